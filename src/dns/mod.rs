//! DNS Server Module
//!
//! Answers DNS queries over UDP.
//!
//! ## Pipeline
//!
//! ```text
//! datagram -> wire::decode -> DnsHandler::handle -> wire::encode -> datagram
//!                                   |
//!                             AnswerProvider
//! ```
//!
//! Undecodable datagrams still get a reply (FORMERR, ID echoed when
//! present) so clients never wait on a dropped packet.

mod handler;
mod server;
mod zone;

pub use handler::DnsHandler;
pub use server::{run_dns_server, DnsServer};
pub use zone::{AnswerProvider, Lookup, StaticZone};
