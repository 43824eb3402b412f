//! DNS Wire Format
//!
//! Pure, stateless codec for DNS messages (RFC 1035 layout, no name
//! compression, no EDNS). The rest of the crate talks to it through
//! [`decode`] and [`encode`].

mod error;
mod header;
mod message;
mod name;
mod reader;
mod record;
mod types;

pub use error::WireError;
pub use header::{Header, Opcode, ResponseCode, HEADER_SIZE};
pub use message::Message;
pub use name::{read_name, DomainName, MAX_LABEL_LEN, MAX_NAME_LEN};
pub use reader::WireReader;
pub use record::{Question, ResourceRecord, QUESTION_FIXED_LEN, RECORD_FIXED_LEN};
pub use types::{RecordClass, RecordType};

/// Largest datagram accepted or sent (no EDNS)
pub const MAX_UDP_PAYLOAD: usize = 512;

/// Decode a raw datagram into a message
pub fn decode(bytes: &[u8]) -> Result<Message, WireError> {
    Message::decode(bytes)
}

/// Encode a message into wire bytes
pub fn encode(message: &Message) -> Result<Vec<u8>, WireError> {
    message.encode()
}
