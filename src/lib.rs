//! dns-responder
//!
//! A minimal DNS responder built around a hand-written wire codec.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      DNS RESPONDER                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  wire    ←── header / name / record codec, decode + encode  │
//! │  dns     ←── UDP loop, response builder, answer providers   │
//! │  config  ←── TOML config with CLI overrides                 │
//! │  api     ←── health, metrics and zone over HTTP             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod dns;
pub mod wire;
