//! DNS Header Codec
//!
//! Fixed 12-byte header:
//!
//! ```text
//!  offset  field
//!  0..2    ID
//!  2..4    flags word
//!  4..6    question count
//!  6..8    answer count
//!  8..10   authority count
//!  10..12  additional count
//! ```
//!
//! Flags word, bit 15 first:
//!
//! ```text
//!  15  14-11   10  9   8   7   6  5   4   3-0
//!  QR  OPCODE  AA  TC  RD  RA  Z  AD  CD  RCODE
//! ```

use std::fmt;

use crate::wire::WireError;

/// Size of the fixed header in bytes
pub const HEADER_SIZE: usize = 12;

/// DNS flags
const FLAG_QR: u16 = 0x8000; // Query/Response
const FLAG_AA: u16 = 0x0400; // Authoritative Answer
const FLAG_TC: u16 = 0x0200; // Truncated
const FLAG_RD: u16 = 0x0100; // Recursion Desired
const FLAG_RA: u16 = 0x0080; // Recursion Available
const FLAG_Z: u16 = 0x0040; // Reserved
const FLAG_AD: u16 = 0x0020; // Authenticated Data
const FLAG_CD: u16 = 0x0010; // Checking Disabled

const OPCODE_SHIFT: u16 = 11;
const NIBBLE: u16 = 0x000F;

/// Operation code (4 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Opcode {
    /// Standard query
    #[default]
    Query,
    /// Inverse query (obsolete)
    IQuery,
    /// Server status request
    Status,
    /// Zone change notification
    Notify,
    /// Dynamic update
    Update,
    /// Any other 4-bit value, kept verbatim
    Unknown(u8),
}

impl Opcode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Opcode::Query,
            1 => Opcode::IQuery,
            2 => Opcode::Status,
            4 => Opcode::Notify,
            5 => Opcode::Update,
            other => Opcode::Unknown(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Opcode::Query => 0,
            Opcode::IQuery => 1,
            Opcode::Status => 2,
            Opcode::Notify => 4,
            Opcode::Update => 5,
            Opcode::Unknown(value) => value,
        }
    }
}

/// Response code (4 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseCode {
    /// No error condition
    #[default]
    NoError,
    /// Format error - the server could not interpret the query
    FormErr,
    /// Server failure
    ServFail,
    /// Name does not exist
    NXDomain,
    /// Query kind not implemented
    NotImp,
    /// Refused for policy reasons
    Refused,
    /// Any other 4-bit value, kept verbatim
    Unknown(u8),
}

impl ResponseCode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => ResponseCode::NoError,
            1 => ResponseCode::FormErr,
            2 => ResponseCode::ServFail,
            3 => ResponseCode::NXDomain,
            4 => ResponseCode::NotImp,
            5 => ResponseCode::Refused,
            other => ResponseCode::Unknown(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            ResponseCode::NoError => 0,
            ResponseCode::FormErr => 1,
            ResponseCode::ServFail => 2,
            ResponseCode::NXDomain => 3,
            ResponseCode::NotImp => 4,
            ResponseCode::Refused => 5,
            ResponseCode::Unknown(value) => value,
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::NoError => write!(f, "NOERROR"),
            ResponseCode::FormErr => write!(f, "FORMERR"),
            ResponseCode::ServFail => write!(f, "SERVFAIL"),
            ResponseCode::NXDomain => write!(f, "NXDOMAIN"),
            ResponseCode::NotImp => write!(f, "NOTIMP"),
            ResponseCode::Refused => write!(f, "REFUSED"),
            ResponseCode::Unknown(value) => write!(f, "RCODE{}", value),
        }
    }
}

/// DNS message header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    /// Transaction ID
    pub id: u16,

    /// QR: set on responses
    pub response: bool,
    pub opcode: Opcode,
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,

    /// Reserved bit; decoded as seen, always written as zero
    pub z: bool,
    pub authed_data: bool,
    pub checking_disabled: bool,
    pub rcode: ResponseCode,

    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub additional_count: u16,
}

impl Header {
    /// Empty query header with the given ID
    pub fn new(id: u16) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Decode the first 12 bytes of `data`
    pub fn decode(data: &[u8]) -> Result<Self, WireError> {
        if data.len() < HEADER_SIZE {
            return Err(WireError::TruncatedHeader { len: data.len() });
        }

        let word = |offset: usize| u16::from_be_bytes([data[offset], data[offset + 1]]);

        let mut header = Header {
            id: word(0),
            question_count: word(4),
            answer_count: word(6),
            authority_count: word(8),
            additional_count: word(10),
            ..Default::default()
        };
        header.apply_flags(word(2));

        Ok(header)
    }

    /// Encode into the fixed 12-byte layout
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..2].copy_from_slice(&self.id.to_be_bytes());
        out[2..4].copy_from_slice(&self.flags().to_be_bytes());
        out[4..6].copy_from_slice(&self.question_count.to_be_bytes());
        out[6..8].copy_from_slice(&self.answer_count.to_be_bytes());
        out[8..10].copy_from_slice(&self.authority_count.to_be_bytes());
        out[10..12].copy_from_slice(&self.additional_count.to_be_bytes());
        out
    }

    /// Pack the flag fields into the 16-bit wire word
    pub fn flags(&self) -> u16 {
        let bit = |set: bool, mask: u16| if set { mask } else { 0 };

        bit(self.response, FLAG_QR)
            | ((self.opcode.to_u8() as u16 & NIBBLE) << OPCODE_SHIFT)
            | bit(self.authoritative, FLAG_AA)
            | bit(self.truncated, FLAG_TC)
            | bit(self.recursion_desired, FLAG_RD)
            | bit(self.recursion_available, FLAG_RA)
            | bit(self.authed_data, FLAG_AD)
            | bit(self.checking_disabled, FLAG_CD)
            | (self.rcode.to_u8() as u16 & NIBBLE)
    }

    /// Unpack a 16-bit wire word into the flag fields
    pub fn apply_flags(&mut self, flags: u16) {
        self.response = flags & FLAG_QR != 0;
        self.opcode = Opcode::from_u8(((flags >> OPCODE_SHIFT) & NIBBLE) as u8);
        self.authoritative = flags & FLAG_AA != 0;
        self.truncated = flags & FLAG_TC != 0;
        self.recursion_desired = flags & FLAG_RD != 0;
        self.recursion_available = flags & FLAG_RA != 0;
        self.z = flags & FLAG_Z != 0;
        self.authed_data = flags & FLAG_AD != 0;
        self.checking_disabled = flags & FLAG_CD != 0;
        self.rcode = ResponseCode::from_u8((flags & NIBBLE) as u8);
    }
}
