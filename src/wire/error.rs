//! Codec errors

use crate::wire::ResponseCode;

/// Failure while decoding or encoding a DNS message
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("Truncated header: {len} bytes, need 12")]
    TruncatedHeader { len: usize },

    #[error("Malformed name at offset {offset}")]
    MalformedName { offset: usize },

    #[error("Compression pointer at offset {offset} is not supported")]
    CompressionNotSupported { offset: usize },

    #[error("Truncated section at offset {offset}")]
    TruncatedSection { offset: usize },

    #[error("Record length mismatch: declared {declared}, actual {actual}")]
    RecordLengthMismatch { declared: u16, actual: usize },

    #[error("Unsupported opcode {0}")]
    UnsupportedOpcode(u8),

    #[error("Unsupported record type {0}")]
    UnsupportedType(u16),

    #[error("Query has no questions")]
    NoQuestions,

    #[error("Invalid domain name: {0}")]
    InvalidName(String),

    #[error("Section has more than 65535 entries")]
    CountOverflow,
}

impl WireError {
    /// Result code reported to a peer whose request caused this error
    pub fn response_code(&self) -> ResponseCode {
        match self {
            WireError::TruncatedHeader { .. }
            | WireError::MalformedName { .. }
            | WireError::CompressionNotSupported { .. }
            | WireError::TruncatedSection { .. }
            | WireError::NoQuestions
            | WireError::InvalidName(_) => ResponseCode::FormErr,
            WireError::UnsupportedOpcode(_) | WireError::UnsupportedType(_) => {
                ResponseCode::NotImp
            }
            WireError::RecordLengthMismatch { .. } | WireError::CountOverflow => {
                ResponseCode::ServFail
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_code_mapping() {
        assert_eq!(
            WireError::TruncatedHeader { len: 8 }.response_code(),
            ResponseCode::FormErr
        );
        assert_eq!(
            WireError::CompressionNotSupported { offset: 12 }.response_code(),
            ResponseCode::FormErr
        );
        assert_eq!(WireError::UnsupportedOpcode(2).response_code(), ResponseCode::NotImp);
        assert_eq!(WireError::CountOverflow.response_code(), ResponseCode::ServFail);
    }
}
