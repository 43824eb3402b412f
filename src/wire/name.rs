//! Domain name codec
//!
//! Names are written as a sequence of length-prefixed labels closed by a
//! zero byte. Compression pointers are recognised and rejected.

use std::fmt;
use std::str::FromStr;

use crate::wire::{WireError, WireReader};

/// Maximum bytes in a single label
pub const MAX_LABEL_LEN: usize = 63;

/// Maximum bytes in an encoded name, terminator included
pub const MAX_NAME_LEN: usize = 255;

/// Top two bits of a length byte
const LABEL_KIND_MASK: u8 = 0xC0;
const LABEL_KIND_POINTER: u8 = 0xC0;

/// Uncompressed domain name held as raw label bytes
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DomainName {
    labels: Vec<Vec<u8>>,
}

impl DomainName {
    /// The root name (no labels)
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a name from raw labels, validating label and total lengths
    pub fn from_labels<I, L>(labels: I) -> Result<Self, WireError>
    where
        I: IntoIterator<Item = L>,
        L: Into<Vec<u8>>,
    {
        let name = Self {
            labels: labels.into_iter().map(Into::into).collect(),
        };

        for label in &name.labels {
            if label.is_empty() {
                return Err(WireError::InvalidName("empty label".to_string()));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(WireError::InvalidName(format!(
                    "label of {} bytes exceeds {}",
                    label.len(),
                    MAX_LABEL_LEN
                )));
            }
        }

        if name.wire_len() > MAX_NAME_LEN {
            return Err(WireError::InvalidName(format!(
                "name of {} bytes exceeds {}",
                name.wire_len(),
                MAX_NAME_LEN
            )));
        }

        Ok(name)
    }

    pub fn labels(&self) -> &[Vec<u8>] {
        &self.labels
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of bytes `encode` writes
    pub fn wire_len(&self) -> usize {
        1 + self.labels.iter().map(|l| l.len() + 1).sum::<usize>()
    }

    /// Copy with every label ASCII-lowercased; label boundaries and
    /// non-ASCII bytes are kept as is
    pub fn to_lowercase(&self) -> DomainName {
        DomainName {
            labels: self.labels.iter().map(|l| l.to_ascii_lowercase()).collect(),
        }
    }

    /// Append the wire form to `out`
    pub fn encode(&self, out: &mut Vec<u8>) {
        for label in &self.labels {
            out.push(label.len() as u8);
            out.extend_from_slice(label);
        }
        out.push(0);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.wire_len());
        self.encode(&mut out);
        out
    }

    /// Read a name at the reader's position
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        let mut labels = Vec::new();
        let mut wire_len = 1;

        loop {
            let offset = reader.position();
            let len = reader
                .read_u8()
                .map_err(|_| WireError::MalformedName { offset })?;

            match len & LABEL_KIND_MASK {
                0 => {}
                LABEL_KIND_POINTER => return Err(WireError::CompressionNotSupported { offset }),
                _ => return Err(WireError::MalformedName { offset }),
            }

            if len == 0 {
                break;
            }

            let label = reader
                .read_bytes(len as usize)
                .map_err(|_| WireError::MalformedName { offset })?;

            wire_len += label.len() + 1;
            if wire_len > MAX_NAME_LEN {
                return Err(WireError::MalformedName { offset });
            }

            labels.push(label.to_vec());
        }

        Ok(Self { labels })
    }
}

/// Decode the name starting at `offset` in `buf`
///
/// Returns the name and the number of bytes it occupied.
pub fn read_name(buf: &[u8], offset: usize) -> Result<(DomainName, usize), WireError> {
    if offset >= buf.len() {
        return Err(WireError::MalformedName { offset });
    }
    let mut reader = WireReader::at(buf, offset);
    let name = DomainName::decode(&mut reader)?;
    Ok((name, reader.position() - offset))
}

impl FromStr for DomainName {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_suffix('.').unwrap_or(s);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        Self::from_labels(trimmed.split('.').map(|l| l.as_bytes().to_vec()))
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            return write!(f, ".");
        }
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", String::from_utf8_lossy(label))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_codecrafters() {
        let bytes = b"\x0ccodecrafters\x02io\x00";

        let (name, consumed) = read_name(bytes, 0).unwrap();
        assert_eq!(name.to_string(), "codecrafters.io");
        assert_eq!(consumed, bytes.len());
        assert_eq!(name.to_bytes(), bytes.to_vec());
    }

    #[test]
    fn test_parse_roundtrip() {
        for input in ["codecrafters.io", "a.b.c.d", "seed.example.network", "x"] {
            let name: DomainName = input.parse().unwrap();
            let (decoded, consumed) = read_name(&name.to_bytes(), 0).unwrap();
            assert_eq!(decoded, name);
            assert_eq!(consumed, name.wire_len());
            assert_eq!(decoded.to_string(), input);
        }
    }

    #[test]
    fn test_root_name() {
        let root: DomainName = ".".parse().unwrap();
        assert!(root.is_root());
        assert_eq!(root.to_bytes(), vec![0]);
        assert_eq!(read_name(&[0], 0).unwrap(), (DomainName::root(), 1));
    }

    #[test]
    fn test_trailing_dot_accepted() {
        let a: DomainName = "example.com.".parse().unwrap();
        let b: DomainName = "example.com".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert!("a..b".parse::<DomainName>().is_err());
        assert!("x".repeat(64).parse::<DomainName>().is_err());

        let long = vec!["abcdefghij"; 30].join(".");
        assert!(long.parse::<DomainName>().is_err());
    }

    #[test]
    fn test_binary_label_bytes_preserved() {
        let bytes = [2, 0x00, 0xFF, 1, 0x0C, 0];

        let (name, consumed) = read_name(&bytes, 0).unwrap();
        assert_eq!(consumed, 6);
        assert_eq!(name.labels(), &[vec![0x00, 0xFF], vec![0x0C]]);
        assert_eq!(name.to_bytes(), bytes.to_vec());
    }

    #[test]
    fn test_compression_pointer_rejected() {
        let bytes = [3, b'w', b'w', b'w', 0xC0, 0x0C];
        assert_eq!(
            read_name(&bytes, 0),
            Err(WireError::CompressionNotSupported { offset: 4 })
        );
    }

    #[test]
    fn test_label_past_end() {
        let bytes = [5, b'a', b'b'];
        assert_eq!(read_name(&bytes, 0), Err(WireError::MalformedName { offset: 0 }));
    }

    #[test]
    fn test_missing_terminator() {
        let bytes = [1, b'a'];
        assert_eq!(read_name(&bytes, 0), Err(WireError::MalformedName { offset: 2 }));
    }

    #[test]
    fn test_extended_label_type_rejected() {
        let bytes = [0x41, b'a', 0];
        assert_eq!(read_name(&bytes, 0), Err(WireError::MalformedName { offset: 0 }));
    }

    #[test]
    fn test_offset_past_buffer() {
        assert!(read_name(&[0], 5).is_err());
    }

    #[test]
    fn test_case_insensitive_compare() {
        let a: DomainName = "CodeCrafters.IO".parse().unwrap();
        let b: DomainName = "codecrafters.io".parse().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.to_lowercase(), b);
    }

    #[test]
    fn test_lowercase_keeps_label_boundaries() {
        let dotted = DomainName::from_labels([b"A.b".to_vec()]).unwrap();
        let split: DomainName = "a.b".parse().unwrap();

        assert_eq!(dotted.to_lowercase().labels(), &[b"a.b".to_vec()]);
        assert_ne!(dotted.to_lowercase(), split);

        let binary = DomainName::from_labels([vec![0xFF, b'X']]).unwrap();
        assert_eq!(binary.to_lowercase().labels(), &[vec![0xFF, b'x']]);
    }
}
