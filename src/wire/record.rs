//! Question and resource record codec

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::wire::{DomainName, RecordClass, RecordType, WireError, WireReader};

/// Bytes following the name in a record: type, class, TTL, rdlength
pub const RECORD_FIXED_LEN: usize = 10;

/// Bytes following the name in a question: type, class
pub const QUESTION_FIXED_LEN: usize = 4;

/// Question section entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: DomainName,
    pub qtype: RecordType,
    pub qclass: RecordClass,
}

impl Question {
    pub fn new(name: DomainName, qtype: RecordType, qclass: RecordClass) -> Self {
        Self {
            name,
            qtype,
            qclass,
        }
    }

    pub fn wire_len(&self) -> usize {
        self.name.wire_len() + QUESTION_FIXED_LEN
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        self.name.encode(out);
        out.extend_from_slice(&self.qtype.to_u16().to_be_bytes());
        out.extend_from_slice(&self.qclass.to_u16().to_be_bytes());
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.wire_len());
        self.encode(&mut out);
        out
    }

    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        let name = DomainName::decode(reader)?;
        let qtype = RecordType::from_u16(reader.read_u16()?);
        let qclass = RecordClass::from_u16(reader.read_u16()?);

        Ok(Self {
            name,
            qtype,
            qclass,
        })
    }
}

/// Resource record (answer, authority or additional entry)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: DomainName,
    pub rtype: RecordType,
    pub rclass: RecordClass,

    /// Time to live in seconds
    pub ttl: u32,

    /// Declared resource data length; must equal `data.len()`
    pub rdlength: u16,

    /// Raw resource data
    pub data: Vec<u8>,
}

impl ResourceRecord {
    /// Build a record whose declared length matches `data`
    ///
    /// Fails with `RecordLengthMismatch` when `data` does not fit the
    /// 16-bit length field.
    pub fn new(
        name: DomainName,
        rtype: RecordType,
        rclass: RecordClass,
        ttl: u32,
        data: Vec<u8>,
    ) -> Result<Self, WireError> {
        let rdlength = u16::try_from(data.len()).map_err(|_| WireError::RecordLengthMismatch {
            declared: u16::MAX,
            actual: data.len(),
        })?;

        Ok(Self {
            name,
            rtype,
            rclass,
            ttl,
            rdlength,
            data,
        })
    }

    pub fn a(name: DomainName, addr: Ipv4Addr, ttl: u32) -> Self {
        Self {
            name,
            rtype: RecordType::A,
            rclass: RecordClass::IN,
            ttl,
            rdlength: 4,
            data: addr.octets().to_vec(),
        }
    }

    pub fn aaaa(name: DomainName, addr: Ipv6Addr, ttl: u32) -> Self {
        Self {
            name,
            rtype: RecordType::AAAA,
            rclass: RecordClass::IN,
            ttl,
            rdlength: 16,
            data: addr.octets().to_vec(),
        }
    }

    pub fn wire_len(&self) -> usize {
        self.name.wire_len() + RECORD_FIXED_LEN + self.data.len()
    }

    pub fn encode(&self, out: &mut Vec<u8>) -> Result<(), WireError> {
        if self.rdlength as usize != self.data.len() {
            return Err(WireError::RecordLengthMismatch {
                declared: self.rdlength,
                actual: self.data.len(),
            });
        }

        self.name.encode(out);
        out.extend_from_slice(&self.rtype.to_u16().to_be_bytes());
        out.extend_from_slice(&self.rclass.to_u16().to_be_bytes());
        out.extend_from_slice(&self.ttl.to_be_bytes());
        out.extend_from_slice(&self.rdlength.to_be_bytes());
        out.extend_from_slice(&self.data);

        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, WireError> {
        let mut out = Vec::with_capacity(self.wire_len());
        self.encode(&mut out)?;
        Ok(out)
    }

    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        let name = DomainName::decode(reader)?;
        let rtype = RecordType::from_u16(reader.read_u16()?);
        let rclass = RecordClass::from_u16(reader.read_u16()?);
        let ttl = reader.read_u32()?;
        let rdlength = reader.read_u16()?;
        let data = reader.read_bytes(rdlength as usize)?.to_vec();

        Ok(Self {
            name,
            rtype,
            rclass,
            ttl,
            rdlength,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> DomainName {
        s.parse().unwrap()
    }

    #[test]
    fn test_question_bytes() {
        let question = Question::new(name("codecrafters.io"), RecordType::A, RecordClass::IN);

        let mut expected = b"\x0ccodecrafters\x02io\x00".to_vec();
        expected.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
        assert_eq!(question.to_bytes(), expected);

        let mut reader = WireReader::new(&expected);
        assert_eq!(Question::decode(&mut reader).unwrap(), question);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_record_roundtrip() {
        let record = ResourceRecord {
            name: name("codecrafters.io"),
            rtype: RecordType::A,
            rclass: RecordClass::IN,
            ttl: 60,
            rdlength: 4,
            data: vec![8, 8, 8, 8],
        };

        let bytes = record.to_bytes().unwrap();
        assert_eq!(bytes.len(), record.name.wire_len() + 2 + 2 + 4 + 2 + 4);
        assert_eq!(&bytes[bytes.len() - 10..bytes.len() - 4], &[0, 0, 0, 60, 0, 4]);

        let mut reader = WireReader::new(&bytes);
        let decoded = ResourceRecord::decode(&mut reader).unwrap();
        assert_eq!(decoded.ttl, 60);
        assert_eq!(decoded.rtype, RecordType::A);
        assert_eq!(decoded.rclass, RecordClass::IN);
        assert_eq!(decoded.data, vec![8, 8, 8, 8]);
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_record_length_mismatch() {
        let mut record = ResourceRecord::a(name("example.com"), Ipv4Addr::new(1, 2, 3, 4), 30);
        record.rdlength = 5;

        assert_eq!(
            record.to_bytes(),
            Err(WireError::RecordLengthMismatch {
                declared: 5,
                actual: 4
            })
        );
    }

    #[test]
    fn test_new_sets_length() {
        let record = ResourceRecord::new(
            name("example.com"),
            RecordType::TXT,
            RecordClass::IN,
            300,
            b"\x05hello".to_vec(),
        )
        .unwrap();

        assert_eq!(record.rdlength, 6);
        assert_eq!(record.wire_len(), record.to_bytes().unwrap().len());
    }

    #[test]
    fn test_aaaa_record() {
        let record = ResourceRecord::aaaa(name("v6.example"), Ipv6Addr::LOCALHOST, 10);
        assert_eq!(record.rdlength, 16);
        assert_eq!(record.data[15], 1);
    }

    #[test]
    fn test_truncated_rdata() {
        let record = ResourceRecord::a(name("a.b"), Ipv4Addr::new(9, 9, 9, 9), 1);
        let bytes = record.to_bytes().unwrap();

        let short = &bytes[..bytes.len() - 2];
        let mut reader = WireReader::new(short);
        assert!(matches!(
            ResourceRecord::decode(&mut reader),
            Err(WireError::TruncatedSection { .. })
        ));
    }

    #[test]
    fn test_truncated_question_fields() {
        let bytes = b"\x01a\x00\x00";
        let mut reader = WireReader::new(bytes);
        assert_eq!(
            Question::decode(&mut reader),
            Err(WireError::TruncatedSection { offset: 3 })
        );
    }
}
