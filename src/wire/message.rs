//! Full DNS message: header plus the four sections

use crate::wire::{Header, Question, ResourceRecord, WireError, WireReader, HEADER_SIZE};

/// Decoded DNS message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authority: Vec<ResourceRecord>,
    pub additional: Vec<ResourceRecord>,
}

impl Message {
    pub fn new(header: Header) -> Self {
        Self {
            header,
            ..Default::default()
        }
    }

    pub fn id(&self) -> u16 {
        self.header.id
    }

    /// Copy the section lengths into the header counts
    pub fn sync_counts(&mut self) -> Result<(), WireError> {
        self.header.question_count = section_count(self.questions.len())?;
        self.header.answer_count = section_count(self.answers.len())?;
        self.header.authority_count = section_count(self.authority.len())?;
        self.header.additional_count = section_count(self.additional.len())?;
        Ok(())
    }

    /// Bytes `encode` produces
    pub fn wire_len(&self) -> usize {
        HEADER_SIZE
            + self.questions.iter().map(Question::wire_len).sum::<usize>()
            + self
                .answers
                .iter()
                .chain(&self.authority)
                .chain(&self.additional)
                .map(ResourceRecord::wire_len)
                .sum::<usize>()
    }

    /// Parse a complete message
    ///
    /// Reads exactly as many entries as the header announces; bytes after
    /// the last section are ignored.
    pub fn decode(data: &[u8]) -> Result<Self, WireError> {
        let header = Header::decode(data)?;
        let mut reader = WireReader::at(data, HEADER_SIZE);

        let questions = (0..header.question_count)
            .map(|_| Question::decode(&mut reader))
            .collect::<Result<Vec<_>, _>>()?;
        let answers = read_records(&mut reader, header.answer_count)?;
        let authority = read_records(&mut reader, header.authority_count)?;
        let additional = read_records(&mut reader, header.additional_count)?;

        Ok(Self {
            header,
            questions,
            answers,
            authority,
            additional,
        })
    }

    /// Serialize the message
    ///
    /// The written counts always come from the section lengths, whatever
    /// the stored header says.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let mut header = self.header;
        header.question_count = section_count(self.questions.len())?;
        header.answer_count = section_count(self.answers.len())?;
        header.authority_count = section_count(self.authority.len())?;
        header.additional_count = section_count(self.additional.len())?;

        let mut out = Vec::with_capacity(self.wire_len());
        out.extend_from_slice(&header.encode());

        for question in &self.questions {
            question.encode(&mut out);
        }
        for record in self
            .answers
            .iter()
            .chain(&self.authority)
            .chain(&self.additional)
        {
            record.encode(&mut out)?;
        }

        Ok(out)
    }
}

fn read_records(
    reader: &mut WireReader<'_>,
    count: u16,
) -> Result<Vec<ResourceRecord>, WireError> {
    (0..count).map(|_| ResourceRecord::decode(reader)).collect()
}

fn section_count(len: usize) -> Result<u16, WireError> {
    u16::try_from(len).map_err(|_| WireError::CountOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{DomainName, RecordClass, RecordType};
    use std::net::Ipv4Addr;

    fn codecrafters() -> DomainName {
        "codecrafters.io".parse().unwrap()
    }

    fn sample_response() -> Message {
        let mut header = Header::new(1234);
        header.response = true;

        let mut message = Message::new(header);
        message
            .questions
            .push(Question::new(codecrafters(), RecordType::A, RecordClass::IN));
        message
            .answers
            .push(ResourceRecord::a(codecrafters(), Ipv4Addr::new(8, 8, 8, 8), 60));
        message
    }

    #[test]
    fn test_encode_matches_fixed_layout() {
        let bytes = sample_response().encode().unwrap();

        assert_eq!(&bytes[0..12], &[0x04, 0xD2, 0x80, 0x00, 0, 1, 0, 1, 0, 0, 0, 0]);

        let mut expected = bytes[..12].to_vec();
        expected.extend_from_slice(b"\x0ccodecrafters\x02io\x00\x00\x01\x00\x01");
        expected.extend_from_slice(b"\x0ccodecrafters\x02io\x00\x00\x01\x00\x01");
        expected.extend_from_slice(&[0, 0, 0, 60, 0, 4, 8, 8, 8, 8]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_message_roundtrip() {
        let mut message = sample_response();
        message.authority.push(
            ResourceRecord::new(
                "example.org".parse().unwrap(),
                RecordType::TXT,
                RecordClass::IN,
                120,
                b"\x03abc".to_vec(),
            )
            .unwrap(),
        );
        message.sync_counts().unwrap();

        let bytes = message.encode().unwrap();
        assert_eq!(bytes.len(), message.wire_len());

        let decoded = Message::decode(&bytes).unwrap();
        assert_eq!(decoded, message);
        assert_eq!(decoded.header.authority_count, 1);
    }

    #[test]
    fn test_encode_counts_follow_sections() {
        let mut message = sample_response();
        message.header.answer_count = 7;

        let bytes = message.encode().unwrap();
        assert_eq!(u16::from_be_bytes([bytes[6], bytes[7]]), 1);
    }

    #[test]
    fn test_decode_missing_question() {
        let bytes = [0x00, 0x01, 0x01, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            Message::decode(&bytes),
            Err(WireError::MalformedName { offset: 12 })
        );
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut bytes = sample_response().encode().unwrap();
        bytes.extend_from_slice(&[0xAA, 0xBB]);

        let decoded = Message::decode(&bytes).unwrap();
        assert_eq!(decoded.answers.len(), 1);
    }

    #[test]
    fn test_encode_rejects_bad_record() {
        let mut message = sample_response();
        message.answers[0].data.push(0);

        assert!(matches!(
            message.encode(),
            Err(WireError::RecordLengthMismatch { declared: 4, actual: 5 })
        ));
    }
}
