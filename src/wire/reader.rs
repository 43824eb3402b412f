//! Bounds-checked read cursor over a whole DNS message

use crate::wire::WireError;

/// Shared cursor used by the section decoders
///
/// Every read checks the remaining length first, so a short buffer
/// surfaces as `TruncatedSection` instead of a panic.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Start reading at `pos` (clamped to the buffer end)
    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self {
            buf,
            pos: pos.min(buf.len()),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    pub fn read_u16(&mut self) -> Result<u16, WireError> {
        self.read_array::<2>().map(u16::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        self.read_array::<4>().map(u32::from_be_bytes)
    }

    /// Borrow the next `len` bytes and advance past them
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        if len > self.remaining() {
            return Err(WireError::TruncatedSection { offset: self.pos });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_big_endian() {
        let data = [0x12, 0x34, 0xde, 0xad, 0xbe, 0xef, 0x07];
        let mut reader = WireReader::new(&data);

        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_u32().unwrap(), 0xdead_beef);
        assert_eq!(reader.read_u8().unwrap(), 7);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_short_read_does_not_advance() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = WireReader::at(&data, 2);

        assert_eq!(
            reader.read_u16(),
            Err(WireError::TruncatedSection { offset: 2 })
        );
        assert_eq!(reader.position(), 2);
        assert_eq!(reader.read_u8().unwrap(), 3);
    }
}
