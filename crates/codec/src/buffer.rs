//! Big-endian byte buffers.
//!
//! Cache formats are read with a cursor that can be repositioned freely:
//! model decoders open several readers over the same bytes, each starting at
//! a different section offset.

use crate::error::{ErrorKind, Result};

/// A bounds-checked cursor over a byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// A reader positioned at `offset`. Positions past the end are allowed;
    /// the first read from them fails.
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn set_position(&mut self, offset: usize) {
        self.offset = offset;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    /// Borrow the next `count` bytes and advance past them.
    pub fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if self.offset > self.data.len() || count > available {
            exn::bail!(ErrorKind::UnexpectedEof {
                offset: self.offset,
                needed: count,
                available,
            });
        }
        let slice = &self.data[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn peek_u8(&self) -> Result<u8> {
        match self.data.get(self.offset) {
            Some(byte) => Ok(*byte),
            None => exn::bail!(ErrorKind::UnexpectedEof {
                offset: self.offset,
                needed: 1,
                available: 0,
            }),
        }
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    pub fn i8(&mut self) -> Result<i8> {
        Ok(self.u8()? as i8)
    }

    pub fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    pub fn u24(&mut self) -> Result<u32> {
        let [a, b, c] = self.array()?;
        Ok(u32::from_be_bytes([0, a, b, c]))
    }

    pub fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    pub fn i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    /// Signed smart: one byte in `-64..64`, otherwise two bytes in `-16384..16384`.
    pub fn short_smart(&mut self) -> Result<i32> {
        if self.peek_u8()? < 128 {
            Ok(i32::from(self.u8()?) - 64)
        } else {
            Ok(i32::from(self.u16()?) - 0xC000)
        }
    }

    /// Two bytes when the high bit is clear, otherwise four bytes with the
    /// high bit masked off.
    pub fn big_smart(&mut self) -> Result<u32> {
        if self.peek_u8()? & 0x80 != 0 {
            Ok(self.u32()? & 0x7FFF_FFFF)
        } else {
            Ok(u32::from(self.u16()?))
        }
    }
}

/// A growable big-endian output buffer.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    data: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.data.push(value);
        self
    }

    pub fn put_u16(&mut self, value: u16) -> &mut Self {
        self.data.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Writes the low 24 bits of `value`.
    pub fn put_u24(&mut self, value: u32) -> &mut Self {
        self.data.extend_from_slice(&value.to_be_bytes()[1..]);
        self
    }

    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.data.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn put_i32(&mut self, value: i32) -> &mut Self {
        self.data.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Inverse of [`Reader::short_smart`]. Values outside `-16384..16384`
    /// cannot be represented.
    pub fn put_short_smart(&mut self, value: i32) -> Result<&mut Self> {
        match value {
            -64..64 => Ok(self.put_u8((value + 64) as u8)),
            -16384..16384 => Ok(self.put_u16((value + 0xC000) as u16)),
            _ => exn::bail!(ErrorKind::InvalidData),
        }
    }

    /// Inverse of [`Reader::big_smart`].
    pub fn put_big_smart(&mut self, value: u32) -> Result<&mut Self> {
        match value {
            0..0x8000 => Ok(self.put_u16(value as u16)),
            0x8000..0x8000_0000 => Ok(self.put_u32(value | 0x8000_0000)),
            _ => exn::bail!(ErrorKind::InvalidData),
        }
    }
}

impl From<Writer> for Vec<u8> {
    fn from(writer: Writer) -> Self {
        writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn reads_big_endian_integers() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xFF, 0xFF, 0xFF, 0xFE];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u8().unwrap(), 0x01);
        assert_eq!(reader.u16().unwrap(), 0x0203);
        assert_eq!(reader.u24().unwrap(), 0x040506);
        assert_eq!(reader.i32().unwrap(), -2);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn read_past_end_reports_offset() {
        let data = [0x00, 0x01, 0x02];
        let mut reader = Reader::at(&data, 2);
        let err = reader.u16().unwrap_err();
        assert_eq!(
            *err,
            ErrorKind::UnexpectedEof {
                offset: 2,
                needed: 2,
                available: 1
            }
        );
        // A failed read does not advance.
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn reader_positioned_beyond_end() {
        let data = [0x00];
        let mut reader = Reader::at(&data, 10);
        assert_eq!(reader.remaining(), 0);
        assert!(reader.peek_u8().is_err());

        let err = reader.take(0).unwrap_err();
        assert_eq!(
            *err,
            ErrorKind::UnexpectedEof {
                offset: 10,
                needed: 0,
                available: 0,
            }
        );
        assert!(reader.skip(0).is_err());
    }

    #[rstest]
    #[case(&[0x40], 0)]
    #[case(&[0x00], -64)]
    #[case(&[0x7F], 63)]
    #[case(&[0x80, 0x00], -16384)]
    #[case(&[0xC0, 0x40], 64)]
    #[case(&[0xFF, 0xFF], 16383)]
    fn reads_short_smart(#[case] bytes: &[u8], #[case] expected: i32) {
        let mut reader = Reader::new(bytes);
        assert_eq!(reader.short_smart().unwrap(), expected);
        assert_eq!(reader.remaining(), 0);
    }

    #[rstest]
    #[case(&[0x00, 0x05], 5)]
    #[case(&[0x7F, 0xFF], 0x7FFF)]
    #[case(&[0x80, 0x00, 0x80, 0x00], 0x8000)]
    #[case(&[0xFF, 0xFF, 0xFF, 0xFF], 0x7FFF_FFFF)]
    fn reads_big_smart(#[case] bytes: &[u8], #[case] expected: u32) {
        let mut reader = Reader::new(bytes);
        assert_eq!(reader.big_smart().unwrap(), expected);
        assert_eq!(reader.remaining(), 0);
    }

    #[rstest]
    #[case(-64)]
    #[case(63)]
    #[case(64)]
    #[case(-65)]
    #[case(16383)]
    #[case(-16384)]
    fn short_smart_inverse(#[case] value: i32) {
        let mut writer = Writer::new();
        writer.put_short_smart(value).unwrap();
        let bytes = writer.into_inner();
        let expected_len = if (-64..64).contains(&value) { 1 } else { 2 };
        assert_eq!(bytes.len(), expected_len);
        assert_eq!(Reader::new(&bytes).short_smart().unwrap(), value);
    }

    #[test]
    fn short_smart_out_of_range() {
        assert!(Writer::new().put_short_smart(16384).is_err());
        assert!(Writer::new().put_short_smart(-16385).is_err());
    }

    #[test]
    fn big_smart_widths() {
        let mut writer = Writer::new();
        writer.put_big_smart(0x7FFF).unwrap();
        writer.put_big_smart(0x8000).unwrap();
        assert_eq!(writer.as_slice(), &[0x7F, 0xFF, 0x80, 0x00, 0x80, 0x00]);
        assert!(Writer::new().put_big_smart(0x8000_0000).is_err());
    }

    #[test]
    fn writer_u24_drops_high_byte() {
        let mut writer = Writer::new();
        writer.put_u24(0xAA_010203);
        assert_eq!(writer.as_slice(), &[0x01, 0x02, 0x03]);
    }
}
