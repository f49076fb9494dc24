//! Bounds-checked little-endian reader over `&[u8]`.
//!
//! Every read past the end of the input is `TgaError::TruncatedStream`.

use crate::error::TgaError;

pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn set_position(&mut self, pos: usize) -> Result<(), TgaError> {
        if pos > self.data.len() {
            return Err(TgaError::TruncatedStream);
        }
        self.pos = pos;
        Ok(())
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, TgaError> {
        let b = *self.data.get(self.pos).ok_or(TgaError::TruncatedStream)?;
        self.pos += 1;
        Ok(b)
    }

    pub(crate) fn read_u16_le(&mut self) -> Result<u16, TgaError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_u32_le(&mut self) -> Result<u32, TgaError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_array<const N: usize>(&mut self) -> Result<[u8; N], TgaError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.read_bytes(N)?);
        Ok(buf)
    }

    /// Borrow the next `n` bytes and advance past them.
    pub(crate) fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], TgaError> {
        let end = self.pos.checked_add(n).ok_or(TgaError::TruncatedStream)?;
        let bytes = self
            .data
            .get(self.pos..end)
            .ok_or(TgaError::TruncatedStream)?;
        self.pos = end;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian() {
        let data = [0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let mut c = Cursor::new(&data);
        assert_eq!(c.read_u8().unwrap(), 1);
        assert_eq!(c.read_u16_le().unwrap(), 0x1234);
        assert_eq!(c.read_u32_le().unwrap(), 0x1234_5678);
        assert_eq!(c.position(), 7);
        assert!(matches!(c.read_u8(), Err(TgaError::TruncatedStream)));
    }

    #[test]
    fn short_read_does_not_advance() {
        let data = [1, 2, 3];
        let mut c = Cursor::new(&data);
        assert!(c.read_u32_le().is_err());
        assert_eq!(c.position(), 0);
        assert!(c.set_position(4).is_err());
        c.set_position(3).unwrap();
        assert_eq!(c.read_bytes(0).unwrap(), &[] as &[u8]);
    }
}
