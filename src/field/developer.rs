use alloc::vec::Vec;

use super::{Field, sized};
use crate::error::TgaError;

/// One developer-directory record: where a tagged block lives in the file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DirectoryEntry {
    pub tag: u16,
    pub offset: u32,
    pub size: u32,
}

impl Field for DirectoryEntry {
    const NAME: &'static str = "developer directory entry";
    const SIZE: usize = 10;

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.tag.to_le_bytes());
        out.extend_from_slice(&self.offset.to_le_bytes());
        out.extend_from_slice(&self.size.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Result<Self, TgaError> {
        let mut c = sized::<Self>(bytes)?;
        Ok(Self {
            tag: c.read_u16_le()?,
            offset: c.read_u32_le()?,
            size: c.read_u32_le()?,
        })
    }
}
