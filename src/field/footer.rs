use alloc::vec::Vec;

use super::{Field, sized};
use crate::error::TgaError;

/// Signature that marks a v2.0 file.
pub const SIGNATURE: &[u8; 16] = b"TRUEVISION-XFILE";

/// The 26-byte trailer of a v2.0 file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Footer {
    /// 0 when there is no extension area.
    pub extension_offset: u32,
    /// 0 when there is no developer directory.
    pub developer_directory_offset: u32,
}

impl Field for Footer {
    const NAME: &'static str = "footer";
    const SIZE: usize = 26;

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.extension_offset.to_le_bytes());
        out.extend_from_slice(&self.developer_directory_offset.to_le_bytes());
        out.extend_from_slice(SIGNATURE);
        out.extend_from_slice(b".\0");
    }

    /// Fails with [`TgaError::InvalidSignature`] unless the signature matches exactly.
    fn decode(bytes: &[u8]) -> Result<Self, TgaError> {
        let mut c = sized::<Self>(bytes)?;
        let extension_offset = c.read_u32_le()?;
        let developer_directory_offset = c.read_u32_le()?;
        if c.read_bytes(SIGNATURE.len())? != SIGNATURE {
            return Err(TgaError::InvalidSignature);
        }
        Ok(Self {
            extension_offset,
            developer_directory_offset,
        })
    }
}
