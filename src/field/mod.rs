//! Fixed-size binary records of the TGA container.
//!
//! Every record knows its encoded size and how to write and read itself.
//! Decoding validates the byte count before looking at any field.

mod developer;
mod extension;
mod footer;
mod header;
mod text;

pub use developer::DirectoryEntry;
pub use extension::{
    AttributeType, ExtensionMetadata, ExtensionOffsets, Fraction, JobTime, KeyColor,
    SoftwareVersion, TimeStamp,
};
pub use footer::{Footer, SIGNATURE};
pub use header::{
    ColorMapSpec, ColorMapType, Header, ImageDescriptor, ImageOrigin, ImageSpec, ImageType,
};
pub use text::{AuthorComments, ImageId};

pub(crate) use extension::ExtensionBlock;

use alloc::vec::Vec;

use crate::cursor::Cursor;
use crate::error::TgaError;

/// A fixed-size record with a byte-exact encoding.
pub trait Field: Sized {
    /// Section name used in length errors.
    const NAME: &'static str;
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Append exactly [`Self::SIZE`] bytes to `out`.
    fn write_to(&self, out: &mut Vec<u8>);

    /// Decode from exactly [`Self::SIZE`] bytes.
    fn decode(bytes: &[u8]) -> Result<Self, TgaError>;

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::SIZE);
        self.write_to(&mut out);
        debug_assert_eq!(out.len(), Self::SIZE);
        out
    }
}

/// Cursor over `bytes` after checking it is exactly one `F` long.
pub(crate) fn sized<F: Field>(bytes: &[u8]) -> Result<Cursor<'_>, TgaError> {
    if bytes.len() != F::SIZE {
        return Err(TgaError::length(F::NAME, F::SIZE, bytes.len()));
    }
    Ok(Cursor::new(bytes))
}

/// Read one `F` from the cursor's current position.
pub(crate) fn read<F: Field>(c: &mut Cursor<'_>) -> Result<F, TgaError> {
    F::decode(c.read_bytes(F::SIZE)?)
}
