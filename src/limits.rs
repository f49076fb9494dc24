//! Resource limits for untrusted input.
//!
//! A TGA header alone decides how much the loader allocates: the color map,
//! the expanded pixels, and every v2.0 table are sized from declared fields.
//! Each of those sizes passes through [`Limits::check_alloc`] first.

use alloc::format;

use crate::error::TgaError;
use crate::field::ImageSpec;

/// Resource limits applied while parsing untrusted TGA bytes.
///
/// All fields default to `None` (no limit).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    pub max_width: Option<u16>,
    pub max_height: Option<u16>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum bytes for any one section buffer (pixels, color map, tables).
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Reject dimensions above the configured maxima.
    pub(crate) fn check_dimensions(&self, width: u16, height: u16) -> Result<(), TgaError> {
        if let Some(max) = self.max_width.filter(|&max| width > max) {
            return Err(TgaError::LimitExceeded(format!(
                "width {width} exceeds limit {max}"
            )));
        }
        if let Some(max) = self.max_height.filter(|&max| height > max) {
            return Err(TgaError::LimitExceeded(format!(
                "height {height} exceeds limit {max}"
            )));
        }
        let pixels = u64::from(width) * u64::from(height);
        if let Some(max) = self.max_pixels.filter(|&max| pixels > max) {
            return Err(TgaError::LimitExceeded(format!(
                "{width}x{height} is {pixels} pixels, limit {max}"
            )));
        }
        Ok(())
    }

    /// Reject a `bytes`-long buffer for `section` above the memory limit.
    pub(crate) fn check_alloc(&self, section: &'static str, bytes: usize) -> Result<(), TgaError> {
        match self.max_memory_bytes {
            Some(max) if bytes as u64 > max => Err(TgaError::LimitExceeded(format!(
                "{section} needs {bytes} bytes, limit {max}"
            ))),
            _ => Ok(()),
        }
    }
}

/// The loader's view of optional limits; `None` checks nothing.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Budget<'a>(pub Option<&'a Limits>);

impl Budget<'_> {
    /// Check the image geometry and its uncompressed pixel buffer.
    pub(crate) fn image(self, spec: &ImageSpec) -> Result<(), TgaError> {
        if let Some(limits) = self.0 {
            limits.check_dimensions(spec.width, spec.height)?;
            limits.check_alloc("image data", spec.data_len())?;
        }
        Ok(())
    }

    pub(crate) fn alloc(self, section: &'static str, bytes: usize) -> Result<(), TgaError> {
        match self.0 {
            Some(limits) => limits.check_alloc(section, bytes),
            None => Ok(()),
        }
    }
}
