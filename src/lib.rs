//! # zentga
//!
//! Truevision TGA reader and writer with byte-exact round trips.
//!
//! ## What it covers
//!
//! - Every image type: color-mapped, true-color and black-and-white, each
//!   uncompressed or run-length encoded
//! - Color-map entries of 15, 16, 24 and 32 bits
//! - The v2.0 tail: developer directory, extension area, scan-line table,
//!   postage stamp, color-correction table and footer
//! - Files without the v2.0 footer signature load as v1.0
//!
//! Parsing keeps pixels in their stored order and format. [`TgaImage::to_rgba8`]
//! expands them to top-left-first RGBA when that is what you need.
//!
//! ## Layout
//!
//! Every offset inside the file is derived. [`resolve`] computes them into a
//! [`Layout`] without touching the image, and saving always resolves first,
//! so an edited image can never be written with stale offsets.
//!
//! ## Non-Goals
//!
//! - Compositing or color-space conversion
//! - Streaming decode of files that do not fit in memory
//! - Editing an existing file in place
//!
//! ## Usage
//!
//! ```no_run
//! use zentga::{DecodeRequest, EncodeRequest, ImageInfo, ImageType, TgaImage};
//! use enough::Unstoppable;
//!
//! let data: &[u8] = &[]; // your TGA bytes
//!
//! // Probe without decoding
//! let info = ImageInfo::from_bytes(data)?;
//! println!("{}x{} {:?}", info.width, info.height, info.image_type);
//!
//! let image = DecodeRequest::new(data).decode(Unstoppable)?;
//! let rgba = image.to_rgba8()?;
//!
//! // Build and write a compressed true-color image
//! let mut out = TgaImage::new(64, 64, 24, ImageType::RleTrueColor);
//! out.upgrade_to_extended();
//! out.generate_postage_stamp()?;
//! let bytes = EncodeRequest::new().encode(&out, Unstoppable)?;
//! # let _ = (rgba, bytes);
//! # Ok::<(), zentga::TgaError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod cursor;
mod error;
mod image;
mod info;
mod layout;
mod limits;

pub mod field;
pub mod pixel;
pub mod rle;

mod decode;
mod encode;

// Re-exports
pub use decode::DecodeRequest;
pub use encode::EncodeRequest;
pub use enough::{Stop, Unstoppable};
pub use error::TgaError;
pub use field::{
    AttributeType, ColorMapSpec, ColorMapType, ExtensionMetadata, ImageId, ImageOrigin,
    ImageSpec, ImageType, TimeStamp,
};
pub use image::{
    DeveloperArea, DeveloperEntry, ExtensionArea, FormatVersion, POSTAGE_STAMP_MAX,
    PostageStamp, TgaImage,
};
pub use info::ImageInfo;
pub use layout::{COLOR_CORRECTION_ENTRIES, ExtensionLayout, Layout, TimestampPolicy, resolve};
pub use limits::Limits;
pub use pixel::ColorMapEntrySize;
pub use rle::{decode_rle, encode_rle};

use alloc::vec::Vec;

/// Parse a whole TGA file with no limits.
pub fn parse(data: &[u8]) -> Result<TgaImage, TgaError> {
    decode::load(data, None, &Unstoppable)
}

/// Serialize `image`, stamping the extension area per [`TimestampPolicy::default`].
pub fn serialize(image: &TgaImage) -> Result<Vec<u8>, TgaError> {
    EncodeRequest::new().encode(image, Unstoppable)
}
