//! Run-length packet codec.
//!
//! A packet is one header byte followed by pixel data. With bit 7 set the
//! packet is a run: one pixel repeated `(header & 0x7F) + 1` times. With bit
//! 7 clear it is raw: `header + 1` literal pixels. The encoder never lets a
//! packet cross a scanline; the decoder is a flat byte-count loop.

mod decode;
mod encode;

pub(crate) use decode::decode_from;
pub(crate) use encode::{encode_into, encoded_len};

use alloc::vec::Vec;
use enough::{Stop, Unstoppable};

use crate::cursor::Cursor;
use crate::error::TgaError;

/// Most pixels a single packet can describe.
pub const MAX_PACKET_PIXELS: usize = 128;

/// Run-length encode `width * height` pixels of `bytes_per_pixel` bytes each.
///
/// `pixels` must be exactly `width * height * bytes_per_pixel` bytes long.
pub fn encode_rle(
    pixels: &[u8],
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
) -> Result<Vec<u8>, TgaError> {
    encode_rle_with(pixels, width, height, bytes_per_pixel, &Unstoppable)
}

/// [`encode_rle`] with cooperative cancellation.
pub fn encode_rle_with(
    pixels: &[u8],
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
    stop: &dyn Stop,
) -> Result<Vec<u8>, TgaError> {
    check_input(pixels.len(), width, height, bytes_per_pixel)?;
    let mut out = Vec::with_capacity(encoded_len(pixels, width, bytes_per_pixel));
    encode_into(pixels, width, bytes_per_pixel, &mut out, stop)?;
    Ok(out)
}

/// Expand a packet stream until `width * height * bytes_per_pixel` bytes
/// have been produced. Bytes after the last needed packet are ignored.
pub fn decode_rle(
    stream: &[u8],
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
) -> Result<Vec<u8>, TgaError> {
    decode_rle_with(stream, width, height, bytes_per_pixel, &Unstoppable)
}

/// [`decode_rle`] with cooperative cancellation.
pub fn decode_rle_with(
    stream: &[u8],
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
    stop: &dyn Stop,
) -> Result<Vec<u8>, TgaError> {
    let expected = expected_len(width, height, bytes_per_pixel)?;
    decode_from(&mut Cursor::new(stream), expected, bytes_per_pixel, stop)
}

fn expected_len(width: usize, height: usize, bytes_per_pixel: usize) -> Result<usize, TgaError> {
    if bytes_per_pixel == 0 {
        return Err(TgaError::UnsupportedPixelFormat(
            "zero bytes per pixel".into(),
        ));
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(bytes_per_pixel))
        .ok_or_else(|| {
            TgaError::LimitExceeded(alloc::format!(
                "{width}x{height} at {bytes_per_pixel} bytes per pixel overflows"
            ))
        })
}

/// Validate an uncompressed pixel buffer against its declared geometry.
pub(crate) fn check_input(
    len: usize,
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
) -> Result<(), TgaError> {
    let expected = expected_len(width, height, bytes_per_pixel)?;
    if len != expected {
        return Err(TgaError::length("pixel buffer", expected, len));
    }
    Ok(())
}
