//! Pixel and color-map packing.
//!
//! Pure bit arithmetic: entry codecs for the four color-map entry sizes,
//! pixel strides, and expansion of stored pixels to [`RGBA8`].

use alloc::format;
use alloc::vec::Vec;

use enough::Stop;
use rgb::RGBA8;

use crate::error::TgaError;
use crate::field::ImageOrigin;

/// Bytes occupied by one pixel of `pixel_depth` bits: `ceil(depth / 8)`.
///
/// Used as the stride by the RLE codec and the section resolver alike.
pub fn bytes_per_pixel(pixel_depth: u8) -> usize {
    usize::from(pixel_depth).div_ceil(8)
}

/// Bits per color-map entry (color-map spec byte 4).
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorMapEntrySize {
    /// 15-bit X1R5G5B5; bit 15 unused and written as zero.
    Rgb555,
    /// 16-bit A1R5G5B5; bit 15 is a one-bit alpha flag.
    Argb1555,
    /// 24-bit, stored B, G, R.
    Rgb888,
    /// 32-bit, stored B, G, R, A.
    Argb8888,
    /// Any other declared size. Survives a header round trip, cannot be packed.
    Other(u8),
}

impl Default for ColorMapEntrySize {
    fn default() -> Self {
        ColorMapEntrySize::Other(0)
    }
}

impl ColorMapEntrySize {
    pub fn from_bits(bits: u8) -> Self {
        match bits {
            15 => Self::Rgb555,
            16 => Self::Argb1555,
            24 => Self::Rgb888,
            32 => Self::Argb8888,
            other => Self::Other(other),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Rgb555 => 15,
            Self::Argb1555 => 16,
            Self::Rgb888 => 24,
            Self::Argb8888 => 32,
            Self::Other(bits) => bits,
        }
    }

    /// Stored bytes per entry, `ceil(bits / 8)`.
    pub fn bytes_per_entry(self) -> usize {
        bytes_per_pixel(self.bits())
    }

    /// Pack one color into `out`, which must be exactly one entry long.
    ///
    /// The 15/16-bit forms keep the top five bits of each channel; that
    /// direction is lossy.
    pub fn pack(self, color: RGBA8, out: &mut [u8]) -> Result<(), TgaError> {
        self.check_entry_len(out.len())?;
        match self {
            Self::Rgb555 | Self::Argb1555 => {
                let mut word = (u16::from(color.r >> 3) << 10)
                    | (u16::from(color.g >> 3) << 5)
                    | u16::from(color.b >> 3);
                if self == Self::Argb1555 && color.a & 0x80 != 0 {
                    word |= 0x8000;
                }
                out.copy_from_slice(&word.to_le_bytes());
            }
            Self::Rgb888 => out.copy_from_slice(&[color.b, color.g, color.r]),
            Self::Argb8888 => out.copy_from_slice(&[color.b, color.g, color.r, color.a]),
            Self::Other(bits) => return Err(unsupported_entry(bits)),
        }
        Ok(())
    }

    /// Unpack one entry. 5-bit channels scale up by `v * 255 / 31`.
    pub fn unpack(self, bytes: &[u8]) -> Result<RGBA8, TgaError> {
        self.check_entry_len(bytes.len())?;
        Ok(match self {
            Self::Rgb555 => unpack_555(u16::from_le_bytes([bytes[0], bytes[1]]), false),
            Self::Argb1555 => unpack_555(u16::from_le_bytes([bytes[0], bytes[1]]), true),
            Self::Rgb888 => RGBA8::new(bytes[2], bytes[1], bytes[0], 255),
            Self::Argb8888 => RGBA8::new(bytes[2], bytes[1], bytes[0], bytes[3]),
            Self::Other(bits) => return Err(unsupported_entry(bits)),
        })
    }

    fn check_entry_len(self, len: usize) -> Result<(), TgaError> {
        if let Self::Other(bits) = self {
            return Err(unsupported_entry(bits));
        }
        if len != self.bytes_per_entry() {
            return Err(TgaError::length(
                "color-map entry",
                self.bytes_per_entry(),
                len,
            ));
        }
        Ok(())
    }
}

fn unsupported_entry(bits: u8) -> TgaError {
    TgaError::UnsupportedPixelFormat(format!("{bits}-bit color-map entries"))
}

fn scale_5_to_8(v: u16) -> u8 {
    (u32::from(v & 0x1F) * 255 / 31) as u8
}

fn unpack_555(word: u16, alpha_bit: bool) -> RGBA8 {
    let a = if !alpha_bit || word & 0x8000 != 0 {
        255
    } else {
        0
    };
    RGBA8::new(
        scale_5_to_8(word >> 10),
        scale_5_to_8(word >> 5),
        scale_5_to_8(word),
        a,
    )
}

/// Pack a palette into raw color-map bytes.
pub fn encode_palette(
    colors: &[RGBA8],
    entry_size: ColorMapEntrySize,
) -> Result<Vec<u8>, TgaError> {
    if let ColorMapEntrySize::Other(bits) = entry_size {
        return Err(unsupported_entry(bits));
    }
    let stride = entry_size.bytes_per_entry();
    let mut out = alloc::vec![0u8; colors.len() * stride];
    for (color, entry) in colors.iter().zip(out.chunks_exact_mut(stride)) {
        entry_size.pack(*color, entry)?;
    }
    Ok(out)
}

/// Unpack raw color-map bytes; the length must be a whole number of entries.
pub fn decode_palette(data: &[u8], entry_size: ColorMapEntrySize) -> Result<Vec<RGBA8>, TgaError> {
    if let ColorMapEntrySize::Other(bits) = entry_size {
        return Err(unsupported_entry(bits));
    }
    let stride = entry_size.bytes_per_entry();
    if data.len() % stride != 0 {
        return Err(TgaError::length(
            "color map",
            data.len() / stride * stride,
            data.len(),
        ));
    }
    data.chunks_exact(stride)
        .map(|entry| entry_size.unpack(entry))
        .collect()
}

// ── RGBA expansion ──────────────────────────────────────────────────

/// How stored pixel values map to colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PixelKind {
    Indexed,
    TrueColor,
    Gray,
}

pub(crate) struct Expand<'a> {
    pub width: usize,
    pub height: usize,
    pub pixel_depth: u8,
    pub kind: PixelKind,
    /// Whether the descriptor declares attribute (alpha) bits.
    pub alpha: bool,
    pub origin: ImageOrigin,
    pub palette: &'a [RGBA8],
    pub first_index: u16,
}

impl Expand<'_> {
    fn check_supported(&self) -> Result<(), TgaError> {
        let ok = matches!(
            (self.kind, self.pixel_depth),
            (PixelKind::Indexed, 8 | 16)
                | (PixelKind::TrueColor, 15 | 16 | 24 | 32)
                | (PixelKind::Gray, 8 | 16)
        );
        if ok {
            Ok(())
        } else {
            Err(TgaError::UnsupportedPixelFormat(format!(
                "{:?} image at {} bits per pixel",
                self.kind, self.pixel_depth
            )))
        }
    }

    fn pixel(&self, px: &[u8]) -> Result<RGBA8, TgaError> {
        Ok(match (self.kind, px.len()) {
            (PixelKind::Indexed, n) => {
                let index = if n == 1 {
                    u16::from(px[0])
                } else {
                    u16::from_le_bytes([px[0], px[1]])
                };
                index
                    .checked_sub(self.first_index)
                    .and_then(|i| self.palette.get(usize::from(i)))
                    .copied()
                    .ok_or_else(|| {
                        TgaError::InvalidData(format!("color-map index {index} out of range"))
                    })?
            }
            (PixelKind::TrueColor, 2) => {
                let word = u16::from_le_bytes([px[0], px[1]]);
                unpack_555(word, self.alpha && self.pixel_depth == 16)
            }
            (PixelKind::TrueColor, 3) => RGBA8::new(px[2], px[1], px[0], 255),
            (PixelKind::TrueColor, _) => {
                RGBA8::new(px[2], px[1], px[0], if self.alpha { px[3] } else { 255 })
            }
            (PixelKind::Gray, 1) => RGBA8::new(px[0], px[0], px[0], 255),
            (PixelKind::Gray, _) => {
                RGBA8::new(px[0], px[0], px[0], if self.alpha { px[1] } else { 255 })
            }
        })
    }

    /// Expand stored pixels to RGBA in top-left row order.
    pub(crate) fn run(&self, data: &[u8], stop: &dyn Stop) -> Result<Vec<RGBA8>, TgaError> {
        self.check_supported()?;
        let bpp = bytes_per_pixel(self.pixel_depth);
        let row_bytes = self.width * bpp;
        let expected = row_bytes * self.height;
        if data.len() != expected {
            return Err(TgaError::length("image data", expected, data.len()));
        }

        let mut out = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            if y % 16 == 0 {
                stop.check()?;
            }
            let src_y = if self.origin.is_bottom() {
                self.height - 1 - y
            } else {
                y
            };
            let row = &data[src_y * row_bytes..(src_y + 1) * row_bytes];
            let start = out.len();
            for px in row.chunks_exact(bpp) {
                out.push(self.pixel(px)?);
            }
            if self.origin.is_right() {
                out[start..].reverse();
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enough::Unstoppable;

    #[test]
    fn strides() {
        assert_eq!(bytes_per_pixel(8), 1);
        assert_eq!(bytes_per_pixel(15), 2);
        assert_eq!(bytes_per_pixel(16), 2);
        assert_eq!(bytes_per_pixel(24), 3);
        assert_eq!(bytes_per_pixel(32), 4);
        assert_eq!(ColorMapEntrySize::Rgb555.bytes_per_entry(), 2);
    }

    #[test]
    fn entry_size_bits_roundtrip() {
        for bits in [0u8, 8, 15, 16, 24, 32, 48] {
            assert_eq!(ColorMapEntrySize::from_bits(bits).bits(), bits);
        }
    }

    #[test]
    fn rgb555_bit_layout() {
        let mut out = [0u8; 2];
        ColorMapEntrySize::Rgb555
            .pack(RGBA8::new(0xFF, 0, 0, 0xFF), &mut out)
            .unwrap();
        // red lives in bits 14-10, bit 15 stays clear
        assert_eq!(u16::from_le_bytes(out), 0x7C00);

        ColorMapEntrySize::Rgb555
            .pack(RGBA8::new(0, 0, 0xFF, 0xFF), &mut out)
            .unwrap();
        assert_eq!(u16::from_le_bytes(out), 0x001F);
    }

    #[test]
    fn argb1555_alpha_bit() {
        let mut out = [0u8; 2];
        ColorMapEntrySize::Argb1555
            .pack(RGBA8::new(0, 0xFF, 0, 0xFF), &mut out)
            .unwrap();
        assert_eq!(u16::from_le_bytes(out), 0x8000 | 0x03E0);

        let c = ColorMapEntrySize::Argb1555.unpack(&0x03E0u16.to_le_bytes()).unwrap();
        assert_eq!(c, RGBA8::new(0, 255, 0, 0));
        let c = ColorMapEntrySize::Rgb555.unpack(&0x03E0u16.to_le_bytes()).unwrap();
        assert_eq!(c.a, 255);
    }

    #[test]
    fn five_bit_upscale_is_not_a_shift() {
        // 16 * 255 / 31 = 131, a plain shift would give 128
        let c = ColorMapEntrySize::Rgb555.unpack(&(16u16 << 10).to_le_bytes()).unwrap();
        assert_eq!(c.r, 131);
    }

    #[test]
    fn byte_order_24_and_32() {
        let mut out = [0u8; 3];
        ColorMapEntrySize::Rgb888
            .pack(RGBA8::new(1, 2, 3, 4), &mut out)
            .unwrap();
        assert_eq!(out, [3, 2, 1]);

        let mut out = [0u8; 4];
        ColorMapEntrySize::Argb8888
            .pack(RGBA8::new(1, 2, 3, 4), &mut out)
            .unwrap();
        assert_eq!(out, [3, 2, 1, 4]);
        assert_eq!(
            ColorMapEntrySize::Argb8888.unpack(&out).unwrap(),
            RGBA8::new(1, 2, 3, 4)
        );
    }

    #[test]
    fn palette_24_is_lossless() {
        let colors = alloc::vec![RGBA8::new(10, 20, 30, 255), RGBA8::new(200, 100, 0, 255)];
        let bytes = encode_palette(&colors, ColorMapEntrySize::Rgb888).unwrap();
        assert_eq!(bytes.len(), 6);
        assert_eq!(
            decode_palette(&bytes, ColorMapEntrySize::Rgb888).unwrap(),
            colors
        );
    }

    #[test]
    fn other_entry_size_is_unsupported() {
        let mut out = [0u8; 1];
        assert!(matches!(
            ColorMapEntrySize::Other(8).pack(RGBA8::default(), &mut out),
            Err(TgaError::UnsupportedPixelFormat(_))
        ));
        assert!(matches!(
            decode_palette(&[0, 0], ColorMapEntrySize::Other(8)),
            Err(TgaError::UnsupportedPixelFormat(_))
        ));
    }

    #[test]
    fn expand_bottom_left_flips_rows() {
        // 1x2 BGR image stored bottom row first
        let data = [0, 0, 255, 255, 0, 0];
        let exp = Expand {
            width: 1,
            height: 2,
            pixel_depth: 24,
            kind: PixelKind::TrueColor,
            alpha: false,
            origin: ImageOrigin::BottomLeft,
            palette: &[],
            first_index: 0,
        };
        let out = exp.run(&data, &Unstoppable).unwrap();
        assert_eq!(out, [RGBA8::new(0, 0, 255, 255), RGBA8::new(255, 0, 0, 255)]);
    }

    #[test]
    fn expand_indexed_respects_first_index() {
        let palette = [RGBA8::new(1, 1, 1, 255), RGBA8::new(2, 2, 2, 255)];
        let exp = Expand {
            width: 2,
            height: 1,
            pixel_depth: 8,
            kind: PixelKind::Indexed,
            alpha: false,
            origin: ImageOrigin::TopLeft,
            palette: &palette,
            first_index: 4,
        };
        assert_eq!(exp.run(&[5, 4], &Unstoppable).unwrap(), [palette[1], palette[0]]);
        assert!(matches!(
            exp.run(&[3, 4], &Unstoppable),
            Err(TgaError::InvalidData(_))
        ));
    }
}
