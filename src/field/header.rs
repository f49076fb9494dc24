//! The 18-byte file header and its packed sub-records.

use alloc::format;
use alloc::vec::Vec;

use super::{Field, read, sized};
use crate::error::TgaError;
use crate::pixel::{ColorMapEntrySize, PixelKind};

/// Image type byte (header byte 2).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ImageType {
    #[default]
    NoImageData,
    ColorMapped,
    TrueColor,
    BlackWhite,
    RleColorMapped,
    RleTrueColor,
    RleBlackWhite,
}

impl ImageType {
    pub fn from_u8(b: u8) -> Option<Self> {
        Some(match b {
            0 => Self::NoImageData,
            1 => Self::ColorMapped,
            2 => Self::TrueColor,
            3 => Self::BlackWhite,
            9 => Self::RleColorMapped,
            10 => Self::RleTrueColor,
            11 => Self::RleBlackWhite,
            _ => return None,
        })
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::NoImageData => 0,
            Self::ColorMapped => 1,
            Self::TrueColor => 2,
            Self::BlackWhite => 3,
            Self::RleColorMapped => 9,
            Self::RleTrueColor => 10,
            Self::RleBlackWhite => 11,
        }
    }

    pub fn is_rle(self) -> bool {
        matches!(
            self,
            Self::RleColorMapped | Self::RleTrueColor | Self::RleBlackWhite
        )
    }

    pub fn has_image_data(self) -> bool {
        self != Self::NoImageData
    }

    pub fn is_color_mapped(self) -> bool {
        matches!(self, Self::ColorMapped | Self::RleColorMapped)
    }

    /// The run-length encoded variant of this type.
    pub fn to_rle(self) -> Self {
        match self {
            Self::ColorMapped => Self::RleColorMapped,
            Self::TrueColor => Self::RleTrueColor,
            Self::BlackWhite => Self::RleBlackWhite,
            other => other,
        }
    }

    /// The uncompressed variant of this type.
    pub fn to_uncompressed(self) -> Self {
        match self {
            Self::RleColorMapped => Self::ColorMapped,
            Self::RleTrueColor => Self::TrueColor,
            Self::RleBlackWhite => Self::BlackWhite,
            other => other,
        }
    }

    pub(crate) fn pixel_kind(self) -> Option<PixelKind> {
        match self.to_uncompressed() {
            Self::ColorMapped => Some(PixelKind::Indexed),
            Self::TrueColor => Some(PixelKind::TrueColor),
            Self::BlackWhite => Some(PixelKind::Gray),
            _ => None,
        }
    }
}

/// Color-map type byte (header byte 1).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorMapType {
    #[default]
    NoColorMap,
    ColorMap,
}

impl ColorMapType {
    pub fn from_u8(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::NoColorMap),
            1 => Some(Self::ColorMap),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::NoColorMap => 0,
            Self::ColorMap => 1,
        }
    }
}

/// Order in which pixels are transferred to the screen (descriptor bits 5-4).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ImageOrigin {
    #[default]
    BottomLeft,
    BottomRight,
    TopLeft,
    TopRight,
}

impl ImageOrigin {
    /// From the two origin bits (bit 0 = right-to-left, bit 1 = top-to-bottom).
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::BottomLeft,
            1 => Self::BottomRight,
            2 => Self::TopLeft,
            _ => Self::TopRight,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::BottomLeft => 0,
            Self::BottomRight => 1,
            Self::TopLeft => 2,
            Self::TopRight => 3,
        }
    }

    pub fn is_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight)
    }

    pub fn is_right(self) -> bool {
        matches!(self, Self::BottomRight | Self::TopRight)
    }

    /// Origin after mirroring the image horizontally and/or vertically.
    pub fn flipped(self, horizontal: bool, vertical: bool) -> Self {
        let mut bits = self.bits();
        if horizontal {
            bits ^= 0b01;
        }
        if vertical {
            bits ^= 0b10;
        }
        Self::from_bits(bits)
    }
}

/// Packed image descriptor byte: bits 7-6 reserved, 5-4 origin, 3-0 alpha bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ImageDescriptor {
    pub origin: ImageOrigin,
    /// Attribute (alpha or overlay) bits per pixel; only the low four bits are stored.
    pub alpha_bits: u8,
}

impl ImageDescriptor {
    pub fn from_byte(b: u8) -> Self {
        Self {
            origin: ImageOrigin::from_bits(b >> 4),
            alpha_bits: b & 0x0F,
        }
    }

    pub fn to_byte(self) -> u8 {
        (self.origin.bits() << 4) | (self.alpha_bits & 0x0F)
    }
}

impl Field for ImageDescriptor {
    const NAME: &'static str = "image descriptor";
    const SIZE: usize = 1;

    fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.to_byte());
    }

    fn decode(bytes: &[u8]) -> Result<Self, TgaError> {
        let mut c = sized::<Self>(bytes)?;
        Ok(Self::from_byte(c.read_u8()?))
    }
}

/// Palette shape (header bytes 3-7).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ColorMapSpec {
    pub first_entry_index: u16,
    /// Number of entries.
    pub length: u16,
    pub entry_size: ColorMapEntrySize,
}

impl ColorMapSpec {
    /// Byte length of the color-map data this spec declares.
    pub fn data_len(&self) -> usize {
        usize::from(self.length) * self.entry_size.bytes_per_entry()
    }
}

impl Field for ColorMapSpec {
    const NAME: &'static str = "color-map spec";
    const SIZE: usize = 5;

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.first_entry_index.to_le_bytes());
        out.extend_from_slice(&self.length.to_le_bytes());
        out.push(self.entry_size.bits());
    }

    fn decode(bytes: &[u8]) -> Result<Self, TgaError> {
        let mut c = sized::<Self>(bytes)?;
        Ok(Self {
            first_entry_index: c.read_u16_le()?,
            length: c.read_u16_le()?,
            entry_size: ColorMapEntrySize::from_bits(c.read_u8()?),
        })
    }
}

/// Geometry and pixel format (header bytes 8-17).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ImageSpec {
    pub x_origin: u16,
    pub y_origin: u16,
    pub width: u16,
    pub height: u16,
    /// Bits per pixel, attribute bits included.
    pub pixel_depth: u8,
    pub descriptor: ImageDescriptor,
}

impl ImageSpec {
    /// Uncompressed byte length of the pixel data, `width * height * ceil(depth / 8)`.
    pub fn data_len(&self) -> usize {
        usize::from(self.width)
            * usize::from(self.height)
            * crate::pixel::bytes_per_pixel(self.pixel_depth)
    }
}

impl Field for ImageSpec {
    const NAME: &'static str = "image spec";
    const SIZE: usize = 10;

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.x_origin.to_le_bytes());
        out.extend_from_slice(&self.y_origin.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.push(self.pixel_depth);
        self.descriptor.write_to(out);
    }

    fn decode(bytes: &[u8]) -> Result<Self, TgaError> {
        let mut c = sized::<Self>(bytes)?;
        Ok(Self {
            x_origin: c.read_u16_le()?,
            y_origin: c.read_u16_le()?,
            width: c.read_u16_le()?,
            height: c.read_u16_le()?,
            pixel_depth: c.read_u8()?,
            descriptor: read(&mut c)?,
        })
    }
}

/// The fixed 18-byte file header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Header {
    /// Length of the image identifier that follows the header.
    pub id_length: u8,
    pub color_map_type: ColorMapType,
    pub image_type: ImageType,
    pub color_map_spec: ColorMapSpec,
    pub image_spec: ImageSpec,
}

impl Field for Header {
    const NAME: &'static str = "header";
    const SIZE: usize = 18;

    fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.id_length);
        out.push(self.color_map_type.as_u8());
        out.push(self.image_type.as_u8());
        self.color_map_spec.write_to(out);
        self.image_spec.write_to(out);
    }

    fn decode(bytes: &[u8]) -> Result<Self, TgaError> {
        let mut c = sized::<Self>(bytes)?;
        let id_length = c.read_u8()?;
        let cmap = c.read_u8()?;
        let color_map_type = ColorMapType::from_u8(cmap)
            .ok_or_else(|| TgaError::InvalidHeader(format!("unknown color-map type {cmap}")))?;
        let ty = c.read_u8()?;
        let image_type = ImageType::from_u8(ty)
            .ok_or_else(|| TgaError::InvalidHeader(format!("unknown image type {ty}")))?;
        Ok(Self {
            id_length,
            color_map_type,
            image_type,
            color_map_spec: read(&mut c)?,
            image_spec: read(&mut c)?,
        })
    }
}
