//! The `TgaImage` aggregate and its optional v2.0 sections.

use alloc::format;
use alloc::vec::Vec;

use enough::Unstoppable;
use rgb::RGBA8;

use crate::error::TgaError;
use crate::field::{
    AttributeType, ColorMapSpec, ColorMapType, ExtensionMetadata, ImageDescriptor, ImageId,
    ImageOrigin, ImageSpec, ImageType, TimeStamp,
};
use crate::pixel::{self, ColorMapEntrySize, Expand};

/// Longest side of a generated postage stamp.
pub const POSTAGE_STAMP_MAX: u8 = 64;
const POSTAGE_STAMP_MIN: u8 = 4;

/// One tagged block of application data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DeveloperEntry {
    pub tag: u16,
    pub data: Vec<u8>,
}

/// Application-defined tagged blocks referenced from the developer directory.
///
/// Entries with empty data are not written. With more than two entries the
/// writer orders them by tag and rejects duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DeveloperArea {
    pub entries: Vec<DeveloperEntry>,
}

/// Thumbnail stored in the extension area, same pixel format as the image.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PostageStamp {
    pub width: u8,
    pub height: u8,
    /// Uncompressed pixels, `width * height * bytes_per_pixel` of the parent.
    pub data: Vec<u8>,
}

/// v2.0 extension area contents. Section offsets are not stored here; they
/// are derived on every save.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ExtensionArea {
    pub metadata: ExtensionMetadata,
    /// Bytes following the 495-byte fixed block.
    pub vendor_data: Vec<u8>,
    /// File offset of each scanline; one entry per row.
    pub scan_line_table: Option<Vec<u32>>,
    pub postage_stamp: Option<PostageStamp>,
    /// 256 x (A, R, G, B) u16 entries.
    pub color_correction_table: Option<Vec<u16>>,
}

impl ExtensionArea {
    pub fn new(attribute_type: AttributeType) -> Self {
        Self {
            metadata: ExtensionMetadata {
                attribute_type,
                timestamp: current_timestamp(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(feature = "std")]
fn current_timestamp() -> TimeStamp {
    TimeStamp::now()
}

#[cfg(not(feature = "std"))]
fn current_timestamp() -> TimeStamp {
    TimeStamp::default()
}

/// Which container revision the image is written as.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FormatVersion {
    /// v1.0: no footer, developer or extension data.
    #[default]
    Legacy,
    /// v2.0: a footer, optionally pointing at developer and extension areas.
    Extended {
        developer: Option<DeveloperArea>,
        extension: Option<ExtensionArea>,
    },
}

/// A whole TGA file as value data.
///
/// `pixels` always holds the uncompressed image data in stored row order;
/// compression is applied on save when `image_type` is an RLE variant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TgaImage {
    pub image_type: ImageType,
    pub color_map_type: ColorMapType,
    pub color_map_spec: ColorMapSpec,
    pub image_spec: ImageSpec,
    pub image_id: Option<ImageId>,
    /// Raw color-map entries, `length * ceil(entry_size / 8)` bytes.
    pub color_map: Option<Vec<u8>>,
    pub pixels: Option<Vec<u8>>,
    pub format: FormatVersion,
}

impl TgaImage {
    /// A zero-filled image. A zero dimension or depth yields an image
    /// without image data.
    pub fn new(width: u16, height: u16, pixel_depth: u8, image_type: ImageType) -> Self {
        let image_spec = ImageSpec {
            width,
            height,
            pixel_depth,
            ..Default::default()
        };
        let has_data =
            image_type.has_image_data() && width > 0 && height > 0 && pixel_depth > 0;
        let image_type = if has_data {
            image_type
        } else {
            ImageType::NoImageData
        };
        let color_map_type = if image_type.is_color_mapped() {
            ColorMapType::ColorMap
        } else {
            ColorMapType::NoColorMap
        };
        Self {
            image_type,
            color_map_type,
            image_spec,
            pixels: has_data.then(|| alloc::vec![0u8; image_spec.data_len()]),
            ..Default::default()
        }
    }

    pub fn with_alpha_bits(mut self, bits: u8) -> Self {
        self.image_spec.descriptor.alpha_bits = bits & 0x0F;
        self
    }

    pub fn with_origin(mut self, origin: ImageOrigin) -> Self {
        self.image_spec.descriptor.origin = origin;
        self
    }

    pub fn with_image_id(mut self, id: ImageId) -> Self {
        self.image_id = Some(id);
        self
    }

    pub fn width(&self) -> u16 {
        self.image_spec.width
    }

    pub fn height(&self) -> u16 {
        self.image_spec.height
    }

    pub fn pixel_depth(&self) -> u8 {
        self.image_spec.pixel_depth
    }

    pub fn descriptor(&self) -> ImageDescriptor {
        self.image_spec.descriptor
    }

    pub fn bytes_per_pixel(&self) -> usize {
        pixel::bytes_per_pixel(self.image_spec.pixel_depth)
    }

    /// Pack `colors` with `entry_size` and install them as the color map,
    /// starting at index 0.
    pub fn set_palette(
        &mut self,
        colors: &[RGBA8],
        entry_size: ColorMapEntrySize,
    ) -> Result<(), TgaError> {
        let bytes = pixel::encode_palette(colors, entry_size)?;
        self.set_color_map(entry_size, 0, bytes)
    }

    /// Install raw color-map bytes; the length must be a whole number of entries.
    pub fn set_color_map(
        &mut self,
        entry_size: ColorMapEntrySize,
        first_entry_index: u16,
        bytes: Vec<u8>,
    ) -> Result<(), TgaError> {
        let stride = entry_size.bytes_per_entry();
        if stride == 0 {
            return Err(TgaError::UnsupportedPixelFormat(format!(
                "{}-bit color-map entries",
                entry_size.bits()
            )));
        }
        if bytes.len() % stride != 0 {
            return Err(TgaError::length(
                "color map",
                bytes.len() / stride * stride,
                bytes.len(),
            ));
        }
        let length = u16::try_from(bytes.len() / stride).map_err(|_| {
            TgaError::LimitExceeded(format!("{} color-map entries", bytes.len() / stride))
        })?;
        self.color_map_type = ColorMapType::ColorMap;
        self.color_map_spec = ColorMapSpec {
            first_entry_index,
            length,
            entry_size,
        };
        self.color_map = Some(bytes);
        Ok(())
    }

    /// Decoded color map, empty when there is none.
    pub fn palette(&self) -> Result<Vec<RGBA8>, TgaError> {
        match &self.color_map {
            Some(bytes) if !bytes.is_empty() => {
                pixel::decode_palette(bytes, self.color_map_spec.entry_size)
            }
            _ => Ok(Vec::new()),
        }
    }

    pub fn is_extended(&self) -> bool {
        matches!(self.format, FormatVersion::Extended { .. })
    }

    /// Switch to the v2.0 format, adding a footer and an extension area.
    /// Existing sections are kept.
    pub fn upgrade_to_extended(&mut self) {
        let attribute_type = if self.image_spec.descriptor.alpha_bits > 0 {
            AttributeType::Alpha
        } else {
            AttributeType::NoAlpha
        };
        match &mut self.format {
            FormatVersion::Legacy => {
                self.format = FormatVersion::Extended {
                    developer: None,
                    extension: Some(ExtensionArea::new(attribute_type)),
                };
            }
            FormatVersion::Extended { extension, .. } => {
                extension.get_or_insert_with(|| ExtensionArea::new(attribute_type));
            }
        }
    }

    pub fn extension(&self) -> Option<&ExtensionArea> {
        match &self.format {
            FormatVersion::Extended { extension, .. } => extension.as_ref(),
            FormatVersion::Legacy => None,
        }
    }

    pub fn extension_mut(&mut self) -> Option<&mut ExtensionArea> {
        match &mut self.format {
            FormatVersion::Extended { extension, .. } => extension.as_mut(),
            FormatVersion::Legacy => None,
        }
    }

    pub fn developer(&self) -> Option<&DeveloperArea> {
        match &self.format {
            FormatVersion::Extended { developer, .. } => developer.as_ref(),
            FormatVersion::Legacy => None,
        }
    }

    /// Append a developer entry. Legacy images have nowhere to put it.
    pub fn add_developer_entry(&mut self, tag: u16, data: Vec<u8>) -> Result<(), TgaError> {
        match &mut self.format {
            FormatVersion::Extended { developer, .. } => {
                developer
                    .get_or_insert_with(DeveloperArea::default)
                    .entries
                    .push(DeveloperEntry { tag, data });
                Ok(())
            }
            FormatVersion::Legacy => Err(TgaError::MissingRequiredField("footer")),
        }
    }

    /// Mirror the image by rewriting the origin bits. Pixel data is untouched.
    pub fn flip(&mut self, horizontal: bool, vertical: bool) {
        let d = &mut self.image_spec.descriptor;
        d.origin = d.origin.flipped(horizontal, vertical);
    }

    /// Build a nearest-neighbour thumbnail of at most 64x64, upgrading to
    /// the v2.0 format if needed. Images without pixel data lose any
    /// existing thumbnail instead.
    pub fn generate_postage_stamp(&mut self) -> Result<(), TgaError> {
        let (w, h) = (self.width(), self.height());
        let pixels = match &self.pixels {
            Some(p) if self.image_type.has_image_data() && w > 0 && h > 0 => p,
            _ => {
                self.remove_postage_stamp();
                return Ok(());
            }
        };
        let expected = self.image_spec.data_len();
        if pixels.len() != expected {
            return Err(TgaError::length("image data", expected, pixels.len()));
        }
        let (sw, sh) = postage_stamp_size(w, h);
        let bpp = self.bytes_per_pixel();
        let mut data = Vec::with_capacity(usize::from(sw) * usize::from(sh) * bpp);
        for y in 0..usize::from(sh) {
            let src_y = y * usize::from(h) / usize::from(sh);
            for x in 0..usize::from(sw) {
                let src_x = x * usize::from(w) / usize::from(sw);
                let at = (src_y * usize::from(w) + src_x) * bpp;
                data.extend_from_slice(&pixels[at..at + bpp]);
            }
        }
        let stamp = PostageStamp {
            width: sw,
            height: sh,
            data,
        };
        self.upgrade_to_extended();
        if let Some(ext) = self.extension_mut() {
            ext.postage_stamp = Some(stamp);
        }
        Ok(())
    }

    pub fn remove_postage_stamp(&mut self) {
        if let Some(ext) = self.extension_mut() {
            ext.postage_stamp = None;
        }
    }

    /// Expand the image to RGBA in top-left row order.
    pub fn to_rgba8(&self) -> Result<Vec<RGBA8>, TgaError> {
        let data = self
            .pixels
            .as_deref()
            .filter(|_| self.image_type.has_image_data())
            .ok_or(TgaError::MissingRequiredField("image data"))?;
        self.expand(usize::from(self.width()), usize::from(self.height()), data)
    }

    /// Expand the postage stamp to RGBA in top-left row order.
    pub fn postage_stamp_rgba8(&self) -> Result<Vec<RGBA8>, TgaError> {
        let stamp = self
            .extension()
            .and_then(|e| e.postage_stamp.as_ref())
            .ok_or(TgaError::MissingRequiredField("postage stamp"))?;
        self.expand(
            usize::from(stamp.width),
            usize::from(stamp.height),
            &stamp.data,
        )
    }

    /// The image as an [`imgref::ImgVec`] of RGBA pixels, top row first.
    #[cfg(feature = "imgref")]
    pub fn to_imgvec(&self) -> Result<imgref::ImgVec<RGBA8>, TgaError> {
        let pixels = self.to_rgba8()?;
        Ok(imgref::ImgVec::new(
            pixels,
            usize::from(self.width()),
            usize::from(self.height()),
        ))
    }

    fn expand(&self, width: usize, height: usize, data: &[u8]) -> Result<Vec<RGBA8>, TgaError> {
        let kind = self.image_type.pixel_kind().ok_or_else(|| {
            TgaError::UnsupportedPixelFormat(format!("{:?} has no pixels", self.image_type))
        })?;
        let palette = if kind == pixel::PixelKind::Indexed {
            self.palette()?
        } else {
            Vec::new()
        };
        let descriptor = self.image_spec.descriptor;
        Expand {
            width,
            height,
            pixel_depth: self.pixel_depth(),
            kind,
            alpha: descriptor.alpha_bits > 0,
            origin: descriptor.origin,
            palette: &palette,
            first_index: self.color_map_spec.first_entry_index,
        }
        .run(data, &Unstoppable)
    }
}

/// Thumbnail dimensions for a `w` x `h` image, each side within 4..=64.
fn postage_stamp_size(w: u16, h: u16) -> (u8, u8) {
    let max = u32::from(POSTAGE_STAMP_MAX);
    let (w32, h32) = (u32::from(w), u32::from(h));
    if w32 <= max && h32 <= max {
        // small images are upsampled to the minimum
        return (
            (w as u8).max(POSTAGE_STAMP_MIN),
            (h as u8).max(POSTAGE_STAMP_MIN),
        );
    }
    let shrink = |side: u32, long: u32| {
        (side * max / long).clamp(u32::from(POSTAGE_STAMP_MIN), max) as u8
    };
    if w32 >= h32 {
        (POSTAGE_STAMP_MAX, shrink(h32, w32))
    } else {
        (shrink(w32, h32), POSTAGE_STAMP_MAX)
    }
}
