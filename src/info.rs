use crate::error::TgaError;
use crate::field::{ColorMapSpec, Field, Footer, Header, ImageOrigin, ImageType};

/// Header-level facts about a TGA file, read without decoding pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u16,
    pub height: u16,
    pub pixel_depth: u8,
    pub image_type: ImageType,
    pub color_map: ColorMapSpec,
    pub origin: ImageOrigin,
    pub alpha_bits: u8,
    /// Whether the file ends in a v2.0 footer.
    pub extended: bool,
}

impl ImageInfo {
    /// Probe the 18-byte header and the 26-byte tail.
    pub fn from_bytes(data: &[u8]) -> Result<Self, TgaError> {
        let header = Header::decode(data.get(..Header::SIZE).ok_or(TgaError::TruncatedStream)?)?;
        let extended = data
            .len()
            .checked_sub(Footer::SIZE)
            .is_some_and(|start| Footer::decode(&data[start..]).is_ok());
        let spec = header.image_spec;
        Ok(Self {
            width: spec.width,
            height: spec.height,
            pixel_depth: spec.pixel_depth,
            image_type: header.image_type,
            color_map: header.color_map_spec,
            origin: spec.descriptor.origin,
            alpha_bits: spec.descriptor.alpha_bits,
            extended,
        })
    }

    pub fn has_alpha(&self) -> bool {
        self.alpha_bits > 0
    }
}
