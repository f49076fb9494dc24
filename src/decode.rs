//! Image assembler: load.

use alloc::format;
use alloc::vec::Vec;

use enough::Stop;
use log::{debug, warn};

use crate::cursor::Cursor;
use crate::error::TgaError;
use crate::field::{self, DirectoryEntry, ExtensionBlock, Field, Footer, Header, ImageId};
use crate::image::{
    DeveloperArea, DeveloperEntry, ExtensionArea, FormatVersion, PostageStamp, TgaImage,
};
use crate::layout::COLOR_CORRECTION_ENTRIES;
use crate::limits::{Budget, Limits};
use crate::pixel::bytes_per_pixel;
use crate::rle;

/// Builder for parsing a TGA file held in memory.
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    limits: Option<&'a Limits>,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, limits: None }
    }

    /// Reject images and tables that exceed `limits` before allocating them.
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn decode(self, stop: impl Stop) -> Result<TgaImage, TgaError> {
        load(self.data, self.limits, &stop)
    }
}

pub(crate) fn load(
    data: &[u8],
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<TgaImage, TgaError> {
    let budget = Budget(limits);
    let mut c = Cursor::new(data);
    let header: Header = field::read(&mut c)?;
    let spec = header.image_spec;

    let image_id = if header.id_length > 0 {
        Some(ImageId::from_raw(
            c.read_bytes(usize::from(header.id_length))?,
        ))
    } else {
        None
    };

    let color_map = if header.color_map_spec.length > 0 {
        let len = header.color_map_spec.data_len();
        budget.alloc("color map", len)?;
        Some(c.read_bytes(len)?.to_vec())
    } else {
        None
    };

    let pixels = if header.image_type.has_image_data() {
        if spec.width == 0 || spec.height == 0 || spec.pixel_depth == 0 {
            return Err(TgaError::InvalidHeader(format!(
                "{}x{} at {} bits per pixel",
                spec.width, spec.height, spec.pixel_depth
            )));
        }
        budget.image(&spec)?;
        let expected = spec.data_len();
        stop.check()?;
        Some(if header.image_type.is_rle() {
            rle::decode_from(&mut c, expected, bytes_per_pixel(spec.pixel_depth), stop)?
        } else {
            c.read_bytes(expected)?.to_vec()
        })
    } else {
        None
    };

    stop.check()?;
    let format = read_tail(data, &header, budget)?;

    Ok(TgaImage {
        image_type: header.image_type,
        color_map_type: header.color_map_type,
        color_map_spec: header.color_map_spec,
        image_spec: spec,
        image_id,
        color_map,
        pixels,
        format,
    })
}

/// Cursor positioned at an absolute file offset.
fn seek(data: &[u8], offset: u32) -> Result<Cursor<'_>, TgaError> {
    let mut c = Cursor::new(data);
    c.set_position(offset as usize)?;
    Ok(c)
}

fn read_tail(
    data: &[u8],
    header: &Header,
    budget: Budget<'_>,
) -> Result<FormatVersion, TgaError> {
    let Some(start) = data.len().checked_sub(Footer::SIZE) else {
        debug!("input shorter than a footer, reading as v1.0");
        return Ok(FormatVersion::Legacy);
    };
    let footer = match Footer::decode(&data[start..]) {
        Ok(footer) => footer,
        Err(TgaError::InvalidSignature) => {
            debug!("no footer signature, reading as v1.0");
            return Ok(FormatVersion::Legacy);
        }
        Err(e) => return Err(e),
    };

    let developer = match footer.developer_directory_offset {
        0 => None,
        offset => Some(read_developer(data, offset, budget)?),
    };
    let extension = match footer.extension_offset {
        0 => None,
        offset => Some(read_extension(data, offset, header, budget)?),
    };
    debug!(
        "v2.0 footer: {} developer entries, extension area {}",
        developer.as_ref().map_or(0, |d| d.entries.len()),
        if extension.is_some() { "present" } else { "absent" }
    );
    Ok(FormatVersion::Extended {
        developer,
        extension,
    })
}

fn read_developer(
    data: &[u8],
    offset: u32,
    budget: Budget<'_>,
) -> Result<DeveloperArea, TgaError> {
    let mut c = seek(data, offset)?;
    let count = c.read_u16_le()?;
    let directory = (0..count)
        .map(|_| field::read::<DirectoryEntry>(&mut c))
        .collect::<Result<Vec<_>, _>>()?;

    let entries = directory
        .into_iter()
        .map(|e| {
            budget.alloc("developer entry", e.size as usize)?;
            let bytes = seek(data, e.offset)?.read_bytes(e.size as usize)?;
            Ok(DeveloperEntry {
                tag: e.tag,
                data: bytes.to_vec(),
            })
        })
        .collect::<Result<Vec<_>, TgaError>>()?;
    Ok(DeveloperArea { entries })
}

fn read_extension(
    data: &[u8],
    offset: u32,
    header: &Header,
    budget: Budget<'_>,
) -> Result<ExtensionArea, TgaError> {
    let mut c = seek(data, offset)?;
    let declared = usize::from(c.read_u16_le()?);
    let size = if declared < ExtensionBlock::SIZE {
        warn!(
            "extension area declares {declared} bytes, reading the {} byte minimum",
            ExtensionBlock::SIZE
        );
        ExtensionBlock::SIZE
    } else {
        declared
    };

    c.set_position(offset as usize)?;
    let block: ExtensionBlock = field::read(&mut c)?;
    let vendor_data = c.read_bytes(size - ExtensionBlock::SIZE)?.to_vec();
    let offsets = block.offsets;

    let scan_line_table = match offsets.scan_line {
        0 => None,
        at => {
            let rows = usize::from(header.image_spec.height);
            budget.alloc("scan-line table", rows * 4)?;
            let mut c = seek(data, at)?;
            Some(
                (0..rows)
                    .map(|_| c.read_u32_le())
                    .collect::<Result<Vec<_>, _>>()?,
            )
        }
    };

    let postage_stamp = match offsets.postage_stamp {
        0 => None,
        at => {
            let mut c = seek(data, at)?;
            let width = c.read_u8()?;
            let height = c.read_u8()?;
            if width == 0 || height == 0 {
                warn!("skipping {width}x{height} postage stamp");
                None
            } else {
                let len = usize::from(width)
                    * usize::from(height)
                    * bytes_per_pixel(header.image_spec.pixel_depth);
                budget.alloc("postage stamp", len)?;
                Some(PostageStamp {
                    width,
                    height,
                    data: c.read_bytes(len)?.to_vec(),
                })
            }
        }
    };

    let color_correction_table = match offsets.color_correction {
        0 => None,
        at => {
            budget.alloc("color-correction table", COLOR_CORRECTION_ENTRIES * 2)?;
            let mut c = seek(data, at)?;
            Some(
                (0..COLOR_CORRECTION_ENTRIES)
                    .map(|_| c.read_u16_le())
                    .collect::<Result<Vec<_>, _>>()?,
            )
        }
    };

    Ok(ExtensionArea {
        metadata: block.metadata,
        vendor_data,
        scan_line_table,
        postage_stamp,
        color_correction_table,
    })
}
