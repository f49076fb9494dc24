//! Image assembler: save.

use alloc::vec::Vec;

use enough::Stop;

use crate::error::TgaError;
use crate::field::{ExtensionBlock, ExtensionMetadata, Field};
use crate::image::{FormatVersion, TgaImage};
use crate::layout::{Layout, TimestampPolicy, resolve};
use crate::rle;

/// Builder for serializing a [`TgaImage`].
#[derive(Clone, Copy, Debug, Default)]
pub struct EncodeRequest {
    timestamp: TimestampPolicy,
}

impl EncodeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the timestamp written into the extension area.
    pub fn with_timestamp(mut self, policy: TimestampPolicy) -> Self {
        self.timestamp = policy;
        self
    }

    /// Resolve the layout, then write every section in file order.
    pub fn encode(&self, image: &TgaImage, stop: impl Stop) -> Result<Vec<u8>, TgaError> {
        let layout = resolve(image, self.timestamp)?;
        write(image, &layout, &stop)
    }
}

fn write(
    image: &TgaImage,
    layout: &Layout,
    stop: &dyn Stop,
) -> Result<Vec<u8>, TgaError> {
    let mut out = Vec::with_capacity(layout.file_len as usize);
    layout.header.write_to(&mut out);
    if let Some(id) = &image.image_id {
        id.write_to(&mut out);
    }
    if let Some(color_map) = &image.color_map {
        out.extend_from_slice(color_map);
    }

    if image.image_type.has_image_data() {
        if let Some(pixels) = &image.pixels {
            if image.image_type.is_rle() {
                rle::encode_into(
                    pixels,
                    usize::from(image.width()),
                    image.bytes_per_pixel(),
                    &mut out,
                    stop,
                )?;
            } else {
                out.extend_from_slice(pixels);
            }
        }
    }
    stop.check()?;

    if let FormatVersion::Extended {
        developer,
        extension,
    } = &image.format
    {
        if let Some(area) = developer {
            for &i in &layout.developer_order {
                out.extend_from_slice(&area.entries[i].data);
            }
        }
        if !layout.developer_directory.is_empty() {
            // count fits: the resolver caps the directory at u16::MAX entries
            out.extend_from_slice(&(layout.developer_directory.len() as u16).to_le_bytes());
            for entry in &layout.developer_directory {
                entry.write_to(&mut out);
            }
        }

        if let (Some(ext), Some(placed)) = (extension, &layout.extension) {
            ExtensionBlock {
                size: placed.size,
                metadata: ExtensionMetadata {
                    timestamp: placed.timestamp,
                    ..ext.metadata.clone()
                },
                offsets: placed.offsets,
            }
            .write_to(&mut out);
            out.extend_from_slice(&ext.vendor_data);

            if let Some(table) = &ext.scan_line_table {
                for offset in table {
                    out.extend_from_slice(&offset.to_le_bytes());
                }
            }
            if let Some(stamp) = &ext.postage_stamp {
                out.push(stamp.width);
                out.push(stamp.height);
                out.extend_from_slice(&stamp.data);
            }
            if let Some(table) = &ext.color_correction_table {
                for v in table {
                    out.extend_from_slice(&v.to_le_bytes());
                }
            }
        }

        if let Some(footer) = &layout.footer {
            footer.write_to(&mut out);
        }
    }

    if out.len() != layout.file_len as usize {
        return Err(TgaError::length("file", layout.file_len as usize, out.len()));
    }
    Ok(out)
}
