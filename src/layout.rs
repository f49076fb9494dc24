//! Section resolver.
//!
//! Walks the file from the header to the footer, validating every
//! cross-section size rule and assigning every derived offset. The result is
//! a [`Layout`]; the image itself is never touched.

use alloc::format;
use alloc::vec::Vec;

#[cfg(feature = "std")]
use chrono::Utc;
use log::debug;

use crate::error::TgaError;
use crate::field::{
    ColorMapType, DirectoryEntry, ExtensionBlock, ExtensionOffsets, Field, Footer, Header,
    TimeStamp,
};
use crate::image::{ExtensionArea, FormatVersion, TgaImage};
use crate::rle;

/// Entries in a color-correction table (256 x A, R, G, B).
pub const COLOR_CORRECTION_ENTRIES: usize = 1024;

/// Which timestamp is written into the extension area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimestampPolicy {
    /// The current UTC time.
    #[cfg(feature = "std")]
    Now,
    /// Whatever the image's extension area already holds.
    Keep,
    Fixed(TimeStamp),
}

impl Default for TimestampPolicy {
    #[cfg(feature = "std")]
    fn default() -> Self {
        Self::Now
    }

    #[cfg(not(feature = "std"))]
    fn default() -> Self {
        Self::Keep
    }
}

impl TimestampPolicy {
    fn apply(self, stored: TimeStamp) -> TimeStamp {
        match self {
            #[cfg(feature = "std")]
            Self::Now => Utc::now().into(),
            Self::Keep => stored,
            Self::Fixed(ts) => ts,
        }
    }
}

/// Derived placement of the extension area and the tables it points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtensionLayout {
    pub offset: u32,
    /// Declared extension size: 495 plus vendor bytes.
    pub size: u16,
    pub timestamp: TimeStamp,
    pub offsets: ExtensionOffsets,
}

/// Every derived length and offset of one serialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Header as written, with the derived id length.
    pub header: Header,
    pub color_map_offset: u32,
    pub image_data_offset: u32,
    /// Stored image data length (compressed for RLE types).
    pub image_data_len: u32,
    /// Developer directory in write order.
    pub developer_directory: Vec<DirectoryEntry>,
    pub extension: Option<ExtensionLayout>,
    pub footer: Option<Footer>,
    pub file_len: u32,
    /// Index into the image's developer entries for each directory record.
    pub(crate) developer_order: Vec<usize>,
}

/// Running file offset with overflow checks.
struct Offset(u32);

impl Offset {
    /// Reserve `len` bytes and return where they start.
    fn take(&mut self, len: usize, section: &str) -> Result<u32, TgaError> {
        let start = self.0;
        self.0 = u32::try_from(len)
            .ok()
            .and_then(|len| start.checked_add(len))
            .ok_or_else(|| {
                TgaError::LimitExceeded(format!("file passes 4 GiB at the {section}"))
            })?;
        Ok(start)
    }
}

/// Compute the layout `image` would be written with.
pub fn resolve(image: &TgaImage, timestamp: TimestampPolicy) -> Result<Layout, TgaError> {
    let mut at = Offset(0);
    at.take(Header::SIZE, "header")?;

    let id_length = image.image_id.as_ref().map_or(0, |id| id.encoded_len());
    at.take(usize::from(id_length), "image id")?;

    let color_map_offset = at.take(color_map_len(image)?, "color map")?;

    let image_data_len = image_data_len(image)?;
    let image_data_offset = at.take(image_data_len, "image data")?;

    let mut layout = Layout {
        header: Header {
            id_length,
            color_map_type: image.color_map_type,
            image_type: image.image_type,
            color_map_spec: image.color_map_spec,
            image_spec: image.image_spec,
        },
        color_map_offset,
        image_data_offset,
        image_data_len: image_data_len as u32,
        developer_directory: Vec::new(),
        extension: None,
        footer: None,
        file_len: 0,
        developer_order: Vec::new(),
    };

    if let FormatVersion::Extended {
        developer,
        extension,
    } = &image.format
    {
        let mut footer = Footer::default();

        if let Some(area) = developer {
            let mut order: Vec<usize> = (0..area.entries.len())
                .filter(|&i| !area.entries[i].data.is_empty())
                .collect();
            let dropped = area.entries.len() - order.len();
            if dropped > 0 {
                debug!("dropping {dropped} empty developer entries");
            }
            if order.len() > usize::from(u16::MAX) {
                return Err(TgaError::LimitExceeded(format!(
                    "{} developer entries",
                    order.len()
                )));
            }
            if order.len() > 2 {
                order.sort_by_key(|&i| area.entries[i].tag);
                for pair in order.windows(2) {
                    let tag = area.entries[pair[0]].tag;
                    if tag == area.entries[pair[1]].tag {
                        return Err(TgaError::DuplicateDeveloperTag(tag));
                    }
                }
            }
            for &i in &order {
                let entry = &area.entries[i];
                let offset = at.take(entry.data.len(), "developer data")?;
                layout.developer_directory.push(DirectoryEntry {
                    tag: entry.tag,
                    offset,
                    size: entry.data.len() as u32,
                });
            }
            if !order.is_empty() {
                footer.developer_directory_offset = at.take(
                    2 + order.len() * DirectoryEntry::SIZE,
                    "developer directory",
                )?;
            }
            layout.developer_order = order;
        }

        if let Some(ext) = extension {
            let placed = resolve_extension(image, ext, timestamp, &mut at)?;
            footer.extension_offset = placed.offset;
            layout.extension = Some(placed);
        }

        let tail = footer.to_bytes();
        if tail.len() != Footer::SIZE {
            return Err(TgaError::length("footer", Footer::SIZE, tail.len()));
        }
        at.take(Footer::SIZE, "footer")?;
        layout.footer = Some(footer);
    }

    layout.file_len = at.0;
    debug!(
        "layout: color map @{} image data @{} ({} bytes), {} developer entries, extension {:?}, {} bytes total",
        layout.color_map_offset,
        layout.image_data_offset,
        layout.image_data_len,
        layout.developer_directory.len(),
        layout.extension.map(|e| e.offset),
        layout.file_len
    );
    Ok(layout)
}

fn color_map_len(image: &TgaImage) -> Result<usize, TgaError> {
    let spec = image.color_map_spec;
    if image.color_map_type == ColorMapType::ColorMap && spec.length == 0 {
        return Err(TgaError::MissingRequiredField("color-map length"));
    }
    let expected = spec.data_len();
    match &image.color_map {
        Some(bytes) if bytes.len() != expected => {
            Err(TgaError::length("color map", expected, bytes.len()))
        }
        Some(bytes) => Ok(bytes.len()),
        None if image.color_map_type == ColorMapType::ColorMap => {
            Err(TgaError::MissingRequiredField("color-map data"))
        }
        // a declared length without data would desynchronise every later section
        None if expected > 0 => Err(TgaError::length("color map", expected, 0)),
        None => Ok(0),
    }
}

fn image_data_len(image: &TgaImage) -> Result<usize, TgaError> {
    if !image.image_type.has_image_data() {
        return Ok(0);
    }
    let spec = image.image_spec;
    if spec.width == 0 || spec.height == 0 {
        return Err(TgaError::MissingRequiredField("image dimensions"));
    }
    if spec.pixel_depth == 0 {
        return Err(TgaError::MissingRequiredField("pixel depth"));
    }
    let pixels = image
        .pixels
        .as_deref()
        .ok_or(TgaError::MissingRequiredField("image data"))?;
    let expected = spec.data_len();
    if pixels.len() != expected {
        return Err(TgaError::length("image data", expected, pixels.len()));
    }
    if image.image_type.is_rle() {
        Ok(rle::encoded_len(
            pixels,
            usize::from(spec.width),
            image.bytes_per_pixel(),
        ))
    } else {
        Ok(expected)
    }
}

fn resolve_extension(
    image: &TgaImage,
    ext: &ExtensionArea,
    timestamp: TimestampPolicy,
    at: &mut Offset,
) -> Result<ExtensionLayout, TgaError> {
    let block_len = ExtensionBlock::SIZE + ext.vendor_data.len();
    let size = u16::try_from(block_len).map_err(|_| {
        TgaError::LimitExceeded(format!("extension area of {block_len} bytes"))
    })?;
    let offset = at.take(block_len, "extension area")?;
    let mut offsets = ExtensionOffsets::default();

    if let Some(table) = &ext.scan_line_table {
        let height = usize::from(image.height());
        if table.len() != height {
            return Err(TgaError::length("scan-line table", height, table.len()));
        }
        offsets.scan_line = at.take(height * 4, "scan-line table")?;
    }

    if let Some(stamp) = &ext.postage_stamp {
        if stamp.width == 0 || stamp.height == 0 {
            return Err(TgaError::MissingRequiredField("postage stamp dimensions"));
        }
        if image.image_type.has_image_data() {
            let expected =
                usize::from(stamp.width) * usize::from(stamp.height) * image.bytes_per_pixel();
            if stamp.data.len() != expected {
                return Err(TgaError::length("postage stamp", expected, stamp.data.len()));
            }
        }
        offsets.postage_stamp = at.take(2 + stamp.data.len(), "postage stamp")?;
    }

    if let Some(table) = &ext.color_correction_table {
        if table.len() != COLOR_CORRECTION_ENTRIES {
            return Err(TgaError::length(
                "color-correction table",
                COLOR_CORRECTION_ENTRIES,
                table.len(),
            ));
        }
        offsets.color_correction =
            at.take(COLOR_CORRECTION_ENTRIES * 2, "color-correction table")?;
    }

    Ok(ExtensionLayout {
        offset,
        size,
        timestamp: timestamp.apply(ext.metadata.timestamp),
        offsets,
    })
}
