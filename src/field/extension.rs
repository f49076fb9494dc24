//! Records of the v2.0 extension area.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use chrono::{DateTime, Datelike, Timelike, Utc};
use rgb::RGBA8;

use super::text::{SHORT_TEXT, read_padded, write_padded};
use super::{AuthorComments, Field, read, sized};
use crate::error::TgaError;

/// Date and time of image creation (u16 each: month, day, year, hour, minute, second).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TimeStamp {
    pub month: u16,
    pub day: u16,
    pub year: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
}

impl TimeStamp {
    /// Current UTC wall-clock time.
    #[cfg(feature = "std")]
    pub fn now() -> Self {
        Utc::now().into()
    }
}

impl From<DateTime<Utc>> for TimeStamp {
    /// Years outside `0..=65535` saturate.
    fn from(t: DateTime<Utc>) -> Self {
        Self {
            month: t.month() as u16,
            day: t.day() as u16,
            year: t.year().clamp(0, i32::from(u16::MAX)) as u16,
            hour: t.hour() as u16,
            minute: t.minute() as u16,
            second: t.second() as u16,
        }
    }
}

impl Field for TimeStamp {
    const NAME: &'static str = "timestamp";
    const SIZE: usize = 12;

    fn write_to(&self, out: &mut Vec<u8>) {
        for v in [
            self.month,
            self.day,
            self.year,
            self.hour,
            self.minute,
            self.second,
        ] {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn decode(bytes: &[u8]) -> Result<Self, TgaError> {
        let mut c = sized::<Self>(bytes)?;
        Ok(Self {
            month: c.read_u16_le()?,
            day: c.read_u16_le()?,
            year: c.read_u16_le()?,
            hour: c.read_u16_le()?,
            minute: c.read_u16_le()?,
            second: c.read_u16_le()?,
        })
    }
}

/// Elapsed time spent on the job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct JobTime {
    pub hours: u16,
    pub minutes: u16,
    pub seconds: u16,
}

impl Field for JobTime {
    const NAME: &'static str = "job time";
    const SIZE: usize = 6;

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.hours.to_le_bytes());
        out.extend_from_slice(&self.minutes.to_le_bytes());
        out.extend_from_slice(&self.seconds.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Result<Self, TgaError> {
        let mut c = sized::<Self>(bytes)?;
        Ok(Self {
            hours: c.read_u16_le()?,
            minutes: c.read_u16_le()?,
            seconds: c.read_u16_le()?,
        })
    }
}

/// A u16 ratio; a zero denominator means "not specified".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Fraction {
    pub numerator: u16,
    pub denominator: u16,
}

impl Fraction {
    pub fn new(numerator: u16, denominator: u16) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn value(self) -> Option<f32> {
        (self.denominator != 0).then(|| f32::from(self.numerator) / f32::from(self.denominator))
    }
}

impl Field for Fraction {
    const NAME: &'static str = "fraction";
    const SIZE: usize = 4;

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.numerator.to_le_bytes());
        out.extend_from_slice(&self.denominator.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Result<Self, TgaError> {
        let mut c = sized::<Self>(bytes)?;
        Ok(Self {
            numerator: c.read_u16_le()?,
            denominator: c.read_u16_le()?,
        })
    }
}

/// Version of the software that wrote the file: `number` is the version
/// times 100, `letter` a revision suffix (space for none).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoftwareVersion {
    pub number: u16,
    pub letter: u8,
}

impl Default for SoftwareVersion {
    fn default() -> Self {
        Self {
            number: 0,
            letter: b' ',
        }
    }
}

impl fmt::Display for SoftwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.number / 100, self.number % 100)?;
        if self.letter.is_ascii_graphic() {
            write!(f, "{}", self.letter as char)?;
        }
        Ok(())
    }
}

impl Field for SoftwareVersion {
    const NAME: &'static str = "software version";
    const SIZE: usize = 3;

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.number.to_le_bytes());
        out.push(self.letter);
    }

    fn decode(bytes: &[u8]) -> Result<Self, TgaError> {
        let mut c = sized::<Self>(bytes)?;
        Ok(Self {
            number: c.read_u16_le()?,
            letter: c.read_u8()?,
        })
    }
}

/// Background or transparent color, stored B, G, R, A.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyColor(pub RGBA8);

impl Field for KeyColor {
    const NAME: &'static str = "key color";
    const SIZE: usize = 4;

    fn write_to(&self, out: &mut Vec<u8>) {
        let c = self.0;
        out.extend_from_slice(&[c.b, c.g, c.r, c.a]);
    }

    fn decode(bytes: &[u8]) -> Result<Self, TgaError> {
        let [b, g, r, a] = sized::<Self>(bytes)?.read_array()?;
        Ok(Self(RGBA8::new(r, g, b, a)))
    }
}

/// Meaning of the attribute bits (extension byte 494).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AttributeType {
    #[default]
    NoAlpha,
    UndefinedIgnore,
    UndefinedRetain,
    Alpha,
    PremultipliedAlpha,
    Other(u8),
}

impl AttributeType {
    pub fn from_u8(b: u8) -> Self {
        match b {
            0 => Self::NoAlpha,
            1 => Self::UndefinedIgnore,
            2 => Self::UndefinedRetain,
            3 => Self::Alpha,
            4 => Self::PremultipliedAlpha,
            other => Self::Other(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::NoAlpha => 0,
            Self::UndefinedIgnore => 1,
            Self::UndefinedRetain => 2,
            Self::Alpha => 3,
            Self::PremultipliedAlpha => 4,
            Self::Other(b) => b,
        }
    }
}

/// The descriptive fields of the extension area.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ExtensionMetadata {
    pub author_name: String,
    pub author_comments: AuthorComments,
    pub timestamp: TimeStamp,
    pub job_name: String,
    pub job_time: JobTime,
    pub software_id: String,
    pub software_version: SoftwareVersion,
    pub key_color: KeyColor,
    pub pixel_aspect_ratio: Fraction,
    pub gamma: Fraction,
    pub attribute_type: AttributeType,
}

/// File offsets of the tables the extension area points at; 0 means absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ExtensionOffsets {
    pub color_correction: u32,
    pub postage_stamp: u32,
    pub scan_line: u32,
}

/// The fixed 495-byte extension block as stored on disk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ExtensionBlock {
    /// Declared size of the whole extension area, vendor bytes included.
    pub size: u16,
    pub metadata: ExtensionMetadata,
    pub offsets: ExtensionOffsets,
}

impl Field for ExtensionBlock {
    const NAME: &'static str = "extension area";
    const SIZE: usize = 495;

    fn write_to(&self, out: &mut Vec<u8>) {
        let m = &self.metadata;
        out.extend_from_slice(&self.size.to_le_bytes());
        write_padded(out, &m.author_name, SHORT_TEXT);
        m.author_comments.write_to(out);
        m.timestamp.write_to(out);
        write_padded(out, &m.job_name, SHORT_TEXT);
        m.job_time.write_to(out);
        write_padded(out, &m.software_id, SHORT_TEXT);
        m.software_version.write_to(out);
        m.key_color.write_to(out);
        m.pixel_aspect_ratio.write_to(out);
        m.gamma.write_to(out);
        out.extend_from_slice(&self.offsets.color_correction.to_le_bytes());
        out.extend_from_slice(&self.offsets.postage_stamp.to_le_bytes());
        out.extend_from_slice(&self.offsets.scan_line.to_le_bytes());
        out.push(m.attribute_type.as_u8());
    }

    fn decode(bytes: &[u8]) -> Result<Self, TgaError> {
        let mut c = sized::<Self>(bytes)?;
        let size = c.read_u16_le()?;
        let author_name = read_padded(c.read_bytes(SHORT_TEXT)?);
        let author_comments = read(&mut c)?;
        let timestamp = read(&mut c)?;
        let job_name = read_padded(c.read_bytes(SHORT_TEXT)?);
        let job_time = read(&mut c)?;
        let software_id = read_padded(c.read_bytes(SHORT_TEXT)?);
        let software_version = read(&mut c)?;
        let key_color = read(&mut c)?;
        let pixel_aspect_ratio = read(&mut c)?;
        let gamma = read(&mut c)?;
        let offsets = ExtensionOffsets {
            color_correction: c.read_u32_le()?,
            postage_stamp: c.read_u32_le()?,
            scan_line: c.read_u32_le()?,
        };
        let attribute_type = AttributeType::from_u8(c.read_u8()?);
        Ok(Self {
            size,
            metadata: ExtensionMetadata {
                author_name,
                author_comments,
                timestamp,
                job_name,
                job_time,
                software_id,
                software_version,
                key_color,
                pixel_aspect_ratio,
                gamma,
                attribute_type,
            },
            offsets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use chrono::TimeZone;

    #[test]
    fn timestamp_layout() {
        let ts = TimeStamp {
            month: 12,
            day: 31,
            year: 2024,
            hour: 23,
            minute: 59,
            second: 58,
        };
        let bytes = ts.to_bytes();
        assert_eq!(bytes, [12, 0, 31, 0, 0xE8, 0x07, 23, 0, 59, 0, 58, 0]);
        assert_eq!(TimeStamp::decode(&bytes).unwrap(), ts);
        assert!(TimeStamp::decode(&bytes[..11]).is_err());
    }

    #[test]
    fn from_utc_datetime() {
        let t = Utc.with_ymd_and_hms(2000, 2, 29, 12, 34, 56).unwrap();
        assert_eq!(
            TimeStamp::from(t),
            TimeStamp {
                month: 2,
                day: 29,
                year: 2000,
                hour: 12,
                minute: 34,
                second: 56,
            }
        );
        let epoch = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        assert_eq!(
            TimeStamp::from(epoch),
            TimeStamp {
                month: 1,
                day: 1,
                year: 1970,
                ..TimeStamp::default()
            }
        );
    }

    #[cfg(feature = "std")]
    #[test]
    fn now_is_a_valid_date() {
        let ts = TimeStamp::now();
        assert!(ts.year >= 2024);
        assert!((1..=12).contains(&ts.month));
        assert!((1..=31).contains(&ts.day));
    }

    #[test]
    fn software_version_display() {
        let v = SoftwareVersion {
            number: 412,
            letter: b'b',
        };
        assert_eq!(v.to_string(), "4.12b");
        assert_eq!(SoftwareVersion::default().to_string(), "0.00");
        assert_eq!(v.to_bytes(), [0x9C, 0x01, b'b']);
    }

    #[test]
    fn key_color_is_bgra() {
        let k = KeyColor(RGBA8::new(1, 2, 3, 4));
        assert_eq!(k.to_bytes(), [3, 2, 1, 4]);
        assert_eq!(KeyColor::decode(&[3, 2, 1, 4]).unwrap(), k);
    }

    #[test]
    fn fraction_value() {
        assert_eq!(Fraction::new(22, 10).value(), Some(2.2));
        assert_eq!(Fraction::default().value(), None);
    }

    #[test]
    fn extension_block_offsets() {
        let block = ExtensionBlock {
            size: 495,
            metadata: ExtensionMetadata {
                author_name: "Ann".into(),
                software_id: "zentga".into(),
                attribute_type: AttributeType::Alpha,
                ..Default::default()
            },
            offsets: ExtensionOffsets {
                color_correction: 0x0102_0304,
                postage_stamp: 7,
                scan_line: 9,
            },
        };
        let bytes = block.to_bytes();
        assert_eq!(bytes.len(), 495);
        assert_eq!(&bytes[0..2], &495u16.to_le_bytes());
        assert_eq!(&bytes[2..5], b"Ann");
        assert_eq!(&bytes[426..432], b"zentga");
        assert_eq!(&bytes[482..486], &[4, 3, 2, 1]);
        assert_eq!(&bytes[486..490], &7u32.to_le_bytes());
        assert_eq!(&bytes[490..494], &9u32.to_le_bytes());
        assert_eq!(bytes[494], 3);
        assert_eq!(ExtensionBlock::decode(&bytes).unwrap(), block);
    }
}
