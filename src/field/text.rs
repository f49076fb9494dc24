//! Fixed-length NUL-padded ASCII strings and the image identifier.

use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;

use super::{Field, sized};
use crate::error::TgaError;

/// Write `s` as exactly `len` bytes: at most `len - 1` ASCII characters,
/// then NUL padding. Non-ASCII characters become `?`.
pub(crate) fn write_padded(out: &mut Vec<u8>, s: &str, len: usize) {
    let start = out.len();
    out.extend(
        s.chars()
            .take(len - 1)
            .map(|c| if c.is_ascii() { c as u8 } else { b'?' }),
    );
    out.resize(start + len, 0);
}

/// Read a padded string, dropping trailing NULs.
pub(crate) fn read_padded(bytes: &[u8]) -> String {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Width of one padded extension-area string (40 characters + NUL).
pub(crate) const SHORT_TEXT: usize = 41;
const COMMENT_LINE: usize = 81;

/// The four 80-character comment lines of the extension area.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AuthorComments {
    pub lines: [String; 4],
}

impl AuthorComments {
    /// Split `text` on newlines into at most four lines.
    pub fn new(text: &str) -> Self {
        let mut comments = Self::default();
        for (slot, line) in comments.lines.iter_mut().zip(text.lines()) {
            *slot = line.to_owned();
        }
        comments
    }

    /// Lines joined with `\n`, trailing empty lines omitted.
    pub fn text(&self) -> String {
        let used = self
            .lines
            .iter()
            .rposition(|l| !l.is_empty())
            .map_or(0, |i| i + 1);
        self.lines[..used].join("\n")
    }
}

impl Field for AuthorComments {
    const NAME: &'static str = "author comments";
    const SIZE: usize = 4 * COMMENT_LINE;

    fn write_to(&self, out: &mut Vec<u8>) {
        for line in &self.lines {
            write_padded(out, line, COMMENT_LINE);
        }
    }

    fn decode(bytes: &[u8]) -> Result<Self, TgaError> {
        let mut c = sized::<Self>(bytes)?;
        let mut comments = Self::default();
        for line in &mut comments.lines {
            *line = read_padded(c.read_bytes(COMMENT_LINE)?);
        }
        Ok(comments)
    }
}

/// Free-form identifier stored between the header and the color map.
///
/// On disk a trailing NUL is indistinguishable from a terminator, so a
/// loaded id never has `terminated == false` with `bytes` ending in NUL.
/// [`ImageId::new`] strips trailing NULs to keep that form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ImageId {
    pub bytes: Vec<u8>,
    /// Whether a NUL terminator follows `bytes` on disk.
    pub terminated: bool,
}

impl ImageId {
    pub fn new(text: &str) -> Self {
        Self {
            bytes: text.trim_end_matches('\0').as_bytes().to_vec(),
            terminated: false,
        }
    }

    /// An identifier written with a trailing NUL.
    pub fn terminated(text: &str) -> Self {
        Self {
            bytes: text.as_bytes().to_vec(),
            terminated: true,
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    fn stored_len(&self) -> usize {
        let max = if self.terminated { 254 } else { 255 };
        self.bytes.len().min(max)
    }

    /// The header's id-length byte for this identifier.
    pub fn encoded_len(&self) -> u8 {
        // stored_len is at most 254 when terminated
        (self.stored_len() + usize::from(self.terminated)) as u8
    }

    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.bytes[..self.stored_len()]);
        if self.terminated {
            out.push(0);
        }
    }

    /// Interpret raw id bytes; a trailing NUL marks the id as terminated.
    pub(crate) fn from_raw(raw: &[u8]) -> Self {
        match raw.split_last() {
            Some((0, rest)) => Self {
                bytes: rest.to_vec(),
                terminated: true,
            },
            _ => Self {
                bytes: raw.to_vec(),
                terminated: false,
            },
        }
    }
}
