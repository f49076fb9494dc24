use alloc::string::String;
use enough::StopReason;

/// Errors from TGA parsing, layout resolution and serialization.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TgaError {
    /// A section's byte count disagrees with its declared or derived size.
    #[error("malformed {section} length: expected {expected} bytes, got {actual}")]
    MalformedLength {
        section: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate developer tag {0}")]
    DuplicateDeveloperTag(u16),

    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("unexpected end of input")]
    TruncatedStream,

    /// The 26-byte tail does not carry the `TRUEVISION-XFILE` signature.
    ///
    /// The loader treats this as "legacy v1.0 file", never as a failure.
    #[error("footer signature mismatch")]
    InvalidSignature,

    #[error("unsupported pixel format: {0}")]
    UnsupportedPixelFormat(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("invalid pixel data: {0}")]
    InvalidData(String),

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for TgaError {
    fn from(r: StopReason) -> Self {
        TgaError::Cancelled(r)
    }
}

impl TgaError {
    pub(crate) fn length(section: &'static str, expected: usize, actual: usize) -> Self {
        TgaError::MalformedLength {
            section,
            expected,
            actual,
        }
    }
}
