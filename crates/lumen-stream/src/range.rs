use lumen_core::error::LumenError;

/// An inclusive byte span that has been checked against a file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// The whole file. Only meaningful for non-empty files.
    pub fn full(size: u64) -> Self {
        Self {
            start: 0,
            end: size.saturating_sub(1),
        }
    }

    /// Number of bytes covered. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value for a satisfied range.
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

/// `Content-Range` value sent with a 416 response.
pub fn unsatisfied_content_range(size: u64) -> String {
    format!("bytes */{size}")
}

/// Parse a `Range` header of the form `bytes=<start>-<end>?` against a file
/// of `size` bytes.
///
/// A missing end means the last byte; an end past the file is clamped.
/// Syntax errors give [`LumenError::MalformedRange`], spans outside the file
/// give [`LumenError::RangeUnsatisfiable`].
pub fn parse_range(header: &str, size: u64) -> Result<ByteRange, LumenError> {
    let malformed = || LumenError::MalformedRange {
        header: header.to_string(),
    };

    let byte_spec = header.trim().strip_prefix("bytes=").ok_or_else(malformed)?;
    let (start, end) = byte_spec.split_once('-').ok_or_else(malformed)?;
    if start.is_empty() || !is_digits(start) || !is_digits(end) {
        return Err(malformed());
    }

    let start: u64 = start.parse().map_err(|_| malformed())?;
    let end: Option<u64> = if end.is_empty() {
        None
    } else {
        Some(end.parse().map_err(|_| malformed())?)
    };

    if start >= size {
        return Err(LumenError::RangeUnsatisfiable { size });
    }
    let last = size - 1;
    let end = end.map_or(last, |e| e.min(last));
    if start > end {
        return Err(LumenError::RangeUnsatisfiable { size });
    }

    Ok(ByteRange { start, end })
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}
