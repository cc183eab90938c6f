use lumen_core::error::LumenError;
use serde::Serialize;
use std::path::Path;

/// Decoded text file content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    pub content: String,
    /// Encoding the bytes were decoded with.
    pub encoding: &'static str,
}

/// Read a text file for display, refusing anything above `max_size` bytes.
///
/// Tries UTF-8 (BOM stripped), then UTF-16 when a BOM is present, and falls
/// back to Latin-1, which accepts any byte sequence.
pub fn read_text(path: &Path, max_size: u64) -> Result<TextContent, LumenError> {
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(LumenError::WrongType {
            path: path.display().to_string(),
            expected: "file".into(),
        });
    }
    if metadata.len() > max_size {
        return Err(LumenError::TooLarge {
            size: metadata.len(),
            limit: max_size,
        });
    }

    let bytes = std::fs::read(path)?;
    decode(&bytes).ok_or_else(|| LumenError::Encoding {
        path: path.to_path_buf(),
    })
}

fn decode(bytes: &[u8]) -> Option<TextContent> {
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if let Ok(s) = std::str::from_utf8(body) {
        return Some(TextContent {
            content: s.to_string(),
            encoding: "utf-8",
        });
    }

    if let Some(rest) = bytes.strip_prefix(b"\xFF\xFE") {
        return decode_utf16(rest, u16::from_le_bytes).map(|content| TextContent {
            content,
            encoding: "utf-16le",
        });
    }
    if let Some(rest) = bytes.strip_prefix(b"\xFE\xFF") {
        return decode_utf16(rest, u16::from_be_bytes).map(|content| TextContent {
            content,
            encoding: "utf-16be",
        });
    }

    Some(TextContent {
        content: bytes.iter().map(|&b| b as char).collect(),
        encoding: "latin-1",
    })
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}
