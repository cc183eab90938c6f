use lumen_core::error::LumenError;
use lumen_core::models::item::ItemType;
use std::path::Path;
use std::time::UNIX_EPOCH;
use tokio::fs::File;
use xxhash_rust::xxh3::xxh3_64;

use crate::body::{chunk_stream, ChunkStream};
use crate::range::{parse_range, ByteRange};

/// Whether a response carries the whole file or a requested slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// 200 OK
    Full,
    /// 206 Partial Content
    Partial,
}

/// Headers and bounds for a file response, decided before any body bytes
/// are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPlan {
    pub delivery: Delivery,
    /// `None` only for an empty file sent in full.
    pub range: Option<ByteRange>,
    pub size: u64,
    pub content_type: String,
    pub etag: String,
}

impl StreamPlan {
    /// Plan a response for a file of `size` bytes.
    pub fn new(
        size: u64,
        range_header: Option<&str>,
        content_type: String,
        etag: String,
    ) -> Result<Self, LumenError> {
        let (delivery, range) = match range_header {
            Some(header) => (Delivery::Partial, Some(parse_range(header, size)?)),
            None if size == 0 => (Delivery::Full, None),
            None => (Delivery::Full, Some(ByteRange::full(size))),
        };
        Ok(Self {
            delivery,
            range,
            size,
            content_type,
            etag,
        })
    }

    pub fn content_length(&self) -> u64 {
        self.range.map_or(0, |r| r.len())
    }

    /// Only set for partial responses.
    pub fn content_range(&self) -> Option<String> {
        match (self.delivery, self.range) {
            (Delivery::Partial, Some(r)) => Some(r.content_range(self.size)),
            _ => None,
        }
    }
}

/// An opened file with its plan and a body that has not been read yet.
pub struct FileStream {
    pub plan: StreamPlan,
    pub body: ChunkStream,
}

impl std::fmt::Debug for FileStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStream").field("plan", &self.plan).finish_non_exhaustive()
    }
}

/// Open `path` for streaming, honouring an optional `Range` header.
///
/// The caller must already have confined `path` to the media root.
pub async fn open_stream(
    path: &Path,
    range_header: Option<&str>,
    chunk_size: usize,
    item_type: ItemType,
) -> Result<FileStream, LumenError> {
    let file = File::open(path).await?;
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(LumenError::WrongType {
            path: path.display().to_string(),
            expected: "file".into(),
        });
    }

    let modified = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_nanos());
    let plan = StreamPlan::new(
        metadata.len(),
        range_header,
        content_type_for(path, item_type),
        etag_for(path, metadata.len(), modified),
    )?;

    tracing::debug!(
        path = %path.display(),
        range = ?plan.range,
        size = plan.size,
        "streaming file"
    );

    let (start, length) = plan.range.map_or((0, 0), |r| (r.start, r.len()));
    Ok(FileStream {
        body: chunk_stream(file, start, length, chunk_size),
        plan,
    })
}

/// Guess a MIME type from the extension, falling back by media kind.
pub fn content_type_for(path: &Path, item_type: ItemType) -> String {
    if let Some(mime) = mime_guess::from_path(path).first_raw() {
        return mime.to_string();
    }
    match item_type {
        ItemType::Video => "video/mp4",
        ItemType::Audio => "audio/mpeg",
        ItemType::Text => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Weak validator derived from path, size and modification time.
pub fn etag_for(path: &Path, size: u64, modified_nanos: u128) -> String {
    let mut key = path.as_os_str().as_encoded_bytes().to_vec();
    key.extend_from_slice(&size.to_le_bytes());
    key.extend_from_slice(&modified_nanos.to_le_bytes());
    format!("\"{:016x}\"", xxh3_64(&key))
}
