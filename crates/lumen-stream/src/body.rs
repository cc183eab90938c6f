use bytes::Bytes;
use futures::stream::BoxStream;
use std::io::{self, SeekFrom};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// A lazily read file body.
pub type ChunkStream = BoxStream<'static, io::Result<Bytes>>;

/// Emit `length` bytes of `file` starting at `start`, at most `chunk_size`
/// bytes per item.
///
/// Nothing is read until the stream is polled. A short read ends the stream
/// early with a warning rather than an error, since the response headers are
/// already on the wire by then. Dropping the stream closes the file.
pub fn chunk_stream(mut file: File, start: u64, length: u64, chunk_size: usize) -> ChunkStream {
    let chunk_size = chunk_size.max(1) as u64;
    Box::pin(async_stream::stream! {
        let mut remaining = length;
        if let Err(e) = file.seek(SeekFrom::Start(start)).await {
            tracing::error!(start, "seek failed while streaming: {e}");
            remaining = 0;
            yield Err::<Bytes, io::Error>(e);
        }

        while remaining > 0 {
            let want = remaining.min(chunk_size) as usize;
            let mut buf = vec![0u8; want];
            let filled = match fill(&mut file, &mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    tracing::error!(start, length, "read failed while streaming: {e}");
                    yield Err(e);
                    break;
                }
            };

            if filled < want {
                tracing::warn!(
                    start,
                    length,
                    sent = length - remaining + filled as u64,
                    "short read while streaming, truncating response"
                );
                if filled > 0 {
                    buf.truncate(filled);
                    yield Ok(Bytes::from(buf));
                }
                break;
            }

            remaining -= filled as u64;
            yield Ok(Bytes::from(buf));
        }
    })
}

/// Read until `buf` is full or the file ends.
async fn fill(file: &mut File, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use tempfile::TempDir;

    async fn collect(stream: ChunkStream) -> Vec<Bytes> {
        stream.try_collect().await.unwrap()
    }

    fn sample(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("data.bin");
        let bytes: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn test_chunks_cover_range() {
        let dir = TempDir::new().unwrap();
        let path = sample(&dir);
        let file = File::open(&path).await.unwrap();

        let chunks = collect(chunk_stream(file, 100, 250, 64)).await;
        let sizes: Vec<usize> = chunks.iter().map(Bytes::len).collect();
        assert_eq!(sizes, vec![64, 64, 64, 58]);

        let joined: Vec<u8> = chunks.concat();
        let expected = &std::fs::read(&path).unwrap()[100..350];
        assert_eq!(joined, expected);
    }

    #[tokio::test]
    async fn test_short_read_truncates() {
        let dir = TempDir::new().unwrap();
        let path = sample(&dir);
        let file = File::open(&path).await.unwrap();

        let chunks = collect(chunk_stream(file, 900, 500, 64)).await;
        let total: usize = chunks.iter().map(Bytes::len).sum();
        assert_eq!(total, 100);
    }

    #[tokio::test]
    async fn test_zero_length_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = sample(&dir);
        let file = File::open(&path).await.unwrap();

        assert!(collect(chunk_stream(file, 0, 0, 64)).await.is_empty());
    }
}
