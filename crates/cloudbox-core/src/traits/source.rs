//! Upload byte sources.

use async_trait::async_trait;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};

/// A sequential byte stream of known total length.
///
/// The chunked uploader never seeks: it assumes each read continues where
/// the previous one stopped. A source is therefore single-reader and must
/// not be shared between concurrent uploads.
#[async_trait]
pub trait ByteSource: Send {
    /// Total number of bytes this source will yield.
    fn total_len(&self) -> u64;

    /// Read up to `max` bytes. Returns fewer only at the end of the stream,
    /// and an empty buffer once the stream is exhausted.
    async fn read_chunk(&mut self, max: usize) -> std::io::Result<Vec<u8>>;
}

/// An in-memory source.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Vec<u8>,
    position: usize,
}

impl MemorySource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            position: 0,
        }
    }

    /// Bytes handed out so far.
    pub fn position(&self) -> usize {
        self.position
    }
}

#[async_trait]
impl ByteSource for MemorySource {
    fn total_len(&self) -> u64 {
        self.data.len() as u64
    }

    async fn read_chunk(&mut self, max: usize) -> std::io::Result<Vec<u8>> {
        let end = self.position.saturating_add(max).min(self.data.len());
        let chunk = self.data[self.position..end].to_vec();
        self.position = end;
        Ok(chunk)
    }
}

/// A source backed by any async reader whose length is known up front.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    len: u64,
}

impl<R> ReaderSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R, len: u64) -> Self {
        Self { reader, len }
    }
}

impl ReaderSource<tokio::fs::File> {
    /// Open a local file, taking its length from the filesystem metadata.
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();
        Ok(Self::new(file, len))
    }
}

#[async_trait]
impl<R> ByteSource for ReaderSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    fn total_len(&self) -> u64 {
        self.len
    }

    async fn read_chunk(&mut self, max: usize) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(max.min(self.len as usize));
        // A single read may return less than asked for; keep going until the
        // chunk is full or the reader is exhausted.
        (&mut self.reader).take(max as u64).read_to_end(&mut buf).await?;
        Ok(buf)
    }
}
