//! Resumable chunked uploads.
//!
//! A [`ChunkedUploader`] streams a [`ByteSource`] to the content host one
//! chunk at a time. The server tracks how many bytes it holds for an
//! upload id; whenever it disagrees with the local offset it answers with
//! its own offset and the uploader realigns:
//!
//! * server offset inside the in-flight chunk: resend only the tail;
//! * at the chunk's end: the chunk is already stored, move on;
//! * past the chunk's end: skip the gap in the source;
//! * equal to the local offset: resend the same chunk, at most
//!   [`MAX_SAME_OFFSET_RESENDS`] times in a row.
//!
//! The in-flight chunk is kept across failed calls, so a caller may retry
//! [`ChunkedUploader::upload`] after any error and resume where it stopped.

use tracing::{debug, info, instrument, warn};

use cloudbox_core::error::{InvalidInputError, UploadError};
use cloudbox_core::{ApplicationError, ByteSource, Error, Metadata, Method, RemotePath};

use crate::client::Client;
use crate::endpoints::{CHUNKED_UPLOAD, ChunkResponse, WriteMode};
use crate::response::parse_json;

/// Default chunk size (4 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// Upper bound on a single read while skipping already-stored bytes.
const SKIP_WINDOW: u64 = 1024 * 1024;

/// Resends allowed when the server keeps reporting the local offset.
pub const MAX_SAME_OFFSET_RESENDS: u32 = 3;

/// How the server answered one chunk append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The chunk was stored; `offset` is the new server offset.
    Accepted { offset: u64, upload_id: String },
    /// The server refused the chunk and reported the offset it expects.
    Resync {
        offset: u64,
        upload_id: Option<String>,
    },
}

/// Coordinates a chunked upload of one source.
pub struct ChunkedUploader<'c, S> {
    client: &'c Client,
    source: S,
    total_size: u64,
    upload_id: Option<String>,
    /// Bytes the server has acknowledged.
    offset: u64,
    /// Chunk sent but not yet acknowledged; always starts at `offset`.
    pending: Option<Vec<u8>>,
    /// Source bytes already stored server-side that must be skipped.
    skip: u64,
}

impl<'c, S: ByteSource> ChunkedUploader<'c, S> {
    pub(crate) fn new(client: &'c Client, source: S) -> Self {
        let total_size = source.total_len();
        Self {
            client,
            source,
            total_size,
            upload_id: None,
            offset: 0,
            pending: None,
            skip: 0,
        }
    }

    /// Bytes acknowledged by the server so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Upload id assigned by the server with the first accepted chunk.
    pub fn upload_id(&self) -> Option<&str> {
        self.upload_id.as_deref()
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn is_complete(&self) -> bool {
        self.offset == self.total_size
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Send chunks until the server holds every byte of the source.
    ///
    /// Errors leave the uploader in a consistent state: calling `upload`
    /// again resends the unacknowledged chunk at the current offset.
    #[instrument(skip(self), fields(total = self.total_size))]
    pub async fn upload(&mut self, chunk_size: usize) -> Result<(), Error> {
        if chunk_size == 0 {
            return Err(InvalidInputError::Other {
                message: "chunk size must be greater than zero".into(),
            }
            .into());
        }

        let mut resends = 0;
        while self.offset < self.total_size {
            let chunk = match self.pending.take() {
                Some(chunk) => chunk,
                None => self.next_chunk(chunk_size).await?,
            };

            let outcome = match self.append_chunk(&chunk).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.pending = Some(chunk);
                    return Err(e);
                }
            };

            let (server_offset, upload_id, resync) = match outcome {
                ChunkOutcome::Accepted { offset, upload_id } => (offset, Some(upload_id), false),
                ChunkOutcome::Resync { offset, upload_id } => {
                    warn!(
                        local = self.offset,
                        server = offset,
                        "Server offset differs, resynchronizing"
                    );
                    (offset, upload_id, true)
                }
            };
            self.adopt_upload_id(upload_id);

            // The server holds nothing past our offset: send the same bytes again.
            if resync && server_offset == self.offset {
                self.pending = Some(chunk);
                if resends == MAX_SAME_OFFSET_RESENDS {
                    return Err(UploadError::Stalled {
                        offset: self.offset,
                        attempts: resends + 1,
                    }
                    .into());
                }
                resends += 1;
                continue;
            }

            if let Err(e) = self.check_offset(server_offset) {
                self.pending = Some(chunk);
                return Err(e);
            }
            resends = 0;
            self.advance(server_offset, chunk);
            debug!(offset = self.offset, "Chunk acknowledged");
        }

        info!(upload_id = ?self.upload_id, bytes = self.total_size, "All chunks uploaded");
        Ok(())
    }

    /// Commit the uploaded bytes to `path`.
    ///
    /// An empty source that never started a session is written with a
    /// single empty `files_put` instead.
    #[instrument(skip(self, mode), fields(%path))]
    pub async fn finish(&self, path: &RemotePath, mode: &WriteMode) -> Result<Metadata, Error> {
        let Some(ref upload_id) = self.upload_id else {
            if self.total_size == 0 {
                return self.client.put_file(path, Vec::new(), mode).await;
            }
            return Err(UploadError::NotStarted.into());
        };

        if !self.is_complete() {
            return Err(UploadError::Incomplete {
                offset: self.offset,
                total: self.total_size,
            }
            .into());
        }

        self.client
            .commit_chunked_upload(path, upload_id, mode)
            .await
    }

    /// Read the next chunk, skipping bytes the server already holds.
    async fn next_chunk(&mut self, chunk_size: usize) -> Result<Vec<u8>, Error> {
        while self.skip > 0 {
            let window = self.skip.min(SKIP_WINDOW) as usize;
            let skipped = self.source.read_chunk(window).await?;
            if skipped.is_empty() {
                return Err(self.exhausted());
            }
            self.skip -= skipped.len() as u64;
        }

        let remaining = self.total_size - self.offset;
        let want = remaining.min(chunk_size as u64) as usize;
        let chunk = self.source.read_chunk(want).await?;
        if chunk.is_empty() {
            return Err(self.exhausted());
        }
        Ok(chunk)
    }

    async fn append_chunk(&self, chunk: &[u8]) -> Result<ChunkOutcome, Error> {
        let session = self.client.session();

        let mut params: Vec<(&str, String)> = Vec::with_capacity(2);
        if let Some(ref upload_id) = self.upload_id {
            params.push(("upload_id", upload_id.clone()));
        }
        if self.upload_id.is_some() || self.offset > 0 {
            params.push(("offset", self.offset.to_string()));
        }
        let url = session.with_query(session.config().content_url(CHUNKED_UPLOAD), &params);

        debug!(offset = self.offset, len = chunk.len(), "Appending chunk");
        let request = session
            .signed_request(Method::Put, url)?
            .header("Content-Type", "application/octet-stream")
            .body(chunk.to_vec());
        let response = session.send(request).await?;

        match parse_json::<ChunkResponse>(response) {
            Ok(body) => Ok(ChunkOutcome::Accepted {
                offset: body.offset,
                upload_id: body.upload_id,
            }),
            Err(Error::Application(ApplicationError {
                offset: Some(offset),
                upload_id,
                ..
            })) => Ok(ChunkOutcome::Resync { offset, upload_id }),
            Err(e) => Err(e),
        }
    }

    fn adopt_upload_id(&mut self, upload_id: Option<String>) {
        match (&self.upload_id, upload_id) {
            (None, Some(id)) => self.upload_id = Some(id),
            (Some(current), Some(id)) if *current != id => {
                warn!(current = %current, received = %id, "Ignoring changed upload id");
            }
            _ => {}
        }
    }

    /// A server offset must advance the upload without overshooting it.
    fn check_offset(&self, server: u64) -> Result<(), Error> {
        if server <= self.offset {
            return Err(UploadError::OffsetRegressed {
                local: self.offset,
                server,
            }
            .into());
        }
        if server > self.total_size {
            return Err(UploadError::OffsetOutOfRange {
                server,
                total: self.total_size,
            }
            .into());
        }
        Ok(())
    }

    /// Move to `server`, which lies in `(offset, total_size]`.
    fn advance(&mut self, server: u64, mut chunk: Vec<u8>) {
        let chunk_end = self.offset + chunk.len() as u64;
        if server < chunk_end {
            let acknowledged = (server - self.offset) as usize;
            self.pending = Some(chunk.split_off(acknowledged));
        } else {
            self.pending = None;
            self.skip = server - chunk_end;
        }
        self.offset = server;
    }

    fn exhausted(&self) -> Error {
        UploadError::SourceExhausted {
            offset: self.offset,
            total: self.total_size,
        }
        .into()
    }
}
