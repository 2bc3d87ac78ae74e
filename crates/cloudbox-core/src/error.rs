//! Error types for cloudbox.
//!
//! Every failure raised by the library is an [`Error`]. Variants that stem
//! from a server response carry an [`ErrorRecord`] holding the technical
//! message, an optional translated message meant for end users, and the raw
//! response that produced it.

use std::fmt;
use thiserror::Error;

use crate::traits::HttpResponse;

/// The unified error type for cloudbox operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The OAuth handshake was rejected or answered with a malformed body.
    ///
    /// The caller must restart the out-of-band approval flow.
    #[error("authorization handshake failed: {0}")]
    AuthProtocol(ErrorRecord),

    /// An operation needed an access token but the session has none.
    #[error("session is not authorized; complete the access token handshake first")]
    NotAuthorized,

    /// The server rejected the credentials (HTTP 401).
    #[error("authentication rejected: {0}")]
    Auth(ErrorRecord),

    /// The server failed (HTTP 5xx). Not retried by this library.
    #[error("server error: {0}")]
    Server(ErrorRecord),

    /// The entry is unchanged since the supplied hash (HTTP 304).
    #[error("not modified")]
    NotModified(ErrorRecord),

    /// Structured application error reported by the server.
    #[error("{0}")]
    Application(ApplicationError),

    /// A response body did not have the expected structure.
    #[error("malformed response: {0}")]
    MalformedResponse(ErrorRecord),

    /// Chunked upload state errors.
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    /// Input validation errors (bad host, path, token or session blob).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Reading from an upload source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the server-derived record behind this error, if any.
    pub fn record(&self) -> Option<&ErrorRecord> {
        match self {
            Error::AuthProtocol(record)
            | Error::Auth(record)
            | Error::Server(record)
            | Error::NotModified(record)
            | Error::MalformedResponse(record) => Some(record),
            Error::Application(err) => Some(&err.record),
            _ => None,
        }
    }

    /// Returns the translated, human-readable message supplied by the server.
    pub fn user_message(&self) -> Option<&str> {
        self.record().and_then(|r| r.user_message.as_deref())
    }

    /// Returns the HTTP status of the response behind this error, if any.
    pub fn status(&self) -> Option<u16> {
        self.record()
            .and_then(|r| r.response.as_ref())
            .map(|r| r.status)
    }
}

/// Payload carried by every failure derived from a server response.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    /// Technical message (raw server message or a description of the failure).
    pub message: String,
    /// Translated message intended for end users, when the server sent one.
    pub user_message: Option<String>,
    /// The response that produced this error.
    pub response: Option<HttpResponse>,
}

impl ErrorRecord {
    /// Create a record with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            user_message: None,
            response: None,
        }
    }

    /// Attach the response that produced this record.
    pub fn with_response(mut self, response: HttpResponse) -> Self {
        self.response = Some(response);
        self
    }

    /// Attach a translated user-facing message.
    pub fn with_user_message(mut self, user_message: impl Into<String>) -> Self {
        self.user_message = Some(user_message.into());
        self
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref response) = self.response {
            write!(f, "HTTP {}: ", response.status)?;
        }
        write!(f, "{}", self.message)
    }
}

/// A structured application error (non-2xx with an `error` field).
#[derive(Debug, Clone)]
pub struct ApplicationError {
    /// Message, translated message and raw response.
    pub record: ErrorRecord,
    /// Server offset reported alongside the error (chunked upload conflicts).
    pub offset: Option<u64>,
    /// Upload id reported alongside the error, if any.
    pub upload_id: Option<String>,
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.record)?;
        if let Some(offset) = self.offset {
            write!(f, " (server offset {})", offset)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApplicationError {}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// TLS handshake or certificate verification failed.
    #[error("TLS error: {message}")]
    Tls { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Any other HTTP-level failure.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Chunked upload state errors.
#[derive(Debug, Error)]
pub enum UploadError {
    /// `finish` was called before any chunk was accepted.
    #[error("no chunk has been accepted yet; call upload() first")]
    NotStarted,

    /// `finish` was called before all bytes were acknowledged.
    #[error("upload incomplete: {offset} of {total} bytes acknowledged")]
    Incomplete { offset: u64, total: u64 },

    /// The byte source ended before `total` bytes were read.
    #[error("source exhausted at offset {offset}, expected {total} bytes")]
    SourceExhausted { offset: u64, total: u64 },

    /// The server reported an offset behind the local one, or accepted a
    /// chunk without advancing.
    #[error("server offset {server} does not advance local offset {local}")]
    OffsetRegressed { local: u64, server: u64 },

    /// The server kept asking for the bytes at `offset` after every resend.
    #[error("server still expects offset {offset} after {attempts} sends")]
    Stalled { offset: u64, attempts: u32 },

    /// The server reported an offset past the end of the upload.
    #[error("server offset {server} exceeds total size {total}")]
    OffsetOutOfRange { server: u64, total: u64 },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid service host URL.
    #[error("invalid host URL '{value}': {reason}")]
    Host { value: String, reason: String },

    /// Invalid remote path.
    #[error("invalid path '{value}': {reason}")]
    Path { value: String, reason: String },

    /// Invalid token material.
    #[error("invalid token: {reason}")]
    Token { reason: String },

    /// Unreadable serialized session.
    #[error("invalid serialized session: {reason}")]
    Session { reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
