//! cloudbox-http - HTTPS-backed storage client.
//!
//! [`AuthSession`] drives the three-legged OAuth handshake and signs every
//! request with a PLAINTEXT authorization header. [`Client`] issues the
//! file operations, and [`ChunkedUploader`] streams large sources with
//! server-driven offset resynchronization.

mod client;
mod endpoints;
mod oauth;
mod response;
mod session;
mod transport;
mod upload;

#[cfg(test)]
mod testing;

pub use client::Client;
pub use endpoints::{MetadataQuery, WriteMode};
pub use oauth::authorization_header;
pub use response::{classify, parse_json};
pub use session::AuthSession;
pub use transport::{DEFAULT_TIMEOUT, ReqwestTransport, TransportConfig};
pub use upload::{ChunkOutcome, ChunkedUploader, DEFAULT_CHUNK_SIZE, MAX_SAME_OFFSET_RESENDS};
