//! cloudbox-core - Core types and traits for the cloudbox storage client.
//!
//! This crate holds everything that does not depend on a particular HTTP
//! stack: the error taxonomy, credential and token types, service
//! configuration, remote paths, response models, and the [`Transport`] and
//! [`ByteSource`] seams the network crate plugs into.

pub mod credentials;
pub mod encode;
pub mod error;
pub mod model;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use error::{ApplicationError, Error, ErrorRecord};
pub use model::{AccountInfo, Metadata, QuotaInfo};
pub use tokens::TokenPair;
pub use traits::{
    ByteSource, HttpRequest, HttpResponse, MemorySource, Method, ReaderSource, Transport,
};
pub use types::{HostUrl, RemotePath, Root, ServiceConfig};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
