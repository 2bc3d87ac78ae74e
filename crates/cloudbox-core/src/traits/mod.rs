//! Core traits at the transport and upload-source seams.

mod source;
mod transport;

pub use source::{ByteSource, MemorySource, ReaderSource};
pub use transport::{HttpRequest, HttpResponse, Method, Transport};
