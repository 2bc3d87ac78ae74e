//! Core service types.
//!
//! These types enforce their invariants at construction time,
//! ensuring invalid hosts and paths are unrepresentable.

mod host_url;
mod remote_path;
mod service;

pub use host_url::HostUrl;
pub use remote_path::RemotePath;
pub use service::{Root, ServiceConfig};
