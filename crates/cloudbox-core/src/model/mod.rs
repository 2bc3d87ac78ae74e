//! Response models for the storage service.

mod account;
mod metadata;

pub use account::{AccountInfo, QuotaInfo};
pub use metadata::Metadata;
