//! Account information.

use serde::{Deserialize, Serialize};

/// The linked user's account information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub uid: u64,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub referral_link: Option<String>,
    pub quota_info: QuotaInfo,
}

/// Storage quota, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaInfo {
    /// Total quota.
    pub quota: u64,
    /// Bytes used by the user's own files.
    pub normal: u64,
    /// Bytes used by shared folders.
    pub shared: u64,
}

impl QuotaInfo {
    /// Bytes still available.
    pub fn remaining(&self) -> u64 {
        self.quota.saturating_sub(self.normal + self.shared)
    }
}
