//! Endpoint paths and wire-level request/response types.

use serde::Deserialize;

// ============================================================================
// Endpoint Paths (relative to the versioned host root)
// ============================================================================

/// GET on the API host, signed without a token.
pub const REQUEST_TOKEN: &str = "/oauth/request_token";

/// Human-facing page on the web host; never called by this crate.
pub const AUTHORIZE: &str = "/oauth/authorize";

/// GET on the API host, signed with the request token.
pub const ACCESS_TOKEN: &str = "/oauth/access_token";

/// PUT on the content host, octet-stream body.
pub const CHUNKED_UPLOAD: &str = "/chunked_upload";

/// POST on the content host, followed by `/<root><path>`.
pub const COMMIT_CHUNKED_UPLOAD: &str = "/commit_chunked_upload";

/// PUT on the content host, followed by `/<root><path>`.
pub const FILES_PUT: &str = "/files_put";

/// GET on the content host, followed by `/<root><path>`.
pub const FILES: &str = "/files";

/// GET on the API host, followed by `/<root><path>`.
pub const METADATA: &str = "/metadata";

pub const ACCOUNT_INFO: &str = "/account/info";
pub const CREATE_FOLDER: &str = "/fileops/create_folder";
pub const DELETE: &str = "/fileops/delete";
pub const MOVE: &str = "/fileops/move";
pub const COPY: &str = "/fileops/copy";

// ============================================================================
// Typed Parameters
// ============================================================================

/// How a write treats an existing file at the destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteMode {
    /// Replace an existing file instead of writing a renamed copy.
    pub overwrite: bool,
    /// Revision the new content is based on; a mismatch yields a conflicted copy.
    pub parent_rev: Option<String>,
}

impl WriteMode {
    pub fn overwrite() -> Self {
        Self {
            overwrite: true,
            parent_rev: None,
        }
    }

    pub fn with_parent_rev(mut self, rev: impl Into<String>) -> Self {
        self.parent_rev = Some(rev.into());
        self
    }

    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("overwrite", self.overwrite.to_string())];
        if let Some(ref rev) = self.parent_rev {
            params.push(("parent_rev", rev.clone()));
        }
        params
    }
}

/// Options for a metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataQuery {
    /// Maximum number of children returned for a folder.
    pub file_limit: u32,
    /// Folder hash from a previous listing; an unchanged folder yields `NotModified`.
    pub hash: Option<String>,
    /// Whether to include folder contents.
    pub list: bool,
    pub include_deleted: bool,
    /// Look up a specific revision of a file.
    pub rev: Option<String>,
}

impl Default for MetadataQuery {
    fn default() -> Self {
        Self {
            file_limit: 25_000,
            hash: None,
            list: true,
            include_deleted: false,
            rev: None,
        }
    }
}

impl MetadataQuery {
    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("file_limit", self.file_limit.to_string()),
            ("list", self.list.to_string()),
            ("include_deleted", self.include_deleted.to_string()),
        ];
        if let Some(ref hash) = self.hash {
            params.push(("hash", hash.clone()));
        }
        if let Some(ref rev) = self.rev {
            params.push(("rev", rev.clone()));
        }
        params
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Response from a successful chunk append.
#[derive(Debug, Deserialize)]
pub(crate) struct ChunkResponse {
    pub upload_id: String,
    pub offset: u64,
    #[serde(default)]
    #[allow(dead_code)]
    pub expires: Option<String>,
}

/// Error body format shared by every endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub user_error: Option<String>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub upload_id: Option<String>,
}

impl ErrorBody {
    /// The `error` field rendered as text; structured values are kept as JSON.
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
