//! File and folder metadata.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Metadata of a file or folder as reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Canonical path of the entry.
    pub path: String,

    /// Human-readable size (e.g. "9.5 MB").
    #[serde(default)]
    pub size: String,

    /// Exact size in bytes.
    #[serde(default)]
    pub bytes: u64,

    #[serde(default)]
    pub is_dir: bool,

    /// Revision identifier, usable as `parent_rev` on later writes.
    #[serde(default)]
    pub rev: Option<String>,

    /// Folder hash for change detection (folders only).
    #[serde(default)]
    pub hash: Option<String>,

    #[serde(default)]
    pub is_deleted: bool,

    #[serde(default)]
    pub thumb_exists: bool,

    #[serde(default)]
    pub icon: Option<String>,

    #[serde(default)]
    pub mime_type: Option<String>,

    /// Server modification time, RFC 2822 formatted.
    #[serde(default)]
    pub modified: Option<String>,

    /// Root the entry lives under (`dropbox` or `app_folder`).
    #[serde(default)]
    pub root: Option<String>,

    /// Children, present when a folder is listed.
    #[serde(default)]
    pub contents: Vec<Metadata>,
}

impl Metadata {
    /// Parsed server modification time.
    pub fn modified_at(&self) -> Option<DateTime<FixedOffset>> {
        self.modified
            .as_deref()
            .and_then(|m| DateTime::parse_from_rfc2822(m).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_file_entry() {
        let metadata: Metadata = serde_json::from_value(json!({
            "size": "9.5 MB",
            "bytes": 10000000,
            "rev": "35e97029684fe",
            "thumb_exists": false,
            "path": "/backups/db.tar",
            "is_dir": false,
            "icon": "page_white_compressed",
            "root": "dropbox",
            "mime_type": "application/x-tar",
            "modified": "Tue, 19 Jul 2011 21:55:38 +0000"
        }))
        .unwrap();

        assert_eq!(metadata.bytes, 10_000_000);
        assert_eq!(metadata.rev.as_deref(), Some("35e97029684fe"));
        assert!(metadata.contents.is_empty());
        let modified = metadata.modified_at().unwrap();
        assert_eq!(modified.to_rfc3339(), "2011-07-19T21:55:38+00:00");
    }

    #[test]
    fn parses_folder_listing() {
        let metadata: Metadata = serde_json::from_value(json!({
            "path": "/Photos",
            "is_dir": true,
            "hash": "37eb1ba1849d4b0fb0b28caf7ef3af52",
            "size": "0 bytes",
            "bytes": 0,
            "contents": [
                {"path": "/Photos/a.jpg", "bytes": 12, "size": "12 bytes", "is_dir": false}
            ]
        }))
        .unwrap();

        assert!(metadata.is_dir);
        assert_eq!(metadata.contents.len(), 1);
        assert_eq!(metadata.contents[0].path, "/Photos/a.jpg");
        assert!(metadata.modified_at().is_none());
    }
}
