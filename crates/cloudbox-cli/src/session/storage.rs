//! Session storage for persisting login state.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use cloudbox_core::{Root, ServiceConfig};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stored session data.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredSession {
    /// Opaque blob produced by `AuthSession::serialize`.
    pub session: String,
    pub config: ServiceConfig,
    pub root: Root,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// Get the session file path.
fn session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "cloudbox").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// Save a session to disk.
pub async fn save_session(stored: &StoredSession) -> Result<PathBuf> {
    let path = session_path()?;
    let json = serde_json::to_string_pretty(stored)?;

    write_private(&path, json.as_bytes())
        .await
        .context("Failed to write session file")?;

    Ok(path)
}

/// Write `contents` to a file only the owner can read.
///
/// The blob holds the application and access secrets, so the mode is set
/// before any byte lands on disk, including when the file already exists.
async fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    #[cfg(unix)]
    file.set_permissions(std::fs::Permissions::from_mode(0o600))
        .await?;

    file.write_all(contents).await?;
    file.flush().await
}

/// Load a session from disk.
pub async fn load_session() -> Result<Option<StoredSession>> {
    let path = session_path()?;

    if !fs::try_exists(&path).await? {
        return Ok(None);
    }

    let json = fs::read_to_string(&path)
        .await
        .context("Failed to read session file")?;
    let stored = serde_json::from_str(&json).context("Invalid session file")?;

    Ok(Some(stored))
}

/// Remove the stored session. Returns whether one existed.
pub async fn clear_session() -> Result<bool> {
    let path = session_path()?;

    if !fs::try_exists(&path).await? {
        return Ok(false);
    }

    fs::remove_file(&path)
        .await
        .context("Failed to remove session file")?;
    Ok(true)
}
