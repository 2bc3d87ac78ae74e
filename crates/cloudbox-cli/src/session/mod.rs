//! Persisted login state.

pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};

use cloudbox_http::{AuthSession, Client, ReqwestTransport};

use crate::cli::ServiceArgs;

/// Build an authorized client from the stored session.
///
/// `--locale` and `--app-folder` given on the command line override the
/// values recorded at login.
pub async fn load_client(args: &ServiceArgs) -> Result<Client> {
    let stored = storage::load_session()
        .await
        .context("Failed to load session")?
        .context("No active session. Run 'cloudbox login' first.")?;

    let transport = Arc::new(ReqwestTransport::new()?);
    let mut session = AuthSession::deserialize(&stored.session, stored.config, transport)
        .context("Stored session is unreadable; run 'cloudbox login' again")?;
    if let Some(locale) = args.locale.clone().or(stored.locale) {
        session = session.with_locale(locale);
    }

    let root = if args.app_folder { args.root() } else { stored.root };
    Client::new(session, root).context("Stored session is not authorized; run 'cloudbox login' again")
}
