//! Login command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use cloudbox_http::{AuthSession, Client, ReqwestTransport};

use crate::cli::ServiceArgs;
use crate::output;
use crate::session::storage::{self, StoredSession};

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// URL the service redirects to after approval
    #[arg(long)]
    pub callback: Option<String>,
}

pub async fn run(args: LoginArgs, service: &ServiceArgs) -> Result<()> {
    let credentials = service.credentials()?;
    let config = service.service_config()?;
    let transport = Arc::new(ReqwestTransport::new()?);

    let mut session = AuthSession::new(credentials, config.clone(), transport);
    if let Some(ref locale) = service.locale {
        session = session.with_locale(locale);
    }

    let url = session
        .build_authorize_url(args.callback.as_deref(), None)
        .await
        .context("Failed to obtain a request token")?;

    eprintln!("{}", "Open this URL and approve access:".dimmed());
    println!("{}", url);
    eprintln!("{}", "Press Enter once approved...".dimmed());

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read confirmation")?;

    session
        .exchange_for_access_token()
        .await
        .context("Failed to exchange the request token")?;

    let blob = session.serialize().await?;
    let stored = StoredSession {
        session: blob,
        config,
        root: service.root(),
        locale: service.locale.clone(),
    };
    let path = storage::save_session(&stored)
        .await
        .context("Failed to save session")?;

    let client = Client::new(session, stored.root)?;
    let account = client
        .account_info()
        .await
        .context("Failed to fetch account info")?;

    output::success("Logged in successfully");
    println!();
    output::field("Account", &account.display_name);
    output::field("Root", stored.root.as_str());
    output::field("Session", &path.display().to_string());

    Ok(())
}
