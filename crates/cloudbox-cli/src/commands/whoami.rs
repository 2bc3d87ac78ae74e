//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::ServiceArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the raw account info as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, service: &ServiceArgs) -> Result<()> {
    let client = session::load_client(service).await?;
    let account = client
        .account_info()
        .await
        .context("Failed to fetch account info")?;

    if args.json {
        return output::json(&account);
    }

    output::field("Name", &account.display_name);
    output::field("UID", &account.uid.to_string());
    if let Some(ref email) = account.email {
        output::field("Email", email);
    }
    output::field("Root", client.root().as_str());
    output::field(
        "Quota",
        &format!(
            "{} of {} bytes free",
            account.quota_info.remaining(),
            account.quota_info.quota
        ),
    );

    Ok(())
}
