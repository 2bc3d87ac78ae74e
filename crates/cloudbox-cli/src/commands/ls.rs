//! List command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use cloudbox_core::RemotePath;
use cloudbox_http::MetadataQuery;

use crate::cli::ServiceArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LsArgs {
    /// Remote folder or file
    #[arg(default_value = "/")]
    pub path: String,

    /// Include deleted entries
    #[arg(long)]
    pub deleted: bool,

    /// Print each entry as a JSON line
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: LsArgs, service: &ServiceArgs) -> Result<()> {
    let client = session::load_client(service).await?;
    let path = RemotePath::new(&args.path).context("Invalid remote path")?;

    let query = MetadataQuery {
        include_deleted: args.deleted,
        ..Default::default()
    };
    let metadata = client
        .metadata(&path, &query)
        .await
        .with_context(|| format!("Failed to list {}", path))?;

    let entries = if metadata.is_dir {
        metadata.contents
    } else {
        vec![metadata]
    };

    if entries.is_empty() {
        eprintln!("{}", "Folder is empty.".dimmed());
        return Ok(());
    }

    for entry in &entries {
        if args.json {
            output::json(entry)?;
        } else {
            output::entry(entry);
        }
    }

    Ok(())
}
