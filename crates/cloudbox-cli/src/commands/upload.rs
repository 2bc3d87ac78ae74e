//! Upload command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::warn;

use cloudbox_core::{Error, ReaderSource, RemotePath};
use cloudbox_http::{DEFAULT_CHUNK_SIZE, WriteMode};

use crate::cli::ServiceArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Local file to upload
    pub file: PathBuf,

    /// Remote destination path
    pub dest: String,

    /// Chunk size in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Replace an existing file instead of writing a renamed copy
    #[arg(long)]
    pub overwrite: bool,

    /// Revision the upload is based on
    #[arg(long)]
    pub parent_rev: Option<String>,

    /// Times to resume after a transport failure
    #[arg(long, default_value_t = 3)]
    pub retries: u32,
}

pub async fn run(args: UploadArgs, service: &ServiceArgs) -> Result<()> {
    let client = session::load_client(service).await?;
    let dest = RemotePath::new(&args.dest).context("Invalid remote path")?;
    let source = ReaderSource::open(&args.file)
        .await
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    let mut uploader = client.chunked_uploader(source);
    eprintln!(
        "{}",
        format!("Uploading {} bytes...", uploader.total_size()).dimmed()
    );

    let mut attempts = 0;
    loop {
        match uploader.upload(args.chunk_size).await {
            Ok(()) => break,
            Err(Error::Transport(e)) if attempts < args.retries => {
                attempts += 1;
                warn!(error = %e, offset = uploader.offset(), attempt = attempts, "Resuming upload");
            }
            Err(e) => return Err(e).context("Upload failed"),
        }
    }

    let mut mode = WriteMode {
        overwrite: args.overwrite,
        ..Default::default()
    };
    if let Some(rev) = args.parent_rev {
        mode = mode.with_parent_rev(rev);
    }

    let metadata = uploader
        .finish(&dest, &mode)
        .await
        .context("Failed to commit upload")?;

    output::success("Upload committed");
    println!();
    output::field("Path", &metadata.path);
    output::field("Size", &metadata.size);
    if let Some(ref rev) = metadata.rev {
        output::field("Rev", rev);
    }

    Ok(())
}
