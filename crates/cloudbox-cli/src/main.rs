//! cloudbox - command line access to a cloud storage account.
//!
//! `login` runs the out-of-band authorization handshake and stores the
//! session; the other commands reuse it.

mod cli;
mod commands;
mod logging;
mod output;
mod session;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli::Cli {
        verbose,
        log_format,
        service,
        command,
    } = cli::Cli::parse();

    logging::init(verbose, log_format)?;
    commands::handle(command, &service).await
}
