//! Subcommand implementations.

pub mod login;
pub mod logout;
pub mod ls;
pub mod upload;
pub mod whoami;

use anyhow::Result;

use crate::cli::{Commands, ServiceArgs};

pub async fn handle(command: Commands, service: &ServiceArgs) -> Result<()> {
    match command {
        Commands::Login(args) => login::run(args, service).await,
        Commands::Whoami(args) => whoami::run(args, service).await,
        Commands::Ls(args) => ls::run(args, service).await,
        Commands::Upload(args) => upload::run(args, service).await,
        Commands::Logout(args) => logout::run(args).await,
    }
}
