//! CLI argument definitions.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use cloudbox_core::{Credentials, HostUrl, Root, ServiceConfig};

use crate::commands::{login, logout, ls, upload, whoami};
use crate::logging::LogFormat;

/// Cloud storage CLI tool.
#[derive(Parser, Debug)]
#[command(name = "cloudbox")]
#[command(author, version = env!("CLOUDBOX_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value = "text", global = true, env = "CLOUDBOX_LOG_FORMAT")]
    pub log_format: LogFormat,

    #[command(flatten)]
    pub service: ServiceArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Application credentials and service endpoints.
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// Application key
    #[arg(long, env = "CLOUDBOX_APP_KEY", global = true)]
    pub app_key: Option<String>,

    /// Application secret
    #[arg(long, env = "CLOUDBOX_APP_SECRET", global = true, hide_env_values = true)]
    pub app_secret: Option<String>,

    /// API host base URL
    #[arg(long, env = "CLOUDBOX_API_HOST", global = true)]
    pub api_host: Option<String>,

    /// Content host base URL
    #[arg(long, env = "CLOUDBOX_CONTENT_HOST", global = true)]
    pub content_host: Option<String>,

    /// Web host base URL (authorization page)
    #[arg(long, env = "CLOUDBOX_WEB_HOST", global = true)]
    pub web_host: Option<String>,

    /// Use the app folder root instead of the full account
    #[arg(long, global = true)]
    pub app_folder: bool,

    /// Locale for server messages (e.g. "fr")
    #[arg(long, global = true)]
    pub locale: Option<String>,
}

impl ServiceArgs {
    pub fn credentials(&self) -> Result<Credentials> {
        let key = self
            .app_key
            .as_deref()
            .context("Missing application key (--app-key or CLOUDBOX_APP_KEY)")?;
        let secret = self
            .app_secret
            .as_deref()
            .context("Missing application secret (--app-secret or CLOUDBOX_APP_SECRET)")?;
        Ok(Credentials::new(key, secret))
    }

    /// Service configuration with any host overrides applied.
    pub fn service_config(&self) -> Result<ServiceConfig> {
        let mut config = ServiceConfig::default();
        if let Some(ref host) = self.api_host {
            config.api = HostUrl::new(host).context("Invalid API host")?;
        }
        if let Some(ref host) = self.content_host {
            config.content = HostUrl::new(host).context("Invalid content host")?;
        }
        if let Some(ref host) = self.web_host {
            config.web = HostUrl::new(host).context("Invalid web host")?;
        }
        Ok(config)
    }

    pub fn root(&self) -> Root {
        if self.app_folder {
            Root::AppFolder
        } else {
            Root::Dropbox
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authorize this tool against an account
    Login(login::LoginArgs),

    /// Display the linked account
    Whoami(whoami::WhoamiArgs),

    /// List a folder
    Ls(ls::LsArgs),

    /// Upload a local file in chunks
    Upload(upload::UploadArgs),

    /// Forget the stored session
    Logout(logout::LogoutArgs),
}
