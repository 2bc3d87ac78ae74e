//! Service endpoint configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::HostUrl;

const DEFAULT_API_HOST: &str = "https://api.dropbox.com";
const DEFAULT_CONTENT_HOST: &str = "https://api-content.dropbox.com";
const DEFAULT_WEB_HOST: &str = "https://www.dropbox.com";
const DEFAULT_API_VERSION: &str = "1";

/// Hosts and API version a session talks to.
///
/// - `api` serves the handshake and metadata calls
/// - `content` serves file bodies and chunked uploads
/// - `web` serves the human-facing authorization page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub api: HostUrl,
    pub content: HostUrl,
    pub web: HostUrl,
    pub api_version: String,
}

impl ServiceConfig {
    /// Build a configuration with every host pointing at the same base URL.
    ///
    /// Mostly useful against a local mock server.
    pub fn single_host(host: HostUrl) -> Self {
        Self {
            api: host.clone(),
            content: host.clone(),
            web: host,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// URL of an endpoint on the API host.
    pub fn api_url(&self, path: &str) -> String {
        self.versioned(&self.api, path)
    }

    /// URL of an endpoint on the content host.
    pub fn content_url(&self, path: &str) -> String {
        self.versioned(&self.content, path)
    }

    /// URL of a page on the web host.
    pub fn web_url(&self, path: &str) -> String {
        self.versioned(&self.web, path)
    }

    /// `path` must start with `/` and already be percent-encoded.
    fn versioned(&self, host: &HostUrl, path: &str) -> String {
        format!("{}/{}{}", host.base(), self.api_version, path)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        // The defaults are compile-time constants known to be valid.
        let parse = |s: &str| HostUrl::new(s).unwrap_or_else(|_| unreachable!("invalid default host {s}"));
        Self {
            api: parse(DEFAULT_API_HOST),
            content: parse(DEFAULT_CONTENT_HOST),
            web: parse(DEFAULT_WEB_HOST),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

/// Access root a client operates under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Root {
    /// Full access to the user's storage.
    #[default]
    Dropbox,
    /// Access restricted to the application's own folder.
    AppFolder,
}

impl Root {
    /// The path segment used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Root::Dropbox => "dropbox",
            Root::AppFolder => "sandbox",
        }
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
