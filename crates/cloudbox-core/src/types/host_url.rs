//! Base URL of a service host.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::{Host, Url};

use crate::error::{Error, InvalidInputError};

/// Scheme, host and optional path prefix of one service host.
///
/// ```
/// use cloudbox_core::HostUrl;
///
/// let host = HostUrl::new("https://api.dropbox.com/").unwrap();
/// assert_eq!(host.base(), "https://api.dropbox.com");
/// assert!(HostUrl::new("http://api.dropbox.com").is_err());
/// assert!(HostUrl::new("http://localhost:8080").is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HostUrl {
    url: Url,
}

impl HostUrl {
    /// Parse a host URL. Plain `http` is only accepted for loopback hosts.
    pub fn new(value: impl AsRef<str>) -> Result<Self, Error> {
        let value = value.as_ref();
        let invalid = |reason: String| InvalidInputError::Host {
            value: value.to_string(),
            reason,
        };

        let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
        let host = url.host().ok_or_else(|| invalid("no host".into()))?;

        match url.scheme() {
            "https" => {}
            "http" if is_loopback(&host) => {}
            "http" => return Err(invalid("http is only allowed for loopback hosts".into()).into()),
            other => return Err(invalid(format!("unsupported scheme '{other}'")).into()),
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed".into()).into());
        }

        Ok(Self { url })
    }

    /// The URL without a trailing slash, ready to have a path appended.
    pub fn base(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }
}

fn is_loopback(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(name) => name.eq_ignore_ascii_case("localhost"),
        Host::Ipv4(ip) => ip.is_loopback(),
        Host::Ipv6(ip) => ip.is_loopback(),
    }
}

impl fmt::Display for HostUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base())
    }
}

impl FromStr for HostUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for HostUrl {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HostUrl> for String {
    fn from(host: HostUrl) -> Self {
        host.base().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_drops_trailing_slash() {
        let host = HostUrl::new("https://api.dropbox.com/").unwrap();
        assert_eq!(host.base(), "https://api.dropbox.com");
        assert_eq!(host.host(), Some("api.dropbox.com"));

        let prefixed = HostUrl::new("https://proxy.test/dropbox/").unwrap();
        assert_eq!(prefixed.base(), "https://proxy.test/dropbox");
    }

    #[test]
    fn http_only_for_loopback() {
        assert!(HostUrl::new("http://127.0.0.1:8080").is_ok());
        assert!(HostUrl::new("http://[::1]:8080").is_ok());
        assert!(HostUrl::new("http://LOCALHOST").is_ok());
        assert!(HostUrl::new("http://api.dropbox.com").is_err());
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(HostUrl::new("/1/account/info").is_err());
        assert!(HostUrl::new("ftp://api.dropbox.com").is_err());
        assert!(HostUrl::new("https://api.dropbox.com/?x=1").is_err());
        assert!(HostUrl::new("mailto:someone@example.test").is_err());
    }

    #[test]
    fn serde_uses_the_base_string() {
        let host = HostUrl::new("https://www.dropbox.com/").unwrap();
        let json = serde_json::to_string(&host).unwrap();
        assert_eq!(json, "\"https://www.dropbox.com\"");
        assert_eq!(serde_json::from_str::<HostUrl>(&json).unwrap(), host);
        assert!(serde_json::from_str::<HostUrl>("\"http://evil.test\"").is_err());
    }
}
