//! Remote path type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::encode::percent_encode_path;
use crate::error::{Error, InvalidInputError};

/// A normalized path inside the remote storage root.
///
/// Normalization collapses repeated slashes, guarantees a leading slash and
/// drops a trailing one (except for the root itself, which is `/`).
///
/// # Example
///
/// ```
/// use cloudbox_core::RemotePath;
///
/// let path = RemotePath::new("Photos//2024/trip one.jpg/").unwrap();
/// assert_eq!(path.as_str(), "/Photos/2024/trip one.jpg");
/// assert_eq!(path.encoded(), "/Photos/2024/trip%20one.jpg");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RemotePath(String);

impl RemotePath {
    /// Create a normalized remote path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path contains a NUL byte or a `.`/`..` segment.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();

        if s.contains('\0') {
            return Err(InvalidInputError::Path {
                value: s.to_string(),
                reason: "contains a NUL byte".to_string(),
            }
            .into());
        }

        let mut normalized = String::with_capacity(s.len() + 1);
        for segment in s.split('/').filter(|seg| !seg.is_empty()) {
            if segment == "." || segment == ".." {
                return Err(InvalidInputError::Path {
                    value: s.to_string(),
                    reason: "relative segments are not allowed".to_string(),
                }
                .into());
            }
            normalized.push('/');
            normalized.push_str(segment);
        }
        if normalized.is_empty() {
            normalized.push('/');
        }

        Ok(Self(normalized))
    }

    /// The root of the storage area.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Returns true if this is the root path.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Returns the normalized, unencoded path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the path percent-encoded for use in a URL, separators kept.
    pub fn encoded(&self) -> String {
        percent_encode_path(&self.0)
    }

    /// Returns the last segment, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.0.rsplit('/').next()
        }
    }

    /// Append a child segment (which may itself contain separators).
    pub fn join(&self, child: &str) -> Result<Self, Error> {
        Self::new(format!("{}/{}", self.0, child))
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RemotePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for RemotePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for RemotePath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RemotePath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RemotePath::new(&s).map_err(serde::de::Error::custom)
    }
}
