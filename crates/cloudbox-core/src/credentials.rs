//! Consumer credentials type.

use std::fmt;

/// Consumer (application) credentials issued by the storage service.
///
/// Supplied once when a session is created and never mutated afterwards.
///
/// # Security
///
/// The secret is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use cloudbox_core::Credentials;
///
/// let creds = Credentials::new("app-key", "app-secret");
/// assert_eq!(creds.key(), "app-key");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    key: String,
    secret: String,
}

impl Credentials {
    /// Create new consumer credentials.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Returns the consumer key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the consumer secret.
    ///
    /// # Security
    ///
    /// Use this only when building the `Authorization` header or serializing
    /// a session. Never log or display this value.
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
