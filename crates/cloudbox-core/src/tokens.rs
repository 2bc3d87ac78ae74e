//! OAuth1 token pair.

use std::fmt;

use crate::error::{Error, InvalidInputError};

/// An OAuth1 token: a key paired with its secret.
///
/// Used for both request tokens and access tokens. Both halves are opaque;
/// the only validation is that neither is empty.
///
/// # Security
///
/// The secret is never displayed in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    key: String,
    secret: String,
}

impl TokenPair {
    /// Create a token pair, rejecting empty halves.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Result<Self, Error> {
        let key = key.into();
        let secret = secret.into();

        if key.is_empty() {
            return Err(InvalidInputError::Token {
                reason: "token key is empty".to_string(),
            }
            .into());
        }
        if secret.is_empty() {
            return Err(InvalidInputError::Token {
                reason: "token secret is empty".to_string(),
            }
            .into());
        }

        Ok(Self { key, secret })
    }

    /// Returns the token key (sent as `oauth_token`).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the token secret.
    ///
    /// # Security
    ///
    /// Use only when signing requests or serializing a session.
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_hides_secret_in_debug() {
        let token = TokenPair::new("tok", "very-secret").unwrap();
        let debug = format!("{:?}", token);
        assert!(debug.contains("tok"));
        assert!(!debug.contains("very-secret"));
    }

    #[test]
    fn rejects_empty_halves() {
        assert!(TokenPair::new("", "secret").is_err());
        assert!(TokenPair::new("key", "").is_err());
    }
}
