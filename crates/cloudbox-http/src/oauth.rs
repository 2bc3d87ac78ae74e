//! OAuth1 PLAINTEXT signing and handshake response parsing.
//!
//! The signature is the consumer secret and token secret joined by `&`,
//! each percent-encoded, sent as-is. Confidentiality rests entirely on TLS.
//! The exact header layout is part of the wire contract.

use url::form_urlencoded;

use cloudbox_core::encode::percent_encode;
use cloudbox_core::{Credentials, Error, ErrorRecord, HttpResponse, TokenPair};

/// Build the `Authorization` header value for a request.
///
/// Handshake calls pass `None` for the request token step; every other call
/// passes exactly one token (request or access).
pub fn authorization_header(credentials: &Credentials, token: Option<&TokenPair>) -> String {
    let mut header = format!(
        "OAuth oauth_version=\"1.0\", oauth_signature_method=\"PLAINTEXT\", oauth_consumer_key=\"{}\", ",
        percent_encode(credentials.key())
    );
    let consumer_secret = percent_encode(credentials.secret());

    match token {
        Some(token) => {
            header.push_str(&format!(
                "oauth_token=\"{}\", oauth_signature=\"{}&{}\"",
                percent_encode(token.key()),
                consumer_secret,
                percent_encode(token.secret())
            ));
        }
        None => {
            header.push_str(&format!("oauth_signature=\"{}&\"", consumer_secret));
        }
    }

    header
}

/// Parse a handshake response body (`application/x-www-form-urlencoded`).
///
/// Both `oauth_token` and `oauth_token_secret` must appear exactly once.
pub(crate) fn parse_token_response(response: &HttpResponse, step: &str) -> Result<TokenPair, Error> {
    let mut keys = Vec::new();
    let mut secrets = Vec::new();
    for (name, value) in form_urlencoded::parse(&response.body) {
        match name.as_ref() {
            "oauth_token" => keys.push(value.into_owned()),
            "oauth_token_secret" => secrets.push(value.into_owned()),
            _ => {}
        }
    }

    let malformed = |reason: &str| {
        Error::AuthProtocol(
            ErrorRecord::new(format!("invalid {} response: {}", step, reason))
                .with_response(response.clone()),
        )
    };

    if keys.len() != 1 {
        return Err(malformed("expected exactly one oauth_token"));
    }
    if secrets.len() != 1 {
        return Err(malformed("expected exactly one oauth_token_secret"));
    }

    let (key, secret) = (keys.remove(0), secrets.remove(0));
    TokenPair::new(key, secret).map_err(|e| malformed(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("consumer key", "con&secret")
    }

    fn form(body: &str) -> HttpResponse {
        HttpResponse::new(200, Vec::new(), body.as_bytes().to_vec())
    }

    #[test]
    fn header_without_token_signs_with_consumer_secret_only() {
        assert_eq!(
            authorization_header(&credentials(), None),
            "OAuth oauth_version=\"1.0\", oauth_signature_method=\"PLAINTEXT\", \
             oauth_consumer_key=\"consumer%20key\", oauth_signature=\"con%26secret&\""
        );
    }

    #[test]
    fn header_with_token_appends_token_secret() {
        let token = TokenPair::new("tok/en", "tok secret").unwrap();
        assert_eq!(
            authorization_header(&credentials(), Some(&token)),
            "OAuth oauth_version=\"1.0\", oauth_signature_method=\"PLAINTEXT\", \
             oauth_consumer_key=\"consumer%20key\", oauth_token=\"tok%2Fen\", \
             oauth_signature=\"con%26secret&tok%20secret\""
        );
    }

    #[test]
    fn header_is_deterministic() {
        let token = TokenPair::new("k", "s").unwrap();
        assert_eq!(
            authorization_header(&credentials(), Some(&token)),
            authorization_header(&credentials(), Some(&token))
        );
    }

    #[test]
    fn parses_token_pair() {
        let token = parse_token_response(
            &form("oauth_token_secret=b%2Bc&oauth_token=abc&oauth_callback_confirmed=true"),
            "request token",
        )
        .unwrap();
        assert_eq!(token.key(), "abc");
        assert_eq!(token.secret(), "b+c");
    }

    #[test]
    fn rejects_missing_secret() {
        let err = parse_token_response(&form("oauth_token=abc"), "request token").unwrap_err();
        assert!(matches!(err, Error::AuthProtocol(_)));
    }

    #[test]
    fn rejects_duplicate_token() {
        let err = parse_token_response(
            &form("oauth_token=a&oauth_token=b&oauth_token_secret=s"),
            "access token",
        )
        .unwrap_err();
        assert!(err.to_string().contains("exactly one oauth_token"));
    }

    #[test]
    fn rejects_empty_values() {
        let err = parse_token_response(&form("oauth_token=&oauth_token_secret=s"), "access token")
            .unwrap_err();
        assert!(matches!(err, Error::AuthProtocol(_)));
    }
}
