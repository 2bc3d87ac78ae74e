//! OAuth1 session: handshake, request signing and persistence.

use std::sync::Arc;
use tracing::{debug, info, instrument};

use cloudbox_core::encode::percent_encode;
use cloudbox_core::error::InvalidInputError;
use cloudbox_core::{
    Credentials, Error, ErrorRecord, HttpRequest, HttpResponse, Method, ServiceConfig, TokenPair,
    Transport,
};

use crate::endpoints::{ACCESS_TOKEN, AUTHORIZE, REQUEST_TOKEN};
use crate::oauth::{authorization_header, parse_token_response};
use crate::response::classify;
use crate::transport::ReqwestTransport;

/// An authentication session with the storage service.
///
/// A session starts unauthenticated, acquires a request token, hands an
/// authorization URL to a human, and once that human has approved the
/// request token exchanges it for an access token. The access token then
/// signs every API call. A session can also be restored directly from a
/// persisted access token, skipping the handshake.
///
/// Sessions hold no global state; independent sessions can coexist freely.
/// Handshake steps take `&mut self` because they cache tokens in place.
///
/// # Example
///
/// ```no_run
/// use cloudbox_core::Credentials;
/// use cloudbox_http::AuthSession;
///
/// # async fn example() -> Result<(), cloudbox_core::Error> {
/// let mut session = AuthSession::with_defaults(Credentials::new("app-key", "app-secret"))?;
/// let url = session.build_authorize_url(None, None).await?;
/// println!("Approve access at {url}, then press enter");
/// // ... wait for the user ...
/// session.exchange_for_access_token().await?;
/// assert!(session.is_authorized());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthSession {
    credentials: Credentials,
    request_token: Option<TokenPair>,
    access_token: Option<TokenPair>,
    locale: Option<String>,
    config: ServiceConfig,
    transport: Arc<dyn Transport>,
}

impl AuthSession {
    /// Create an unauthenticated session.
    pub fn new(
        credentials: Credentials,
        config: ServiceConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            credentials,
            request_token: None,
            access_token: None,
            locale: None,
            config,
            transport,
        }
    }

    /// Create an unauthenticated session against the production hosts.
    pub fn with_defaults(credentials: Credentials) -> Result<Self, Error> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::new(
            credentials,
            ServiceConfig::default(),
            Arc::new(transport),
        ))
    }

    /// Restore a session from a previously persisted access token.
    pub fn from_access_token(
        credentials: Credentials,
        access_token: TokenPair,
        config: ServiceConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let mut session = Self::new(credentials, config, transport);
        session.access_token = Some(access_token);
        session
    }

    /// Set the locale sent with every API request and the authorization page.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn request_token(&self) -> Option<&TokenPair> {
        self.request_token.as_ref()
    }

    pub fn access_token(&self) -> Option<&TokenPair> {
        self.access_token.as_ref()
    }

    pub fn set_request_token(&mut self, token: TokenPair) {
        self.request_token = Some(token);
    }

    pub fn set_access_token(&mut self, token: TokenPair) {
        self.access_token = Some(token);
    }

    /// Forget the access token, e.g. after the server revoked it.
    pub fn clear_access_token(&mut self) {
        self.access_token = None;
    }

    /// True iff an access token is present.
    pub fn is_authorized(&self) -> bool {
        self.access_token.is_some()
    }

    /// Fail with [`Error::NotAuthorized`] unless an access token is present.
    pub fn require_authorized(&self) -> Result<&TokenPair, Error> {
        self.access_token.as_ref().ok_or(Error::NotAuthorized)
    }

    // ========================================================================
    // Handshake
    // ========================================================================

    /// Return the cached request token, fetching one on first use.
    ///
    /// The fetch is a GET signed with the consumer secret alone. On failure
    /// nothing is cached.
    #[instrument(skip(self), fields(consumer = %self.credentials.key()))]
    pub async fn acquire_request_token(&mut self) -> Result<TokenPair, Error> {
        if let Some(ref token) = self.request_token {
            return Ok(token.clone());
        }

        info!("Requesting request token");
        let token = self
            .fetch_token(REQUEST_TOKEN, None, "request token")
            .await?;
        debug!(token = %token.key(), "Request token acquired");

        self.request_token = Some(token.clone());
        Ok(token)
    }

    /// Build the URL a human visits to approve the request token.
    ///
    /// Acquires a request token first if none is cached. `locale` overrides
    /// the session locale for this URL only. No other network call is made.
    #[instrument(skip(self))]
    pub async fn build_authorize_url(
        &mut self,
        callback: Option<&str>,
        locale: Option<&str>,
    ) -> Result<String, Error> {
        let token = self.acquire_request_token().await?;

        let mut url = format!(
            "{}?oauth_token={}",
            self.config.web_url(AUTHORIZE),
            percent_encode(token.key())
        );
        if let Some(callback) = callback {
            url.push_str("&oauth_callback=");
            url.push_str(&percent_encode(callback));
        }
        if let Some(locale) = locale.or(self.locale.as_deref()) {
            url.push_str("&locale=");
            url.push_str(&percent_encode(locale));
        }

        Ok(url)
    }

    /// Exchange the approved request token for an access token.
    ///
    /// Returns the existing access token unchanged if there is one. Fails
    /// with [`Error::AuthProtocol`] when no request token is cached, when the
    /// request token has not been approved, or when the response is malformed.
    #[instrument(skip(self), fields(consumer = %self.credentials.key()))]
    pub async fn exchange_for_access_token(&mut self) -> Result<TokenPair, Error> {
        if let Some(ref token) = self.access_token {
            return Ok(token.clone());
        }

        let request_token = self.request_token.clone().ok_or_else(|| {
            Error::AuthProtocol(ErrorRecord::new(
                "no request token; build an authorize URL first",
            ))
        })?;

        info!("Exchanging request token for access token");
        let token = self
            .fetch_token(ACCESS_TOKEN, Some(&request_token), "access token")
            .await?;
        debug!(token = %token.key(), "Access token acquired");

        self.access_token = Some(token.clone());
        Ok(token)
    }

    async fn fetch_token(
        &self,
        path: &str,
        token: Option<&TokenPair>,
        step: &str,
    ) -> Result<TokenPair, Error> {
        let request = HttpRequest::new(Method::Get, self.config.api_url(path))
            .header("Authorization", self.sign(token));

        let response = self.send(request).await?;
        let response = classify(response).map_err(|err| {
            let mut record = match err.record() {
                Some(record) => record.clone(),
                None => ErrorRecord::new(err.to_string()),
            };
            record.message = format!("{} could not be retrieved: {}", step, record.message);
            Error::AuthProtocol(record)
        })?;

        parse_token_response(&response, step)
    }

    // ========================================================================
    // Signing
    // ========================================================================

    /// Produce the `Authorization` header value for the given token.
    pub fn sign(&self, token: Option<&TokenPair>) -> String {
        authorization_header(&self.credentials, token)
    }

    /// Build a request signed with the access token.
    pub(crate) fn signed_request(&self, method: Method, url: String) -> Result<HttpRequest, Error> {
        let token = self.require_authorized()?;
        Ok(HttpRequest::new(method, url).header("Authorization", self.sign(Some(token))))
    }

    /// Append query parameters (and the session locale) to an endpoint URL.
    pub(crate) fn with_query(&self, base: String, params: &[(&str, String)]) -> String {
        let mut pairs: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect();
        if let Some(ref locale) = self.locale {
            pairs.push(format!("locale={}", percent_encode(locale)));
        }

        if pairs.is_empty() {
            base
        } else {
            format!("{}?{}", base, pairs.join("&"))
        }
    }

    /// Execute a request on the session's transport.
    pub(crate) async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        debug!(method = %request.method, url = %request.url, "Sending request");
        Ok(self.transport.execute(request).await?)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Serialize the session as an ordered list of opaque strings.
    ///
    /// Layout, most specific first:
    /// `[access_secret, access_key,] request_secret, request_key, consumer_secret, consumer_key`.
    ///
    /// The request token is always part of the layout, so serializing a
    /// session that has none performs the request-token round-trip first.
    #[instrument(skip(self))]
    pub async fn serialize(&mut self) -> Result<String, Error> {
        let request_token = self.acquire_request_token().await?;

        let mut fields: Vec<&str> = Vec::with_capacity(6);
        if let Some(ref access) = self.access_token {
            fields.push(access.secret());
            fields.push(access.key());
        }
        fields.push(request_token.secret());
        fields.push(request_token.key());
        fields.push(self.credentials.secret());
        fields.push(self.credentials.key());

        serde_json::to_string(&fields).map_err(|e| {
            InvalidInputError::Session {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Rebuild a session from [`serialize`](Self::serialize) output.
    ///
    /// Fields are consumed from the end of the list; the access token is
    /// restored only when fields remain after the mandatory four.
    pub fn deserialize(
        blob: &str,
        config: ServiceConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::Session {
                reason: reason.to_string(),
            }
            .into()
        };

        let mut fields: Vec<String> =
            serde_json::from_str(blob).map_err(|e| invalid(&e.to_string()))?;
        if fields.len() != 4 && fields.len() != 6 {
            return Err(invalid(&format!(
                "expected 4 or 6 fields, found {}",
                fields.len()
            )));
        }

        let has_access_token = fields.len() == 6;
        let mut pop = || fields.pop().ok_or_else(|| invalid("missing field"));

        let consumer_key = pop()?;
        let consumer_secret = pop()?;
        let request_key = pop()?;
        let request_secret = pop()?;

        let mut session = Self::new(
            Credentials::new(consumer_key, consumer_secret),
            config,
            transport,
        );
        session.request_token = Some(TokenPair::new(request_key, request_secret)?);

        if has_access_token {
            let access_key = pop()?;
            let access_secret = pop()?;
            session.access_token = Some(TokenPair::new(access_key, access_secret)?);
        }

        Ok(session)
    }
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("consumer_key", &self.credentials.key())
            .field("has_request_token", &self.request_token.is_some())
            .field("authorized", &self.is_authorized())
            .field("locale", &self.locale)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
