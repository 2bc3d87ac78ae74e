//! In-process transport that replays canned responses.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cloudbox_core::error::TransportError;
use cloudbox_core::{Credentials, HttpRequest, HttpResponse, ServiceConfig, TokenPair, Transport};

use crate::session::AuthSession;

#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_ok(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_err(&self, err: TransportError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> HttpRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted response for {}", url))
    }
}

pub(crate) fn form_response(body: &str) -> HttpResponse {
    HttpResponse::new(
        200,
        vec![("content-type".into(), "text/plain".into())],
        body.as_bytes().to_vec(),
    )
}

pub(crate) fn json_response(status: u16, body: serde_json::Value) -> HttpResponse {
    HttpResponse::new(
        status,
        vec![("content-type".into(), "application/json".into())],
        body.to_string().into_bytes(),
    )
}

/// An authorized session over `transport` with keys `ckey`/`ak`.
pub(crate) fn test_session(transport: Arc<ScriptedTransport>) -> AuthSession {
    AuthSession::from_access_token(
        Credentials::new("ckey", "csecret"),
        TokenPair::new("ak", "as").unwrap(),
        ServiceConfig::default(),
        transport,
    )
}
