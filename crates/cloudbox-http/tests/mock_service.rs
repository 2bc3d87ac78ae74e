//! Mock service tests for cloudbox-http.
//!
//! These tests run the real reqwest transport against a wiremock server
//! standing in for the API, content and web hosts.

use std::sync::Arc;

use cloudbox_core::error::UploadError;
use cloudbox_core::{
    Credentials, Error, HostUrl, MemorySource, RemotePath, Root, ServiceConfig, TokenPair,
};
use cloudbox_http::{
    AuthSession, Client, MAX_SAME_OFFSET_RESENDS, MetadataQuery, ReqwestTransport, WriteMode,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_config(server: &MockServer) -> ServiceConfig {
    let host = HostUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap();
    ServiceConfig::single_host(host)
}

fn transport() -> Arc<ReqwestTransport> {
    Arc::new(ReqwestTransport::new().unwrap())
}

fn authorized_client(server: &MockServer) -> Client {
    let session = AuthSession::from_access_token(
        Credentials::new("ckey", "csecret"),
        TokenPair::new("ak", "as").unwrap(),
        mock_config(server),
        transport(),
    );
    Client::new(session, Root::Dropbox).unwrap()
}

fn data(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

// ============================================================================
// Handshake Tests
// ============================================================================

#[tokio::test]
async fn test_full_handshake() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/oauth/request_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("oauth_token_secret=rs&oauth_token=rk"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/1/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("oauth_token=ak&oauth_token_secret=as"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = AuthSession::new(
        Credentials::new("ckey", "csecret"),
        mock_config(&server),
        transport(),
    );

    let url = session
        .build_authorize_url(Some("https://app.test/done"), Some("fr"))
        .await
        .unwrap();
    assert_eq!(
        url,
        format!(
            "http://127.0.0.1:{}/1/oauth/authorize?oauth_token=rk\
             &oauth_callback=https%3A%2F%2Fapp.test%2Fdone&locale=fr",
            server.address().port()
        )
    );
    assert!(!session.is_authorized());

    let access = session.exchange_for_access_token().await.unwrap();
    assert_eq!(access.key(), "ak");
    assert!(session.is_authorized());

    // Cached; no further network traffic.
    session.exchange_for_access_token().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let authorization = |i: usize| {
        requests[i]
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .unwrap()
    };
    assert_eq!(
        authorization(0),
        "OAuth oauth_version=\"1.0\", oauth_signature_method=\"PLAINTEXT\", \
         oauth_consumer_key=\"ckey\", oauth_signature=\"csecret&\""
    );
    assert_eq!(
        authorization(1),
        "OAuth oauth_version=\"1.0\", oauth_signature_method=\"PLAINTEXT\", \
         oauth_consumer_key=\"ckey\", oauth_token=\"rk\", oauth_signature=\"csecret&rs\""
    );
}

#[tokio::test]
async fn test_handshake_missing_secret() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/oauth/request_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("oauth_token=rk"))
        .mount(&server)
        .await;

    let mut session = AuthSession::new(
        Credentials::new("ckey", "csecret"),
        mock_config(&server),
        transport(),
    );

    let err = session.acquire_request_token().await.unwrap_err();
    assert!(matches!(err, Error::AuthProtocol(_)));
    assert!(session.request_token().is_none());
}

#[tokio::test]
async fn test_handshake_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/oauth/request_token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Unauthorized"
        })))
        .mount(&server)
        .await;

    let mut session = AuthSession::new(
        Credentials::new("ckey", "wrong"),
        mock_config(&server),
        transport(),
    );

    let err = session.acquire_request_token().await.unwrap_err();
    assert!(matches!(err, Error::AuthProtocol(_)));
    assert_eq!(err.status(), Some(401));
}

// ============================================================================
// Classification Tests
// ============================================================================

#[tokio::test]
async fn test_account_info() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/account/info"))
        .and(query_param("locale", "de"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uid": 12345678,
            "display_name": "Alice",
            "country": "DE",
            "referral_link": "https://db.tt/abc",
            "quota_info": {"quota": 1000, "normal": 300, "shared": 200}
        })))
        .mount(&server)
        .await;

    let session = AuthSession::from_access_token(
        Credentials::new("ckey", "csecret"),
        TokenPair::new("ak", "as").unwrap(),
        mock_config(&server),
        transport(),
    )
    .with_locale("de");
    let client = Client::new(session, Root::Dropbox).unwrap();

    let info = client.account_info().await.unwrap();
    assert_eq!(info.display_name, "Alice");
    assert_eq!(info.quota_info.remaining(), 500);
}

#[tokio::test]
async fn test_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/account/info"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .mount(&server)
        .await;

    let err = authorized_client(&server).account_info().await.unwrap_err();
    assert!(matches!(err, Error::Server(_)));
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_expired_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/account/info"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Access token expired"
        })))
        .mount(&server)
        .await;

    let err = authorized_client(&server).account_info().await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
}

#[tokio::test]
async fn test_metadata_not_modified() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1/metadata/dropbox/Photos"))
        .and(query_param("hash", "h1"))
        .respond_with(ResponseTemplate::new(304))
        .mount(&server)
        .await;

    let query = MetadataQuery {
        hash: Some("h1".into()),
        ..Default::default()
    };
    let err = authorized_client(&server)
        .metadata(&RemotePath::new("/Photos").unwrap(), &query)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotModified(_)));
}

#[tokio::test]
async fn test_put_file_not_found_carries_user_message() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/1/files_put/dropbox/missing/a.txt"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "Path not found",
            "user_error": "Dossier introuvable"
        })))
        .mount(&server)
        .await;

    let err = authorized_client(&server)
        .put_file(
            &RemotePath::new("/missing/a.txt").unwrap(),
            b"hi".to_vec(),
            &WriteMode::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Application(_)));
    assert_eq!(err.to_string(), "HTTP 404: Path not found");
    assert_eq!(err.user_message(), Some("Dossier introuvable"));
}

// ============================================================================
// Chunked Upload Tests
// ============================================================================

#[tokio::test]
async fn test_chunked_upload_and_commit() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/1/chunked_upload"))
        .and(query_param_is_missing("upload_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "upload_id": "U", "offset": 1000, "expires": "Tue, 19 Jul 2011 21:55:38 +0000"
        })))
        .expect(1)
        .mount(&server)
        .await;

    for (offset, next) in [(1000, 2000), (2000, 2500)] {
        Mock::given(method("PUT"))
            .and(path("/1/chunked_upload"))
            .and(query_param("upload_id", "U"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "upload_id": "U", "offset": next
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    Mock::given(method("POST"))
        .and(path("/1/commit_chunked_upload/dropbox/big.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "path": "/big.bin", "size": "2.4 KB", "bytes": 2500, "rev": "7"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = authorized_client(&server);
    let mut uploader = client.chunked_uploader(MemorySource::new(data(2500)));
    uploader.upload(1000).await.unwrap();
    assert!(uploader.is_complete());

    let metadata = uploader
        .finish(&RemotePath::new("/big.bin").unwrap(), &WriteMode::overwrite())
        .await
        .unwrap();
    assert_eq!(metadata.bytes, 2500);

    let requests = server.received_requests().await.unwrap();
    let commit = requests.last().unwrap();
    assert_eq!(
        String::from_utf8_lossy(&commit.body),
        "overwrite=true&upload_id=U"
    );
}

#[tokio::test]
async fn test_chunked_upload_resyncs_to_server_offset() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/1/chunked_upload"))
        .and(query_param_is_missing("upload_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "upload_id": "U", "offset": 1000
        })))
        .mount(&server)
        .await;

    // Another writer already pushed the second window.
    Mock::given(method("PUT"))
        .and(path("/1/chunked_upload"))
        .and(query_param("offset", "1000"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Submitted input out of alignment: got [1000] expected [2000]",
            "upload_id": "U",
            "offset": 2000
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/1/chunked_upload"))
        .and(query_param("offset", "2000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "upload_id": "U", "offset": 3000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = data(3000);
    let client = authorized_client(&server);
    let mut uploader = client.chunked_uploader(MemorySource::new(source.clone()));
    uploader.upload(1000).await.unwrap();
    assert_eq!(uploader.offset(), 3000);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[2].body, &source[2000..]);
}

#[tokio::test]
async fn test_chunked_upload_resends_at_same_offset() {
    let server = MockServer::start().await;

    // The first send is dropped on the floor.
    Mock::given(method("PUT"))
        .and(path("/1/chunked_upload"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Submitted input out of alignment",
            "upload_id": "U",
            "offset": 0
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/1/chunked_upload"))
        .and(query_param("upload_id", "U"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "upload_id": "U", "offset": 10
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = data(10);
    let client = authorized_client(&server);
    let mut uploader = client.chunked_uploader(MemorySource::new(source.clone()));
    uploader.upload(10).await.unwrap();
    assert!(uploader.is_complete());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body, source);
    assert_eq!(requests[1].body, source);
}

#[tokio::test]
async fn test_chunked_upload_gives_up_when_offset_never_moves() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/1/chunked_upload"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Submitted input out of alignment",
            "upload_id": "U",
            "offset": 0
        })))
        .expect(u64::from(MAX_SAME_OFFSET_RESENDS) + 1)
        .mount(&server)
        .await;

    let client = authorized_client(&server);
    let mut uploader = client.chunked_uploader(MemorySource::new(data(10)));
    let err = uploader.upload(10).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Upload(UploadError::Stalled { offset: 0, attempts: 4 })
    ));
    assert_eq!(uploader.offset(), 0);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let server = MockServer::start().await;
    let config = mock_config(&server);
    drop(server);

    let session = AuthSession::from_access_token(
        Credentials::new("ckey", "csecret"),
        TokenPair::new("ak", "as").unwrap(),
        config,
        transport(),
    );
    let client = Client::new(session, Root::Dropbox).unwrap();

    let err = client.account_info().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}
