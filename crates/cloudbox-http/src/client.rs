//! Authorized client for file operations.

use tracing::{debug, instrument};
use url::form_urlencoded;

use cloudbox_core::{AccountInfo, ByteSource, Error, Metadata, Method, RemotePath, Root};

use crate::endpoints::{
    ACCOUNT_INFO, COMMIT_CHUNKED_UPLOAD, COPY, CREATE_FOLDER, DELETE, FILES, FILES_PUT, METADATA,
    MOVE, MetadataQuery, WriteMode,
};
use crate::response::{classify, parse_json};
use crate::session::AuthSession;
use crate::upload::ChunkedUploader;

/// A client bound to an authorized session and an access root.
///
/// Every call is a single signed request; responses are classified into
/// the crate's error taxonomy and decoded into typed models.
///
/// # Example
///
/// ```no_run
/// use cloudbox_core::{Credentials, RemotePath, Root, TokenPair, ServiceConfig};
/// use cloudbox_http::{AuthSession, Client, ReqwestTransport};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), cloudbox_core::Error> {
/// let session = AuthSession::from_access_token(
///     Credentials::new("app-key", "app-secret"),
///     TokenPair::new("access-key", "access-secret")?,
///     ServiceConfig::default(),
///     Arc::new(ReqwestTransport::new()?),
/// );
/// let client = Client::new(session, Root::Dropbox)?;
/// let listing = client.metadata(&RemotePath::root(), &Default::default()).await?;
/// for entry in listing.contents {
///     println!("{}", entry.path);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    session: AuthSession,
    root: Root,
}

impl Client {
    /// Create a client. Fails with [`Error::NotAuthorized`] unless the
    /// session already holds an access token.
    pub fn new(session: AuthSession, root: Root) -> Result<Self, Error> {
        session.require_authorized()?;
        Ok(Self { session, root })
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn root(&self) -> Root {
        self.root
    }

    /// Start a chunked upload of `source`.
    pub fn chunked_uploader<S: ByteSource>(&self, source: S) -> ChunkedUploader<'_, S> {
        ChunkedUploader::new(self, source)
    }

    /// Fetch the linked account's information.
    #[instrument(skip(self))]
    pub async fn account_info(&self) -> Result<AccountInfo, Error> {
        let url = self
            .session
            .with_query(self.session.config().api_url(ACCOUNT_INFO), &[]);
        let request = self.session.signed_request(Method::Get, url)?;
        parse_json(self.session.send(request).await?)
    }

    /// Look up metadata for a file or folder.
    ///
    /// When `query.hash` matches the folder's current hash the server answers
    /// 304 and this returns [`Error::NotModified`].
    #[instrument(skip(self, query), fields(root = %self.root, %path))]
    pub async fn metadata(&self, path: &RemotePath, query: &MetadataQuery) -> Result<Metadata, Error> {
        debug!("Fetching metadata");
        let base = self
            .session
            .config()
            .api_url(&self.rooted(METADATA, path));
        let url = self.session.with_query(base, &query.params());
        let request = self.session.signed_request(Method::Get, url)?;
        parse_json(self.session.send(request).await?)
    }

    /// Upload a small file in a single request.
    #[instrument(skip(self, contents), fields(root = %self.root, %path, len = contents.len()))]
    pub async fn put_file(
        &self,
        path: &RemotePath,
        contents: Vec<u8>,
        mode: &WriteMode,
    ) -> Result<Metadata, Error> {
        debug!("Uploading file");
        let base = self
            .session
            .config()
            .content_url(&self.rooted(FILES_PUT, path));
        let url = self.session.with_query(base, &mode.params());
        let request = self
            .session
            .signed_request(Method::Put, url)?
            .header("Content-Type", "application/octet-stream")
            .body(contents);
        parse_json(self.session.send(request).await?)
    }

    /// Download a file, optionally at a given revision.
    #[instrument(skip(self), fields(root = %self.root, %path))]
    pub async fn get_file(&self, path: &RemotePath, rev: Option<&str>) -> Result<Vec<u8>, Error> {
        debug!("Downloading file");
        let params: Vec<(&str, String)> = rev.map(|r| ("rev", r.to_string())).into_iter().collect();
        let base = self
            .session
            .config()
            .content_url(&self.rooted(FILES, path));
        let url = self.session.with_query(base, &params);
        let request = self.session.signed_request(Method::Get, url)?;
        let response = classify(self.session.send(request).await?)?;
        Ok(response.body)
    }

    /// Create a folder.
    #[instrument(skip(self), fields(root = %self.root, %path))]
    pub async fn create_folder(&self, path: &RemotePath) -> Result<Metadata, Error> {
        self.file_op(CREATE_FOLDER, &[("path", path.as_str())]).await
    }

    /// Delete a file or folder.
    #[instrument(skip(self), fields(root = %self.root, %path))]
    pub async fn delete(&self, path: &RemotePath) -> Result<Metadata, Error> {
        self.file_op(DELETE, &[("path", path.as_str())]).await
    }

    /// Move a file or folder.
    #[instrument(skip(self), fields(root = %self.root, %from, %to))]
    pub async fn move_entry(&self, from: &RemotePath, to: &RemotePath) -> Result<Metadata, Error> {
        self.file_op(MOVE, &[("from_path", from.as_str()), ("to_path", to.as_str())])
            .await
    }

    /// Copy a file or folder.
    #[instrument(skip(self), fields(root = %self.root, %from, %to))]
    pub async fn copy_entry(&self, from: &RemotePath, to: &RemotePath) -> Result<Metadata, Error> {
        self.file_op(COPY, &[("from_path", from.as_str()), ("to_path", to.as_str())])
            .await
    }

    /// Commit a finished chunked upload to `path`.
    pub(crate) async fn commit_chunked_upload(
        &self,
        path: &RemotePath,
        upload_id: &str,
        mode: &WriteMode,
    ) -> Result<Metadata, Error> {
        let base = self
            .session
            .config()
            .content_url(&self.rooted(COMMIT_CHUNKED_UPLOAD, path));
        let url = self.session.with_query(base, &[]);

        let mut form = form_urlencoded::Serializer::new(String::new());
        for (name, value) in mode.params() {
            form.append_pair(name, &value);
        }
        form.append_pair("upload_id", upload_id);

        let request = self
            .session
            .signed_request(Method::Post, url)?
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(form.finish().into_bytes());
        parse_json(self.session.send(request).await?)
    }

    async fn file_op(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Metadata, Error> {
        debug!(endpoint, "File operation");
        let url = self
            .session
            .with_query(self.session.config().api_url(endpoint), &[]);

        let mut form = form_urlencoded::Serializer::new(String::new());
        form.append_pair("root", self.root.as_str());
        for (name, value) in params {
            form.append_pair(name, value);
        }

        let request = self
            .session
            .signed_request(Method::Post, url)?
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(form.finish().into_bytes());
        parse_json(self.session.send(request).await?)
    }

    /// `<endpoint>/<root><encoded path>`
    fn rooted(&self, endpoint: &str, path: &RemotePath) -> String {
        format!("{}/{}{}", endpoint, self.root.as_str(), path.encoded())
    }
}
