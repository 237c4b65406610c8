//! Disk API client
//!
//! Holds the access token and configuration and implements every API
//! operation on top of an [`HttpTransport`].

use std::path::Path;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::operation::{Clock, OperationHandler, OperationStatus, PollState, SystemClock, elapsed};
use crate::path::file_destination;
use crate::response::{Payload, check_response};
use crate::transport::{HttpRequest, HttpTransport, Method};
use crate::types::{Link, ResourceInfo, from_payload};

/// Client for the disk REST API
///
/// The Authorization header is derived from the token once, at
/// construction. The client is immutable afterwards.
pub struct DiskClient<T> {
    transport: T,
    access_token: String,
    authorization: String,
    config: ClientConfig,
    clock: Arc<dyn Clock>,
}

impl<T: HttpTransport> DiskClient<T> {
    /// Create a client for the default API endpoint
    pub fn new(access_token: impl Into<String>, transport: T) -> Self {
        Self::with_config(access_token, transport, ClientConfig::default())
    }

    pub fn with_config(access_token: impl Into<String>, transport: T, config: ClientConfig) -> Self {
        let access_token = access_token.into();
        let authorization = format!("OAuth {access_token}");
        Self {
            transport,
            access_token,
            authorization,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for polling decisions
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Value sent in the `Authorization` header
    pub fn authorization_header(&self) -> &str {
        &self.authorization
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Send an authorized request and check the response
    pub(crate) async fn execute(&self, request: HttpRequest) -> Result<Payload> {
        self.send_checked(request.header("Authorization", &self.authorization))
            .await
    }

    async fn send_checked(&self, request: HttpRequest) -> Result<Payload> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.send(request).await?;
        tracing::debug!(status = response.status, "received response");
        check_response(&response, &self.access_token)
    }

    fn resources_request(&self, method: Method, path: &str) -> HttpRequest {
        HttpRequest::new(method, self.config.endpoint("/resources")).query("path", path)
    }

    /// Check whether a file or directory exists at `path`
    ///
    /// Only `PathNotFound` means "does not exist"; every other error is
    /// returned unchanged.
    pub async fn path_exists(&self, path: &str) -> Result<bool> {
        let request = self.resources_request(Method::Get, path).query("limit", "0");
        match self.execute(request).await {
            Ok(_) => Ok(true),
            Err(Error::PathNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Fetch metadata of a file or directory
    pub async fn metadata(&self, path: &str) -> Result<ResourceInfo> {
        let request = self.resources_request(Method::Get, path).query("limit", "0");
        let payload = self
            .execute(request)
            .await
            .map_err(|e| e.with_path(path))?;
        from_payload(payload)
    }

    /// Create a directory
    ///
    /// Fails with `Generic` (HTTP 409) if the path already exists.
    pub async fn create_dir(&self, path: &str) -> Result<()> {
        self.execute(self.resources_request(Method::Put, path))
            .await
            .map_err(|e| e.with_path(path))?;
        Ok(())
    }

    /// Delete a file or directory
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(self.resources_request(Method::Delete, path))
            .await
            .map_err(|e| e.with_path(path))?;
        Ok(())
    }

    /// Upload bytes to `path`, overwriting any existing file
    ///
    /// Requests an upload link first; nothing is sent if that fails. A
    /// failure while sending the bytes leaves the destination undefined.
    pub async fn upload(&self, path: &str, data: impl Into<Vec<u8>>) -> Result<()> {
        let link = self.upload_link(path).await?;
        let data = data.into();
        tracing::debug!(path, bytes = data.len(), "uploading data");

        // The upload target is pre-authorized and takes no token.
        self.send_checked(HttpRequest::new(Method::Put, link.href).body(data))
            .await
            .map_err(|e| e.with_path(path))?;
        Ok(())
    }

    /// Upload a local file into `folder` under its own file name
    ///
    /// Returns the disk path the file was written to.
    pub async fn upload_file(&self, local_path: impl AsRef<Path>, folder: &str) -> Result<String> {
        let local_path = local_path.as_ref();
        let is_file = tokio::fs::metadata(local_path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(Error::InvalidPath(local_path.display().to_string()));
        }

        let destination = file_destination(folder, local_path)?;
        let data = tokio::fs::read(local_path).await?;
        self.upload(&destination, data).await?;
        Ok(destination)
    }

    async fn upload_link(&self, path: &str) -> Result<Link> {
        let request = HttpRequest::new(Method::Get, self.config.endpoint("/resources/upload"))
            .query("path", path)
            .query("overwrite", "true");
        let payload = self
            .execute(request)
            .await
            .map_err(|e| e.with_path(path))?;
        from_payload(payload)
    }

    /// Ask the server to download `source_url` into `path`
    ///
    /// Returns the handle of the server-side operation without waiting for
    /// it, so the caller decides how and whether to poll.
    pub async fn start_upload_from_url(
        &self,
        source_url: &str,
        path: &str,
    ) -> Result<OperationHandler<'_, T>> {
        url::Url::parse(source_url)?;

        let request = HttpRequest::new(Method::Post, self.config.endpoint("/resources/upload"))
            .query("url", source_url)
            .query("path", path)
            .timeout(self.config.http.remote_upload_timeout());
        let payload = self
            .execute(request)
            .await
            .map_err(|e| e.with_path(path))?;
        let link: Link = from_payload(payload)?;

        tracing::debug!(source_url, path, status_url = %link.href, "remote upload started");
        Ok(OperationHandler::new(self, "upload", link))
    }

    /// Download `source_url` into `path` on the server and wait for it
    pub async fn upload_from_url(&self, source_url: &str, path: &str) -> Result<()> {
        let mut operation = self.start_upload_from_url(source_url, path).await?;
        self.wait_for_operation(&mut operation).await
    }

    /// Poll an operation until it succeeds
    ///
    /// Returns `OperationFailed` when the server reports `failed` and
    /// `PollTimeout` once the configured check count or timeout is reached.
    pub async fn wait_for_operation(&self, operation: &mut OperationHandler<'_, T>) -> Result<()> {
        let poll = &self.config.poll;
        let mut state = PollState::new();
        let started = self.clock.now();

        loop {
            match operation.check_status(&mut state).await? {
                OperationStatus::Success => return Ok(()),
                OperationStatus::Failed => {
                    tracing::warn!(operation = operation.name(), "operation failed");
                    return Err(Error::OperationFailed {
                        name: operation.name().to_string(),
                    });
                }
                _ => {}
            }

            let exhausted = poll
                .max_checks
                .is_some_and(|max| state.check_count() >= max);
            let expired = poll
                .timeout()
                .is_some_and(|timeout| elapsed(started, self.clock.now()) >= timeout);
            if exhausted || expired {
                let waited = elapsed(started, self.clock.now());
                tracing::warn!(
                    operation = operation.name(),
                    checks = state.check_count(),
                    waited_secs = waited.as_secs(),
                    "gave up waiting for operation"
                );
                return Err(Error::PollTimeout {
                    name: operation.name().to_string(),
                    checks: state.check_count(),
                    elapsed: waited,
                });
            }

            tokio::time::sleep(poll.interval()).await;
        }
    }
}
