//! reqwest transport
//!
//! Implements the HttpTransport trait from yd-core over a pooled
//! `reqwest::Client`.

use async_trait::async_trait;
use reqwest::{Client, Method as HttpMethod};

use yd_core::{Error, HttpConfig, HttpRequest, HttpResponse, HttpTransport, Method, Result};

/// HTTP transport backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    /// Create a transport with the given timeouts
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout())
            .user_agent(concat!("ydisk-rs/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = config.read_timeout() {
            builder = builder.timeout(timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { http_client })
    }

    /// Wrap an existing reqwest client
    pub fn from_client(http_client: Client) -> Self {
        Self { http_client }
    }

    fn method(method: Method) -> HttpMethod {
        match method {
            Method::Get => HttpMethod::GET,
            Method::Put => HttpMethod::PUT,
            Method::Post => HttpMethod::POST,
            Method::Delete => HttpMethod::DELETE,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut request_builder = self
            .http_client
            .request(Self::method(request.method), &request.url);

        if !request.query.is_empty() {
            request_builder = request_builder.query(&request.query);
        }

        for (name, value) in &request.headers {
            request_builder = request_builder.header(name.as_str(), value.as_str());
        }

        if let Some(timeout) = request.timeout {
            request_builder = request_builder.timeout(timeout);
        }

        if let Some(body) = request.body {
            request_builder = request_builder.body(body);
        }

        let response = request_builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request failed: {e}")))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response: {e}")))?;

        Ok(HttpResponse { status, body })
    }
}
