//! yd-rest: HTTP adapter for the ydisk-rs client
//!
//! This crate provides the implementation of the HttpTransport trait
//! using reqwest. It is the only crate that depends on an HTTP library.

pub mod transport;

pub use transport::ReqwestTransport;
pub use yd_core::{ClientConfig, DiskClient, Error, Result};

/// Client backed by the reqwest transport
pub type RestDiskClient = DiskClient<ReqwestTransport>;

/// Create a client for the default API endpoint
pub fn connect(access_token: impl Into<String>) -> Result<RestDiskClient> {
    connect_with_config(access_token, ClientConfig::default())
}

/// Create a client from an explicit configuration
pub fn connect_with_config(
    access_token: impl Into<String>,
    config: ClientConfig,
) -> Result<RestDiskClient> {
    config.validate()?;
    let transport = ReqwestTransport::new(&config.http)?;
    tracing::debug!(base_url = %config.base_url, "creating disk client");
    Ok(DiskClient::with_config(access_token, transport, config))
}
