//! yd-core: Core library for the ydisk-rs REST client
//!
//! This crate provides the core functionality of the client, including:
//! - The `DiskClient` with existence, create, delete, upload and remote upload operations
//! - Response checking that maps HTTP statuses to typed errors
//! - Polling of asynchronous server-side operations
//! - Configuration management
//! - The `HttpTransport` trait the network layer plugs into
//!
//! This crate does not depend on any HTTP library; see `yd-rest` for the
//! reqwest-based transport.

pub mod client;
pub mod config;
pub mod error;
pub mod operation;
pub mod path;
pub mod response;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::DiskClient;
pub use config::{ClientConfig, ConfigManager, HttpConfig, PollConfig};
pub use error::{Error, Result};
pub use operation::{Clock, OperationHandler, OperationStatus, PollState, SystemClock};
pub use path::{file_destination, normalize_folder};
pub use response::{Payload, check_response};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method};
pub use types::{Link, OperationInfo, ResourceInfo, ResourceType};
