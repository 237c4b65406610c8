//! Error types for yd-core
//!
//! The first three variants are the API taxonomy: every HTTP response the
//! client does not accept is mapped to exactly one of them. The remaining
//! variants cover transport, parsing, configuration and polling failures.

use thiserror::Error;

/// Result type alias for yd-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for yd-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// The server rejected the access token (HTTP 401)
    #[error("Unauthorized: the access token was rejected")]
    Unauthorized {
        /// The token that was sent
        token: String,
    },

    /// The requested resource does not exist (HTTP 404)
    #[error("Path not found: {path}")]
    PathNotFound {
        /// Disk path, empty when the caller had no path context
        path: String,
    },

    /// Any other non-success HTTP status
    #[error("API error (HTTP {status}): {code}: {message}")]
    Generic {
        status: u16,
        /// Server error code from the `error` field
        code: String,
        /// Server description from the `message` field
        message: String,
    },

    /// An asynchronous operation reached the `failed` state
    #[error("Operation '{name}' failed")]
    OperationFailed { name: String },

    /// An asynchronous operation did not finish within the polling bounds
    #[error(
        "Operation '{name}' did not finish: gave up after {}s and {checks} status checks",
        elapsed.as_secs()
    )]
    PollTimeout {
        name: String,
        checks: u32,
        /// Time spent waiting before giving up
        elapsed: std::time::Duration,
    },

    /// Transport failure: DNS, connect, timeout, broken body
    #[error("Network error: {0}")]
    Network(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid local or remote path
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl Error {
    /// Fill in the path of a `PathNotFound` error; other variants pass through.
    pub fn with_path(self, path: impl Into<String>) -> Self {
        match self {
            Error::PathNotFound { .. } => Error::PathNotFound { path: path.into() },
            other => other,
        }
    }

    /// HTTP status code behind this error, if it came from an API response
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Error::Unauthorized { .. } => Some(401),
            Error::PathNotFound { .. } => Some(404),
            Error::Generic { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Error::PathNotFound { .. })
    }
}
