//! Configuration management
//!
//! Client settings live in a TOML file at ~/.config/ydisk/config.toml.
//! The access token is never part of this file; callers supply it directly.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Base URL of the disk REST API
pub const DEFAULT_API_URL: &str = "https://cloud-api.yandex.net:443/v1/disk";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// API base URL, without a trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Operation polling settings
    #[serde(default)]
    pub poll: PollConfig,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,
}

/// Settings for waiting on asynchronous operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Sleep between client-level polls in milliseconds
    #[serde(default = "default_poll_interval")]
    pub interval_ms: u64,

    /// Minimum time between two real status requests in milliseconds
    #[serde(default = "default_min_check_interval")]
    pub min_check_interval_ms: u64,

    /// Give up after this many status requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_checks: Option<u32>,

    /// Give up after this many seconds; 0 waits indefinitely
    #[serde(default = "default_poll_timeout")]
    pub timeout_secs: u64,
}

/// Settings for the HTTP transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Whole-request timeout in milliseconds; none means unlimited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_timeout_ms: Option<u64>,

    /// Timeout for the request that starts a remote upload
    #[serde(default = "default_remote_upload_timeout")]
    pub remote_upload_timeout_ms: u64,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_min_check_interval() -> u64 {
    3000
}

fn default_poll_timeout() -> u64 {
    600
}

fn default_connect_timeout() -> u64 {
    10_000
}

fn default_remote_upload_timeout() -> u64 {
    5000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            base_url: default_base_url(),
            poll: PollConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval(),
            min_check_interval_ms: default_min_check_interval(),
            max_checks: None,
            timeout_secs: default_poll_timeout(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout(),
            read_timeout_ms: None,
            remote_upload_timeout_ms: default_remote_upload_timeout(),
        }
    }
}

impl ClientConfig {
    /// Default configuration pointing at another API root
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Full URL of an API endpoint, e.g. `endpoint("/resources")`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Reject values the client cannot work with
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)?;
        if self.poll.max_checks == Some(0) {
            return Err(Error::Config("poll.max_checks must be at least 1".into()));
        }
        Ok(())
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn min_check_interval(&self) -> Duration {
        Duration::from_millis(self.min_check_interval_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }

    pub fn remote_upload_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_upload_timeout_ms)
    }
}

/// Configuration manager handles loading and saving config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        let config_path = config_dir.join("ydisk").join("config.toml");
        Ok(Self { config_path })
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// A missing file yields the default configuration.
    pub fn load(&self) -> Result<ClientConfig> {
        if !self.config_path.exists() {
            return Ok(ClientConfig::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: ClientConfig = toml::from_str(&content)?;

        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}",
                config.schema_version, SCHEMA_VERSION
            )));
        }
        config.schema_version = SCHEMA_VERSION;
        config.validate()?;

        tracing::debug!(path = %self.config_path.display(), "loaded client configuration");
        Ok(config)
    }

    /// Save configuration to disk
    ///
    /// Creates parent directories and sets 0600 permissions on Unix.
    pub fn save(&self, config: &ClientConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.config_path, permissions)?;
        }

        Ok(())
    }
}
