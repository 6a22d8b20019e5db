//! Client configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BucketError, Result};

/// Default backend address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001";

/// Files at or above this size are uploaded in several chunks (100 MiB).
pub const DEFAULT_CHUNK_SIZE: u64 = 100 * 1024 * 1024;

/// How long a notification stays visible before it is dismissed.
pub const DEFAULT_NOTIFICATION_TTL_MS: u64 = 5000;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Settings for a [`Session`](crate::Session).
///
/// # Example
/// ```
/// use bucketlib::ClientConfig;
///
/// let config = ClientConfig::new("http://localhost:5001")
///     .with_chunk_size(8 * 1024 * 1024)
///     .with_csrf_token("token-from-page");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend root URL, without trailing slash
    pub base_url: String,
    /// Upload chunk size in bytes
    pub chunk_size: u64,
    /// CSRF token attached to mutating requests
    pub csrf_token: Option<String>,
    /// HTTP proxy URL
    pub proxy: Option<String>,
    /// TCP connect timeout
    pub connect_timeout_secs: u64,
    /// Notification dismiss interval
    pub notification_ttl_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            csrf_token: None,
            proxy: None,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            notification_ttl_ms: DEFAULT_NOTIFICATION_TTL_MS,
        }
    }
}

impl ClientConfig {
    /// Create a config pointing at `base_url` with default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the upload chunk size.
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the CSRF token.
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Route requests through an HTTP proxy.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Recognised keys: `BUCKETLIB_BASE_URL`, `BUCKETLIB_CHUNK_SIZE`,
    /// `BUCKETLIB_CSRF_TOKEN`, `BUCKETLIB_PROXY`.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BUCKETLIB_BASE_URL") {
            self.base_url = url;
        }
        if let Some(size) = lookup("BUCKETLIB_CHUNK_SIZE") {
            self.chunk_size = size.trim().parse().map_err(|_| {
                BucketError::InvalidConfig(format!("BUCKETLIB_CHUNK_SIZE is not a number: {}", size))
            })?;
        }
        if let Some(token) = lookup("BUCKETLIB_CSRF_TOKEN") {
            self.csrf_token = Some(token);
        }
        if let Some(proxy) = lookup("BUCKETLIB_PROXY") {
            self.proxy = Some(proxy);
        }
        Ok(self)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Check the settings for obvious mistakes.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(BucketError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(BucketError::InvalidConfig(format!(
                "base_url must start with http:// or https://: {}",
                self.base_url
            )));
        }
        Ok(())
    }

    /// Backend URL with trailing slashes removed.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub(crate) fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub(crate) fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }
}
