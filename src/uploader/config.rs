//! Upload configuration constants and runtime settings

use std::time::Duration;

use super::UploadError;

/// Number of concurrent upload workers.
/// Also the capacity of the work queue. Buffered, re-queued and in-flight jobs
/// together never exceed twice this many.
pub const DEFAULT_WORKERS: usize = 5;

/// Minimum time between the starts of two attempts made by the same worker.
/// Five workers at one attempt per second stays under the Files API burst limit.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// Overall timeout for a single upload request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Time allowed to establish the TCP/TLS connection
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Files API v3 base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.hubapi.com/files/v3";

/// Remote folder used when no destination is given
pub const DEFAULT_DESTINATION: &str = "/";

/// Environment variable overriding [`DEFAULT_API_BASE_URL`]
pub const BASE_URL_ENV_VAR: &str = "HS_API_BASE_URL";

/// Runtime settings for an upload run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploaderConfig {
    /// Files API base URL (without the `/files` endpoint)
    pub base_url: String,
    /// Worker count and queue capacity
    pub workers: usize,
    /// Per-worker pacing floor
    pub min_request_interval: Duration,
    /// Per-request network timeout
    pub request_timeout: Duration,
    /// Connection establishment timeout
    pub connect_timeout: Duration,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            workers: DEFAULT_WORKERS,
            min_request_interval: MIN_REQUEST_INTERVAL,
            request_timeout: REQUEST_TIMEOUT,
            connect_timeout: CONNECT_TIMEOUT,
        }
    }
}

impl UploaderConfig {
    /// Defaults, with the base URL taken from `HS_API_BASE_URL` when set
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var(BASE_URL_ENV_VAR) {
            Ok(url) if !url.trim().is_empty() => config.with_base_url(url.trim()),
            _ => config,
        }
    }

    /// Set the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the number of workers (and queue capacity)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the per-worker pacing floor
    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check the settings can drive a run
    pub fn validate(&self) -> Result<(), UploadError> {
        if self.workers == 0 {
            return Err(UploadError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.base_url.is_empty() {
            return Err(UploadError::InvalidConfig(
                "API base URL cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
