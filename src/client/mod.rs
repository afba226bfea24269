//! Remote file API clients
//!
//! The worker pool never talks HTTP directly. It drives an
//! [`UploadTransport`], which performs one upload attempt per call and reports
//! the outcome. [`files_api::FilesApiClient`] is the production transport; tests
//! plug in scripted transports.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::uploader::{UploadJob, UploadOutcome};

pub mod files_api;

pub use files_api::{FilesApiClient, UploadOptions};

/// Per-attempt transport errors. Both are terminal for the job.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The local file could not be opened or stat'ed
    #[error("failed to open {path}: {source}")]
    FileOpen {
        /// File that could not be opened
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The request failed before a response status arrived
    #[error("network error: {0}")]
    Network(String),
}

/// Errors building a client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The underlying HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

/// Result type for a single upload attempt
pub type TransportResult = Result<UploadOutcome, TransportError>;

/// Capability to upload one file to the remote API
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Perform a single upload attempt for `job`
    ///
    /// # Returns
    /// The outcome derived from the response status
    ///
    /// # Errors
    /// [`TransportError::FileOpen`] when the source cannot be read,
    /// [`TransportError::Network`] when no status was received
    async fn upload(&self, job: &UploadJob) -> TransportResult;
}
