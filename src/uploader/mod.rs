//! Concurrent upload pipeline
//!
//! # Overview
//!
//! 1. **Jobs**: [`job::UploadJob`] pairs a local file with a remote folder
//! 2. **Queue**: [`queue::WorkQueue`] buffers at most `workers` jobs and counts
//!    outstanding entries so the run can wait for drain
//! 3. **Workers**: [`worker::Worker`] uploads, paces with [`pacer::Pacer`] and
//!    re-queues rate-limited jobs
//! 4. **Progress**: [`progress::ProgressReporter`] counts terminal outcomes and
//!    collects failures
//! 5. **Orchestration**: [`executor::UploadExecutor`] wires it together
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use tree_uploader::client::FilesApiClient;
//! use tree_uploader::credential::Credential;
//! use tree_uploader::uploader::{UploadExecutor, UploaderConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = UploaderConfig::default();
//! let client = FilesApiClient::new(&config, Credential::from_env()?)?;
//! let executor = UploadExecutor::new(Arc::new(client), config);
//!
//! let report = executor.execute(Path::new("./site"), "/assets").await?;
//! if let Some(summary) = report.summary() {
//!     println!("{summary}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Failure semantics
//!
//! - 200/201: counted as completed
//! - 429: re-queued as a new entry, retried without limit or backoff
//! - any other status, a file that cannot be opened, or a request that gets
//!   no response: counted as completed and recorded as a failure

pub mod config;
pub mod executor;
pub mod job;
pub mod pacer;
pub mod progress;
pub mod queue;
pub mod worker;

pub use config::UploaderConfig;
pub use executor::UploadExecutor;
pub use job::{UploadJob, UploadOutcome};
pub use progress::{FailedUpload, FailureReason, ProgressReporter, RunReport};
pub use queue::{QueueError, WorkQueue};

use crate::client::ClientError;
use crate::enumerate::EnumerateError;

/// Upload run errors. Per-file failures are not errors; they land in the report.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Source could not be enumerated
    #[error("enumeration error: {0}")]
    Enumerate(#[from] EnumerateError),

    /// Work queue failure
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// HTTP client could not be created
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
