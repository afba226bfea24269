//! # Tree Uploader Library
//!
//! Uploads a local file or directory tree to a remote file manager API
//! (HubSpot Files v3 by default), keeping the relative folder structure.
//!
//! ## Features
//!
//! - **Bounded Concurrency**: A fixed worker pool fed through a bounded queue,
//!   so memory stays flat on large trees
//! - **Pacing**: Every worker keeps a minimum interval between attempts
//! - **Rate Limit Retry**: 429 answers put the file back on the queue
//! - **Streaming Uploads**: File contents are streamed from disk, never
//!   buffered whole
//! - **Failure Report**: Files that could not be uploaded are listed at the end
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use tree_uploader::{Credential, FilesApiClient, UploadExecutor, UploaderConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = UploaderConfig::default();
//! let client = FilesApiClient::new(&config, Credential::new("pat-na1-...")?)?;
//!
//! let report = UploadExecutor::new(Arc::new(client), config)
//!     .execute(Path::new("./public"), "/assets")
//!     .await?;
//! println!("{} of {} files uploaded", report.uploaded(), report.total);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`enumerate`] - Source tree walk, exclusion rules and destination paths
//! - [`client`] - Upload transport trait and the Files API client
//! - [`uploader`] - Queue, workers, pacing, progress and orchestration
//! - [`credential`] - Access token loading
//! - [`cli`] - Command-line front end
//! - [`metrics`] - Prometheus metrics

#![warn(missing_docs)]
#![warn(clippy::all)]

/// CLI command implementations
pub mod cli;

/// Remote API clients
pub mod client;

/// Access token loading
pub mod credential;

/// Source tree enumeration
pub mod enumerate;

/// Observability metrics
pub mod metrics;

/// Concurrent upload pipeline
pub mod uploader;

// Re-export commonly used types
pub use client::{FilesApiClient, UploadTransport};
pub use credential::Credential;
pub use uploader::{RunReport, UploadExecutor, UploadJob, UploadOutcome, UploaderConfig};
