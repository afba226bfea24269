//! Upload job and per-attempt outcome types

use std::fmt;
use std::path::{Path, PathBuf};

/// One file-to-destination upload unit.
///
/// Jobs are immutable once created; a rate-limited job is re-enqueued as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UploadJob {
    source_path: PathBuf,
    destination_dir: String,
}

impl UploadJob {
    /// Create a job uploading `source_path` into the remote folder `destination_dir`
    pub fn new(source_path: impl Into<PathBuf>, destination_dir: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            destination_dir: destination_dir.into(),
        }
    }

    /// Absolute path of the local file
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Remote folder the file lands in
    pub fn destination_dir(&self) -> &str {
        &self.destination_dir
    }

    /// Base name of the local file, as sent in the `fileName` field
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl fmt::Display for UploadJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.source_path.display(),
            self.destination_dir
        )
    }
}

/// Result of a single upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The API accepted the file (200 or 201)
    Success,
    /// The API asked us to slow down (429); the job goes back on the queue
    RateLimited,
    /// Any other status; terminal for the job
    Failed(u16),
}

impl UploadOutcome {
    /// Map an HTTP status code to an outcome
    pub fn from_status(status: u16) -> Self {
        match status {
            200 | 201 => Self::Success,
            429 => Self::RateLimited,
            other => Self::Failed(other),
        }
    }

    /// Whether this outcome ends the job's lifecycle
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::RateLimited)
    }
}
