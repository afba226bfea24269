//! Progress and failure aggregation for an upload run.
//!
//! Workers share one [`ProgressReporter`] behind an `Arc`. The completed
//! counter is atomic and the failure list sits behind a mutex, so outcomes
//! from every worker can be recorded concurrently. The counter only advances
//! on terminal outcomes; a rate-limited attempt logs a transient line and
//! leaves it alone.
//!
//! On a terminal the per-file lines are printed above a live bar on stderr.
//! Without one (pipes, CI, cron) they go to stdout, and every terminal
//! outcome logs the completed/total count at `info`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::{debug, info, warn};

use super::job::UploadJob;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} ETA {eta}";
const BAR_MESSAGE: &str = "Files upload";

/// Why a job ended without being uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The API answered with a non-success, non-429 status
    Status(u16),
    /// The local file could not be opened
    FileOpen(String),
    /// The request failed before a status was received
    Network(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "Status code {code}"),
            Self::FileOpen(msg) => write!(f, "File open error: {msg}"),
            Self::Network(msg) => write!(f, "Network error: {msg}"),
        }
    }
}

/// A job that reached a terminal failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    /// Local file that was not uploaded
    pub source_path: PathBuf,
    /// What went wrong
    pub reason: FailureReason,
}

impl FailedUpload {
    /// Status code, when the failure came from the API
    pub fn status_code(&self) -> Option<u16> {
        match self.reason {
            FailureReason::Status(code) => Some(code),
            _ => None,
        }
    }
}

/// Shared completed-vs-total counter and failure collector
pub struct ProgressReporter {
    bar: ProgressBar,
    visible: bool,
    total: u64,
    completed: AtomicU64,
    failures: Mutex<Vec<FailedUpload>>,
}

impl ProgressReporter {
    /// Create a reporter for `total` jobs; `visible` draws a bar on stderr,
    /// otherwise per-file lines go to stdout
    pub fn new(total: u64, visible: bool) -> Self {
        let target = if visible {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        let bar = ProgressBar::with_draw_target(Some(total), target);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(BAR_TEMPLATE)
                .expect("hardcoded template is valid")
                .progress_chars("#>-"),
        );
        bar.set_message(BAR_MESSAGE);

        Self {
            bar,
            visible,
            total,
            completed: AtomicU64::new(0),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Reporter without a bar, for tests and non-interactive runs
    pub fn hidden(total: u64) -> Self {
        Self::new(total, false)
    }

    /// Total number of jobs in the run
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Jobs that reached a terminal outcome so far
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Record a successful upload
    pub fn record_success(&self, job: &UploadJob) {
        self.line(format!(
            "Uploaded {} to {}",
            job.source_path().display(),
            job.destination_dir()
        ));
        debug!(
            source = %job.source_path().display(),
            destination = job.destination_dir(),
            "Upload succeeded"
        );
        self.advance();
    }

    /// Record a terminal failure for `job`
    pub fn record_failure(&self, job: &UploadJob, reason: FailureReason) {
        self.line(format!(
            "Error upload {} to {}",
            job.source_path().display(),
            job.destination_dir()
        ));
        debug!(
            source = %job.source_path().display(),
            destination = job.destination_dir(),
            reason = %reason,
            "Upload failed"
        );

        self.lock_failures().push(FailedUpload {
            source_path: job.source_path().to_path_buf(),
            reason,
        });
        self.advance();
    }

    /// Note a rate-limited attempt. Does not advance the counter.
    pub fn note_rate_limited(&self, job: &UploadJob) {
        self.bar.suspend(|| {
            warn!(
                source = %job.source_path().display(),
                "Too many requests, job re-queued"
            )
        });
    }

    /// Stop drawing and freeze the run state into a report
    pub fn finish(&self) -> RunReport {
        self.bar.finish();
        RunReport {
            total: self.total,
            completed: self.completed(),
            failures: self.lock_failures().clone(),
        }
    }

    fn advance(&self) {
        let completed = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
        self.bar.inc(1);
        if !self.visible {
            info!(completed = completed, total = self.total, "Upload progress");
        }
    }

    fn line(&self, line: String) {
        if self.visible {
            self.bar.println(line);
        } else {
            println!("{line}");
        }
    }

    fn lock_failures(&self) -> std::sync::MutexGuard<'_, Vec<FailedUpload>> {
        // A worker panicking mid-push cannot leave the Vec half-written.
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Final state of an upload run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Jobs enumerated
    pub total: u64,
    /// Jobs that reached a terminal outcome
    pub completed: u64,
    /// Terminal failures in the order they were recorded
    pub failures: Vec<FailedUpload>,
}

impl RunReport {
    /// Whether every job was uploaded
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.completed == self.total
    }

    /// Number of successfully uploaded files
    pub fn uploaded(&self) -> u64 {
        self.completed.saturating_sub(self.failures.len() as u64)
    }

    /// Whether `path` is among the failures
    pub fn failed(&self, path: &Path) -> bool {
        self.failures.iter().any(|f| f.source_path == path)
    }

    /// End-of-run failure summary, or `None` when nothing failed
    pub fn summary(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }

        let mut lines = vec![
            String::new(),
            "!!!ERROR!!!".to_string(),
            format!("{} files weren't uploaded:", self.failures.len()),
        ];
        lines.extend(
            self.failures
                .iter()
                .map(|f| format!("{} ==> {}", f.reason, f.source_path.display())),
        );
        Some(lines.join("\n"))
    }
}
