//! Upload run orchestration
//!
//! [`UploadExecutor`] wires the pipeline: enumerate every job up front so the
//! total is known, spawn the worker pool, feed the bounded queue, wait for
//! drain, close the queue and collect the report.

use std::path::Path;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{error, info};

use super::config::UploaderConfig;
use super::pacer::Pacer;
use super::progress::{ProgressReporter, RunReport};
use super::queue::WorkQueue;
use super::worker::Worker;
use super::{UploadError, UploadJob};
use crate::client::UploadTransport;
use crate::enumerate::{enumerate_jobs_with, ExclusionRules};

/// Runs one upload of a source tree
pub struct UploadExecutor {
    transport: Arc<dyn UploadTransport>,
    config: UploaderConfig,
    show_progress: bool,
    rules: ExclusionRules,
}

impl UploadExecutor {
    /// Create an executor uploading through `transport`
    pub fn new(transport: Arc<dyn UploadTransport>, config: UploaderConfig) -> Self {
        Self {
            transport,
            config,
            show_progress: false,
            rules: ExclusionRules::default(),
        }
    }

    /// Draw a progress bar on stderr while running
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Override the exclusion rules
    pub fn with_exclusions(mut self, rules: ExclusionRules) -> Self {
        self.rules = rules;
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Upload `source` (file or directory) into the remote folder `destination`
    ///
    /// # Errors
    /// Fails before any upload if the configuration is invalid or the source
    /// does not exist. Per-file failures are reported in the [`RunReport`].
    pub async fn execute(&self, source: &Path, destination: &str) -> Result<RunReport, UploadError> {
        self.config.validate()?;

        let jobs: Vec<UploadJob> =
            enumerate_jobs_with(source, destination, self.rules.clone())?.collect();
        info!(
            source = %source.display(),
            destination = destination,
            files = jobs.len(),
            "Enumerated files to upload"
        );

        self.run(jobs).await
    }

    /// Upload an already enumerated list of jobs
    pub async fn run(&self, jobs: Vec<UploadJob>) -> Result<RunReport, UploadError> {
        self.config.validate()?;

        let workers = self.config.workers;
        let progress = Arc::new(ProgressReporter::new(jobs.len() as u64, self.show_progress));
        let queue = Arc::new(WorkQueue::new(workers));
        let pacer = Pacer::new(self.config.min_request_interval);

        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let worker = Worker::new(
                    id,
                    queue.clone(),
                    self.transport.clone(),
                    progress.clone(),
                    pacer,
                );
                tokio::spawn(worker.run())
            })
            .collect();

        for job in jobs {
            queue.put(job).await?;
        }

        queue.join().await;
        queue.close();

        let mut attempts = 0u64;
        for result in join_all(handles).await {
            match result {
                Ok(count) => attempts += count,
                Err(e) => error!(error = %e, "Upload worker terminated abnormally"),
            }
        }

        let report = progress.finish();
        info!(
            total = report.total,
            uploaded = report.uploaded(),
            failed = report.failures.len(),
            attempts = attempts,
            "Upload run finished"
        );
        Ok(report)
    }
}
