//! Upload worker loop
//!
//! Each worker repeats until the queue is closed:
//! 1. take a job;
//! 2. run one upload attempt and pace to the minimum interval;
//! 3. resolve the outcome: success and terminal failures advance progress,
//!    a 429 puts the job back on the queue;
//! 4. mark the taken entry done.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, error, trace};

use super::pacer::Pacer;
use super::progress::{FailureReason, ProgressReporter};
use super::queue::WorkQueue;
use super::{UploadJob, UploadOutcome};
use crate::client::{TransportError, UploadTransport};
use crate::metrics;

/// One member of the worker pool
pub struct Worker {
    id: usize,
    queue: Arc<WorkQueue>,
    transport: Arc<dyn UploadTransport>,
    progress: Arc<ProgressReporter>,
    pacer: Pacer,
}

impl Worker {
    /// Create a worker sharing the run's queue, transport and reporter
    pub fn new(
        id: usize,
        queue: Arc<WorkQueue>,
        transport: Arc<dyn UploadTransport>,
        progress: Arc<ProgressReporter>,
        pacer: Pacer,
    ) -> Self {
        Self {
            id,
            queue,
            transport,
            progress,
            pacer,
        }
    }

    /// Process jobs until the queue is closed.
    ///
    /// # Returns
    /// Number of attempts this worker made
    pub async fn run(self) -> u64 {
        let mut attempts = 0u64;
        debug!(worker = self.id, "Worker started");

        while let Some(job) = self.queue.get().await {
            attempts += 1;
            self.process(job).await;

            if let Err(e) = self.queue.task_done() {
                error!(worker = self.id, error = %e, "Work queue bookkeeping error");
            }
        }

        debug!(worker = self.id, attempts = attempts, "Worker stopped");
        attempts
    }

    async fn process(&self, job: UploadJob) {
        let started = Instant::now();
        let result = self.transport.upload(&job).await;
        trace!(
            worker = self.id,
            elapsed_ms = started.elapsed().as_millis(),
            "Attempt returned"
        );

        let delay = self.pacer.pace(started).await;
        if !delay.is_zero() {
            metrics::record_pacing_delay(delay);
        }

        match result {
            Ok(UploadOutcome::Success) => {
                metrics::record_completed();
                self.progress.record_success(&job);
            }
            Ok(UploadOutcome::RateLimited) => {
                metrics::record_rate_limited();
                self.progress.note_rate_limited(&job);
                // New queue entry; the caller marks the current one done afterwards.
                if let Err(e) = self.queue.requeue(job.clone()) {
                    error!(
                        worker = self.id,
                        error = %e,
                        source = %job.source_path().display(),
                        "Could not re-queue rate-limited job"
                    );
                }
            }
            Ok(UploadOutcome::Failed(status)) => {
                self.fail(&job, FailureReason::Status(status));
            }
            Err(TransportError::FileOpen { source, .. }) => {
                self.fail(&job, FailureReason::FileOpen(source.to_string()));
            }
            Err(TransportError::Network(message)) => {
                self.fail(&job, FailureReason::Network(message));
            }
        }
    }

    fn fail(&self, job: &UploadJob, reason: FailureReason) {
        metrics::record_failed(&reason);
        self.progress.record_failure(job, reason);
    }
}
