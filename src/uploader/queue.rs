//! Bounded work queue with a task-counting drain barrier
//!
//! The queue is the pipeline's only backpressure: [`WorkQueue::put`] suspends
//! while `capacity` jobs are buffered, so the producer can never run further
//! ahead than `capacity` queued jobs plus the jobs workers hold in flight.
//!
//! Rate-limited jobs go back through [`WorkQueue::requeue`], a separate
//! unbounded lane that [`WorkQueue::get`] drains first. Only a job a worker
//! holds can enter it, and a worker only takes a fresh job when the lane is
//! empty, so re-queued plus held jobs never exceed the worker count. Buffered
//! plus in-flight jobs therefore stay within `capacity + workers`, and a
//! worker never blocks on a queue the producer has filled.
//!
//! Every `put` or `requeue` must be balanced by exactly one
//! [`WorkQueue::task_done`]. [`WorkQueue::join`] resolves once the counts
//! meet. A worker that re-enqueues a job calls `requeue` for the new entry
//! *before* `task_done` for the current one, so the outstanding count never
//! touches zero mid-retry.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::job::UploadJob;

/// Work queue errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueueError {
    /// Queue was closed before the job could be inserted
    #[error("work queue is closed")]
    Closed,

    /// `task_done` called more times than jobs were put
    #[error("task_done() called more times than there were queued jobs")]
    TaskDoneUnderflow,
}

/// Fixed-capacity FIFO shared by the producer and all workers
#[derive(Debug)]
pub struct WorkQueue {
    tx: flume::Sender<UploadJob>,
    rx: flume::Receiver<UploadJob>,
    retry_tx: flume::Sender<UploadJob>,
    retry_rx: flume::Receiver<UploadJob>,
    capacity: usize,
    outstanding: AtomicUsize,
    drained: Notify,
    closed: CancellationToken,
}

impl WorkQueue {
    /// Create a queue holding at most `capacity` unconsumed jobs
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = flume::bounded(capacity);
        let (retry_tx, retry_rx) = flume::unbounded();
        Self {
            tx,
            rx,
            retry_tx,
            retry_rx,
            capacity,
            outstanding: AtomicUsize::new(0),
            drained: Notify::new(),
            closed: CancellationToken::new(),
        }
    }

    /// Insert a job, suspending while the queue is full
    pub async fn put(&self, job: UploadJob) -> Result<(), QueueError> {
        if self.closed.is_cancelled() {
            return Err(QueueError::Closed);
        }

        self.outstanding.fetch_add(1, Ordering::AcqRel);
        let sent = tokio::select! {
            biased;
            sent = self.tx.send_async(job) => sent.map_err(|_| QueueError::Closed),
            _ = self.closed.cancelled() => Err(QueueError::Closed),
        };

        if sent.is_err() {
            // The entry never made it in, so nobody will mark it done.
            self.release_one()?;
        }
        sent
    }

    /// Put a taken job back as a new entry without waiting for capacity
    pub fn requeue(&self, job: UploadJob) -> Result<(), QueueError> {
        if self.closed.is_cancelled() {
            return Err(QueueError::Closed);
        }

        self.outstanding.fetch_add(1, Ordering::AcqRel);
        if self.retry_tx.send(job).is_err() {
            self.release_one()?;
            return Err(QueueError::Closed);
        }
        Ok(())
    }

    /// Take the next job, suspending while the queue is empty.
    /// Re-queued jobs are handed out before fresh ones.
    ///
    /// Returns `None` once the queue has been closed.
    pub async fn get(&self) -> Option<UploadJob> {
        tokio::select! {
            biased;
            job = self.retry_rx.recv_async() => job.ok(),
            job = self.rx.recv_async() => job.ok(),
            _ = self.closed.cancelled() => None,
        }
    }

    /// Mark one previously taken entry as fully handled
    pub fn task_done(&self) -> Result<(), QueueError> {
        self.release_one()
    }

    /// Wait until every entry put so far has been marked done
    pub async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.outstanding.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Release every worker blocked in [`WorkQueue::get`]
    pub fn close(&self) {
        trace!(outstanding = self.outstanding(), "Closing work queue");
        self.closed.cancel();
    }

    /// Whether [`WorkQueue::close`] has been called
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Number of buffered, not yet taken jobs, re-queued ones included
    pub fn len(&self) -> usize {
        self.rx.len() + self.retry_rx.len()
    }

    /// Whether no job is currently buffered
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty() && self.retry_rx.is_empty()
    }

    /// Maximum number of buffered fresh jobs
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries put but not yet marked done (buffered plus in flight)
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    fn release_one(&self) -> Result<(), QueueError> {
        let previous = self
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map_err(|_| QueueError::TaskDoneUnderflow)?;

        if previous == 1 {
            self.drained.notify_waiters();
        }
        Ok(())
    }
}
