//! Upload metrics
//!
//! Counters and histograms are recorded through the `metrics` facade and are
//! no-ops until a recorder is installed. [`init_metrics`] installs a
//! Prometheus exporter; `main` calls it only when `METRICS_ADDR` is set.
//!
//! Recorded series:
//! - `upload_attempts_total{status}` and `upload_request_duration_seconds`
//! - `upload_rate_limited_total`
//! - `uploads_completed_total`, `uploads_failed_total{reason}`
//! - `pacing_delay_seconds`

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::Lazy;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::uploader::progress::FailureReason;
use crate::uploader::UploadJob;

/// Environment variable holding the Prometheus listen address
pub const METRICS_ADDR_ENV_VAR: &str = "METRICS_ADDR";

static METRICS_INITIALIZED: Lazy<RwLock<bool>> = Lazy::new(|| RwLock::new(false));

static CORRELATION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Initialize the Prometheus exporter on `addr`. Idempotent.
pub async fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    let mut initialized = METRICS_INITIALIZED.write().await;
    if *initialized {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "upload_attempts_total",
        Unit::Count,
        "Upload requests sent to the Files API, by response status"
    );
    describe_histogram!(
        "upload_request_duration_seconds",
        Unit::Seconds,
        "Upload request duration in seconds"
    );
    describe_counter!(
        "upload_rate_limited_total",
        Unit::Count,
        "Attempts answered with 429 and re-queued"
    );
    describe_counter!(
        "uploads_completed_total",
        Unit::Count,
        "Files uploaded successfully"
    );
    describe_counter!(
        "uploads_failed_total",
        Unit::Count,
        "Files that reached a terminal failure"
    );
    describe_histogram!(
        "pacing_delay_seconds",
        Unit::Seconds,
        "Sleep inserted by workers to respect the per-request interval"
    );

    *initialized = true;
    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

/// Whether [`init_metrics`] has completed
pub async fn is_initialized() -> bool {
    *METRICS_INITIALIZED.read().await
}

/// Next correlation id, used to tie log lines of one attempt together
pub fn next_correlation_id() -> String {
    let id = CORRELATION_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("upl-{id:08x}")
}

/// Timing and status recording for one upload request
pub struct UploadAttemptMetrics {
    source: String,
    start_time: Instant,
    correlation_id: String,
}

impl UploadAttemptMetrics {
    /// Start timing an attempt for `job`
    pub fn start(job: &UploadJob) -> Self {
        let correlation_id = next_correlation_id();
        let source = job.source_path().display().to_string();

        debug!(
            correlation_id = %correlation_id,
            source = %source,
            destination = job.destination_dir(),
            "Starting upload attempt"
        );

        Self {
            source,
            start_time: Instant::now(),
            correlation_id,
        }
    }

    /// Record a response with `status_code`
    pub fn record_complete(&self, status_code: u16) {
        let duration = self.start_time.elapsed();

        counter!("upload_attempts_total", "status" => status_code.to_string()).increment(1);
        histogram!("upload_request_duration_seconds").record(duration.as_secs_f64());

        debug!(
            correlation_id = %self.correlation_id,
            status = status_code,
            duration_ms = duration.as_millis(),
            "Upload request completed"
        );
    }

    /// Record a request that failed without a status
    pub fn record_network_error(&self) {
        let duration = self.start_time.elapsed();

        counter!("upload_attempts_total", "status" => "network_error").increment(1);
        histogram!("upload_request_duration_seconds").record(duration.as_secs_f64());

        warn!(
            correlation_id = %self.correlation_id,
            source = %self.source,
            duration_ms = duration.as_millis(),
            "Network error recorded"
        );
    }

    /// Correlation id of this attempt
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}

/// Record a 429 answer
pub fn record_rate_limited() {
    counter!("upload_rate_limited_total").increment(1);
}

/// Record a file uploaded successfully
pub fn record_completed() {
    counter!("uploads_completed_total").increment(1);
}

/// Record a terminal failure
pub fn record_failed(reason: &FailureReason) {
    let label = match reason {
        FailureReason::Status(code) => code.to_string(),
        FailureReason::FileOpen(_) => "file_open".to_string(),
        FailureReason::Network(_) => "network".to_string(),
    };
    counter!("uploads_failed_total", "reason" => label).increment(1);
}

/// Record the pacing sleep applied after an attempt
pub fn record_pacing_delay(delay: Duration) {
    histogram!("pacing_delay_seconds").record(delay.as_secs_f64());
}
