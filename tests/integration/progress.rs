//! Integration tests for shared progress reporting

use std::path::Path;
use std::sync::Arc;
use tree_uploader::uploader::{FailureReason, ProgressReporter};
use tree_uploader::UploadJob;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_recording_loses_nothing() {
    let reporter = Arc::new(ProgressReporter::hidden(400));

    let tasks: Vec<_> = (0..4)
        .map(|worker| {
            let reporter = reporter.clone();
            tokio::spawn(async move {
                for i in 0..100 {
                    let job = UploadJob::new(format!("/data/w{worker}/f{i}.txt"), "/");
                    if i % 10 == 0 {
                        reporter.note_rate_limited(&job);
                        reporter.record_failure(&job, FailureReason::Status(500));
                    } else {
                        reporter.record_success(&job);
                    }
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let report = reporter.finish();
    assert_eq!(report.total, 400);
    assert_eq!(report.completed, 400);
    assert_eq!(report.failures.len(), 40);
    assert_eq!(report.uploaded(), 360);
    assert!(report.failed(Path::new("/data/w3/f90.txt")));
}

#[test]
fn test_rate_limited_notes_do_not_advance() {
    let reporter = ProgressReporter::hidden(1);
    let job = UploadJob::new("/data/a.txt", "/");

    for _ in 0..5 {
        reporter.note_rate_limited(&job);
    }
    assert_eq!(reporter.completed(), 0);

    reporter.record_success(&job);
    assert_eq!(reporter.completed(), reporter.total());
}

#[test]
fn test_summary_lists_every_failure_kind() {
    let reporter = ProgressReporter::hidden(3);
    reporter.record_failure(
        &UploadJob::new("/data/a.txt", "/"),
        FailureReason::Status(413),
    );
    reporter.record_failure(
        &UploadJob::new("/data/b.txt", "/"),
        FailureReason::FileOpen("permission denied".to_string()),
    );
    reporter.record_failure(
        &UploadJob::new("/data/c.txt", "/"),
        FailureReason::Network("connection reset".to_string()),
    );

    let summary = reporter.finish().summary().unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(
        lines,
        vec![
            "",
            "!!!ERROR!!!",
            "3 files weren't uploaded:",
            "Status code 413 ==> /data/a.txt",
            "File open error: permission denied ==> /data/b.txt",
            "Network error: connection reset ==> /data/c.txt",
        ]
    );
}
