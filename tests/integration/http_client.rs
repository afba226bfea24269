//! Integration tests for the Files API client against a mock server

use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tree_uploader::client::{TransportError, UploadTransport};
use tree_uploader::{Credential, FilesApiClient, UploadExecutor, UploadJob, UploadOutcome, UploaderConfig};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const TOKEN: &str = "test-token";

fn client_for(server: &MockServer) -> FilesApiClient {
    let config = UploaderConfig::default().with_base_url(server.uri());
    FilesApiClient::new(&config, Credential::new(TOKEN).unwrap()).unwrap()
}

async fn mount_status(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/files"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Value of a text field in a multipart body
fn form_field(request: &Request, name: &str) -> Option<String> {
    let body = String::from_utf8_lossy(&request.body);
    let marker = format!("name=\"{name}\"");
    let start = body.find(&marker)?;
    let rest = &body[start..];
    let value_start = rest.find("\r\n\r\n")? + 4;
    let value_end = rest[value_start..].find("\r\n--")? + value_start;
    Some(rest[value_start..value_end].to_string())
}

fn write_file(dir: &TempDir, relative: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn test_created_is_success() {
    let server = MockServer::start().await;
    mount_status(&server, 201).await;
    let temp = TempDir::new().unwrap();
    let file = write_file(&temp, "a.txt", "hello");

    let outcome = client_for(&server)
        .upload(&UploadJob::new(file, "/assets"))
        .await
        .unwrap();

    assert_eq!(outcome, UploadOutcome::Success);
}

#[tokio::test]
async fn test_too_many_requests_is_rate_limited() {
    let server = MockServer::start().await;
    mount_status(&server, 429).await;
    let temp = TempDir::new().unwrap();
    let file = write_file(&temp, "a.txt", "hello");

    let outcome = client_for(&server)
        .upload(&UploadJob::new(file, "/"))
        .await
        .unwrap();

    assert_eq!(outcome, UploadOutcome::RateLimited);
}

#[tokio::test]
async fn test_server_error_is_failed() {
    let server = MockServer::start().await;
    mount_status(&server, 500).await;
    let temp = TempDir::new().unwrap();
    let file = write_file(&temp, "a.txt", "hello");

    let outcome = client_for(&server)
        .upload(&UploadJob::new(file, "/"))
        .await
        .unwrap();

    assert_eq!(outcome, UploadOutcome::Failed(500));
}

#[tokio::test]
async fn test_request_carries_multipart_fields() {
    let server = MockServer::start().await;
    mount_status(&server, 200).await;
    let temp = TempDir::new().unwrap();
    let file = write_file(&temp, "docs/report.txt", "quarterly numbers");

    client_for(&server)
        .upload(&UploadJob::new(file, "/docs/2024"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    let content_type = request
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("multipart/form-data"));

    assert_eq!(form_field(request, "fileName").as_deref(), Some("report.txt"));
    assert_eq!(form_field(request, "folderPath").as_deref(), Some("/docs/2024"));
    assert_eq!(
        form_field(request, "options").as_deref(),
        Some(r#"{"access":"PUBLIC_INDEXABLE","overwrite":true}"#)
    );
    assert_eq!(form_field(request, "file").as_deref(), Some("quarterly numbers"));
}

#[tokio::test]
async fn test_wrong_token_is_not_matched() {
    let server = MockServer::start().await;
    mount_status(&server, 201).await;
    let temp = TempDir::new().unwrap();
    let file = write_file(&temp, "a.txt", "hello");

    let config = UploaderConfig::default().with_base_url(server.uri());
    let client = FilesApiClient::new(&config, Credential::new("other-token").unwrap()).unwrap();

    // Unmatched requests get wiremock's default 404.
    let outcome = client.upload(&UploadJob::new(file, "/")).await.unwrap();
    assert_eq!(outcome, UploadOutcome::Failed(404));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let temp = TempDir::new().unwrap();
    let file = write_file(&temp, "a.txt", "hello");

    let config = UploaderConfig::default()
        .with_base_url("http://127.0.0.1:1")
        .with_request_timeout(Duration::from_secs(5));
    let client = FilesApiClient::new(&config, Credential::new(TOKEN).unwrap()).unwrap();

    let result = client.upload(&UploadJob::new(file, "/")).await;
    assert!(matches!(result, Err(TransportError::Network(_))));
}

#[tokio::test]
async fn test_directory_upload_end_to_end() {
    let server = MockServer::start().await;
    mount_status(&server, 201).await;
    let temp = TempDir::new().unwrap();
    write_file(&temp, "a.txt", "a");
    write_file(&temp, "sub/b.txt", "b");
    write_file(&temp, ".DS_Store", "junk");

    let config = UploaderConfig::default()
        .with_base_url(server.uri())
        .with_min_request_interval(Duration::ZERO);
    let client = FilesApiClient::new(&config, Credential::new(TOKEN).unwrap()).unwrap();
    let executor = UploadExecutor::new(Arc::new(client), config);

    let report = executor.execute(temp.path(), "/assets").await.unwrap();

    assert_eq!(report.total, 2);
    assert!(report.is_success());

    let requests = server.received_requests().await.unwrap();
    let mut uploads: Vec<(String, String)> = requests
        .iter()
        .map(|r| {
            (
                form_field(r, "fileName").unwrap(),
                form_field(r, "folderPath").unwrap(),
            )
        })
        .collect();
    uploads.sort();
    assert_eq!(
        uploads,
        vec![
            ("a.txt".to_string(), "/assets".to_string()),
            ("b.txt".to_string(), "/assets/sub".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_rate_limited_upload_is_retried_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_status(&server, 201).await;

    let temp = TempDir::new().unwrap();
    write_file(&temp, "a.txt", "a");

    let config = UploaderConfig::default()
        .with_base_url(server.uri())
        .with_workers(1)
        .with_min_request_interval(Duration::ZERO);
    let client = FilesApiClient::new(&config, Credential::new(TOKEN).unwrap()).unwrap();
    let report = UploadExecutor::new(Arc::new(client), config)
        .execute(temp.path(), "/")
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}
