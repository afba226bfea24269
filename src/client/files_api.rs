//! Files API v3 upload client
//!
//! Sends one `POST {base}/files` multipart request per attempt:
//! - `fileName`: base name of the local file
//! - `file`: file contents, streamed from disk
//! - `folderPath`: remote destination folder
//! - `options`: JSON `{"access":"PUBLIC_INDEXABLE","overwrite":true}`
//!
//! The client is built once per run and shared by every worker through an
//! `Arc`, which keeps connection pooling across workers.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::Serialize;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;

use super::{ClientError, TransportError, TransportResult, UploadTransport};
use crate::credential::Credential;
use crate::metrics::UploadAttemptMetrics;
use crate::uploader::{UploadJob, UploadOutcome, UploaderConfig};

/// Endpoint appended to the base URL
pub const UPLOAD_ENDPOINT: &str = "/files";

/// Visibility of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileAccess {
    /// Public and indexable by search engines
    PublicIndexable,
    /// Public but not indexed
    PublicNotIndexable,
    /// Private
    Private,
}

/// The `options` field of an upload request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOptions {
    /// File visibility
    pub access: FileAccess,
    /// Replace a file with the same name in the destination folder
    pub overwrite: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            access: FileAccess::PublicIndexable,
            overwrite: true,
        }
    }
}

impl UploadOptions {
    /// Serialize to the JSON string sent in the form
    pub fn to_json(&self) -> String {
        // Only plain enums and bools, serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Multipart upload client for the Files API
pub struct FilesApiClient {
    client: Client,
    upload_url: String,
    credential: Credential,
    options: UploadOptions,
}

impl FilesApiClient {
    /// Build a client from the run configuration
    ///
    /// # Arguments
    /// * `config` - Base URL and timeouts
    /// * `credential` - Bearer token sent with every request
    pub fn new(config: &UploaderConfig, credential: Credential) -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self::with_client(client, &config.base_url, credential))
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client, base_url: &str, credential: Credential) -> Self {
        Self {
            client,
            upload_url: format!("{}{}", base_url.trim_end_matches('/'), UPLOAD_ENDPOINT),
            credential,
            options: UploadOptions::default(),
        }
    }

    /// Full URL uploads are posted to
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    async fn build_form(&self, job: &UploadJob) -> Result<Form, TransportError> {
        let open_error = |source| TransportError::FileOpen {
            path: job.source_path().to_path_buf(),
            source,
        };

        let file = File::open(job.source_path()).await.map_err(open_error)?;
        let length = file.metadata().await.map_err(open_error)?.len();
        let file_name = job.file_name();

        let file_part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), length)
            .file_name(file_name.clone());

        Ok(Form::new()
            .text("fileName", file_name)
            .part("file", file_part)
            .text("folderPath", job.destination_dir().to_string())
            .text("options", self.options.to_json()))
    }
}

#[async_trait]
impl UploadTransport for FilesApiClient {
    async fn upload(&self, job: &UploadJob) -> TransportResult {
        let form = self.build_form(job).await?;
        let metrics = UploadAttemptMetrics::start(job);

        let response = match self
            .client
            .post(&self.upload_url)
            .bearer_auth(self.credential.token())
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                metrics.record_network_error();
                return Err(TransportError::Network(e.to_string()));
            }
        };

        let status = response.status().as_u16();
        metrics.record_complete(status);
        debug!(
            correlation_id = metrics.correlation_id(),
            status = status,
            source = %job.source_path().display(),
            "Upload attempt finished"
        );

        Ok(UploadOutcome::from_status(status))
    }
}
