//! Upload command

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use super::CliError;
use crate::client::FilesApiClient;
use crate::credential::Credential;
use crate::uploader::config::DEFAULT_DESTINATION;
use crate::uploader::{RunReport, UploadExecutor, UploaderConfig};

/// Upload a file or a folder to the file manager, keeping its structure
#[derive(Parser, Debug)]
#[command(name = "tree-uploader")]
#[command(about = "Upload a file or folder tree to the file manager", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the folder or file to upload
    #[arg(short = 's', long)]
    pub source: PathBuf,

    /// Destination folder on the file manager
    #[arg(short = 'd', long, default_value = DEFAULT_DESTINATION)]
    pub destination: String,
}

impl Cli {
    /// Resolve the credential and run the upload.
    ///
    /// Fails before any request is made when no token is configured.
    pub async fn execute(&self) -> Result<RunReport, CliError> {
        let credential = Credential::from_env()?;
        self.execute_with(credential, UploaderConfig::from_env())
            .await
    }

    /// Run the upload with an explicit credential and configuration.
    ///
    /// Prints the failure summary to stdout when any file failed.
    pub async fn execute_with(
        &self,
        credential: Credential,
        config: UploaderConfig,
    ) -> Result<RunReport, CliError> {
        let client = FilesApiClient::new(&config, credential)?;
        info!(url = client.upload_url(), workers = config.workers, "Starting upload");

        let executor = UploadExecutor::new(Arc::new(client), config)
            .with_progress(std::io::stderr().is_terminal());
        let report = executor.execute(&self.source, &self.destination).await?;

        if let Some(summary) = report.summary() {
            println!("{summary}");
        }
        Ok(report)
    }
}
