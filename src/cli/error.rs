//! CLI error types and conversions

use crate::client::ClientError;
use crate::credential::CredentialError;
use crate::uploader::UploadError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// No access token available
    #[error("{0}")]
    CredentialError(#[from] CredentialError),

    /// HTTP client could not be built
    #[error("client error: {0}")]
    ClientError(#[from] ClientError),

    /// Upload run could not start or complete
    #[error("upload error: {0}")]
    UploadError(#[from] UploadError),
}
