//! Access token loading
//!
//! The token comes from the `HS_TOKEN` environment variable at run time, or
//! from the same variable captured at build time when the runtime one is
//! absent. Empty values count as absent.

use std::fmt;

/// Environment variable holding the bearer token
pub const TOKEN_ENV_VAR: &str = "HS_TOKEN";

/// Token baked in at compile time, if `HS_TOKEN` was set during the build
const BUILD_TIME_TOKEN: Option<&str> = option_env!("HS_TOKEN");

/// Credential errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CredentialError {
    /// No token in the environment nor in the build
    #[error("No API access token configured (set {TOKEN_ENV_VAR})")]
    Missing,
}

/// Bearer access token. `Debug` output never contains the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token, rejecting blank values
    pub fn new(token: impl Into<String>) -> Result<Self, CredentialError> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(CredentialError::Missing);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Resolve the token from `HS_TOKEN`, falling back to the build-time value
    pub fn from_env() -> Result<Self, CredentialError> {
        Self::resolve(std::env::var(TOKEN_ENV_VAR).ok(), BUILD_TIME_TOKEN)
    }

    /// Pick the runtime value when non-blank, otherwise the fallback
    pub fn resolve(
        runtime: Option<String>,
        fallback: Option<&str>,
    ) -> Result<Self, CredentialError> {
        runtime
            .and_then(|token| Self::new(token).ok())
            .or_else(|| fallback.and_then(|token| Self::new(token).ok()))
            .ok_or(CredentialError::Missing)
    }

    /// The raw token, for the `Authorization` header
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
