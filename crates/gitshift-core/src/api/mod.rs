//! External collaborator interfaces
//!
//! The core depends only on these seams, never on transport details:
//! - MigrationApi: the remote migration service
//! - CredentialProvider: per-platform secrets
//! - ScriptSink: destination for rendered script text
//!
//! Secrets pass through the core as [`Secret`] values that never render
//! their contents in logs or debug output.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::migration::MigrationState;

/// A secret value (personal access token or equivalent). Debug and
/// Display print a redaction marker, never the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the underlying value for use at the transport boundary.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Credentials for one migration: source-platform and GitHub tokens.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub source_pat: Secret,
    pub github_pat: Secret,
}

/// Target repository visibility on GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoVisibility {
    Public,
    #[default]
    Private,
    Internal,
}

impl RepoVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoVisibility::Public => "public",
            RepoVisibility::Private => "private",
            RepoVisibility::Internal => "internal",
        }
    }
}

/// Everything needed to submit one repository migration.
#[derive(Debug, Clone)]
pub struct MigrationRequest {
    /// Clone URL of the source repository.
    pub source_repo_url: String,
    pub github_org: String,
    pub github_repo: String,
    pub visibility: RepoVisibility,
    pub credentials: Credentials,
}

/// Remote state of one migration, as reported by the service.
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    pub state: MigrationState,
    pub repository_url: Option<String>,
    pub failure_reason: Option<String>,
}

/// Errors surfaced by the remote migration API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The target repository already exists. Recovered by the launcher as
    /// an idempotent no-op, never surfaced as a failure.
    #[error("{0}")]
    AlreadyExists(String),

    /// Any other rejection at submission or fetch time.
    #[error("remote error: {0}")]
    Remote(String),

    /// Transport-level failure (connection, timeout, malformed response).
    #[error("transport error: {0}")]
    Transport(String),
}

/// The remote migration service.
#[async_trait]
pub trait MigrationApi: Send + Sync {
    /// Register a migration source for the target organization, returning
    /// its remote identifier.
    async fn create_migration_source(&self, github_org: &str) -> Result<String, ApiError>;

    /// Submit a migration, returning the remote migration id.
    async fn start_migration(
        &self,
        source_id: &str,
        request: &MigrationRequest,
    ) -> Result<String, ApiError>;

    /// Fetch the current state of a migration.
    async fn get_migration(&self, migration_id: &str) -> Result<MigrationStatus, ApiError>;
}

/// A required credential was neither passed in nor present in the
/// environment.
#[derive(Debug, Error)]
#[error("missing credential: {0}")]
pub struct MissingCredential(pub String);

/// Supplies personal-access-token-equivalent secrets per platform.
pub trait CredentialProvider: Send + Sync {
    fn source_pat(&self) -> Result<Secret, MissingCredential>;
    fn github_pat(&self) -> Result<Secret, MissingCredential>;
}

/// Accepts rendered script text; the core performs no filesystem I/O.
pub trait ScriptSink: Send + Sync {
    fn write_script(&self, path: &Path, text: &str) -> std::io::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_never_renders_its_value() {
        let secret = Secret::new("hunter2");
        assert_eq!(format!("{:?}", secret), "***");
        assert_eq!(format!("{}", secret), "***");
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn test_credentials_debug_redacts_both_tokens() {
        let credentials = Credentials {
            source_pat: Secret::new("ado-token"),
            github_pat: Secret::new("gh-token"),
        };
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("ado-token"));
        assert!(!rendered.contains("gh-token"));
    }
}
