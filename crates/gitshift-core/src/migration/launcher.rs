//! Migration launcher
//!
//! Submits one repository migration to the remote service. The remote
//! "already exists" rejection is an idempotent success-equivalent: the
//! caller gets a warning, not an error.

use std::sync::Arc;

use thiserror::Error;

use crate::api::{ApiError, MigrationApi, MigrationRequest};
use crate::migration::poller::MigrationPoller;
use crate::migration::{MigrationHandle, MigrationState};
use crate::progress::{ProgressEvent, ProgressReporter};

/// Errors surfaced by launch and the combined migrate operation.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The remote service rejected the submission (other than "already
    /// exists").
    #[error("migration submission failed: {0}")]
    Submission(String),

    /// The migration reached the terminal failed state.
    #[error("migration {id} failed: {reason}")]
    Failed { id: String, reason: String },

    /// The wait was cancelled; the remote migration continues.
    #[error("wait cancelled for migration {0}")]
    Cancelled(String),
}

/// Outcome of submitting a migration.
#[derive(Debug, Clone)]
pub enum LaunchOutcome {
    /// Submission accepted; the handle's state is remote-determined.
    Started(MigrationHandle),
    /// The target repository already exists; nothing was submitted.
    AlreadyExists,
}

/// Submits migrations and optionally drives them to a terminal state.
pub struct MigrationLauncher {
    api: Arc<dyn MigrationApi>,
    reporter: Option<Arc<dyn ProgressReporter>>,
}

impl MigrationLauncher {
    pub fn new(api: Arc<dyn MigrationApi>) -> Self {
        Self {
            api,
            reporter: None,
        }
    }

    /// Attach a progress reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Submit a migration request.
    pub async fn launch(&self, request: &MigrationRequest) -> Result<LaunchOutcome, MigrateError> {
        let source_id = self
            .api
            .create_migration_source(&request.github_org)
            .await
            .map_err(submission_error)?;

        let migration_id = match self.api.start_migration(&source_id, request).await {
            Ok(id) => id,
            Err(ApiError::AlreadyExists(message)) => {
                tracing::warn!(
                    github_org = %request.github_org,
                    github_repo = %request.github_repo,
                    "target repository already exists; no operation will be performed"
                );
                self.report(
                    ProgressEvent::new(None, "migration_already_exists").with_message(message),
                )
                .await;
                return Ok(LaunchOutcome::AlreadyExists);
            }
            Err(err) => return Err(submission_error(err)),
        };

        // The remote decides whether the job starts queued or already in
        // progress; a failed first fetch just leaves it queued.
        let state = match self.api.get_migration(&migration_id).await {
            Ok(status) => status.state,
            Err(err) => {
                tracing::warn!(
                    migration_id = %migration_id,
                    error = %err,
                    "could not fetch initial migration state"
                );
                MigrationState::Queued
            }
        };

        let handle = MigrationHandle::new(migration_id.clone(), state);
        tracing::info!(
            migration_id = %migration_id,
            state = %state,
            github_repo = %request.github_repo,
            "migration queued"
        );
        self.report(ProgressEvent::new(Some(migration_id), "migration_queued"))
            .await;
        Ok(LaunchOutcome::Started(handle))
    }

    /// Launch and, when `wait` is set, poll to a terminal state. Returns
    /// `None` when the target already exists (idempotent no-op).
    pub async fn migrate(
        &self,
        request: &MigrationRequest,
        wait: bool,
        poller: &MigrationPoller,
    ) -> Result<Option<MigrationHandle>, MigrateError> {
        let handle = match self.launch(request).await? {
            LaunchOutcome::Started(handle) => handle,
            LaunchOutcome::AlreadyExists => return Ok(None),
        };

        if !wait {
            return Ok(Some(handle));
        }

        let final_handle = poller.await_migration(&handle).await?;
        if final_handle.state == MigrationState::Failed {
            let reason = final_handle
                .failure_reason
                .clone()
                .unwrap_or_else(|| "no failure reason reported".to_string());
            return Err(MigrateError::Failed {
                id: final_handle.id,
                reason,
            });
        }
        Ok(Some(final_handle))
    }

    async fn report(&self, event: ProgressEvent) {
        if let Some(reporter) = &self.reporter {
            if let Err(err) = reporter.report(event).await {
                tracing::warn!("failed to report launch progress: {}", err);
            }
        }
    }
}

fn submission_error(err: ApiError) -> MigrateError {
    MigrateError::Submission(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::api::{Credentials, MigrationStatus, RepoVisibility, Secret};

    struct StubApi {
        start_result: Mutex<Option<Result<String, ApiError>>>,
        states: Mutex<Vec<MigrationStatus>>,
        fetches: Mutex<u32>,
    }

    impl StubApi {
        fn new(start_result: Result<String, ApiError>) -> Self {
            Self {
                start_result: Mutex::new(Some(start_result)),
                states: Mutex::new(Vec::new()),
                fetches: Mutex::new(0),
            }
        }

        fn with_states(self, states: Vec<MigrationStatus>) -> Self {
            *self.states.lock().unwrap() = states;
            self
        }
    }

    #[async_trait]
    impl MigrationApi for StubApi {
        async fn create_migration_source(&self, _github_org: &str) -> Result<String, ApiError> {
            Ok("source-1".to_string())
        }

        async fn start_migration(
            &self,
            _source_id: &str,
            _request: &MigrationRequest,
        ) -> Result<String, ApiError> {
            self.start_result.lock().unwrap().take().expect("one start")
        }

        async fn get_migration(&self, _migration_id: &str) -> Result<MigrationStatus, ApiError> {
            let mut fetches = self.fetches.lock().unwrap();
            let mut states = self.states.lock().unwrap();
            *fetches += 1;
            if states.is_empty() {
                return Ok(MigrationStatus {
                    state: MigrationState::Queued,
                    repository_url: None,
                    failure_reason: None,
                });
            }
            Ok(states.remove(0))
        }
    }

    fn request() -> MigrationRequest {
        MigrationRequest {
            source_repo_url: "https://dev.azure.com/fabrikam/Tools/_git/alpha".to_string(),
            github_org: "fabrikam-gh".to_string(),
            github_repo: "Tools-alpha".to_string(),
            visibility: RepoVisibility::Private,
            credentials: Credentials {
                source_pat: Secret::new("src"),
                github_pat: Secret::new("gh"),
            },
        }
    }

    fn status(state: MigrationState, failure_reason: Option<&str>) -> MigrationStatus {
        MigrationStatus {
            state,
            repository_url: None,
            failure_reason: failure_reason.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_launch_returns_remote_determined_handle() {
        tokio_test::block_on(async {
            let api = Arc::new(
                StubApi::new(Ok("mig-1".to_string()))
                    .with_states(vec![status(MigrationState::InProgress, None)]),
            );
            let launcher = MigrationLauncher::new(api);

            let outcome = launcher.launch(&request()).await.expect("launch");
            match outcome {
                LaunchOutcome::Started(handle) => {
                    assert_eq!(handle.id, "mig-1");
                    assert_eq!(handle.state, MigrationState::InProgress);
                }
                LaunchOutcome::AlreadyExists => panic!("expected started"),
            }
        });
    }

    #[test]
    fn test_already_exists_is_an_idempotent_no_op() {
        tokio_test::block_on(async {
            let api = Arc::new(StubApi::new(Err(ApiError::AlreadyExists(
                "A repository called fabrikam-gh/Tools-alpha already exists".to_string(),
            ))));
            let launcher = MigrationLauncher::new(api.clone());
            let poller = MigrationPoller::new(api);

            let result = launcher.migrate(&request(), true, &poller).await;
            assert!(matches!(result, Ok(None)));
        });
    }

    #[test]
    fn test_other_rejections_surface_as_submission_errors() {
        tokio_test::block_on(async {
            let api = Arc::new(StubApi::new(Err(ApiError::Remote(
                "insufficient permissions".to_string(),
            ))));
            let launcher = MigrationLauncher::new(api);

            let result = launcher.launch(&request()).await;
            match result {
                Err(MigrateError::Submission(message)) => {
                    assert!(message.contains("insufficient permissions"));
                }
                other => panic!("expected submission error, got {:?}", other.map(|_| ())),
            }
        });
    }

    #[test]
    fn test_migrate_with_wait_surfaces_terminal_failure() {
        tokio_test::block_on(async {
            let api = Arc::new(StubApi::new(Ok("mig-2".to_string())).with_states(vec![
                status(MigrationState::Queued, None),
                status(MigrationState::Failed, Some("archive too large")),
            ]));
            let launcher = MigrationLauncher::new(api.clone());
            let poller = MigrationPoller::new(api).with_interval(std::time::Duration::ZERO);

            let result = launcher.migrate(&request(), true, &poller).await;
            match result {
                Err(MigrateError::Failed { id, reason }) => {
                    assert_eq!(id, "mig-2");
                    assert_eq!(reason, "archive too large");
                }
                other => panic!("expected failed migration, got {:?}", other.map(|_| ())),
            }
        });
    }

    #[test]
    fn test_migrate_without_wait_returns_queued_handle() {
        tokio_test::block_on(async {
            let api = Arc::new(
                StubApi::new(Ok("mig-3".to_string()))
                    .with_states(vec![status(MigrationState::Queued, None)]),
            );
            let launcher = MigrationLauncher::new(api.clone());
            let poller = MigrationPoller::new(api);

            let handle = launcher
                .migrate(&request(), false, &poller)
                .await
                .expect("migrate")
                .expect("handle");
            assert_eq!(handle.id, "mig-3");
            assert_eq!(handle.state, MigrationState::Queued);
        });
    }
}
