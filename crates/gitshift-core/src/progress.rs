//! Progress reporting
//!
//! The core emits human-readable progress events (poll status, launch
//! outcomes); a logging collaborator renders them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One observable progress notification.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Remote migration id, when one exists yet.
    pub migration_id: Option<String>,
    /// Phase label, e.g. migration_queued/migration_pending/migration_completed.
    pub phase: String,
    /// Optional human-readable message.
    pub message: Option<String>,
    /// Poll attempt counter, for pending phases.
    pub attempt: Option<u32>,
    pub at: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(migration_id: Option<String>, phase: impl Into<String>) -> Self {
        Self {
            migration_id,
            phase: phase.into(),
            message: None,
            attempt: None,
            at: Utc::now(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }
}

/// Sink interface for progress reporting.
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    async fn report(&self, event: ProgressEvent) -> Result<(), String>;
}
