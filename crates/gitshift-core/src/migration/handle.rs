//! Migration handle and state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of one remote migration.
///
/// Queued -> InProgress -> {Succeeded | Failed}; the last two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationState {
    Queued,
    InProgress,
    Succeeded,
    Failed,
}

impl MigrationState {
    /// Parse the remote service's state string. Unknown states are treated
    /// as in-progress so the poller keeps watching rather than failing.
    pub fn from_remote(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "QUEUED" => MigrationState::Queued,
            "SUCCEEDED" => MigrationState::Succeeded,
            "FAILED" => MigrationState::Failed,
            _ => MigrationState::InProgress,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MigrationState::Succeeded | MigrationState::Failed)
    }

    pub fn is_pending(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationState::Queued => "queued",
            MigrationState::InProgress => "in_progress",
            MigrationState::Succeeded => "succeeded",
            MigrationState::Failed => "failed",
        }
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque reference to one in-flight remote migration.
///
/// Mutated only by re-fetching from the remote source of truth; discarded
/// when the CLI invocation ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationHandle {
    pub id: String,
    pub state: MigrationState,
    /// Populated only in the failed state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl MigrationHandle {
    pub fn new(id: impl Into<String>, state: MigrationState) -> Self {
        Self {
            id: id.into(),
            state,
            failure_reason: None,
        }
    }

    pub fn with_failure_reason(mut self, reason: impl Into<String>) -> Self {
        self.failure_reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_state_parsing() {
        assert_eq!(MigrationState::from_remote("QUEUED"), MigrationState::Queued);
        assert_eq!(
            MigrationState::from_remote("succeeded"),
            MigrationState::Succeeded
        );
        assert_eq!(MigrationState::from_remote("FAILED"), MigrationState::Failed);
        // Unknown remote states keep the poller watching.
        assert_eq!(
            MigrationState::from_remote("PENDING_VALIDATION"),
            MigrationState::InProgress
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(MigrationState::Succeeded.is_terminal());
        assert!(MigrationState::Failed.is_terminal());
        assert!(MigrationState::Queued.is_pending());
        assert!(MigrationState::InProgress.is_pending());
    }
}
