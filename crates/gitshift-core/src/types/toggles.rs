//! Feature toggles and execution mode for one generation pass.

use serde::{Deserialize, Serialize};

/// Boolean switches controlling which optional step kinds are emitted.
///
/// Immutable for the duration of one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureToggles {
    /// Emit team-creation steps for teams referenced by role bindings.
    #[serde(default)]
    pub create_teams: bool,
    /// Emit identity-provider linking steps for created teams.
    #[serde(default)]
    pub link_idp_groups: bool,
    /// Emit lock/disable steps for migrated source repositories.
    #[serde(default)]
    pub lock_source_repos: bool,
    /// Emit work-item-tracker integration steps.
    #[serde(default)]
    pub integrate_boards: bool,
    /// Emit build-pipeline rewiring steps.
    #[serde(default)]
    pub rewire_pipelines: bool,
    /// Emit migration-log download steps.
    #[serde(default)]
    pub download_migration_logs: bool,
}

impl FeatureToggles {
    pub fn with_create_teams(mut self, enabled: bool) -> Self {
        self.create_teams = enabled;
        self
    }

    pub fn with_link_idp_groups(mut self, enabled: bool) -> Self {
        self.link_idp_groups = enabled;
        self
    }

    pub fn with_lock_source_repos(mut self, enabled: bool) -> Self {
        self.lock_source_repos = enabled;
        self
    }

    pub fn with_integrate_boards(mut self, enabled: bool) -> Self {
        self.integrate_boards = enabled;
        self
    }

    pub fn with_rewire_pipelines(mut self, enabled: bool) -> Self {
        self.rewire_pipelines = enabled;
        self
    }

    pub fn with_download_migration_logs(mut self, enabled: bool) -> Self {
        self.download_migration_logs = enabled;
        self
    }
}

/// How the generated script orders independent steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One strict linear order; every step waits for its remote effect.
    Sequential,
    /// Independent repo migrations are queued together and rendezvous
    /// before dependent steps run.
    #[default]
    Parallel,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Parallel => "parallel",
        }
    }
}
