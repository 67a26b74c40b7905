//! Step type definitions
//!
//! Step represents one unit of orchestrated work in a generated script.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::TeamRepoRole;

/// Strongly-typed Step ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct StepId(pub String);

impl StepId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for StepId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for StepId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<StepId> for String {
    fn from(value: StepId) -> Self {
        value.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for StepId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<&str> for StepId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Position of a step in the emitted order. A step's key is strictly
/// greater than the keys of all steps it depends on.
pub type OrderingKey = u32;

/// The work a step performs, with everything needed to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepSpec {
    CreateTeam {
        team: String,
        idp_group: Option<String>,
    },
    LinkIdpGroup {
        team: String,
        idp_group: String,
    },
    MigrateRepo {
        project: String,
        repo: String,
        github_repo: String,
    },
    BindTeamRole {
        team: String,
        project: String,
        repo: String,
        role: TeamRepoRole,
    },
    LockSourceRepo {
        project: String,
        repo: String,
    },
    IntegrateBoards {
        project: String,
        repo: String,
    },
    RewirePipeline {
        project: String,
        repo: String,
        pipeline: String,
    },
    DownloadLogs {
        project: String,
        repo: String,
    },
}

impl StepSpec {
    /// Tie-break rank for steps with no dependency relation:
    /// team create < idp link < repo migrate < role bind < hardening < logs.
    pub fn priority(&self) -> u8 {
        match self {
            StepSpec::CreateTeam { .. } => 0,
            StepSpec::LinkIdpGroup { .. } => 1,
            StepSpec::MigrateRepo { .. } => 2,
            StepSpec::BindTeamRole { .. } => 3,
            StepSpec::LockSourceRepo { .. }
            | StepSpec::IntegrateBoards { .. }
            | StepSpec::RewirePipeline { .. } => 4,
            StepSpec::DownloadLogs { .. } => 5,
        }
    }

    /// Project this step targets, when it targets one.
    pub fn project(&self) -> Option<&str> {
        match self {
            StepSpec::CreateTeam { .. } | StepSpec::LinkIdpGroup { .. } => None,
            StepSpec::MigrateRepo { project, .. }
            | StepSpec::BindTeamRole { project, .. }
            | StepSpec::LockSourceRepo { project, .. }
            | StepSpec::IntegrateBoards { project, .. }
            | StepSpec::RewirePipeline { project, .. }
            | StepSpec::DownloadLogs { project, .. } => Some(project),
        }
    }
}

/// A single step in an ordered script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Unique identifier for this step (logical ID)
    pub id: StepId,
    /// Emission position; strictly greater than every dependency's key.
    pub key: OrderingKey,
    /// Human-readable label
    pub label: String,
    /// IDs of steps this step depends on
    #[serde(default)]
    pub depends_on: Vec<StepId>,
    /// The work this step performs
    pub spec: StepSpec,
}

impl Step {
    pub fn new(id: impl Into<StepId>, key: OrderingKey, label: impl Into<String>, spec: StepSpec) -> Self {
        Self {
            id: id.into(),
            key,
            label: label.into(),
            depends_on: Vec::new(),
            spec,
        }
    }

    /// Add dependencies
    pub fn with_depends_on(mut self, deps: Vec<StepId>) -> Self {
        self.depends_on = deps;
        self
    }
}
