//! Inventory type definitions
//!
//! The Inventory describes everything a generated script must act on:
//! source projects, their repositories, and the teams bound to them.

use serde::{Deserialize, Serialize};

/// Role a team holds on a migrated repository (GitHub's permission set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRepoRole {
    Pull,
    Triage,
    Push,
    Maintain,
    Admin,
}

impl TeamRepoRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamRepoRole::Pull => "pull",
            TeamRepoRole::Triage => "triage",
            TeamRepoRole::Push => "push",
            TeamRepoRole::Maintain => "maintain",
            TeamRepoRole::Admin => "admin",
        }
    }
}

/// Binding of a team (by name) to a repository with a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRole {
    pub team: String,
    pub role: TeamRepoRole,
    /// Identity-provider group to link the team to, when idp linking is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idp_group: Option<String>,
}

impl TeamRole {
    pub fn new(team: impl Into<String>, role: TeamRepoRole) -> Self {
        Self {
            team: team.into(),
            role,
            idp_group: None,
        }
    }

    pub fn with_idp_group(mut self, group: impl Into<String>) -> Self {
        self.idp_group = Some(group.into());
        self
    }
}

/// A source repository. Belongs to exactly one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    /// Teams bound to this repository after migration.
    #[serde(default)]
    pub team_roles: Vec<TeamRole>,
    /// Build pipelines to rewire to the migrated repository.
    #[serde(default)]
    pub pipelines: Vec<String>,
}

impl Repository {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            team_roles: Vec::new(),
            pipelines: Vec::new(),
        }
    }

    pub fn with_team_roles(mut self, team_roles: Vec<TeamRole>) -> Self {
        self.team_roles = team_roles;
        self
    }

    pub fn with_pipelines(mut self, pipelines: Vec<String>) -> Self {
        self.pipelines = pipelines;
        self
    }
}

/// A source team-project containing repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub repos: Vec<Repository>,
}

impl Project {
    pub fn new(name: impl Into<String>, repos: Vec<Repository>) -> Self {
        Self {
            name: name.into(),
            repos,
        }
    }
}

/// The full set of entities one generation pass acts on.
///
/// Read-only for the duration of a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Source organization (ADO org or BBS server project namespace).
    pub source_org: String,
    /// Target GitHub organization.
    pub github_org: String,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Inventory {
    pub fn new(source_org: impl Into<String>, github_org: impl Into<String>) -> Self {
        Self {
            source_org: source_org.into(),
            github_org: github_org.into(),
            projects: Vec::new(),
        }
    }

    pub fn with_projects(mut self, projects: Vec<Project>) -> Self {
        self.projects = projects;
        self
    }

    /// Total number of repositories across all projects.
    pub fn repo_count(&self) -> usize {
        self.projects.iter().map(|p| p.repos.len()).sum()
    }
}
