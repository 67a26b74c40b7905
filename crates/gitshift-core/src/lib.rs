//! # Gitshift Core
//!
//! Migration orchestration core for cross-platform source-control
//! migrations (Azure DevOps / Bitbucket Server -> GitHub).
//!
//! This crate contains:
//! - Inventory / FeatureToggles / Step / OrderedScript definitions
//! - The dependency/ordering engine that turns an inventory into an
//!   ordered migration script
//! - The script renderer
//! - The migration lifecycle state machine (launch + poll)
//!
//! This crate does NOT care about:
//! - How credentials are looked up
//! - How the remote API is reached over the wire
//! - Where rendered scripts are written
//! - How progress lines are displayed

pub mod api;
pub mod migration;
pub mod planner;
pub mod progress;
pub mod render;
pub mod types;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::api::{
        ApiError, CredentialProvider, Credentials, MigrationApi, MigrationRequest,
        MigrationStatus, MissingCredential, RepoVisibility, ScriptSink, Secret,
    };
    pub use crate::migration::{
        LaunchOutcome, MigrateError, MigrationHandle, MigrationLauncher, MigrationPoller,
        MigrationState, DEFAULT_POLL_INTERVAL,
    };
    pub use crate::planner::{PlanError, ScriptPlanner};
    pub use crate::progress::{ProgressEvent, ProgressReporter};
    pub use crate::render::ScriptRenderer;
    pub use crate::types::{
        ExecutionMode, FeatureToggles, Inventory, OrderedScript, OrderingKey, Project, Repository,
        ScriptItem, Step, StepId, StepSpec, TeamRepoRole, TeamRole,
    };
}

// Re-export key types at crate root
pub use api::{ApiError, MigrationApi, MigrationRequest, MigrationStatus};
pub use migration::{
    LaunchOutcome, MigrateError, MigrationHandle, MigrationLauncher, MigrationPoller,
    MigrationState,
};
pub use planner::{PlanError, ScriptPlanner};
pub use progress::{ProgressEvent, ProgressReporter};
pub use render::ScriptRenderer;
pub use types::{
    ExecutionMode, FeatureToggles, Inventory, OrderedScript, ScriptItem, Step, StepId, StepSpec,
};
