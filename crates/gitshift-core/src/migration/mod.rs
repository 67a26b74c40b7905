//! Migration lifecycle
//!
//! One remote migration moves Queued -> InProgress -> {Succeeded | Failed}.
//! The launcher submits and interprets "already exists" as an idempotent
//! no-op; the poller drives a handle to a terminal state with a fixed
//! poll cadence.

mod handle;
mod launcher;
mod poller;

pub use handle::{MigrationHandle, MigrationState};
pub use launcher::{LaunchOutcome, MigrateError, MigrationLauncher};
pub use poller::{MigrationPoller, DEFAULT_POLL_INTERVAL};
