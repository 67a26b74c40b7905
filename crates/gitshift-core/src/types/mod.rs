//! Core type definitions for gitshift
//!
//! This module contains the fundamental types used throughout the system:
//! - Inventory: the entities a generated script acts on
//! - FeatureToggles / ExecutionMode: what to emit and how to order it
//! - Step: individual migration unit with dependencies
//! - OrderedScript: the ordered (or batched) result of a generation pass

mod inventory;
mod script;
mod step;
mod toggles;

pub use inventory::{Inventory, Project, Repository, TeamRepoRole, TeamRole};
pub use script::{OrderedScript, ScriptItem};
pub use step::{OrderingKey, Step, StepId, StepSpec};
pub use toggles::{ExecutionMode, FeatureToggles};
