//! OrderedScript: the result of one generation pass.

use serde::{Deserialize, Serialize};

use super::{ExecutionMode, Step, StepId};

/// One entry in an ordered script: either a step, or a rendezvous marker
/// requiring all migrations in a parallel batch to reach a terminal state
/// before dependents proceed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum ScriptItem {
    Step(Step),
    Rendezvous {
        /// Migration steps the batch waits on, in emission order.
        migrations: Vec<StepId>,
    },
}

/// The ordered (or partitioned) sequence of steps plus rendezvous markers.
///
/// Constructed once per generation invocation, immediately rendered, then
/// discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedScript {
    pub mode: ExecutionMode,
    pub items: Vec<ScriptItem>,
}

impl OrderedScript {
    pub fn new(mode: ExecutionMode, items: Vec<ScriptItem>) -> Self {
        Self { mode, items }
    }

    /// Iterate over the steps, skipping rendezvous markers.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.items.iter().filter_map(|item| match item {
            ScriptItem::Step(step) => Some(step),
            ScriptItem::Rendezvous { .. } => None,
        })
    }

    /// Look up a step by ID.
    pub fn get_step(&self, id: impl AsRef<str>) -> Option<&Step> {
        let id = id.as_ref();
        self.steps().find(|s| s.id.as_str() == id)
    }

    pub fn step_count(&self) -> usize {
        self.steps().count()
    }
}
