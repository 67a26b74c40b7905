//! Renders core progress events as log lines.

use async_trait::async_trait;

use gitshift_core::prelude::{ProgressEvent, ProgressReporter};

/// Progress reporter that forwards every event to `tracing`.
pub struct LogReporter;

#[async_trait]
impl ProgressReporter for LogReporter {
    async fn report(&self, event: ProgressEvent) -> Result<(), String> {
        let id = event.migration_id.as_deref().unwrap_or("-");
        let message = event.message.as_deref().unwrap_or("");
        match event.attempt {
            Some(attempt) => tracing::info!(
                migration_id = %id,
                attempt = attempt,
                "{}: {}",
                event.phase,
                message
            ),
            None => tracing::info!(migration_id = %id, "{}: {}", event.phase, message),
        }
        Ok(())
    }
}
