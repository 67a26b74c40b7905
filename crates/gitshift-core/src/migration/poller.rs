//! Migration status poller
//!
//! Drives a migration handle to a terminal state by re-fetching from the
//! remote source of truth. The wait is unbounded by design: remote
//! migrations can legitimately take hours.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::api::MigrationApi;
use crate::migration::{MigrateError, MigrationHandle, MigrationState};
use crate::progress::{ProgressEvent, ProgressReporter};

/// Fixed interval between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Polls migration handles until they reach a terminal state.
///
/// The poll loop suspends cooperatively between fetches, so many handles
/// can be polled concurrently on one thread (see [`await_many`]).
///
/// [`await_many`]: MigrationPoller::await_many
pub struct MigrationPoller {
    api: Arc<dyn MigrationApi>,
    interval: Duration,
    reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation: Option<CancellationToken>,
}

impl MigrationPoller {
    pub fn new(api: Arc<dyn MigrationApi>) -> Self {
        Self {
            api,
            interval: DEFAULT_POLL_INTERVAL,
            reporter: None,
            cancellation: None,
        }
    }

    /// Override the fixed poll interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Attach a progress reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Allow the wait to be aborted between polls. Cancellation never
    /// marks the remote migration failed; it continues independently.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Poll one handle to a terminal state.
    ///
    /// Fetches immediately, then sleeps the fixed interval between
    /// re-fetches. A failed fetch is indistinguishable from "still in
    /// progress": it is logged and retried on the next tick.
    pub async fn await_migration(
        &self,
        handle: &MigrationHandle,
    ) -> Result<MigrationHandle, MigrateError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.api.get_migration(&handle.id).await {
                Ok(status) if status.state.is_terminal() => {
                    let failure_reason = if status.state == MigrationState::Failed {
                        status.failure_reason
                    } else {
                        None
                    };
                    tracing::info!(
                        migration_id = %handle.id,
                        state = %status.state,
                        attempts = attempt,
                        "migration reached terminal state"
                    );
                    let mut final_handle = MigrationHandle::new(handle.id.clone(), status.state);
                    final_handle.failure_reason = failure_reason;
                    self.report(
                        ProgressEvent::new(Some(handle.id.clone()), "migration_completed")
                            .with_message(status.state.to_string())
                            .with_attempt(attempt),
                    )
                    .await;
                    return Ok(final_handle);
                }
                Ok(status) => {
                    tracing::info!(
                        migration_id = %handle.id,
                        state = %status.state,
                        attempt = attempt,
                        "migration in progress, waiting"
                    );
                    self.report(
                        ProgressEvent::new(Some(handle.id.clone()), "migration_pending")
                            .with_message(status.state.to_string())
                            .with_attempt(attempt),
                    )
                    .await;
                }
                Err(err) => {
                    tracing::warn!(
                        migration_id = %handle.id,
                        attempt = attempt,
                        error = %err,
                        "poll fetch failed, retrying on next tick"
                    );
                    self.report(
                        ProgressEvent::new(Some(handle.id.clone()), "migration_pending")
                            .with_message(err.to_string())
                            .with_attempt(attempt),
                    )
                    .await;
                }
            }

            self.wait_for_next_tick(&handle.id).await?;
        }
    }

    /// Poll several handles concurrently, preserving input order in the
    /// returned results.
    pub async fn await_many(
        &self,
        handles: &[MigrationHandle],
    ) -> Vec<Result<MigrationHandle, MigrateError>> {
        let mut in_flight = FuturesUnordered::new();
        for (index, handle) in handles.iter().enumerate() {
            in_flight.push(async move { (index, self.await_migration(handle).await) });
        }

        let mut results: Vec<Option<Result<MigrationHandle, MigrateError>>> =
            (0..handles.len()).map(|_| None).collect();
        while let Some((index, result)) = in_flight.next().await {
            results[index] = Some(result);
        }
        results
            .into_iter()
            .map(|slot| slot.expect("every handle produces exactly one result"))
            .collect()
    }

    async fn wait_for_next_tick(&self, migration_id: &str) -> Result<(), MigrateError> {
        match &self.cancellation {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!(
                            migration_id = %migration_id,
                            "wait cancelled; the remote migration continues"
                        );
                        Err(MigrateError::Cancelled(migration_id.to_string()))
                    }
                    _ = sleep(self.interval) => Ok(()),
                }
            }
            None => {
                sleep(self.interval).await;
                Ok(())
            }
        }
    }

    async fn report(&self, event: ProgressEvent) {
        if let Some(reporter) = &self.reporter {
            if let Err(err) = reporter.report(event).await {
                tracing::warn!("failed to report poll progress: {}", err);
            }
        }
    }
}
