//! The wait-for-migration command: poll an already-queued migration to completion.

use std::sync::Arc;

use anyhow::bail;

use gitshift_core::prelude::{
    CredentialProvider, MigrationHandle, MigrationPoller, MigrationState,
};

use crate::cli::WaitForMigrationArgs;
use crate::env::EnvCredentialProvider;
use crate::github::GithubApi;
use crate::report::LogReporter;

pub async fn run(args: WaitForMigrationArgs) -> anyhow::Result<()> {
    let provider = EnvCredentialProvider::new(None, args.github_pat.clone());
    let github_pat = provider.github_pat()?;

    let api = Arc::new(GithubApi::new(github_pat));
    let poller = MigrationPoller::new(api)
        .with_reporter(Arc::new(LogReporter))
        .with_cancellation(super::interrupt_token());

    let handle = MigrationHandle::new(args.migration_id.clone(), MigrationState::Queued);
    let final_handle = poller.await_migration(&handle).await?;

    if final_handle.state == MigrationState::Failed {
        let reason = final_handle
            .failure_reason
            .unwrap_or_else(|| "no failure reason reported".to_string());
        bail!("migration {} failed: {}", final_handle.id, reason);
    }
    tracing::info!(
        migration_id = %final_handle.id,
        state = %final_handle.state,
        "migration finished"
    );
    Ok(())
}
