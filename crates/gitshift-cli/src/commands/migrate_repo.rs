//! The migrate-repo command: submit one repository migration.

use std::sync::Arc;

use anyhow::Context;

use gitshift_core::prelude::{
    CredentialProvider, Credentials, LaunchOutcome, MigrationLauncher, MigrationPoller,
    MigrationRequest,
};

use crate::cli::MigrateRepoArgs;
use crate::env::EnvCredentialProvider;
use crate::github::GithubApi;
use crate::report::LogReporter;

pub async fn run(args: MigrateRepoArgs) -> anyhow::Result<()> {
    let provider = EnvCredentialProvider::new(args.source_pat.clone(), args.github_pat.clone());
    let source_pat = provider.source_pat()?;
    let github_pat = provider.github_pat()?;

    let request = MigrationRequest {
        source_repo_url: source_repo_url(&args.source_org, &args.source_project, &args.source_repo),
        github_org: args.github_org.clone(),
        github_repo: args.github_repo.clone(),
        visibility: args.target_repo_visibility.into(),
        credentials: Credentials {
            source_pat,
            github_pat: github_pat.clone(),
        },
    };

    let api = Arc::new(GithubApi::new(github_pat));
    let reporter = Arc::new(LogReporter);
    let launcher = MigrationLauncher::new(api.clone()).with_reporter(reporter.clone());
    let poller = MigrationPoller::new(api)
        .with_reporter(reporter)
        .with_cancellation(super::interrupt_token());

    if args.queue_only {
        // Generated scripts capture stdout, so only the id may go there.
        match launcher.launch(&request).await? {
            LaunchOutcome::Started(handle) => println!("{}", handle.id),
            LaunchOutcome::AlreadyExists => {}
        }
        return Ok(());
    }

    let outcome = launcher
        .migrate(&request, args.wait, &poller)
        .await
        .with_context(|| format!("migrating {} to {}", request.source_repo_url, args.github_repo))?;

    if let Some(handle) = outcome {
        tracing::info!(
            migration_id = %handle.id,
            state = %handle.state,
            "migration {}",
            if args.wait { "finished" } else { "queued" }
        );
    }
    Ok(())
}

/// Canonical source repository URL. Spaces are the only characters the
/// source platforms allow that need escaping here.
fn source_repo_url(org: &str, project: &str, repo: &str) -> String {
    format!("https://dev.azure.com/{}/{}/_git/{}", org, project, repo).replace(' ', "%20")
}
