use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use gitshift_core::prelude::*;

use crate::commands;

#[derive(Debug, Parser)]
#[command(
    name = "gitshift",
    about = "Migrate Azure DevOps / Bitbucket Server repositories to GitHub"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit one repository migration, optionally waiting for it to finish
    MigrateRepo(MigrateRepoArgs),
    /// Generate an ordered migration script from an inventory document
    GenerateScript(GenerateScriptArgs),
    /// Poll an existing migration until it reaches a terminal state
    WaitForMigration(WaitForMigrationArgs),
}

#[derive(Debug, Args, Clone)]
pub struct MigrateRepoArgs {
    #[arg(long)]
    pub source_org: String,
    #[arg(long)]
    pub source_project: String,
    #[arg(long)]
    pub source_repo: String,
    #[arg(long)]
    pub github_org: String,
    #[arg(long)]
    pub github_repo: String,
    /// Defaults to private. Valid values are public, private, internal
    #[arg(long, value_enum, default_value_t = VisibilityArg::Private)]
    pub target_repo_visibility: VisibilityArg,
    /// Synchronously wait for the migration to finish
    #[arg(long, conflicts_with = "queue_only")]
    pub wait: bool,
    /// Print only the queued migration id on stdout (for generated scripts)
    #[arg(long)]
    pub queue_only: bool,
    /// Source-platform token; falls back to the SOURCE_PAT env variable
    #[arg(long)]
    pub source_pat: Option<String>,
    /// GitHub token; falls back to the GH_PAT env variable
    #[arg(long)]
    pub github_pat: Option<String>,
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum VisibilityArg {
    Public,
    Private,
    Internal,
}

impl From<VisibilityArg> for RepoVisibility {
    fn from(value: VisibilityArg) -> Self {
        match value {
            VisibilityArg::Public => RepoVisibility::Public,
            VisibilityArg::Private => RepoVisibility::Private,
            VisibilityArg::Internal => RepoVisibility::Internal,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct GenerateScriptArgs {
    /// Inventory document (JSON) describing projects, repos, and teams
    #[arg(long)]
    pub inventory: PathBuf,
    #[arg(long, default_value = "migrate.sh")]
    pub output: PathBuf,
    /// Emit one strict linear order instead of parallel batches
    #[arg(long)]
    pub sequential: bool,
    #[arg(long)]
    pub create_teams: bool,
    #[arg(long, requires = "create_teams")]
    pub link_idp_groups: bool,
    #[arg(long)]
    pub lock_source_repos: bool,
    #[arg(long)]
    pub integrate_boards: bool,
    #[arg(long)]
    pub rewire_pipelines: bool,
    #[arg(long)]
    pub download_migration_logs: bool,
    #[arg(long)]
    pub verbose: bool,
}

impl GenerateScriptArgs {
    pub fn toggles(&self) -> FeatureToggles {
        FeatureToggles::default()
            .with_create_teams(self.create_teams)
            .with_link_idp_groups(self.link_idp_groups)
            .with_lock_source_repos(self.lock_source_repos)
            .with_integrate_boards(self.integrate_boards)
            .with_rewire_pipelines(self.rewire_pipelines)
            .with_download_migration_logs(self.download_migration_logs)
    }

    pub fn mode(&self) -> ExecutionMode {
        if self.sequential {
            ExecutionMode::Sequential
        } else {
            ExecutionMode::Parallel
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct WaitForMigrationArgs {
    #[arg(long)]
    pub migration_id: String,
    /// GitHub token; falls back to the GH_PAT env variable
    #[arg(long)]
    pub github_pat: Option<String>,
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::MigrateRepo(args) => {
                ensure_log_filter(args.verbose);
                commands::migrate_repo::run(args).await
            }
            Command::GenerateScript(args) => {
                ensure_log_filter(args.verbose);
                commands::generate_script::run(args).await
            }
            Command::WaitForMigration(args) => {
                ensure_log_filter(args.verbose);
                commands::wait_for_migration::run(args).await
            }
        }
    }
}

/// Initialize the log filter once. Generated scripts capture stdout, so
/// all log output goes to stderr.
fn ensure_log_filter(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
