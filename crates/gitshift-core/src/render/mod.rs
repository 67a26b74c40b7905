//! Script renderer module
//!
//! Serializes an [`OrderedScript`](crate::types::OrderedScript) into
//! executable shell text. Rendering is deterministic: identical input
//! always produces byte-identical output, so generated scripts can be
//! diffed and tested by comparison.

use crate::planner::target_repo_name;
use crate::types::{ExecutionMode, OrderedScript, ScriptItem, Step, StepSpec};

/// Renders ordered scripts as shell statements invoking the CLI itself.
///
/// Migration-start statements in parallel mode capture the remote
/// migration id into a named variable so that the rendezvous wait
/// statements can reference them.
#[derive(Debug, Clone)]
pub struct ScriptRenderer {
    source_org: String,
    github_org: String,
}

impl ScriptRenderer {
    pub fn new(source_org: impl Into<String>, github_org: impl Into<String>) -> Self {
        Self {
            source_org: source_org.into(),
            github_org: github_org.into(),
        }
    }

    pub fn render(&self, script: &OrderedScript) -> String {
        let mut out = String::new();
        out.push_str("#!/usr/bin/env bash\n");
        out.push_str(&format!(
            "# Generated by gitshift generate-script (mode: {})\n",
            script.mode.as_str()
        ));

        // Blank-line separators per project; team steps carry no project
        // and open their own group.
        let mut last_project: Option<Option<String>> = None;
        for item in &script.items {
            match item {
                ScriptItem::Step(step) => {
                    let project = step.spec.project().map(|p| p.to_string());
                    if last_project.as_ref() != Some(&project) {
                        out.push('\n');
                        if let Some(name) = &project {
                            out.push_str(&format!("# Project: {}\n", name));
                        }
                        last_project = Some(project);
                    }
                    out.push_str(&self.render_step(step, script.mode));
                    out.push('\n');
                }
                ScriptItem::Rendezvous { migrations } => {
                    out.push_str("# Wait for all migrations in this batch\n");
                    for id in migrations {
                        // An already-existing target queues nothing, so its
                        // captured id is empty and there is nothing to wait on.
                        let var = migration_variable(id.as_str());
                        out.push_str(&format!(
                            "if [ -n \"${var}\" ]; then gitshift wait-for-migration --migration-id \"${var}\"; fi\n",
                        ));
                    }
                }
            }
        }
        out
    }

    fn render_step(&self, step: &Step, mode: ExecutionMode) -> String {
        match &step.spec {
            StepSpec::CreateTeam { team, idp_group } => {
                let mut line = format!(
                    "gitshift create-team --github-org \"{}\" --team \"{}\"",
                    self.github_org, team
                );
                if let Some(group) = idp_group {
                    line.push_str(&format!(" --idp-group \"{}\"", group));
                }
                line
            }
            StepSpec::LinkIdpGroup { team, idp_group } => format!(
                "gitshift link-idp-group --github-org \"{}\" --team \"{}\" --idp-group \"{}\"",
                self.github_org, team, idp_group
            ),
            StepSpec::MigrateRepo {
                project,
                repo,
                github_repo,
            } => {
                let base = format!(
                    "gitshift migrate-repo --source-org \"{}\" --source-project \"{}\" --source-repo \"{}\" --github-org \"{}\" --github-repo \"{}\"",
                    self.source_org, project, repo, self.github_org, github_repo
                );
                match mode {
                    ExecutionMode::Sequential => format!("{} --wait", base),
                    ExecutionMode::Parallel => format!(
                        "{}=\"$({} --queue-only)\"",
                        migration_variable(step.id.as_str()),
                        base
                    ),
                }
            }
            StepSpec::BindTeamRole {
                team,
                project,
                repo,
                role,
            } => format!(
                "gitshift add-team-to-repo --github-org \"{}\" --github-repo \"{}\" --team \"{}\" --role \"{}\"",
                self.github_org,
                target_repo_name(project, repo),
                team,
                role.as_str()
            ),
            StepSpec::LockSourceRepo { project, repo } => format!(
                "gitshift lock-source-repo --source-org \"{}\" --source-project \"{}\" --source-repo \"{}\"",
                self.source_org, project, repo
            ),
            StepSpec::IntegrateBoards { project, repo } => format!(
                "gitshift integrate-boards --source-org \"{}\" --source-project \"{}\" --github-org \"{}\" --github-repo \"{}\"",
                self.source_org,
                project,
                self.github_org,
                target_repo_name(project, repo)
            ),
            StepSpec::RewirePipeline {
                project,
                repo,
                pipeline,
            } => format!(
                "gitshift rewire-pipeline --source-org \"{}\" --source-project \"{}\" --pipeline \"{}\" --github-org \"{}\" --github-repo \"{}\"",
                self.source_org,
                project,
                pipeline,
                self.github_org,
                target_repo_name(project, repo)
            ),
            StepSpec::DownloadLogs { project, repo } => format!(
                "gitshift download-logs --github-org \"{}\" --github-repo \"{}\"",
                self.github_org,
                target_repo_name(project, repo)
            ),
        }
    }
}

/// Shell variable holding a captured migration id, derived from the step
/// id. Stable for a given step, valid as a shell identifier.
fn migration_variable(step_id: &str) -> String {
    let mut name = String::from("MIGRATION_ID_");
    for ch in step_id.trim_start_matches("migrate:").chars() {
        if ch.is_ascii_alphanumeric() {
            name.push(ch.to_ascii_uppercase());
        } else {
            name.push('_');
        }
    }
    name
}
