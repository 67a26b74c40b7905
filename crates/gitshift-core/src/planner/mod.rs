//! Script planner module
//!
//! The planner is the dependency/ordering engine: given an inventory and
//! the enabled feature toggles it produces an ordered (or batched)
//! sequence of steps that respects per-repository and per-project
//! dependencies.
//!
//! Responsibilities:
//! - Validate the toggle/mode combination and the inventory
//! - Emit steps in dependency order with stable tie-breaks
//! - Batch independent repo migrations behind rendezvous markers in
//!   parallel mode

use std::collections::HashMap;

use thiserror::Error;

use crate::types::{
    ExecutionMode, FeatureToggles, Inventory, OrderedScript, OrderingKey, Project, Repository,
    ScriptItem, Step, StepId, StepSpec,
};

/// Planning errors
#[derive(Debug, Error)]
pub enum PlanError {
    /// Invalid toggle/mode combination or malformed inventory. Fails fast
    /// before any step is emitted.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("inventory contains no repositories")]
    EmptyInventory,
}

/// The dependency/ordering engine.
pub struct ScriptPlanner;

impl ScriptPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Build an ordered script from an inventory and toggles.
    ///
    /// Tie-break between steps with no dependency relation is project
    /// declaration order, then repository declaration order, then step-kind
    /// priority; all three are realized by the emission order below, so the
    /// ordering key is simply the emission index.
    pub fn build(
        &self,
        inventory: &Inventory,
        toggles: &FeatureToggles,
        mode: ExecutionMode,
    ) -> Result<OrderedScript, PlanError> {
        validate_toggles(toggles)?;
        validate_inventory(inventory)?;

        let mut emitter = StepEmitter::new(toggles.clone());

        for project in &inventory.projects {
            emitter.emit_team_steps(project);
            match mode {
                ExecutionMode::Sequential => emitter.emit_sequential_repo_steps(project),
                ExecutionMode::Parallel => emitter.emit_parallel_repo_steps(project),
            }
        }

        // All repo migrations must be queued before any log download is
        // attempted, so log steps go last globally.
        if toggles.download_migration_logs {
            for project in &inventory.projects {
                for repo in &project.repos {
                    emitter.emit_log_step(project, repo);
                }
            }
        }

        let items = emitter.finish();
        tracing::debug!(
            mode = mode.as_str(),
            items = items.len(),
            repos = inventory.repo_count(),
            "planner emitted ordered script"
        );
        Ok(OrderedScript::new(mode, items))
    }
}

impl Default for ScriptPlanner {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_toggles(toggles: &FeatureToggles) -> Result<(), PlanError> {
    // IdP links attach to teams created in the same run; linking without
    // creation is incoherent and must be rejected, not ignored.
    if toggles.link_idp_groups && !toggles.create_teams {
        return Err(PlanError::Configuration(
            "link_idp_groups requires create_teams".to_string(),
        ));
    }
    Ok(())
}

fn validate_inventory(inventory: &Inventory) -> Result<(), PlanError> {
    if inventory.repo_count() == 0 {
        return Err(PlanError::EmptyInventory);
    }

    let mut seen_projects = std::collections::HashSet::new();
    for project in &inventory.projects {
        if !seen_projects.insert(project.name.as_str()) {
            return Err(PlanError::Configuration(format!(
                "project '{}' appears more than once in the inventory",
                project.name
            )));
        }
        let mut seen_repos = std::collections::HashSet::new();
        for repo in &project.repos {
            if !seen_repos.insert(repo.name.as_str()) {
                return Err(PlanError::Configuration(format!(
                    "repository '{}' appears more than once in project '{}'",
                    repo.name, project.name
                )));
            }
        }
    }
    Ok(())
}

/// Accumulates steps with monotonically increasing ordering keys and
/// tracks cross-project team deduplication.
struct StepEmitter {
    toggles: FeatureToggles,
    items: Vec<ScriptItem>,
    next_key: OrderingKey,
    /// Team name -> creation step ID. A team is created at most once per
    /// run, regardless of how many projects or repositories reference it.
    created_teams: HashMap<String, StepId>,
    /// (project, repo) -> migration step ID, for downstream dependencies.
    migrations: HashMap<(String, String), StepId>,
}

impl StepEmitter {
    fn new(toggles: FeatureToggles) -> Self {
        Self {
            toggles,
            items: Vec::new(),
            next_key: 0,
            created_teams: HashMap::new(),
            migrations: HashMap::new(),
        }
    }

    fn finish(self) -> Vec<ScriptItem> {
        self.items
    }

    fn push(&mut self, id: String, label: String, depends_on: Vec<StepId>, spec: StepSpec) -> StepId {
        let key = self.next_key;
        self.next_key += 1;
        let step = Step::new(id, key, label, spec).with_depends_on(depends_on);
        let step_id = step.id.clone();
        self.items.push(ScriptItem::Step(step));
        step_id
    }

    /// Team-creation (and idp-link) steps for every distinct team
    /// referenced by the project's role bindings.
    fn emit_team_steps(&mut self, project: &Project) {
        if !self.toggles.create_teams {
            return;
        }

        for repo in &project.repos {
            for binding in &repo.team_roles {
                if self.created_teams.contains_key(&binding.team) {
                    continue;
                }

                let idp_group = if self.toggles.link_idp_groups {
                    Some(
                        binding
                            .idp_group
                            .clone()
                            .unwrap_or_else(|| binding.team.clone()),
                    )
                } else {
                    None
                };

                let create_id = self.push(
                    format!("create-team:{}", binding.team),
                    format!("Create team '{}'", binding.team),
                    Vec::new(),
                    StepSpec::CreateTeam {
                        team: binding.team.clone(),
                        idp_group: idp_group.clone(),
                    },
                );

                if let Some(group) = idp_group {
                    self.push(
                        format!("link-idp:{}", binding.team),
                        format!("Link team '{}' to idp group '{}'", binding.team, group),
                        vec![create_id.clone()],
                        StepSpec::LinkIdpGroup {
                            team: binding.team.clone(),
                            idp_group: group,
                        },
                    );
                }

                self.created_teams.insert(binding.team.clone(), create_id);
            }
        }
    }

    /// Sequential mode: migrate, bind, and harden one repository at a time.
    fn emit_sequential_repo_steps(&mut self, project: &Project) {
        for repo in &project.repos {
            let migrate_id = self.emit_migrate_step(project, repo);
            self.emit_post_migration_steps(project, repo, &migrate_id);
        }
    }

    /// Parallel mode: queue every migration in the project, rendezvous,
    /// then emit the dependent steps per repository.
    fn emit_parallel_repo_steps(&mut self, project: &Project) {
        let migrate_ids: Vec<StepId> = project
            .repos
            .iter()
            .map(|repo| self.emit_migrate_step(project, repo))
            .collect();

        self.items.push(ScriptItem::Rendezvous {
            migrations: migrate_ids.clone(),
        });

        for (repo, migrate_id) in project.repos.iter().zip(&migrate_ids) {
            self.emit_post_migration_steps(project, repo, migrate_id);
        }
    }

    fn emit_migrate_step(&mut self, project: &Project, repo: &Repository) -> StepId {
        let migrate_id = self.push(
            format!("migrate:{}/{}", project.name, repo.name),
            format!("Migrate repo '{}/{}'", project.name, repo.name),
            Vec::new(),
            StepSpec::MigrateRepo {
                project: project.name.clone(),
                repo: repo.name.clone(),
                github_repo: target_repo_name(&project.name, &repo.name),
            },
        );
        self.migrations.insert(
            (project.name.clone(), repo.name.clone()),
            migrate_id.clone(),
        );
        migrate_id
    }

    fn emit_post_migration_steps(&mut self, project: &Project, repo: &Repository, migrate_id: &StepId) {
        if self.toggles.create_teams {
            for binding in &repo.team_roles {
                let create_id = self
                    .created_teams
                    .get(&binding.team)
                    .cloned()
                    .unwrap_or_default();
                self.push(
                    format!("bind:{}/{}:{}", project.name, repo.name, binding.team),
                    format!(
                        "Grant team '{}' {} on '{}/{}'",
                        binding.team,
                        binding.role.as_str(),
                        project.name,
                        repo.name
                    ),
                    vec![create_id, migrate_id.clone()],
                    StepSpec::BindTeamRole {
                        team: binding.team.clone(),
                        project: project.name.clone(),
                        repo: repo.name.clone(),
                        role: binding.role,
                    },
                );
            }
        }

        if self.toggles.lock_source_repos {
            self.push(
                format!("lock:{}/{}", project.name, repo.name),
                format!("Lock source repo '{}/{}'", project.name, repo.name),
                vec![migrate_id.clone()],
                StepSpec::LockSourceRepo {
                    project: project.name.clone(),
                    repo: repo.name.clone(),
                },
            );
        }

        if self.toggles.integrate_boards {
            self.push(
                format!("boards:{}/{}", project.name, repo.name),
                format!("Integrate boards for '{}/{}'", project.name, repo.name),
                vec![migrate_id.clone()],
                StepSpec::IntegrateBoards {
                    project: project.name.clone(),
                    repo: repo.name.clone(),
                },
            );
        }

        if self.toggles.rewire_pipelines {
            for pipeline in &repo.pipelines {
                self.push(
                    format!("pipeline:{}/{}:{}", project.name, repo.name, pipeline),
                    format!(
                        "Rewire pipeline '{}' for '{}/{}'",
                        pipeline, project.name, repo.name
                    ),
                    vec![migrate_id.clone()],
                    StepSpec::RewirePipeline {
                        project: project.name.clone(),
                        repo: repo.name.clone(),
                        pipeline: pipeline.clone(),
                    },
                );
            }
        }
    }

    fn emit_log_step(&mut self, project: &Project, repo: &Repository) {
        let migrate_id = self
            .migrations
            .get(&(project.name.clone(), repo.name.clone()))
            .cloned()
            .unwrap_or_default();
        self.push(
            format!("logs:{}/{}", project.name, repo.name),
            format!("Download migration log for '{}/{}'", project.name, repo.name),
            vec![migrate_id],
            StepSpec::DownloadLogs {
                project: project.name.clone(),
                repo: repo.name.clone(),
            },
        );
    }
}

/// Target repository name on GitHub: `<project>-<repo>` with spaces
/// collapsed, matching the source system's naming convention.
pub fn target_repo_name(project: &str, repo: &str) -> String {
    format!("{}-{}", project, repo).replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TeamRepoRole, TeamRole};
    use std::collections::HashMap;

    fn two_repo_inventory() -> Inventory {
        Inventory::new("fabrikam", "fabrikam-gh").with_projects(vec![Project::new(
            "Tools",
            vec![
                Repository::new("alpha")
                    .with_team_roles(vec![TeamRole::new("maintainers", TeamRepoRole::Maintain)]),
                Repository::new("beta")
                    .with_team_roles(vec![TeamRole::new("maintainers", TeamRepoRole::Maintain)]),
            ],
        )])
    }

    fn kinds(script: &OrderedScript) -> Vec<String> {
        script
            .items
            .iter()
            .map(|item| match item {
                ScriptItem::Step(step) => match &step.spec {
                    StepSpec::CreateTeam { .. } => "create-team".to_string(),
                    StepSpec::LinkIdpGroup { .. } => "link-idp".to_string(),
                    StepSpec::MigrateRepo { repo, .. } => format!("migrate:{}", repo),
                    StepSpec::BindTeamRole { repo, .. } => format!("bind:{}", repo),
                    StepSpec::LockSourceRepo { repo, .. } => format!("lock:{}", repo),
                    StepSpec::IntegrateBoards { repo, .. } => format!("boards:{}", repo),
                    StepSpec::RewirePipeline { repo, .. } => format!("pipeline:{}", repo),
                    StepSpec::DownloadLogs { repo, .. } => format!("logs:{}", repo),
                },
                ScriptItem::Rendezvous { .. } => "rendezvous".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_sequential_scenario_orders_per_repo() {
        let toggles = FeatureToggles::default()
            .with_create_teams(true)
            .with_lock_source_repos(true);
        let script = ScriptPlanner::new()
            .build(&two_repo_inventory(), &toggles, ExecutionMode::Sequential)
            .expect("plan");

        assert_eq!(
            kinds(&script),
            vec![
                "create-team",
                "migrate:alpha",
                "bind:alpha",
                "lock:alpha",
                "migrate:beta",
                "bind:beta",
                "lock:beta",
            ]
        );
    }

    #[test]
    fn test_parallel_scenario_batches_migrations_with_one_rendezvous() {
        let toggles = FeatureToggles::default()
            .with_create_teams(true)
            .with_lock_source_repos(true);
        let script = ScriptPlanner::new()
            .build(&two_repo_inventory(), &toggles, ExecutionMode::Parallel)
            .expect("plan");

        assert_eq!(
            kinds(&script),
            vec![
                "create-team",
                "migrate:alpha",
                "migrate:beta",
                "rendezvous",
                "bind:alpha",
                "lock:alpha",
                "bind:beta",
                "lock:beta",
            ]
        );

        let rendezvous = script
            .items
            .iter()
            .find_map(|item| match item {
                ScriptItem::Rendezvous { migrations } => Some(migrations.clone()),
                _ => None,
            })
            .expect("rendezvous");
        assert_eq!(rendezvous.len(), 2);
    }

    #[test]
    fn test_team_created_once_across_projects() {
        let inventory = Inventory::new("fabrikam", "fabrikam-gh").with_projects(vec![
            Project::new(
                "One",
                vec![Repository::new("a")
                    .with_team_roles(vec![TeamRole::new("shared", TeamRepoRole::Push)])],
            ),
            Project::new(
                "Two",
                vec![Repository::new("b")
                    .with_team_roles(vec![TeamRole::new("shared", TeamRepoRole::Push)])],
            ),
        ]);
        let toggles = FeatureToggles::default().with_create_teams(true);
        let script = ScriptPlanner::new()
            .build(&inventory, &toggles, ExecutionMode::Sequential)
            .expect("plan");

        let creates = script
            .steps()
            .filter(|s| matches!(s.spec, StepSpec::CreateTeam { .. }))
            .count();
        assert_eq!(creates, 1);

        // Both bind steps reference the single creation step.
        let binds: Vec<_> = script
            .steps()
            .filter(|s| matches!(s.spec, StepSpec::BindTeamRole { .. }))
            .collect();
        assert_eq!(binds.len(), 2);
        for bind in binds {
            assert!(bind.depends_on.iter().any(|d| d == &"create-team:shared"));
        }
    }

    #[test]
    fn test_ordering_keys_strictly_increase_over_dependencies() {
        let inventory = two_repo_inventory();
        let toggles = FeatureToggles::default()
            .with_create_teams(true)
            .with_link_idp_groups(true)
            .with_lock_source_repos(true)
            .with_integrate_boards(true)
            .with_download_migration_logs(true);

        for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
            let script = ScriptPlanner::new()
                .build(&inventory, &toggles, mode)
                .expect("plan");
            let keys: HashMap<&str, u32> =
                script.steps().map(|s| (s.id.as_str(), s.key)).collect();
            for step in script.steps() {
                for dep in &step.depends_on {
                    let dep_key = keys.get(dep.as_str()).expect("dependency emitted");
                    assert!(
                        step.key > *dep_key,
                        "step '{}' (key {}) does not follow dependency '{}' (key {})",
                        step.id,
                        step.key,
                        dep,
                        dep_key
                    );
                }
            }
        }
    }

    #[test]
    fn test_emission_order_agrees_with_kind_priority() {
        let toggles = FeatureToggles::default()
            .with_create_teams(true)
            .with_link_idp_groups(true)
            .with_lock_source_repos(true)
            .with_download_migration_logs(true);
        let script = ScriptPlanner::new()
            .build(&two_repo_inventory(), &toggles, ExecutionMode::Sequential)
            .expect("plan");

        let chain = [
            "create-team:maintainers",
            "link-idp:maintainers",
            "migrate:Tools/alpha",
            "bind:Tools/alpha:maintainers",
            "lock:Tools/alpha",
            "logs:Tools/alpha",
        ];
        let steps: Vec<&Step> = chain
            .iter()
            .map(|id| script.get_step(id).unwrap_or_else(|| panic!("step '{}'", id)))
            .collect();
        for pair in steps.windows(2) {
            assert!(pair[0].key < pair[1].key);
            assert!(pair[0].spec.priority() < pair[1].spec.priority());
        }
    }

    #[test]
    fn test_modes_emit_same_step_set() {
        let inventory = two_repo_inventory();
        let toggles = FeatureToggles::default()
            .with_create_teams(true)
            .with_lock_source_repos(true)
            .with_download_migration_logs(true);

        let planner = ScriptPlanner::new();
        let sequential = planner
            .build(&inventory, &toggles, ExecutionMode::Sequential)
            .expect("plan");
        let parallel = planner
            .build(&inventory, &toggles, ExecutionMode::Parallel)
            .expect("plan");

        let mut seq_ids: Vec<String> = sequential.steps().map(|s| s.id.to_string()).collect();
        let mut par_ids: Vec<String> = parallel.steps().map(|s| s.id.to_string()).collect();
        seq_ids.sort();
        par_ids.sort();
        assert_eq!(seq_ids, par_ids);
        assert_eq!(sequential.step_count(), parallel.step_count());
    }

    #[test]
    fn test_log_steps_follow_every_migration() {
        let inventory = Inventory::new("fabrikam", "fabrikam-gh").with_projects(vec![
            Project::new("One", vec![Repository::new("a")]),
            Project::new("Two", vec![Repository::new("b")]),
        ]);
        let toggles = FeatureToggles::default().with_download_migration_logs(true);
        let script = ScriptPlanner::new()
            .build(&inventory, &toggles, ExecutionMode::Sequential)
            .expect("plan");

        let last_migrate_key = script
            .steps()
            .filter(|s| matches!(s.spec, StepSpec::MigrateRepo { .. }))
            .map(|s| s.key)
            .max()
            .expect("migrations");
        let first_log_key = script
            .steps()
            .filter(|s| matches!(s.spec, StepSpec::DownloadLogs { .. }))
            .map(|s| s.key)
            .min()
            .expect("logs");
        assert!(first_log_key > last_migrate_key);
    }

    #[test]
    fn test_empty_inventory_is_rejected() {
        let inventory = Inventory::new("fabrikam", "fabrikam-gh");
        let result = ScriptPlanner::new().build(
            &inventory,
            &FeatureToggles::default(),
            ExecutionMode::Sequential,
        );
        assert!(matches!(result, Err(PlanError::EmptyInventory)));
    }

    #[test]
    fn test_idp_linking_without_team_creation_is_rejected() {
        let toggles = FeatureToggles::default().with_link_idp_groups(true);
        let result = ScriptPlanner::new().build(
            &two_repo_inventory(),
            &toggles,
            ExecutionMode::Sequential,
        );
        assert!(matches!(result, Err(PlanError::Configuration(_))));
    }

    #[test]
    fn test_duplicate_repository_is_rejected() {
        let inventory = Inventory::new("fabrikam", "fabrikam-gh").with_projects(vec![
            Project::new("One", vec![Repository::new("a"), Repository::new("a")]),
        ]);
        let result = ScriptPlanner::new().build(
            &inventory,
            &FeatureToggles::default(),
            ExecutionMode::Sequential,
        );
        assert!(matches!(result, Err(PlanError::Configuration(_))));
    }

    #[test]
    fn test_pipeline_steps_emitted_per_pipeline() {
        let inventory = Inventory::new("fabrikam", "fabrikam-gh").with_projects(vec![
            Project::new(
                "One",
                vec![Repository::new("a")
                    .with_pipelines(vec!["ci".to_string(), "release".to_string()])],
            ),
        ]);
        let toggles = FeatureToggles::default().with_rewire_pipelines(true);
        let script = ScriptPlanner::new()
            .build(&inventory, &toggles, ExecutionMode::Sequential)
            .expect("plan");

        let pipelines = script
            .steps()
            .filter(|s| matches!(s.spec, StepSpec::RewirePipeline { .. }))
            .count();
        assert_eq!(pipelines, 2);
    }
}
