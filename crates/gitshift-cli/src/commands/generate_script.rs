//! The generate-script command: plan an inventory and write the ordered script.

use anyhow::Context;

use gitshift_core::prelude::{Inventory, ScriptPlanner, ScriptRenderer, ScriptSink};

use crate::cli::GenerateScriptArgs;
use crate::files::FileScriptWriter;

pub async fn run(args: GenerateScriptArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.inventory)
        .with_context(|| format!("reading inventory {}", args.inventory.display()))?;
    let inventory: Inventory = serde_json::from_str(&text)
        .with_context(|| format!("parsing inventory {}", args.inventory.display()))?;

    let mode = args.mode();
    let script = ScriptPlanner::new().build(&inventory, &args.toggles(), mode)?;
    tracing::info!(
        mode = mode.as_str(),
        projects = inventory.projects.len(),
        repos = inventory.repo_count(),
        steps = script.step_count(),
        "script planned"
    );

    let rendered = ScriptRenderer::new(&inventory.source_org, &inventory.github_org).render(&script);
    FileScriptWriter
        .write_script(&args.output, &rendered)
        .with_context(|| format!("writing {}", args.output.display()))?;
    Ok(())
}
