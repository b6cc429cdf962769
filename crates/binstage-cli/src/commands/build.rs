use binstage_build::{BuildRunner, plan_targets};
use binstage_core::{BinstageConfig, NodeModulesResolver};
use binstage_exec::{EsbuildCompiler, RealExecutor};
use std::path::Path;

/// Execute the full build pipeline.
pub async fn build(project_dir: &Path) -> anyhow::Result<()> {
    let root = super::workspace_root(project_dir)?;
    let config = BinstageConfig::load(&root)?;
    tracing::debug!(root = %root.display(), targets = config.targets.len(), "loaded binstage.toml");

    if config.targets.is_empty() {
        anyhow::bail!("no [[target]] entries in binstage.toml, nothing to build");
    }

    let targets = plan_targets(&config, &root, RealExecutor, NodeModulesResolver::new(&root))?;
    let runner = BuildRunner::new(EsbuildCompiler::new(config.compiler.clone(), &root));

    println!("Building {} target(s)...", targets.len());
    runner.run(&targets).await?;

    for target in &targets {
        println!(
            "  {name} ({format}) -> {output}",
            name = target.name(),
            format = target.format(),
            output = super::display_outputs(&root, target),
        );
    }
    println!("Build complete");

    Ok(())
}
