use binstage_build::plan_targets;
use binstage_core::{BinstageConfig, NodeModulesResolver};
use binstage_exec::RealExecutor;
use std::path::Path;

/// Print the descriptors a build would run, without running anything.
pub fn plan(project_dir: &Path) -> anyhow::Result<()> {
    let root = super::workspace_root(project_dir)?;
    let config = BinstageConfig::load(&root)?;
    let targets = plan_targets(&config, &root, RealExecutor, NodeModulesResolver::new(&root))?;

    for target in &targets {
        println!(
            "{name} [{format}] -> {output}",
            name = target.name(),
            format = target.format(),
            output = super::display_outputs(&root, target),
        );

        let mut flags = Vec::new();
        if target.bundle() {
            flags.push("bundle");
        }
        if target.minify() {
            flags.push("minify");
        }
        if target.emit_type_declarations() {
            flags.push("types");
        }
        if !flags.is_empty() {
            println!("  flags: {}", flags.join(", "));
        }

        for hook in target.hooks() {
            println!("  hook: {}", hook.name());
        }
        for specifier in target.forced_externals() {
            println!("  external: {specifier}");
        }
        for rule in target.overrides() {
            println!(
                "  external manifest: {}",
                super::display_path(&root, rule.match_path())
            );
        }
    }

    if let Some(prebuild) = &config.prebuild {
        println!("prebuild: {}", prebuild.command);
    }
    if let Some(staged) = config.staged_target() {
        println!("staging: {} step(s) on {}", config.stage.len(), staged.name);
    }

    Ok(())
}
