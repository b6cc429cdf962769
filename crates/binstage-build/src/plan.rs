//! Turns `binstage.toml` into the ordered descriptor list the runner
//! consumes, wiring the staging hook and manifest override onto the
//! targets that ask for them.

use std::path::Path;
use std::sync::Arc;

use binstage_core::resolve::MANIFEST_FILE_NAME;
use binstage_core::{
    BinstageConfig, ExternalOverride, Format, ModuleResolver, TargetConfig, TargetDescriptor,
    ensure_unique_outputs,
};
use binstage_exec::CommandExecutor;

use crate::hook::StagingHook;
use crate::stage::{StageContext, StageStep};

/// Build every descriptor named by `config`, in file order, one per format.
///
/// The staging hook is attached to the commonjs build of the `stage = true`
/// target only. Paths are anchored at `workspace_root`.
pub fn plan_targets<E, R>(
    config: &BinstageConfig,
    workspace_root: &Path,
    executor: E,
    resolver: R,
) -> binstage_core::Result<Vec<TargetDescriptor>>
where
    E: CommandExecutor + 'static,
    R: ModuleResolver + 'static,
{
    config.validate()?;

    let mut collaborators = Some((executor, resolver));
    let mut targets = Vec::new();

    for target in &config.targets {
        for &format in &target.formats {
            let mut builder = descriptor(target, format, workspace_root);

            if target.stage && format == Format::CommonJs {
                if let Some((executor, resolver)) = collaborators.take() {
                    let hook = staging_hook(config, target, workspace_root, executor, resolver);
                    builder = builder.hook(Arc::new(hook));
                }
            }

            targets.push(builder.build()?);
        }
    }

    ensure_unique_outputs(&targets)?;
    Ok(targets)
}

fn descriptor(
    target: &TargetConfig,
    format: Format,
    workspace_root: &Path,
) -> binstage_core::TargetBuilder {
    let output_path = workspace_root.join(&target.output);
    let mut builder = TargetDescriptor::builder(&target.name, &output_path)
        .entry_points(target.entry_points.iter().map(|p| workspace_root.join(p)))
        .format(format)
        .bundle(target.bundle)
        .minify(target.minify)
        .emit_type_declarations(target.emit_types);

    for specifier in &target.external {
        builder = builder.external(specifier);
    }
    if target.external_manifest {
        let manifest = workspace_root.join(MANIFEST_FILE_NAME);
        let rule = if target.entry_points.len() > 1 {
            ExternalOverride::new(manifest, &output_path)
        } else {
            ExternalOverride::for_output(manifest, &output_path)
        };
        builder = builder.override_rule(rule);
    }

    builder
}

fn staging_hook<E, R>(
    config: &BinstageConfig,
    target: &TargetConfig,
    workspace_root: &Path,
    executor: E,
    resolver: R,
) -> StagingHook<E, R>
where
    E: CommandExecutor,
    R: ModuleResolver,
{
    let output_path = workspace_root.join(&target.output);
    let mut primary_output = output_path.clone().into_os_string();
    primary_output.push(".");
    primary_output.push(Format::CommonJs.extension());

    let context = StageContext {
        workspace_root: workspace_root.to_path_buf(),
        store_dir: config.workspace.store_dir.clone(),
        output_dir: match output_path.parent() {
            Some(dir) => dir.to_path_buf(),
            None => workspace_root.to_path_buf(),
        },
        primary_output: primary_output.into(),
    };

    let mut hook = StagingHook::new(format!("stage-{}", target.name), context, executor, resolver);
    if let Some(prebuild) = &config.prebuild {
        hook = hook.prebuild(&prebuild.command);
    }
    for spec in &config.stage {
        hook = hook.step(StageStep::from(spec.clone()));
    }
    hook.executable_output(&config.workspace.interpreter)
}
