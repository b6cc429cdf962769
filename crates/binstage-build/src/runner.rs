use binstage_core::{Compiler, HookPhase, TargetDescriptor, ensure_unique_outputs};

use crate::error::BuildError;

/// Runs descriptors through the compiler in order, invoking each target's
/// hooks around its compilation.
///
/// Fail-fast: the first hook or compiler error ends the run. Nothing is
/// retried and files written by earlier targets are left in place.
pub struct BuildRunner<C: Compiler> {
    compiler: C,
}

impl<C: Compiler> BuildRunner<C> {
    pub fn new(compiler: C) -> Self {
        Self { compiler }
    }

    pub async fn run(&self, targets: &[TargetDescriptor]) -> Result<(), BuildError> {
        ensure_unique_outputs(targets)?;

        for target in targets {
            self.run_target(target).await?;
        }

        tracing::info!(targets = targets.len(), "build complete");
        Ok(())
    }

    async fn run_target(&self, target: &TargetDescriptor) -> Result<(), BuildError> {
        tracing::info!(
            name = target.name(),
            format = %target.format(),
            hooks = target.hooks().len(),
            "building target"
        );

        for hook in target.hooks() {
            hook.before_build()
                .await
                .map_err(|e| BuildError::Hook {
                    target: target.name().to_owned(),
                    hook: hook.name().to_owned(),
                    phase: HookPhase::BeforeBuild,
                    source: e,
                })?;
        }

        self.compiler.compile(target).await?;

        for hook in target.hooks() {
            hook.after_build()
                .await
                .map_err(|e| BuildError::Hook {
                    target: target.name().to_owned(),
                    hook: hook.name().to_owned(),
                    phase: HookPhase::AfterBuild,
                    source: e,
                })?;
        }

        tracing::info!(
            name = target.name(),
            output = %target.output_path().display(),
            "target complete"
        );
        Ok(())
    }
}
