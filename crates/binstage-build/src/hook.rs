use binstage_core::{HookError, HookFuture, LifecycleHook, ModuleResolver, NodeModulesResolver};
use binstage_exec::{CommandExecutor, RealExecutor};

use crate::stage::{StageContext, StageStep, run_steps};

/// Prepares inputs before the primary target compiles and stages its
/// runtime companions afterwards.
///
/// `before_build` runs the configured prebuild command (e.g. regenerating
/// a client the entry point imports); `after_build` runs the staging steps
/// in order.
pub struct StagingHook<E: CommandExecutor = RealExecutor, R: ModuleResolver = NodeModulesResolver> {
    name: String,
    prebuild: Option<String>,
    steps: Vec<StageStep>,
    context: StageContext,
    executor: E,
    resolver: R,
}

impl<E: CommandExecutor, R: ModuleResolver> StagingHook<E, R> {
    pub fn new(name: impl Into<String>, context: StageContext, executor: E, resolver: R) -> Self {
        Self {
            name: name.into(),
            prebuild: None,
            steps: Vec::new(),
            context,
            executor,
            resolver,
        }
    }

    pub fn prebuild(mut self, command: impl Into<String>) -> Self {
        self.prebuild = Some(command.into());
        self
    }

    pub fn step(mut self, step: StageStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Finish with the interpreter line and execute permission, which
    /// assume the earlier steps have run.
    pub fn executable_output(self, interpreter: impl Into<String>) -> Self {
        self.step(StageStep::Interpreter {
            line: interpreter.into(),
        })
        .step(StageStep::Executable)
    }
}

impl<E: CommandExecutor, R: ModuleResolver> LifecycleHook for StagingHook<E, R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn before_build(&self) -> HookFuture<'_> {
        Box::pin(async move {
            let Some(command) = &self.prebuild else {
                return Ok(());
            };
            tracing::info!(hook = %self.name, command = %command, "running prebuild");
            self.executor
                .exec_shell(command, &self.context.workspace_root)
                .await?;
            Ok::<(), HookError>(())
        })
    }

    fn after_build(&self) -> HookFuture<'_> {
        Box::pin(async move {
            tracing::info!(
                hook = %self.name,
                steps = self.steps.len(),
                output = %self.context.output_dir.display(),
                "staging output"
            );
            run_steps(&self.steps, &self.context, &self.resolver)?;
            Ok::<(), HookError>(())
        })
    }
}
