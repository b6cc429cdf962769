//! esbuild adapter for the [`Compiler`] seam.
//!
//! esbuild's CLI exposes no resolve callback, so each
//! [`ExternalOverride`](binstage_core::ExternalOverride) reaches it as an
//! `--external:` on the rule's match path. Adapters for bundlers with a
//! resolver hook call `ExternalOverride::resolve` instead.

use std::path::PathBuf;

use binstage_core::{CompileError, Compiler, CompilerConfig, TargetDescriptor};

use crate::executor::{CommandExecutor, RealExecutor};

/// Compiles descriptors by shelling out to esbuild, parameterized over the
/// executor for testability.
pub struct EsbuildCompiler<E: CommandExecutor = RealExecutor> {
    executor: E,
    config: CompilerConfig,
    workspace_root: PathBuf,
}

impl EsbuildCompiler<RealExecutor> {
    pub fn new(config: CompilerConfig, workspace_root: impl Into<PathBuf>) -> Self {
        Self::with_executor(RealExecutor, config, workspace_root)
    }
}

impl<E: CommandExecutor> EsbuildCompiler<E> {
    pub fn with_executor(
        executor: E,
        config: CompilerConfig,
        workspace_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executor,
            config,
            workspace_root: workspace_root.into(),
        }
    }

    /// esbuild arguments for one descriptor.
    pub fn esbuild_args(&self, target: &TargetDescriptor) -> Vec<String> {
        let mut args: Vec<String> = target
            .entry_points()
            .iter()
            .map(|p| p.display().to_string())
            .collect();

        if target.bundle() {
            args.push("--bundle".to_owned());
        }
        args.push(format!("--format={}", target.format()));
        args.push(format!("--platform={}", self.config.platform));
        if let Some(node_target) = &self.config.target {
            args.push(format!("--target={node_target}"));
        }
        if target.minify() {
            args.push("--minify".to_owned());
        }

        if target.entry_points().len() == 1 {
            args.push(format!("--outfile={}", target.output_file().display()));
        } else {
            // Several entries: the output path names a directory.
            args.push(format!("--outdir={}", target.output_path().display()));
            args.push(format!("--out-extension:.js=.{}", target.format().extension()));
        }

        for specifier in target.forced_externals() {
            args.push(format!("--external:{specifier}"));
        }
        for rule in target.overrides() {
            args.push(format!("--external:{}", rule.match_path().display()));
        }

        args
    }

    /// Declaration-emitter arguments for one descriptor.
    pub fn declaration_args(&self, target: &TargetDescriptor) -> Vec<String> {
        let mut args = vec![
            "--emitDeclarationOnly".to_owned(),
            "--declaration".to_owned(),
            "--outDir".to_owned(),
            target.output_dir().display().to_string(),
        ];
        args.extend(target.entry_points().iter().map(|p| p.display().to_string()));
        args
    }
}

impl<E: CommandExecutor> Compiler for EsbuildCompiler<E> {
    async fn compile(&self, target: &TargetDescriptor) -> Result<(), CompileError> {
        let args = self.esbuild_args(target);
        tracing::info!(
            name = target.name(),
            format = %target.format(),
            output = %target.output_path().display(),
            "compiling"
        );

        self.executor
            .exec(&self.config.program, &args, &self.workspace_root)
            .await
            .map_err(|e| CompileError::new(target.name(), e))?;

        if target.emit_type_declarations() {
            let args = self.declaration_args(target);
            self.executor
                .exec(&self.config.declarations, &args, &self.workspace_root)
                .await
                .map_err(|e| CompileError::new(target.name(), e))?;
        }

        Ok(())
    }
}
