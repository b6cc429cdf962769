use crate::TargetDescriptor;

/// The bundler that turns one descriptor into files on disk.
///
/// Production code uses `binstage_exec::EsbuildCompiler`; tests use
/// mockall-generated mocks or in-memory fakes.
#[allow(async_fn_in_trait)]
pub trait Compiler {
    /// Compile a single target. Hooks are not this trait's concern: the
    /// build runner invokes them around this call.
    async fn compile(&self, target: &TargetDescriptor) -> Result<(), CompileError>;
}

#[derive(Debug, thiserror::Error)]
#[error("failed to compile target '{target}'")]
pub struct CompileError {
    pub target: String,
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl CompileError {
    pub fn new(
        target: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            target: target.into(),
            source: source.into(),
        }
    }
}
