use std::path::PathBuf;

use binstage_core::{CompileError, HookError, HookPhase};

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("failed to resolve package '{package}'")]
    Resolve {
        package: String,
        source: binstage_core::Error,
    },

    #[error("staging source {path} does not exist")]
    MissingSource { path: PathBuf },

    #[error("failed to {op} {path}")]
    Io {
        op: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to walk {root}")]
    Walk {
        root: PathBuf,
        source: walkdir::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] binstage_core::Error),

    #[error("hook '{hook}' failed during {phase} of target '{target}'")]
    Hook {
        target: String,
        hook: String,
        phase: HookPhase,
        source: HookError,
    },

    #[error(transparent)]
    Compile(#[from] CompileError),
}
