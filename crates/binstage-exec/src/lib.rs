//! Process execution and compiler adapters for binstage.

pub mod error;
pub mod esbuild;
pub mod executor;

pub use error::ExecError;
pub use esbuild::EsbuildCompiler;
pub use executor::{CommandExecutor, RealExecutor};
