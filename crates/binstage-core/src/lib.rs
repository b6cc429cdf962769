//! Core types and configuration for binstage.
//!
//! This crate defines the `binstage.toml` schema ([`BinstageConfig`]), the
//! immutable [`TargetDescriptor`] model, the seams the pipeline is built on
//! ([`LifecycleHook`], [`Compiler`], [`ModuleResolver`]), the
//! [`ExternalOverride`] resolution rule, and shared error types.

pub mod compiler;
pub mod config;
pub mod error;
pub mod hook;
pub mod manifest;
pub mod paths;
pub mod resolve;
pub mod target;

pub use compiler::{CompileError, Compiler};
pub use config::{
    BinstageConfig, CompilerConfig, PrebuildConfig, StageSpec, TargetConfig, WorkspaceConfig,
};
pub use error::{Error, Result};
pub use hook::{HookError, HookFuture, HookPhase, LifecycleHook};
pub use manifest::{ModuleResolver, NodeModulesResolver, PackageManifest};
pub use resolve::{ExternalOverride, Redirect};
pub use target::{Format, TargetBuilder, TargetDescriptor, ensure_unique_outputs};
