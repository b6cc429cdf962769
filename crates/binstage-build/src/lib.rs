//! Build orchestration for binstage.
//!
//! # Pipeline
//!
//! ```text
//! binstage build
//!   1. Plan     ── binstage.toml → Vec<TargetDescriptor> (one per format)
//!   2. For each descriptor, in order:
//!      a. before_build hooks ── prebuild command (e.g. `prisma generate`)
//!      b. Compile            ── esbuild
//!      c. after_build hooks  ── staging steps, interpreter line, chmod +x
//!   3. First error aborts the run
//! ```
//!
//! # Staging
//!
//! Only the commonjs build of the `stage = true` target carries the staging
//! hook, so building the same entry point as esm as well never stages
//! twice. Steps run in configured order, then the interpreter line is
//! written and the output made executable.

pub mod error;
pub mod hook;
pub mod plan;
pub mod runner;
pub mod stage;

pub use error::{BuildError, StageError};
pub use hook::StagingHook;
pub use plan::plan_targets;
pub use runner::BuildRunner;
pub use stage::{StageContext, StageStep};
