use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Error returned by a hook; the runner attaches the hook name and phase.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed future returned by hook callbacks so hooks stay object-safe.
pub type HookFuture<'a> = Pin<Box<dyn Future<Output = Result<(), HookError>> + 'a>>;

/// Start/end callbacks attached to a build target.
///
/// Compiler-agnostic: the build runner calls [`before_build`] strictly
/// before the target is compiled and [`after_build`] strictly after its
/// files are written. Hooks never schedule themselves.
///
/// [`before_build`]: LifecycleHook::before_build
/// [`after_build`]: LifecycleHook::after_build
pub trait LifecycleHook {
    fn name(&self) -> &str;

    /// Prepare inputs the entry point depends on.
    fn before_build(&self) -> HookFuture<'_>;

    /// Stage artifacts next to the emitted output.
    fn after_build(&self) -> HookFuture<'_>;
}

impl fmt::Debug for dyn LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHook")
            .field("name", &self.name())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    BeforeBuild,
    AfterBuild,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeBuild => f.write_str("before-build"),
            Self::AfterBuild => f.write_str("after-build"),
        }
    }
}
