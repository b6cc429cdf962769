//! External-resolution override.
//!
//! A compiled CLI reads its own `package.json` at runtime. Inlining that
//! file would freeze its contents into the bundle, so the import is kept
//! external and redirected to the manifest's location relative to the
//! emitted file. Manifests of dependencies resolve and bundle normally.

use std::path::{Path, PathBuf};

use crate::paths;

/// File name the override is filtered on before any path comparison.
pub const MANIFEST_FILE_NAME: &str = "package.json";

/// Outcome of a matching resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Specifier to emit in place of the original, relative to the output
    /// directory.
    pub path: String,
    /// Always `true`: the import is left for runtime resolution.
    pub external: bool,
}

/// Keeps one manifest file out of the bundle.
///
/// Pure value: constructed per target, holds no mutable state.
///
/// # Examples
///
/// ```
/// use binstage_core::ExternalOverride;
/// use std::path::Path;
///
/// let rule = ExternalOverride::new("/proj/pkg/package.json", "/proj/pkg/build");
/// let redirect = rule.resolve(Path::new("/proj/pkg/src"), "../package.json").unwrap();
/// assert_eq!(redirect.path, "../package.json");
/// assert!(redirect.external);
///
/// assert!(rule.resolve(Path::new("/proj/other-pkg"), "./package.json").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalOverride {
    match_path: PathBuf,
    output_dir: PathBuf,
}

impl ExternalOverride {
    pub fn new(match_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            match_path: paths::normalize(&match_path.into()),
            output_dir: paths::normalize(&output_dir.into()),
        }
    }

    /// Builds the rule for a target whose extensionless output path is
    /// `output_path`: the output directory is its parent.
    pub fn for_output(match_path: impl Into<PathBuf>, output_path: &Path) -> Self {
        match output_path.parent() {
            Some(output_dir) => Self::new(match_path, output_dir),
            None => Self::new(match_path, PathBuf::new()),
        }
    }

    pub fn match_path(&self) -> &Path {
        &self.match_path
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Whether a specifier passes the name filter. Passing the filter does
    /// not mean the rule applies; see [`resolve`](Self::resolve).
    pub fn filter(specifier: &str) -> bool {
        Path::new(specifier)
            .file_name()
            .is_some_and(|name| name == MANIFEST_FILE_NAME)
    }

    /// Decide a resolution request.
    ///
    /// Returns `None` to fall through to default resolution. Equality is on
    /// the fully resolved absolute path, never the bare specifier.
    pub fn resolve(&self, resolve_dir: &Path, specifier: &str) -> Option<Redirect> {
        if !Self::filter(specifier) {
            return None;
        }

        let resolved = paths::resolve(resolve_dir, specifier);
        if resolved != self.match_path {
            return None;
        }

        let path = paths::relative_specifier(&self.output_dir, &self.match_path)?;
        tracing::debug!(
            specifier,
            resolve_dir = %resolve_dir.display(),
            redirect = %path,
            "keeping manifest external"
        );

        Some(Redirect {
            path,
            external: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> ExternalOverride {
        ExternalOverride::new("/proj/pkg/package.json", "/proj/pkg/build")
    }

    #[test]
    fn matching_path_is_redirected_relative_to_output_dir() {
        let redirect = rule()
            .resolve(Path::new("/proj/pkg/src/commands"), "../../package.json")
            .unwrap();

        assert_eq!(
            redirect,
            Redirect {
                path: "../package.json".to_owned(),
                external: true,
            }
        );
    }

    #[test]
    fn dependency_manifest_falls_through() {
        assert!(
            rule()
                .resolve(Path::new("/proj/other-pkg"), "./package.json")
                .is_none()
        );
    }

    #[test]
    fn bare_package_specifier_with_same_name_falls_through() {
        assert!(
            rule()
                .resolve(Path::new("/proj/pkg/src"), "some-dep/package.json")
                .is_none()
        );
    }

    #[test]
    fn non_manifest_specifier_is_filtered_out() {
        assert!(
            rule()
                .resolve(Path::new("/proj/pkg"), "./package.json.bak")
                .is_none()
        );
    }

    #[test]
    fn for_output_uses_parent_of_output_path() {
        let rule = ExternalOverride::for_output("/proj/package.json", Path::new("/proj/build/index"));
        assert_eq!(rule.output_dir(), Path::new("/proj/build"));
    }
}
