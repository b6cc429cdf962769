//! Package manifest lookup.
//!
//! Mirrors the host runtime's `require.resolve("<pkg>/package.json")`:
//! starting at the workspace root, each ancestor's `node_modules` is
//! searched in turn.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Locates installed packages by name.
pub trait ModuleResolver {
    /// Absolute path to `package`'s `package.json`.
    fn resolve_manifest(&self, package: &str) -> crate::Result<PathBuf>;

    /// Directory containing `package`'s manifest.
    fn resolve_package_dir(&self, package: &str) -> crate::Result<PathBuf> {
        let manifest = self.resolve_manifest(package)?;
        match manifest.parent() {
            Some(dir) => Ok(dir.to_path_buf()),
            None => Ok(manifest),
        }
    }
}

/// Fields of `package.json` the resolver checks.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl PackageManifest {
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| crate::Error::ManifestRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| crate::Error::ManifestParse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Resolves packages through `node_modules` directories.
#[derive(Debug, Clone)]
pub struct NodeModulesResolver {
    root: PathBuf,
}

impl NodeModulesResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ModuleResolver for NodeModulesResolver {
    fn resolve_manifest(&self, package: &str) -> crate::Result<PathBuf> {
        for dir in self.root.ancestors() {
            let candidate = dir
                .join("node_modules")
                .join(package)
                .join(crate::resolve::MANIFEST_FILE_NAME);
            if !candidate.is_file() {
                continue;
            }

            let manifest = PackageManifest::load(&candidate)?;
            if manifest.name != package {
                return Err(crate::Error::ManifestNameMismatch {
                    path: candidate,
                    expected: package.to_owned(),
                    found: manifest.name,
                });
            }

            tracing::debug!(
                package,
                version = manifest.version.as_deref().unwrap_or("unknown"),
                path = %candidate.display(),
                "resolved package manifest"
            );
            return Ok(candidate);
        }

        Err(crate::Error::PackageNotFound {
            package: package.to_owned(),
            searched_from: self.root.clone(),
        })
    }
}
