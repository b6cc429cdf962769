mod build;
mod plan;

use std::path::{Path, PathBuf};

use binstage_core::TargetDescriptor;

pub use build::build;
pub use plan::plan;

/// Absolute workspace root; every configured path is anchored here.
pub(crate) fn workspace_root(project_dir: &Path) -> anyhow::Result<PathBuf> {
    project_dir.canonicalize().map_err(|e| {
        anyhow::anyhow!(
            "cannot open project directory {}: {e}",
            project_dir.display()
        )
    })
}

/// Every file `target` emits, relative to `root`.
pub(crate) fn display_outputs(root: &Path, target: &TargetDescriptor) -> String {
    target
        .output_files()
        .iter()
        .map(|file| display_path(root, file))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `path` relative to `root` for display, or `path` itself.
pub(crate) fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        // arch-lint: allow(no-silent-result-drop) reason="paths outside the workspace are shown as-is"
        .unwrap_or(path)
        .display()
        .to_string()
}
