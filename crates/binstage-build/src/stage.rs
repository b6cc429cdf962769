//! Artifact staging: the ordered steps run after the primary target is
//! written.
//!
//! Every step is idempotent (copies overwrite, the interpreter line is
//! replaced rather than prepended, the mode change is skipped when already
//! applied), so a build can be re-run without cleaning the output
//! directory. [`run_steps`] stops at the first failure; a half-staged output
//! directory is not a usable artifact.

use std::path::{Path, PathBuf};

use binstage_core::{ModuleResolver, StageSpec, paths};
use walkdir::WalkDir;

use crate::error::StageError;

/// Where steps read from and write to.
#[derive(Debug, Clone)]
pub struct StageContext {
    /// Root used to locate the shared module store.
    pub workspace_root: PathBuf,
    /// Module store, relative to `workspace_root`.
    pub store_dir: PathBuf,
    /// Directory the primary output lives in; step destinations are
    /// relative to it.
    pub output_dir: PathBuf,
    /// The emitted file that becomes the executable.
    pub primary_output: PathBuf,
}

impl StageContext {
    fn dest(&self, dest: &Path) -> PathBuf {
        self.output_dir.join(dest)
    }

    fn store_path(&self, path: &str) -> PathBuf {
        self.workspace_root
            .join(&self.store_dir)
            .join(paths::expand_platform(path))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStep {
    /// Copy `<package-dir>/<subdir>` recursively into `dest`.
    PackageDir {
        package: String,
        subdir: PathBuf,
        dest: PathBuf,
    },
    /// Copy `<package-dir>/../<path>` (relative to the manifest) to `dest`.
    PackageFile {
        package: String,
        path: String,
        dest: PathBuf,
    },
    /// Copy `<workspace>/<store_dir>/<path>` to `dest`.
    StoreFile { path: String, dest: PathBuf },
    /// Replace the primary output's first line.
    Interpreter { line: String },
    /// Add execute permission to the primary output.
    Executable,
}

impl From<StageSpec> for StageStep {
    fn from(spec: StageSpec) -> Self {
        match spec {
            StageSpec::PackageDir {
                package,
                subdir,
                dest,
            } => Self::PackageDir {
                package,
                subdir,
                dest,
            },
            StageSpec::PackageFile {
                package,
                path,
                dest,
            } => Self::PackageFile {
                package,
                path,
                dest,
            },
            StageSpec::StoreFile { path, dest } => Self::StoreFile { path, dest },
        }
    }
}

impl StageStep {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PackageDir { .. } => "package-dir",
            Self::PackageFile { .. } => "package-file",
            Self::StoreFile { .. } => "store-file",
            Self::Interpreter { .. } => "interpreter",
            Self::Executable => "executable",
        }
    }

    pub fn apply(&self, ctx: &StageContext, resolver: &dyn ModuleResolver) -> Result<(), StageError> {
        match self {
            Self::PackageDir {
                package,
                subdir,
                dest,
            } => {
                let package_dir = package_dir(resolver, package)?;
                let copied = copy_dir(&package_dir.join(subdir), &ctx.dest(dest))?;
                tracing::debug!(package, files = copied, "copied package directory");
            }
            Self::PackageFile {
                package,
                path,
                dest,
            } => {
                let package_dir = package_dir(resolver, package)?;
                copy_file(
                    &package_dir.join(paths::expand_platform(path)),
                    &ctx.dest(dest),
                )?;
            }
            Self::StoreFile { path, dest } => {
                copy_file(&ctx.store_path(path), &ctx.dest(dest))?;
            }
            Self::Interpreter { line } => {
                replace_first_line(&ctx.primary_output, line)?;
            }
            Self::Executable => {
                let changed = make_executable(&ctx.primary_output)?;
                tracing::debug!(changed, "set execute permission");
            }
        }
        Ok(())
    }
}

/// Apply `steps` in order, stopping at the first failure.
pub fn run_steps(
    steps: &[StageStep],
    ctx: &StageContext,
    resolver: &dyn ModuleResolver,
) -> Result<(), StageError> {
    for (index, step) in steps.iter().enumerate() {
        tracing::debug!(step = index + 1, kind = step.kind(), "staging");
        step.apply(ctx, resolver)?;
    }
    Ok(())
}

fn package_dir(resolver: &dyn ModuleResolver, package: &str) -> Result<PathBuf, StageError> {
    resolver
        .resolve_package_dir(package)
        .map_err(|e| StageError::Resolve {
            package: package.to_owned(),
            source: e,
        })
}

/// Recursively copy `src` into `dst`, overwriting existing files.
///
/// Returns the number of files copied.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<usize, StageError> {
    if !src.is_dir() {
        return Err(StageError::MissingSource {
            path: src.to_path_buf(),
        });
    }

    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| StageError::Walk {
            root: src.to_path_buf(),
            source: e,
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| StageError::MissingSource {
                path: entry.path().to_path_buf(),
            })?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| StageError::Io {
                op: "create directory",
                path: target,
                source: e,
            })?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|e| StageError::Io {
                op: "copy to",
                path: target,
                source: e,
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Copy a single file, creating the destination's parent directories.
pub fn copy_file(src: &Path, dst: &Path) -> Result<(), StageError> {
    if !src.is_file() {
        return Err(StageError::MissingSource {
            path: src.to_path_buf(),
        });
    }
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StageError::Io {
            op: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::copy(src, dst).map_err(|e| StageError::Io {
        op: "copy to",
        path: dst.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Replace the first line of `path` with `line`.
///
/// Later lines are kept byte-for-byte; no terminator is added beyond what
/// `line` carries.
pub fn replace_first_line(path: &Path, line: &str) -> Result<(), StageError> {
    let content = std::fs::read_to_string(path).map_err(|e| StageError::Io {
        op: "read",
        path: path.to_path_buf(),
        source: e,
    })?;

    let rewritten = match content.find('\n') {
        Some(end) => format!("{line}{}", &content[end..]),
        None => line.to_owned(),
    };

    std::fs::write(path, rewritten).map_err(|e| StageError::Io {
        op: "write",
        path: path.to_path_buf(),
        source: e,
    })
}

/// Add execute permission for owner, group, and other.
///
/// Returns `false` without touching the file when every execute bit is
/// already set.
#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<bool, StageError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path).map_err(|e| StageError::Io {
        op: "stat",
        path: path.to_path_buf(),
        source: e,
    })?;
    let mode = metadata.permissions().mode();
    let executable = mode | 0o111;
    if executable == mode {
        return Ok(false);
    }

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(executable)).map_err(|e| {
        StageError::Io {
            op: "chmod",
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    Ok(true)
}

#[cfg(not(unix))]
pub fn make_executable(path: &Path) -> Result<bool, StageError> {
    if !path.is_file() {
        return Err(StageError::MissingSource {
            path: path.to_path_buf(),
        });
    }
    Ok(false)
}
