//! Build target descriptors.

use std::collections::{BTreeSet, HashMap};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{ExternalOverride, LifecycleHook};

/// Module format of an emitted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    #[serde(rename = "cjs")]
    CommonJs,
    #[serde(rename = "esm")]
    Esm,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CommonJs => "cjs",
            Self::Esm => "esm",
        }
    }

    /// Extension appended to a descriptor's output path.
    pub fn extension(self) -> &'static str {
        match self {
            Self::CommonJs => "js",
            Self::Esm => "mjs",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for one compilation unit: entry points to one output file.
///
/// Immutable once built. Use [`TargetDescriptor::builder`].
#[derive(Debug, Clone)]
pub struct TargetDescriptor {
    name: String,
    entry_points: Vec<PathBuf>,
    output_path: PathBuf,
    format: Format,
    bundle: bool,
    emit_type_declarations: bool,
    minify: bool,
    forced_externals: BTreeSet<String>,
    overrides: Vec<ExternalOverride>,
    hooks: Vec<Arc<dyn LifecycleHook>>,
}

impl TargetDescriptor {
    pub fn builder(name: impl Into<String>, output_path: impl Into<PathBuf>) -> TargetBuilder {
        TargetBuilder {
            name: name.into(),
            output_path: output_path.into(),
            entry_points: Vec::new(),
            format: Format::CommonJs,
            bundle: true,
            emit_type_declarations: false,
            minify: false,
            forced_externals: BTreeSet::new(),
            overrides: Vec::new(),
            hooks: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_points(&self) -> &[PathBuf] {
        &self.entry_points
    }

    /// Output path without extension.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// The emitted file of a single-entry target: output path plus the
    /// format's extension.
    pub fn output_file(&self) -> PathBuf {
        let mut file = OsString::from(self.output_path.as_os_str());
        file.push(".");
        file.push(self.format.extension());
        PathBuf::from(file)
    }

    /// Every file the compiler writes for this target.
    ///
    /// With several entry points the output path names a directory and each
    /// entry lands under it at its path relative to the entries' common
    /// ancestor, with the format's extension.
    pub fn output_files(&self) -> Vec<PathBuf> {
        if self.entry_points.len() == 1 {
            return vec![self.output_file()];
        }

        let entries: Vec<PathBuf> = self
            .entry_points
            .iter()
            .map(|p| crate::paths::normalize(p))
            .collect();
        let depth = common_parent(&entries).components().count();

        entries
            .iter()
            .map(|entry| {
                let relative: PathBuf = entry.components().skip(depth).collect();
                self.output_path
                    .join(relative)
                    .with_extension(self.format.extension())
            })
            .collect()
    }

    /// Directory the output is written into: the output path's parent for
    /// a single entry, the output path itself for several.
    pub fn output_dir(&self) -> &Path {
        if self.entry_points.len() > 1 {
            return &self.output_path;
        }
        match self.output_path.parent() {
            Some(dir) => dir,
            None => Path::new(""),
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn bundle(&self) -> bool {
        self.bundle
    }

    pub fn emit_type_declarations(&self) -> bool {
        self.emit_type_declarations
    }

    pub fn minify(&self) -> bool {
        self.minify
    }

    pub fn forced_externals(&self) -> &BTreeSet<String> {
        &self.forced_externals
    }

    pub fn overrides(&self) -> &[ExternalOverride] {
        &self.overrides
    }

    /// Hooks to run around this target. Always empty for [`Format::Esm`].
    pub fn hooks(&self) -> &[Arc<dyn LifecycleHook>] {
        &self.hooks
    }
}

pub struct TargetBuilder {
    name: String,
    output_path: PathBuf,
    entry_points: Vec<PathBuf>,
    format: Format,
    bundle: bool,
    emit_type_declarations: bool,
    minify: bool,
    forced_externals: BTreeSet<String>,
    overrides: Vec<ExternalOverride>,
    hooks: Vec<Arc<dyn LifecycleHook>>,
}

impl TargetBuilder {
    pub fn entry_point(mut self, path: impl Into<PathBuf>) -> Self {
        self.entry_points.push(path.into());
        self
    }

    pub fn entry_points<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.entry_points.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn bundle(mut self, bundle: bool) -> Self {
        self.bundle = bundle;
        self
    }

    pub fn emit_type_declarations(mut self, emit: bool) -> Self {
        self.emit_type_declarations = emit;
        self
    }

    pub fn minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    pub fn external(mut self, specifier: impl Into<String>) -> Self {
        self.forced_externals.insert(specifier.into());
        self
    }

    pub fn override_rule(mut self, rule: ExternalOverride) -> Self {
        self.overrides.push(rule);
        self
    }

    pub fn hook(mut self, hook: Arc<dyn LifecycleHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Validate and freeze the descriptor.
    ///
    /// Hooks given to an esm descriptor are discarded: the same sources are
    /// staged by their commonjs sibling, and staging must run once.
    pub fn build(mut self) -> crate::Result<TargetDescriptor> {
        if self.name.trim().is_empty() {
            return Err(crate::Error::InvalidTarget {
                target: self.name,
                reason: "name must not be empty",
            });
        }
        if self.entry_points.is_empty() {
            return Err(crate::Error::InvalidTarget {
                target: self.name,
                reason: "at least one entry point is required",
            });
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(crate::Error::InvalidTarget {
                target: self.name,
                reason: "output path must not be empty",
            });
        }

        if self.format == Format::Esm && !self.hooks.is_empty() {
            tracing::debug!(
                name = %self.name,
                hooks = self.hooks.len(),
                "dropping hooks from esm target"
            );
            self.hooks.clear();
        }

        Ok(TargetDescriptor {
            name: self.name,
            entry_points: self.entry_points,
            output_path: self.output_path,
            format: self.format,
            bundle: self.bundle,
            emit_type_declarations: self.emit_type_declarations,
            minify: self.minify,
            forced_externals: self.forced_externals,
            overrides: self.overrides,
            hooks: self.hooks,
        })
    }
}

/// Reject descriptor sets where two targets would write the same file.
pub fn ensure_unique_outputs(targets: &[TargetDescriptor]) -> crate::Result<()> {
    let mut seen: HashMap<PathBuf, &str> = HashMap::new();

    for target in targets {
        for file in target.output_files() {
            let file = crate::paths::normalize(&file);
            if let Some(first) = seen.insert(file.clone(), target.name()) {
                return Err(crate::Error::DuplicateOutput {
                    first: first.to_owned(),
                    second: target.name().to_owned(),
                    path: file,
                });
            }
        }
    }

    Ok(())
}

/// Deepest directory containing every path in `paths`.
fn common_parent(paths: &[PathBuf]) -> PathBuf {
    let mut parents = paths.iter().filter_map(|p| p.parent());
    let Some(first) = parents.next() else {
        return PathBuf::new();
    };

    let mut base: Vec<_> = first.components().collect();
    for parent in parents {
        let shared = base
            .iter()
            .zip(parent.components())
            .take_while(|(a, b)| **a == *b)
            .count();
        base.truncate(shared);
    }
    base.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HookError, HookFuture, LifecycleHook};

    struct NoopHook;

    impl LifecycleHook for NoopHook {
        fn name(&self) -> &str {
            "noop"
        }

        fn before_build(&self) -> HookFuture<'_> {
            Box::pin(async { Ok::<(), HookError>(()) })
        }

        fn after_build(&self) -> HookFuture<'_> {
            Box::pin(async { Ok::<(), HookError>(()) })
        }
    }

    fn cli(format: Format) -> TargetDescriptor {
        TargetDescriptor::builder("cli", "build/index")
            .entry_point("src/bin.ts")
            .format(format)
            .hook(Arc::new(NoopHook))
            .build()
            .unwrap()
    }

    #[test]
    fn output_file_appends_format_extension() {
        assert_eq!(cli(Format::CommonJs).output_file(), PathBuf::from("build/index.js"));
        assert_eq!(cli(Format::Esm).output_file(), PathBuf::from("build/index.mjs"));
    }

    #[test]
    fn esm_target_never_carries_hooks() {
        assert_eq!(cli(Format::CommonJs).hooks().len(), 1);
        assert!(cli(Format::Esm).hooks().is_empty());
    }

    #[test]
    fn missing_entry_points_rejected() {
        let err = TargetDescriptor::builder("cli", "build/index")
            .build()
            .unwrap_err();
        assert!(matches!(err, crate::Error::InvalidTarget { .. }));
    }

    #[test]
    fn blank_name_rejected() {
        let err = TargetDescriptor::builder("  ", "build/index")
            .entry_point("src/bin.ts")
            .build()
            .unwrap_err();
        assert!(matches!(err, crate::Error::InvalidTarget { .. }));
    }

    #[test]
    fn same_path_in_two_formats_is_unique() {
        let targets = [cli(Format::CommonJs), cli(Format::Esm)];
        assert!(ensure_unique_outputs(&targets).is_ok());
    }

    #[test]
    fn duplicate_output_names_both_targets() {
        let other = TargetDescriptor::builder("other", "build/./index")
            .entry_point("src/other.ts")
            .build()
            .unwrap();
        let targets = [cli(Format::CommonJs), other];

        match ensure_unique_outputs(&targets) {
            Err(crate::Error::DuplicateOutput { first, second, path }) => {
                assert_eq!(first, "cli");
                assert_eq!(second, "other");
                assert_eq!(path, PathBuf::from("build/index.js"));
            }
            result => panic!("expected DuplicateOutput, got {result:?}"),
        }
    }

    fn library() -> TargetDescriptor {
        TargetDescriptor::builder("lib", "build")
            .entry_points(["src/a.ts", "src/b.ts"])
            .build()
            .unwrap()
    }

    #[test]
    fn several_entries_emit_one_file_each_under_output_path() {
        assert_eq!(
            library().output_files(),
            vec![PathBuf::from("build/a.js"), PathBuf::from("build/b.js")]
        );
        assert_eq!(library().output_dir(), Path::new("build"));
    }

    #[test]
    fn entries_in_sibling_dirs_keep_their_relative_layout() {
        let target = TargetDescriptor::builder("tools", "dist")
            .entry_points(["src/cli/main.ts", "src/worker/main.ts"])
            .format(Format::Esm)
            .build()
            .unwrap();

        assert_eq!(
            target.output_files(),
            vec![
                PathBuf::from("dist/cli/main.mjs"),
                PathBuf::from("dist/worker/main.mjs"),
            ]
        );
    }

    #[test]
    fn multi_entry_collision_with_single_entry_target_rejected() {
        let single = TargetDescriptor::builder("a", "build/a")
            .entry_point("src/a.ts")
            .build()
            .unwrap();
        let targets = [library(), single];

        match ensure_unique_outputs(&targets) {
            Err(crate::Error::DuplicateOutput { first, second, path }) => {
                assert_eq!(first, "lib");
                assert_eq!(second, "a");
                assert_eq!(path, PathBuf::from("build/a.js"));
            }
            result => panic!("expected DuplicateOutput, got {result:?}"),
        }
    }
}
