use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Format;

/// File name of the project configuration.
pub const CONFIG_FILE_NAME: &str = "binstage.toml";

/// binstage.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BinstageConfig {
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub compiler: CompilerConfig,
    /// Auxiliary step run before the staged target compiles
    #[serde(default)]
    pub prebuild: Option<PrebuildConfig>,
    #[serde(default, rename = "target")]
    pub targets: Vec<TargetConfig>,
    /// Copy steps run after the staged target compiles, in order
    #[serde(default, rename = "stage")]
    pub stage: Vec<StageSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Shared binary-module store, relative to the workspace root
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
    /// First line written to the primary output
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Bundler executable
    #[serde(default = "default_compiler_program")]
    pub program: String,
    /// esbuild `--platform`
    #[serde(default = "default_platform")]
    pub platform: String,
    /// esbuild `--target` (e.g. node16)
    #[serde(default)]
    pub target: Option<String>,
    /// Program emitting type declarations when a target asks for them
    #[serde(default = "default_declarations_program")]
    pub declarations: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrebuildConfig {
    /// Shell command, run from the workspace root
    pub command: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub name: String,
    pub entry_points: Vec<PathBuf>,
    /// Output path without extension, relative to the workspace root
    pub output: PathBuf,
    /// One descriptor is produced per format, in order
    #[serde(default = "default_formats")]
    pub formats: Vec<Format>,
    #[serde(default = "default_true")]
    pub bundle: bool,
    #[serde(default)]
    pub minify: bool,
    #[serde(default)]
    pub emit_types: bool,
    /// Attach the staging hook (commonjs build only)
    #[serde(default)]
    pub stage: bool,
    /// Keep the workspace's own package.json out of the bundle
    #[serde(default)]
    pub external_manifest: bool,
    /// Module specifiers never inlined
    #[serde(default)]
    pub external: Vec<String>,
}

/// One configured copy step of the staging hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StageSpec {
    /// Copy a package's build-output directory recursively
    PackageDir {
        package: String,
        subdir: PathBuf,
        dest: PathBuf,
    },
    /// Copy one file found relative to a package's directory
    PackageFile {
        package: String,
        path: String,
        dest: PathBuf,
    },
    /// Copy one file out of the shared module store
    StoreFile { path: String, dest: PathBuf },
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            interpreter: default_interpreter(),
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: default_compiler_program(),
            platform: default_platform(),
            target: None,
            declarations: default_declarations_program(),
        }
    }
}

impl BinstageConfig {
    /// Load binstage.toml from the project directory.
    pub fn load(project_dir: &Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE_NAME);
        let content =
            std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                path: config_path.clone(),
                source: e,
            })?;
        let config: Self = toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
            path: config_path,
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that span targets; per-descriptor checks happen when the
    /// descriptors are built.
    pub fn validate(&self) -> crate::Result<()> {
        let mut staged: Option<&str> = None;

        for target in &self.targets {
            if target.formats.is_empty() {
                return Err(crate::Error::InvalidTarget {
                    target: target.name.clone(),
                    reason: "at least one format is required",
                });
            }
            if !target.stage {
                continue;
            }
            if !target.formats.contains(&Format::CommonJs) {
                return Err(crate::Error::InvalidTarget {
                    target: target.name.clone(),
                    reason: "staging runs on the cjs build; add \"cjs\" to formats",
                });
            }
            if target.entry_points.len() != 1 {
                return Err(crate::Error::InvalidTarget {
                    target: target.name.clone(),
                    reason: "a staged target needs exactly one entry point",
                });
            }
            if staged.replace(&target.name).is_some() {
                return Err(crate::Error::InvalidTarget {
                    target: target.name.clone(),
                    reason: "only one target may set stage = true",
                });
            }
        }

        Ok(())
    }

    /// The target carrying the staging hook, if any.
    pub fn staged_target(&self) -> Option<&TargetConfig> {
        self.targets.iter().find(|t| t.stage)
    }
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("node_modules/.pnpm")
}

fn default_interpreter() -> String {
    "#!/usr/bin/env node".to_owned()
}

fn default_compiler_program() -> String {
    "esbuild".to_owned()
}

fn default_platform() -> String {
    "node".to_owned()
}

fn default_declarations_program() -> String {
    "tsc".to_owned()
}

fn default_formats() -> Vec<Format> {
    vec![Format::CommonJs]
}

fn default_true() -> bool {
    true
}
