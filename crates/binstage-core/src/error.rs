use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // ── Target validation ──
    #[error("invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: &'static str },

    #[error("targets '{first}' and '{second}' both write {path}")]
    DuplicateOutput {
        first: String,
        second: String,
        path: PathBuf,
    },

    // ── Module resolution ──
    #[error(
        "package '{package}' not found in any node_modules above {}",
        searched_from.display()
    )]
    PackageNotFound {
        package: String,
        searched_from: PathBuf,
    },

    #[error("failed to read package manifest {path}")]
    ManifestRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse package manifest {path}")]
    ManifestParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("manifest {path} declares package '{found}', expected '{expected}'")]
    ManifestNameMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
}
