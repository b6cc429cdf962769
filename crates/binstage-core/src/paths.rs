//! Lexical path helpers.
//!
//! Nothing here touches the filesystem: resolution overrides must be
//! decidable for paths that do not exist yet (outputs of a build that has
//! not run).

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without requiring the path to exist.
///
/// `..` at the root is dropped, matching how the OS treats `/..`.
pub fn normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            other => components.push(other),
        }
    }

    components.iter().collect()
}

/// Join `specifier` onto `base` and normalize the result.
///
/// An absolute `specifier` replaces `base`, as `Path::join` does.
pub fn resolve(base: &Path, specifier: &str) -> PathBuf {
    normalize(&base.join(specifier))
}

/// Path of `target` relative to the directory `from`, using `/` separators
/// and a leading `./` when the result does not already climb with `..`.
///
/// Returns `None` when no relative path exists (e.g. different prefixes on
/// Windows).
pub fn relative_specifier(from: &Path, target: &Path) -> Option<String> {
    let rel = pathdiff::diff_paths(normalize(target), normalize(from))?;
    let joined = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");

    if joined.starts_with("..") {
        Some(joined)
    } else {
        Some(format!("./{joined}"))
    }
}

/// Expand `{os}` and `{arch}` placeholders with the host platform.
pub fn expand_platform(template: &str) -> String {
    template
        .replace("{os}", std::env::consts::OS)
        .replace("{arch}", std::env::consts::ARCH)
}
