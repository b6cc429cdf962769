use std::path::{Path, PathBuf};

use binstage_core::ExternalOverride;
use proptest::prelude::*;

#[test]
fn own_manifest_is_external_and_redirected() {
    let rule = ExternalOverride::for_output("/proj/pkg/package.json", Path::new("/proj/pkg/build/index"));
    let redirect = rule
        .resolve(Path::new("/proj/pkg/src"), "../package.json")
        .unwrap();

    assert!(redirect.external);
    assert_eq!(redirect.path, "../package.json");
}

#[test]
fn other_package_manifest_declines() {
    let rule = ExternalOverride::new("/proj/pkg/package.json", "/proj/pkg/build");

    assert!(
        rule.resolve(Path::new("/proj/other-pkg"), "package.json")
            .is_none()
    );
}

#[test]
fn absolute_specifier_matches_on_resolved_path() {
    let rule = ExternalOverride::new("/proj/pkg/package.json", "/proj/pkg/build/nested");
    let redirect = rule
        .resolve(Path::new("/anywhere"), "/proj/pkg/package.json")
        .unwrap();

    assert_eq!(redirect.path, "../../package.json");
}

proptest! {
    /// Whatever directory the import sits in, reaching the manifest through
    /// it yields the same redirect, which points back at the manifest.
    #[test]
    fn redirect_depends_only_on_output_dir(depth in 0usize..5, out_depth in 0usize..4) {
        let src: PathBuf = std::iter::once("/proj/pkg".to_owned())
            .chain((0..depth).map(|i| format!("d{i}")))
            .collect();
        let specifier = format!("{}package.json", "../".repeat(depth));
        let out: PathBuf = std::iter::once("/proj/pkg".to_owned())
            .chain((0..out_depth).map(|i| format!("o{i}")))
            .collect();

        let rule = ExternalOverride::new("/proj/pkg/package.json", &out);
        let redirect = rule.resolve(&src, &specifier).unwrap();

        prop_assert!(redirect.external);
        let back = binstage_core::paths::resolve(&out, &redirect.path);
        prop_assert_eq!(back, PathBuf::from("/proj/pkg/package.json"));
    }
}
