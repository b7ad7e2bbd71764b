//! Marker-prefix visibility.
//!
//! A path segment starting with the marker (by default `@`) names a module
//! private to the directory that contains it. The leading segment of a
//! rooted specifier is never a marker segment, so npm scopes such as
//! `@scope/pkg` are unaffected.

use scope_lint_core::specifier::{self, normalize_path};
use std::path::Path;

/// Marker-prefix rules for one marker.
#[derive(Debug, Clone)]
pub struct Visibility {
    marker: String,
}

impl Visibility {
    /// Creates visibility rules for `marker`.
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// The marker prefix.
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Returns true if `name` starts with the marker.
    #[must_use]
    pub fn is_marked(&self, name: &str) -> bool {
        name.starts_with(self.marker.as_str())
    }

    /// Indices of marker segments in `segments`.
    fn marker_positions(&self, segments: &[&str]) -> Vec<usize> {
        segments
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, s)| self.is_marked(s))
            .map(|(i, _)| i)
            .collect()
    }

    /// Returns true if importing `spec` from the file in `file_dir` reaches
    /// into a private module.
    ///
    /// Each marker segment must either be the first one and be reached
    /// purely by `..` traversal (`../@internal/x`), or contain the
    /// importing file.
    #[must_use]
    pub fn import_banned(&self, spec: &str, file_dir: &Path) -> bool {
        let segments = specifier::segments(spec);
        let positions = self.marker_positions(&segments);
        let Some(&first) = positions.first() else {
            return false;
        };

        let upward_only = {
            let prefix = &segments[..first];
            prefix.iter().all(|s| *s == "." || *s == "..") && prefix.contains(&"..")
        };

        let relative = specifier::is_relative(spec);
        let file_dir = normalize_path(file_dir);

        positions.iter().any(|&i| {
            if i == first && upward_only {
                return false;
            }
            if !relative {
                return true;
            }
            let scope = normalize_path(&file_dir.join(segments[..=i].join("/")));
            !file_dir.starts_with(&scope)
        })
    }

    /// Returns true if re-exporting `spec` from a file with stem
    /// `file_stem` exposes a private module.
    ///
    /// Any marker segment is banned, unless the exporting file is itself
    /// marker-prefixed, in which case only a second marker segment is.
    #[must_use]
    pub fn export_banned(&self, spec: &str, file_stem: &str) -> bool {
        let segments = specifier::segments(spec);
        let count = self.marker_positions(&segments).len();
        if self.is_marked(file_stem) {
            count >= 2
        } else {
            count >= 1
        }
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::new("@")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v() -> Visibility {
        Visibility::default()
    }

    #[test]
    fn upward_traversal_into_marker_is_allowed() {
        let dir = Path::new("/p/src/feature/@internal");
        assert!(!v().import_banned("../@internal/other", dir));
        assert!(!v().import_banned("../../@shared/x", Path::new("/p/src/feature/a")));
    }

    #[test]
    fn sibling_import_into_marker_is_banned() {
        let dir = Path::new("/p/src/feature");
        assert!(v().import_banned("./@internal/other", dir));
        assert!(v().import_banned("../feature/@internal/other", dir));
    }

    #[test]
    fn file_inside_marker_scope_may_reach_it() {
        let dir = Path::new("/p/src/feature/@internal/deep");
        assert!(!v().import_banned("../../feature/@internal/other", dir));
        assert!(!v().import_banned(
            "../../@internal/@inner/x",
            Path::new("/p/src/feature/@internal/@inner")
        ));
    }

    #[test]
    fn second_marker_outside_scope_is_banned() {
        let dir = Path::new("/p/src/feature/a");
        assert!(v().import_banned("../@internal/@inner/x", dir));
    }

    #[test]
    fn npm_scope_is_not_a_marker() {
        let dir = Path::new("/p/src");
        assert!(!v().import_banned("@scope/pkg", dir));
        assert!(v().import_banned("@scope/pkg/@private", dir));
        assert!(!v().export_banned("@scope/pkg", "index"));
    }

    #[test]
    fn plain_specifiers_are_fine() {
        assert!(!v().import_banned("./a", Path::new("/p")));
        assert!(!v().import_banned("../b/c", Path::new("/p/x")));
        assert!(!v().export_banned("./a", "index"));
    }

    #[test]
    fn export_rules() {
        assert!(v().export_banned("./@internal", "index"));
        assert!(v().export_banned("../@internal/x", "index"));
        assert!(!v().export_banned("./@internal/x", "@internal"));
        assert!(v().export_banned("./@internal/@deeper", "@internal"));
    }

    #[test]
    fn renaming_a_directory_to_marked_changes_only_crossing_verdicts() {
        // (importer dir, specifier, crosses the renamed directory's boundary)
        const CASES: &[(&str, &str, bool)] = &[
            ("/p/src/feature", "./{d}/x", true),
            ("/p/src/feature", "../feature/{d}/x", true),
            ("/p/src/other", "../feature/{d}/x", true),
            ("/p/src/feature/{d}", "./x", false),
            ("/p/src/feature/{d}", "../{d}/y", false),
            ("/p/src/feature/{d}/deep", "../y", false),
            ("/p/src/feature/{d}/deep", "../../feature/{d}/x", false),
            ("/p/src/other", "./z", false),
            ("/p/src/other", "../feature/x", false),
        ];

        let banned = |name: &str, dir: &str, spec: &str| {
            v().import_banned(&spec.replace("{d}", name), Path::new(&dir.replace("{d}", name)))
        };

        for &(dir, spec, crosses) in CASES {
            assert!(!banned("lib", dir, spec), "before rename: {dir} {spec}");
            assert_eq!(banned("@lib", dir, spec), crosses, "after rename: {dir} {spec}");
        }
    }

    #[test]
    fn renaming_changes_export_verdicts_only_for_the_renamed_path() {
        const CASES: &[(&str, bool)] = &[
            ("./{d}", true),
            ("./{d}/x", true),
            ("./x", false),
            ("../other/x", false),
        ];

        for &(spec, crosses) in CASES {
            assert!(!v().export_banned(&spec.replace("{d}", "lib"), "index"));
            assert_eq!(
                v().export_banned(&spec.replace("{d}", "@lib"), "index"),
                crosses,
                "{spec}"
            );
        }
    }

    #[test]
    fn custom_marker() {
        let v = Visibility::new("_");
        assert!(v.import_banned("./_private/x", Path::new("/p")));
        assert!(!v.import_banned("./@public/x", Path::new("/p")));
        assert_eq!(v.marker(), "_");
    }
}
