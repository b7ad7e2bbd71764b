//! Export completeness of index and namespace files.

use crate::snapshot::{DirectorySnapshot, EntryKind};
use crate::visibility::Visibility;
use scope_lint_core::specifier::{
    has_known_extension, is_index_file, is_namespace_file, normalize, same_module,
    strip_module_extension,
};
use scope_lint_core::{ModuleStatement, StatementKind};
use std::collections::HashSet;

/// Specifier an index file must reference when a namespace file exists.
pub const NAMESPACE_SPECIFIER: &str = "./namespace";

/// Line appended when an index file does not reference its namespace file.
pub const NAMESPACE_EXPORT_LINE: &str = "export * as Namespace from './namespace';";

/// Specifiers a barrel in `snapshot`'s directory is expected to re-export,
/// in snapshot order.
#[must_use]
pub fn expected_exports(
    snapshot: &DirectorySnapshot,
    visibility: &Visibility,
    file_stem: &str,
) -> Vec<String> {
    let mut seen = HashSet::new();
    snapshot
        .entries
        .iter()
        .filter_map(|entry| match entry.kind {
            EntryKind::File
                if has_known_extension(&entry.name)
                    && !is_index_file(&entry.name)
                    && !is_namespace_file(&entry.name) =>
            {
                Some(format!("./{}", strip_module_extension(&entry.name)))
            }
            EntryKind::SubPackage => Some(format!("./{}", entry.name)),
            _ => None,
        })
        .filter(|spec| !visibility.export_banned(spec, file_stem))
        .filter(|spec| seen.insert(spec.clone()))
        .collect()
}

/// Expected specifiers with no matching `Export` statement.
#[must_use]
pub fn missing_exports(expected: &[String], statements: &[ModuleStatement]) -> Vec<String> {
    let actual: HashSet<&str> = statements
        .iter()
        .filter(|s| s.kind == StatementKind::Export)
        .map(|s| normalize(&s.specifier))
        .collect();

    expected
        .iter()
        .filter(|spec| !actual.contains(spec.as_str()))
        .cloned()
        .collect()
}

/// Returns true if existing exports spell out the `.js` extension.
#[must_use]
pub fn uses_js_extension(statements: &[ModuleStatement]) -> bool {
    statements
        .iter()
        .any(|s| s.kind == StatementKind::Export && s.specifier.ends_with(".js"))
}

/// `export * from '<spec>';`, with the `.js` suffix when requested.
#[must_use]
pub fn export_line(spec: &str, js_extension: bool) -> String {
    let suffix = if js_extension { ".js" } else { "" };
    format!("export * from '{spec}{suffix}';")
}

/// Returns true if an `Import` or `ExportAs` statement references the
/// namespace file.
#[must_use]
pub fn references_namespace(statements: &[ModuleStatement]) -> bool {
    statements.iter().any(|s| {
        matches!(s.kind, StatementKind::Import | StatementKind::ExportAs)
            && same_module(&s.specifier, NAMESPACE_SPECIFIER)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::DirectoryEntry;
    use std::path::PathBuf;

    fn snapshot(entries: &[(&str, EntryKind)]) -> DirectorySnapshot {
        DirectorySnapshot {
            dir: PathBuf::from("/p/src/mod"),
            entries: entries
                .iter()
                .map(|(name, kind)| DirectoryEntry {
                    name: (*name).to_string(),
                    kind: *kind,
                })
                .collect(),
        }
    }

    fn export(spec: &str) -> ModuleStatement {
        ModuleStatement::new(StatementKind::Export, spec, 0..1)
    }

    #[test]
    fn expected_set_follows_entry_rules() {
        let s = snapshot(&[
            ("@internal", EntryKind::SubPackage),
            ("a.ts", EntryKind::File),
            ("b.d.ts", EntryKind::File),
            ("b.ts", EntryKind::File),
            ("index.ts", EntryKind::File),
            ("namespace.ts", EntryKind::File),
            ("readme.md", EntryKind::File),
            ("sub", EntryKind::SubPackage),
            ("plain", EntryKind::Ignored),
        ]);
        assert_eq!(
            expected_exports(&s, &Visibility::default(), "index"),
            vec!["./a", "./b", "./sub"]
        );
    }

    #[test]
    fn missing_ignores_extension_and_other_kinds() {
        let expected = vec!["./a".to_string(), "./b".to_string(), "./c".to_string()];
        let statements = vec![
            export("./a.js"),
            ModuleStatement::new(StatementKind::ExportAs, "./b", 0..1),
            ModuleStatement::new(StatementKind::Import, "./c", 0..1),
        ];
        assert_eq!(missing_exports(&expected, &statements), vec!["./b", "./c"]);
        assert!(uses_js_extension(&statements));
    }

    #[test]
    fn export_lines() {
        assert_eq!(export_line("./b", false), "export * from './b';");
        assert_eq!(export_line("./b", true), "export * from './b.js';");
    }

    #[test]
    fn namespace_reference_by_import_or_export_as() {
        assert!(references_namespace(&[ModuleStatement::new(
            StatementKind::ExportAs,
            "./namespace",
            0..1
        )]));
        assert!(references_namespace(&[ModuleStatement::new(
            StatementKind::Import,
            "./namespace.js",
            0..1
        )]));
        assert!(!references_namespace(&[export("./namespace")]));
    }
}
