//! Rule keeping barrels complete and marker-prefixed modules private.
//!
//! # Checks
//!
//! | Code | Trigger | Fix |
//! |------|---------|-----|
//! | SM001 | import reaching into a private module | none |
//! | SM002 | export exposing a private module | delete statement |
//! | SM003 | index/namespace file missing sibling re-exports | append `export * from` lines |
//! | SM004 | index file not referencing its namespace file | append namespace export |
//! | SM005 | other import in an index file next to a namespace file | delete statement |
//! | SM006 | other export in an index file next to a namespace file | delete statement |
//!
//! # Configuration
//!
//! ```toml
//! [rules.scoped-modules]
//! marker = "@"
//! ```
//!
//! # Suppression
//!
//! - `// scope-lint: allow(scoped-modules)` or `// scope-lint: allow(SM001)`

use crate::completeness::{
    expected_exports, export_line, missing_exports, references_namespace, uses_js_extension,
    NAMESPACE_EXPORT_LINE, NAMESPACE_SPECIFIER,
};
use crate::snapshot::{DirectorySnapshot, SnapshotProvider};
use crate::visibility::Visibility;
use scope_lint_core::specifier::{file_stem, is_index_file, is_namespace_file, same_module};
use scope_lint_core::{
    fix, Config, FileContext, ModuleStatement, Rule, StatementKind, Suggestion,
    Violation,
};
use tracing::debug;

/// Rule name for scoped-modules.
pub const NAME: &str = "scoped-modules";

/// Import reaching into a private module.
pub const BANNED_IMPORT: &str = "SM001";
/// Export exposing a private module.
pub const BANNED_EXPORT: &str = "SM002";
/// Barrel missing re-exports.
pub const MISSING_EXPORTS: &str = "SM003";
/// Index file missing its namespace reference.
pub const MISSING_IMPORTS: &str = "SM004";
/// Import in an index file while a namespace file exists.
pub const BANNED_IMPORT_WHEN_NAMESPACE_EXISTS: &str = "SM005";
/// Export in an index file while a namespace file exists.
pub const BANNED_EXPORT_WHEN_NAMESPACE_EXISTS: &str = "SM006";

/// Default marker prefix.
pub const DEFAULT_MARKER: &str = "@";

/// Enforces barrel completeness and marker-prefix visibility.
pub struct ScopedModules {
    visibility: Visibility,
    snapshots: SnapshotProvider,
}

impl ScopedModules {
    /// Creates the rule with the default marker and an empty snapshot cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            visibility: Visibility::new(DEFAULT_MARKER),
            snapshots: SnapshotProvider::new(),
        }
    }

    /// Creates the rule from `[rules.scoped-modules]` options.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let marker = config
            .rule_config(NAME)
            .map_or(DEFAULT_MARKER, |c| c.get_str("marker", DEFAULT_MARKER));
        Self::new().with_marker(marker)
    }

    /// Sets the marker prefix.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.visibility = Visibility::new(marker);
        self
    }

    fn violation(
        &self,
        ctx: &FileContext,
        code: &str,
        range: std::ops::Range<usize>,
        message: impl Into<String>,
        suggestion: Suggestion,
    ) -> Violation {
        Violation::new(
            code,
            NAME,
            self.default_severity(),
            ctx.span_location(range),
            message,
        )
        .with_suggestion(suggestion)
    }

    fn check_visibility(
        &self,
        ctx: &FileContext,
        statements: &[ModuleStatement],
        stem: &str,
    ) -> Vec<Violation> {
        let marker = self.visibility.marker();
        let mut violations = Vec::new();

        for statement in statements {
            match statement.kind {
                StatementKind::Import => {
                    if self.visibility.import_banned(&statement.specifier, ctx.dir()) {
                        violations.push(self.violation(
                            ctx,
                            BANNED_IMPORT,
                            statement.range.clone(),
                            format!(
                                "'{}' can not be imported, because it contains an internal module with prefix `{marker}` under a parallel directory",
                                statement.specifier
                            ),
                            Suggestion::new("Import the module through its public parent instead"),
                        ));
                    }
                }
                StatementKind::Export | StatementKind::ExportAs => {
                    if !self.visibility.export_banned(&statement.specifier, stem) {
                        continue;
                    }
                    let message = format!(
                        "'{}' can not be exported, because it contains an internal module with prefix `{marker}`",
                        statement.specifier
                    );
                    let suggestion = if statement.kind == StatementKind::Export {
                        Suggestion::with_fix(
                            "Remove this export",
                            fix::delete_through_next_token(ctx, statement.range.clone()),
                        )
                    } else {
                        Suggestion::new("Remove this export")
                    };
                    violations.push(self.violation(
                        ctx,
                        BANNED_EXPORT,
                        statement.range.clone(),
                        message,
                        suggestion,
                    ));
                }
                // Only module-level statements are scoped.
                StatementKind::ImportCall => {}
            }
        }

        violations
    }

    fn check_completeness(
        &self,
        ctx: &FileContext,
        statements: &[ModuleStatement],
        snapshot: &DirectorySnapshot,
        stem: &str,
    ) -> Option<Violation> {
        let expected = expected_exports(snapshot, &self.visibility, stem);
        let missing = missing_exports(&expected, statements);
        if missing.is_empty() {
            return None;
        }

        debug!(
            "{}: {} of {} expected exports missing",
            ctx.relative_path.display(),
            missing.len(),
            expected.len()
        );

        let js_extension = uses_js_extension(statements);
        let lines: Vec<String> = missing
            .iter()
            .map(|spec| export_line(spec, js_extension))
            .collect();

        Some(self.violation(
            ctx,
            MISSING_EXPORTS,
            0..0,
            format!(
                "Missing modules expected to be exported: {}",
                missing.join(", ")
            ),
            Suggestion::with_fix("Add the missing exports", fix::append_lines(ctx, &lines)),
        ))
    }

    /// An index file next to a namespace file may only reference it.
    fn check_namespace_index(
        &self,
        ctx: &FileContext,
        statements: &[ModuleStatement],
    ) -> Vec<Violation> {
        let mut violations = Vec::new();

        for statement in statements {
            let names_namespace = same_module(&statement.specifier, NAMESPACE_SPECIFIER);
            let code = match statement.kind {
                StatementKind::Import if !names_namespace => BANNED_IMPORT_WHEN_NAMESPACE_EXISTS,
                StatementKind::Export => BANNED_EXPORT_WHEN_NAMESPACE_EXISTS,
                StatementKind::ExportAs if !names_namespace => {
                    BANNED_EXPORT_WHEN_NAMESPACE_EXISTS
                }
                _ => continue,
            };
            let verb = if statement.kind == StatementKind::Import {
                "imported"
            } else {
                "exported"
            };
            violations.push(self.violation(
                ctx,
                code,
                statement.range.clone(),
                format!(
                    "'{}' can not be {verb} since a namespace file exists",
                    statement.specifier
                ),
                Suggestion::with_fix(
                    "Remove this statement",
                    fix::delete(ctx, statement.full_range()),
                ),
            ));
        }

        if !references_namespace(statements) {
            violations.push(self.violation(
                ctx,
                MISSING_IMPORTS,
                0..0,
                format!("Missing modules expected to be imported: {NAMESPACE_SPECIFIER}"),
                Suggestion::with_fix(
                    "Export the namespace",
                    fix::append_lines(ctx, &[NAMESPACE_EXPORT_LINE]),
                ),
            ));
        }

        violations
    }
}

impl Default for ScopedModules {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for ScopedModules {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        BANNED_IMPORT
    }

    fn description(&self) -> &'static str {
        "Keeps index/namespace barrels complete and marker-prefixed modules private"
    }

    /// Directory listings are only valid for the run that read them.
    fn begin_run(&self) {
        self.snapshots.clear();
    }

    fn check(&self, ctx: &FileContext, statements: &[ModuleStatement]) -> Vec<Violation> {
        let file_name = ctx.file_name();
        let index = is_index_file(&file_name);
        let structural = index || is_namespace_file(&file_name);

        let cached = structural.then(|| self.snapshots.snapshot(ctx.dir()));
        // An unreadable directory degrades to visibility checks only.
        let snapshot = cached.as_deref().and_then(|r| r.as_ref().ok());

        if index && snapshot.is_some_and(DirectorySnapshot::has_namespace_file) {
            return self.check_namespace_index(ctx, statements);
        }

        let stem = file_stem(ctx.path);
        let mut violations = self.check_visibility(ctx, statements, &stem);
        if let Some(snapshot) = snapshot {
            violations.extend(self.check_completeness(ctx, statements, snapshot, &stem));
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scope_lint_core::StatementExtractor;
    use scope_lint_ts::TypeScriptExtractor;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn check(rule: &ScopedModules, root: &Path, rel: &str) -> (String, Vec<Violation>) {
        let path = root.join(rel);
        let content = fs::read_to_string(&path).unwrap();
        let statements = TypeScriptExtractor::new()
            .extract(rel, &content)
            .unwrap();
        let ctx = FileContext::new(&path, &content, root);
        let violations = rule.check(&ctx, &statements);
        (content, violations)
    }

    fn codes(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.code.as_str()).collect()
    }

    fn apply_all(content: &str, violations: &[Violation]) -> String {
        let fixes: Vec<_> = violations.iter().filter_map(Violation::fix).collect();
        fix::apply(content, &fixes).0
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn missing_export_is_appended() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.ts", "export const a = 1;\n");
        write(tmp.path(), "b.ts", "export const b = 2;\n");
        write(tmp.path(), "index.ts", "export * from './a';\n");

        let rule = ScopedModules::new();
        let (content, violations) = check(&rule, tmp.path(), "index.ts");
        assert_eq!(codes(&violations), vec![MISSING_EXPORTS]);
        assert!(violations[0].message.ends_with("./b"));

        let fixed = apply_all(&content, &violations);
        insta::assert_snapshot!(fixed.trim_end(), @r"
        export * from './a';
        export * from './b';
        ");

        write(tmp.path(), "index.ts", &fixed);
        let (_, again) = check(&rule, tmp.path(), "index.ts");
        assert!(again.is_empty());
    }

    #[test]
    fn missing_exports_reported_iff_expected_not_covered() {
        // Expected exports of the directory: ./a, ./b, ./sub
        const CASES: &[(&str, bool)] = &[
            ("", false),
            ("export * from './a';\n", false),
            ("export * from './a';\nexport * from './b';\nexport * from './sub';\n", true),
            ("export * from './a.js';\nexport { b } from './b';\nexport * from './sub/index';\nexport * from './sub';\n", true),
            ("export * as A from './a';\nexport * from './b';\nexport * from './sub';\n", false),
            ("import './a';\nexport * from './b';\nexport * from './sub';\n", false),
            ("export * from './a';\nexport * from './b';\nexport * from './sub';\nexport * from './extra';\n", true),
        ];

        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.ts", "");
        write(tmp.path(), "b.tsx", "");
        write(tmp.path(), "sub/index.ts", "");

        let rule = ScopedModules::new();
        for &(content, complete) in CASES {
            write(tmp.path(), "index.ts", content);
            let (_, violations) = check(&rule, tmp.path(), "index.ts");
            let reported = codes(&violations).contains(&MISSING_EXPORTS);
            assert_eq!(reported, !complete, "{content}");
        }
    }

    #[test]
    fn js_extension_convention_is_followed() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.ts", "");
        write(tmp.path(), "b.ts", "");
        write(tmp.path(), "sub/index.ts", "");
        write(tmp.path(), "index.ts", "export * from './a.js';\n");

        let (content, violations) = check(&ScopedModules::new(), tmp.path(), "index.ts");
        let fixed = apply_all(&content, &violations);
        assert_eq!(
            fixed,
            "export * from './a.js';\nexport * from './b.js';\nexport * from './sub.js';\n"
        );
    }

    #[test]
    fn private_and_foreign_entries_are_not_expected() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "@internal/index.ts", "");
        write(tmp.path(), "@helper.ts", "");
        write(tmp.path(), "styles.css", "");
        write(tmp.path(), "no-index/x.ts", "");
        write(tmp.path(), "index.ts", "");

        let (_, violations) = check(&ScopedModules::new(), tmp.path(), "index.ts");
        assert!(violations.is_empty());
    }

    #[test]
    fn namespace_file_collapses_index() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.ts", "export const a = 1;\n");
        write(tmp.path(), "namespace.ts", "export * from './a';\n");
        write(tmp.path(), "index.ts", "export * from './a';\n");

        let rule = ScopedModules::new();
        let (content, violations) = check(&rule, tmp.path(), "index.ts");
        assert_eq!(
            codes(&violations),
            vec![BANNED_EXPORT_WHEN_NAMESPACE_EXISTS, MISSING_IMPORTS]
        );

        let fixed = apply_all(&content, &violations);
        assert_eq!(fixed, format!("{NAMESPACE_EXPORT_LINE}\n"));

        write(tmp.path(), "index.ts", &fixed);
        let (_, again) = check(&rule, tmp.path(), "index.ts");
        assert!(again.is_empty());

        let (_, namespace) = check(&rule, tmp.path(), "namespace.ts");
        assert!(namespace.is_empty());
    }

    #[test]
    fn namespace_mode_flags_other_imports_with_trivia() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "namespace.ts", "");
        write(
            tmp.path(),
            "index.ts",
            "import * as Namespace from './namespace';\n// helper\nimport './side';\nexport { Namespace };\n",
        );

        let (content, violations) = check(&ScopedModules::new(), tmp.path(), "index.ts");
        assert_eq!(codes(&violations), vec![BANNED_IMPORT_WHEN_NAMESPACE_EXISTS]);
        assert_eq!(
            apply_all(&content, &violations),
            "import * as Namespace from './namespace';\nexport { Namespace };\n"
        );
    }

    #[test]
    fn import_calls_are_outside_module_scope() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "namespace.ts", "");
        write(
            tmp.path(),
            "index.ts",
            "export * as Namespace from './namespace';\nexport const load = () => import('./@internal/lazy');\n",
        );

        let (_, violations) = check(&ScopedModules::new(), tmp.path(), "index.ts");
        assert!(violations.is_empty());
    }

    #[test]
    fn namespace_file_is_checked_for_completeness() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.ts", "");
        write(tmp.path(), "b.ts", "");
        write(tmp.path(), "index.ts", "export * as Namespace from './namespace';\n");
        write(tmp.path(), "namespace.ts", "export * from './a';\n");

        let (_, violations) = check(&ScopedModules::new(), tmp.path(), "namespace.ts");
        assert_eq!(codes(&violations), vec![MISSING_EXPORTS]);
    }

    #[test]
    fn marker_scoped_imports() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "feature/@internal/helper.ts", "import { o } from '../@internal/other';\n");
        write(tmp.path(), "feature/@internal/other.ts", "export const o = 1;\n");
        write(tmp.path(), "feature/sibling.ts", "import { o } from './@internal/other';\n");

        let rule = ScopedModules::new();
        let (_, inside) = check(&rule, tmp.path(), "feature/@internal/helper.ts");
        assert!(inside.is_empty());

        let (_, outside) = check(&rule, tmp.path(), "feature/sibling.ts");
        assert_eq!(codes(&outside), vec![BANNED_IMPORT]);
        assert!(outside[0].fix().is_none());
    }

    #[test]
    fn banned_export_is_deleted() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "feature/api.ts",
            "export * from './@internal/x';\nexport * from './public';\n",
        );

        let (content, violations) = check(&ScopedModules::new(), tmp.path(), "feature/api.ts");
        assert_eq!(codes(&violations), vec![BANNED_EXPORT]);
        assert_eq!(apply_all(&content, &violations), "export * from './public';\n");
    }

    #[test]
    fn marker_prefixed_file_may_export_its_scope() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "feature/@internal.ts",
            "export * from './@internal/x';\nexport * from './@internal/@deeper/y';\n",
        );

        let (_, violations) = check(&ScopedModules::new(), tmp.path(), "feature/@internal.ts");
        assert_eq!(codes(&violations), vec![BANNED_EXPORT]);
        assert_eq!(violations[0].location.line, 2);
    }

    #[test]
    fn custom_marker_from_config() {
        let config = Config::parse("[rules.scoped-modules]\nmarker = \"_\"\n").unwrap();
        let rule = ScopedModules::from_config(&config);

        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.ts", "import './_private/x';\nimport './@public/y';\n");
        let (_, violations) = check(&rule, tmp.path(), "a.ts");
        assert_eq!(codes(&violations), vec![BANNED_IMPORT]);
        assert_eq!(violations[0].location.line, 1);
    }

    #[test]
    fn reused_analyzer_sees_new_sibling_files() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.ts", "export const a = 1;\n");
        write(tmp.path(), "index.ts", "export * from './a';\n");

        let analyzer = scope_lint_core::Analyzer::builder()
            .root(tmp.path())
            .extractor(TypeScriptExtractor::new())
            .rule(ScopedModules::new())
            .build()
            .unwrap();
        assert!(analyzer.analyze().unwrap().violations.is_empty());

        write(tmp.path(), "b.ts", "export const b = 2;\n");
        let second = analyzer.analyze().unwrap();
        assert_eq!(codes(&second.violations), vec![MISSING_EXPORTS]);
        assert!(second.violations[0].message.ends_with("./b"));
    }

    #[test]
    fn namespace_fix_writes_index_without_blank_line() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.ts", "export const a = 1;\n");
        write(tmp.path(), "namespace.ts", "export * from './a';\n");
        write(tmp.path(), "index.ts", "export * from './a';\n");

        let result = scope_lint_core::Analyzer::builder()
            .root(tmp.path())
            .extractor(TypeScriptExtractor::new())
            .rule(ScopedModules::new())
            .build()
            .unwrap()
            .fix()
            .unwrap();
        assert!(result.violations.is_empty());
        assert_eq!(
            fs::read_to_string(tmp.path().join("index.ts")).unwrap(),
            format!("{NAMESPACE_EXPORT_LINE}\n")
        );
    }

    #[test]
    fn snapshot_cache_is_cleared_between_runs() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.ts", "");
        write(tmp.path(), "index.ts", "export * from './a';\n");

        let rule = ScopedModules::new();
        let (_, before) = check(&rule, tmp.path(), "index.ts");
        assert!(before.is_empty());

        write(tmp.path(), "b.ts", "");
        let (_, cached) = check(&rule, tmp.path(), "index.ts");
        assert!(cached.is_empty());

        rule.begin_run();
        let (_, fresh) = check(&rule, tmp.path(), "index.ts");
        assert_eq!(codes(&fresh), vec![MISSING_EXPORTS]);
    }

    #[test]
    fn unreadable_directory_degrades_to_visibility_only() {
        let rule = ScopedModules::new();
        let content = "export * from './@x';\n";
        let path = Path::new("/nonexistent/scope-lint/index.ts");
        let statements = TypeScriptExtractor::new()
            .extract("index.ts", content)
            .unwrap();
        let ctx = FileContext::new(path, content, Path::new("/nonexistent"));
        assert_eq!(codes(&rule.check(&ctx, &statements)), vec![BANNED_EXPORT]);
    }
}
