//! Check command implementation.

use anyhow::{Context, Result};
use scope_lint_core::{
    Analyzer, FileContext, ModuleStatement, Rule, RuleBox, Severity, Violation,
};
use scope_lint_rules::{rules_from_config, RULES};
use scope_lint_ts::TypeScriptExtractor;
use std::path::Path;

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Options of the check command.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated rule names or codes to run.
    pub rules: Option<String>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
    /// Apply automatic fixes.
    pub fix: bool,
}

/// Runs the check command. Returns false when violations at or above the
/// configured `fail_on` severity remain.
pub fn run(path: &Path, options: &CheckOptions, source: &ConfigSource) -> Result<bool> {
    let config = source.load()?;
    let fail_on = config.fail_on.unwrap_or(Severity::Error);

    let root = path
        .canonicalize()
        .with_context(|| format!("Cannot access {}", path.display()))?;

    let mut rules =
        rules_from_config(&config, &root).context("Failed to build rules from config")?;
    if let Some(filter) = &options.rules {
        let names: Vec<&str> = filter.split(',').map(str::trim).collect();
        rules = filter_rules(rules, &names);
    }

    let mut builder = Analyzer::builder()
        .root(&root)
        .config(config)
        .extractor(TypeScriptExtractor::new());

    for pattern in &options.exclude {
        builder = builder.exclude(pattern.clone());
    }

    for rule in rules {
        builder = builder.rule_box(rule);
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!("Analyzing {:?} with {} rules", root, analyzer.rule_count());

    let result = if options.fix {
        analyzer.fix().context("Fixing failed")?
    } else {
        analyzer.analyze().context("Analysis failed")?
    };

    if options.fix {
        tracing::info!("Fixed {} file(s)", result.files_fixed);
    }

    super::output::print(&result, options.format, &root)?;

    Ok(!result.has_violations_at(fail_on))
}

/// Keeps the rules matching one of `names`. A rule name keeps every code
/// of the rule; codes keep the rule but report only those codes.
fn filter_rules(rules: Vec<RuleBox>, names: &[&str]) -> Vec<RuleBox> {
    for name in names {
        let known = RULES
            .iter()
            .any(|(rule, codes, _)| rule == name || codes.contains(name));
        if !known {
            tracing::warn!("Unknown rule: {}", name);
        }
    }

    rules
        .into_iter()
        .filter_map(|rule| {
            if names.contains(&rule.name()) {
                return Some(rule);
            }
            let codes: Vec<String> = RULES
                .iter()
                .filter(|(r, _, _)| *r == rule.name())
                .flat_map(|(_, codes, _)| codes.iter())
                .filter(|code| names.contains(*code))
                .map(|code| (*code).to_owned())
                .collect();
            if codes.is_empty() {
                None
            } else {
                Some(Box::new(SelectedCodes { rule, codes }) as RuleBox)
            }
        })
        .collect()
}

/// A rule reporting only some of its codes.
struct SelectedCodes {
    rule: RuleBox,
    codes: Vec<String>,
}

impl Rule for SelectedCodes {
    fn name(&self) -> &'static str {
        self.rule.name()
    }

    fn code(&self) -> &'static str {
        self.rule.code()
    }

    fn description(&self) -> &'static str {
        self.rule.description()
    }

    fn default_severity(&self) -> Severity {
        self.rule.default_severity()
    }

    fn begin_run(&self) {
        self.rule.begin_run();
    }

    fn check(&self, ctx: &FileContext, statements: &[ModuleStatement]) -> Vec<Violation> {
        let mut violations = self.rule.check(ctx, statements);
        violations.retain(|v| self.codes.contains(&v.code));
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scope_lint_core::Config;
    use scope_lint_rules::{ScopedModules, StrictHierarchy};

    fn rules() -> Vec<RuleBox> {
        let config = Config::parse("[hierarchy]\nbase_url = \"src\"\n").unwrap();
        vec![
            Box::new(ScopedModules::new()),
            Box::new(
                StrictHierarchy::from_config(&config, "/p")
                    .unwrap()
                    .unwrap(),
            ),
        ]
    }

    #[test]
    fn filter_by_name() {
        let kept = filter_rules(rules(), &["import-path-strict-hierarchy"]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].code(), "SH001");
    }

    #[test]
    fn filter_by_code() {
        let kept = filter_rules(rules(), &["SM003"]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name(), "scoped-modules");
    }

    #[test]
    fn code_filter_reports_only_that_code() {
        use scope_lint_ts::TypeScriptExtractor;
        use scope_lint_core::StatementExtractor;

        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.ts"), "").unwrap();
        let content = "export * from './@private/x';\n";
        let index = tmp.path().join("index.ts");
        std::fs::write(&index, content).unwrap();

        let statements = TypeScriptExtractor::new()
            .extract("index.ts", content)
            .unwrap();
        let ctx = FileContext::new(&index, content, tmp.path());

        let all = filter_rules(rules(), &["scoped-modules"]);
        let all_codes: Vec<String> = all[0]
            .check(&ctx, &statements)
            .into_iter()
            .map(|v| v.code)
            .collect();
        assert_eq!(all_codes, vec!["SM002", "SM003"]);

        let only = filter_rules(rules(), &["SM003"]);
        let only_codes: Vec<String> = only[0]
            .check(&ctx, &statements)
            .into_iter()
            .map(|v| v.code)
            .collect();
        assert_eq!(only_codes, vec!["SM003"]);
    }

    #[test]
    fn unknown_filter_keeps_nothing() {
        assert!(filter_rules(rules(), &["no-such-rule"]).is_empty());
    }
}
