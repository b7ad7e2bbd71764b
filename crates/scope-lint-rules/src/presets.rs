//! Rule sets built from configuration.

use crate::{hierarchy, scoped_modules, ScopedModules, StrictHierarchy};
use scope_lint_core::{Config, ConfigError, RuleBox};
use std::path::Path;

/// Name, codes and description of every rule in this crate.
pub const RULES: &[(&str, &[&str], &str)] = &[
    (
        scoped_modules::NAME,
        &[
            scoped_modules::BANNED_IMPORT,
            scoped_modules::BANNED_EXPORT,
            scoped_modules::MISSING_EXPORTS,
            scoped_modules::MISSING_IMPORTS,
            scoped_modules::BANNED_IMPORT_WHEN_NAMESPACE_EXISTS,
            scoped_modules::BANNED_EXPORT_WHEN_NAMESPACE_EXISTS,
        ],
        "Keeps index/namespace barrels complete and marker-prefixed modules private",
    ),
    (
        hierarchy::NAME,
        &[hierarchy::CODE],
        "Restricts imports between top-level groups to the configured hierarchy",
    ),
];

/// Builds every rule `config` enables for a project rooted at `root`.
///
/// `import-path-strict-hierarchy` is only built when a `[hierarchy]`
/// section exists.
///
/// # Errors
///
/// Returns an error if the hierarchy section is invalid.
pub fn rules_from_config(config: &Config, root: &Path) -> Result<Vec<RuleBox>, ConfigError> {
    let mut rules: Vec<RuleBox> = Vec::new();

    if config.is_rule_enabled(scoped_modules::NAME) {
        rules.push(Box::new(ScopedModules::from_config(config)));
    }

    if config.is_rule_enabled(hierarchy::NAME) {
        if let Some(hierarchy) = StrictHierarchy::from_config(config, root)? {
            rules.push(Box::new(hierarchy));
        }
    }

    Ok(rules)
}

/// Returns all rules that need no configuration.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![Box::new(ScopedModules::new())]
}
