//! Rule restricting imports between top-level groups.
//!
//! A group is the first path segment of a file relative to the base
//! directory. `[hierarchy.groups]` lists, for each group, the groups it may
//! import:
//!
//! ```toml
//! [hierarchy]
//! base_url = "src"
//! transitive = false
//!
//! [hierarchy.groups]
//! ui = ["api"]
//! api = ["core"]
//! ```
//!
//! Imports within a group are always legal. Groups that appear nowhere in
//! the table are unrestricted, both as importer and as target.

use scope_lint_core::specifier::{self, file_stem, normalize_path, strip_module_extension};
use scope_lint_core::{
    Config, ConfigError, FileContext, HierarchyConfig, ModuleStatement, Rule, Suggestion,
    Violation,
};
use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Rule code for import-path-strict-hierarchy.
pub const CODE: &str = "SH001";

/// Rule name for import-path-strict-hierarchy.
pub const NAME: &str = "import-path-strict-hierarchy";

/// Validates import edges against the configured group hierarchy.
#[derive(Debug, Clone)]
pub struct StrictHierarchy {
    root: PathBuf,
    base_url: PathBuf,
    search_name: Option<String>,
    transitive: bool,
    groups: BTreeMap<String, Vec<String>>,
    tracked: HashSet<String>,
}

impl StrictHierarchy {
    /// Builds the rule from a hierarchy section, resolving a relative
    /// `base_url` against `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the hierarchy section is invalid.
    pub fn new(config: &HierarchyConfig, root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        config.validate()?;

        let base_url = config.base_url.clone().unwrap_or_default();
        let tracked = config
            .groups
            .iter()
            .flat_map(|(group, allowed)| std::iter::once(group).chain(allowed))
            .cloned()
            .collect();

        Ok(Self {
            root: normalize_path(&root.into()),
            base_url,
            search_name: config.search_name.clone(),
            transitive: config.transitive,
            groups: config.groups.clone(),
            tracked,
        })
    }

    /// Builds the rule when `config` has a `[hierarchy]` section.
    ///
    /// # Errors
    ///
    /// Returns an error if the hierarchy section is invalid.
    pub fn from_config(
        config: &Config,
        root: impl Into<PathBuf>,
    ) -> Result<Option<Self>, ConfigError> {
        config
            .hierarchy
            .as_ref()
            .map(|h| Self::new(h, root))
            .transpose()
    }

    /// Base directory for files in `file_dir`.
    fn base_dir(&self, file_dir: &Path) -> PathBuf {
        if self.base_url.is_absolute() {
            return normalize_path(&self.base_url);
        }

        let anchor = self
            .search_name
            .as_deref()
            .and_then(|name| {
                file_dir
                    .ancestors()
                    .find(|dir| dir.join(name).is_file())
            })
            .unwrap_or(self.root.as_path());

        normalize_path(&anchor.join(&self.base_url))
    }

    /// Group of the file at `path`, or `None` outside `base`.
    fn group_of_file(base: &Path, path: &Path) -> Option<String> {
        let path = normalize_path(path);
        let dir = path.parent()?;
        if dir == base {
            return Some(file_stem(&path));
        }
        first_segment(dir.strip_prefix(base).ok()?)
    }

    /// Group `spec` resolves into, or `None` outside `base`.
    fn group_of_target(base: &Path, file_dir: &Path, spec: &str) -> Option<String> {
        let resolved = if specifier::is_relative(spec) {
            normalize_path(&file_dir.join(spec))
        } else {
            normalize_path(&base.join(spec))
        };
        let rel = resolved.strip_prefix(base).ok()?;
        let group = first_segment(rel)?;
        if rel.components().count() == 1 {
            Some(strip_module_extension(&group).to_owned())
        } else {
            Some(group)
        }
    }

    /// Returns true if group `from` may import group `to`.
    #[must_use]
    pub fn is_allowed(&self, from: &str, to: &str) -> bool {
        if from == to || !self.tracked.contains(to) || !self.tracked.contains(from) {
            return true;
        }
        if self.transitive {
            self.reachable(from, to)
        } else {
            self.allowed(from).iter().any(|g| g == to)
        }
    }

    fn allowed(&self, group: &str) -> &[String] {
        self.groups
            .get(group)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Depth-first search over allowed edges, each group visited once.
    fn reachable(&self, from: &str, to: &str) -> bool {
        let mut visited: HashSet<&str> = HashSet::from([from]);
        let mut stack = vec![from];

        while let Some(group) = stack.pop() {
            for next in self.allowed(group) {
                if next == to {
                    return true;
                }
                if visited.insert(next) {
                    stack.push(next);
                }
            }
        }

        false
    }
}

fn first_segment(rel: &Path) -> Option<String> {
    match rel.components().next()? {
        Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
        _ => None,
    }
}

impl Rule for StrictHierarchy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Restricts imports between top-level groups to the configured hierarchy"
    }

    fn check(&self, ctx: &FileContext, statements: &[ModuleStatement]) -> Vec<Violation> {
        let base = self.base_dir(ctx.dir());
        let Some(from) = Self::group_of_file(&base, ctx.path) else {
            return Vec::new();
        };
        let file_dir = normalize_path(ctx.dir());

        let mut violations = Vec::new();
        for statement in statements {
            let Some(to) = Self::group_of_target(&base, &file_dir, &statement.specifier) else {
                continue;
            };
            if self.is_allowed(&from, &to) {
                continue;
            }

            debug!("{}: {from} -> {to} not allowed", ctx.relative_path.display());
            violations.push(
                Violation::new(
                    CODE,
                    NAME,
                    self.default_severity(),
                    ctx.span_location(statement.range.clone()),
                    format!(
                        "Cannot import '{}': group `{from}` may not depend on group `{to}`",
                        statement.specifier
                    ),
                )
                .with_suggestion(Suggestion::new(format!(
                    "Move the shared code into a group `{from}` may import, or allow it in [hierarchy.groups]"
                ))),
            );
        }

        violations
    }
}
