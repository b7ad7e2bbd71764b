//! Rule trait for defining lint rules.

use crate::context::FileContext;
use crate::statement::ModuleStatement;
use crate::types::{Severity, Violation};

/// A per-file lint rule over classified module statements.
///
/// Rules are pure functions of the file context and its statement list
/// (plus whatever read-only state the rule owns). They are shared across
/// worker threads, hence `Send + Sync`.
///
/// # Example
///
/// ```ignore
/// use scope_lint_core::{FileContext, ModuleStatement, Rule, Violation};
///
/// pub struct NoBareImports;
///
/// impl Rule for NoBareImports {
///     fn name(&self) -> &'static str { "no-bare-imports" }
///     fn code(&self) -> &'static str { "XX001" }
///
///     fn check(&self, ctx: &FileContext, statements: &[ModuleStatement]) -> Vec<Violation> {
///         statements
///             .iter()
///             .filter(|s| !scope_lint_core::specifier::is_relative(&s.specifier))
///             .map(|s| Violation::new(self.code(), self.name(), self.default_severity(),
///                 ctx.span_location(s.range.clone()), "bare import"))
///             .collect()
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "scoped-modules").
    fn name(&self) -> &'static str;

    /// Returns the primary rule code (e.g., "SM001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Called once at the start of every analyze or fix run, before any
    /// file is checked. Rules caching filesystem state drop it here.
    fn begin_run(&self) {}

    /// Checks a single file and returns any violations found.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Context about the file being checked
    /// * `statements` - The file's classified import/export statements
    fn check(&self, ctx: &FileContext, statements: &[ModuleStatement]) -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
