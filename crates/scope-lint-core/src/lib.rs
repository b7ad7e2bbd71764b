//! # scope-lint-core
//!
//! Core framework for module-boundary linting of JavaScript/TypeScript
//! sources.
//!
//! This crate provides the foundational traits and types for building
//! import/export linters. It includes:
//!
//! - [`StatementExtractor`] for classifying a language's module statements
//! - [`Rule`] trait for per-file rules over those statements
//! - [`Analyzer`] for orchestrating lint execution and fix application
//! - [`Violation`] for representing lint findings
//!
//! ## Example
//!
//! ```ignore
//! use scope_lint_core::{Analyzer, Config};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .extractor(TypeScriptExtractor::new())
//!     .rule(MyRule::new())
//!     .config(Config::default())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod extractor;
mod rule;
mod statement;
mod types;

/// Fix emission and application.
pub mod fix;
/// Module specifier helpers.
pub mod specifier;
/// Utility modules for rule implementations.
pub mod utils;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use config::{AnalyzerConfig, Config, ConfigError, HierarchyConfig, RuleConfig};
pub use context::FileContext;
pub use extractor::{ExtractError, StatementExtractor};
pub use rule::{Rule, RuleBox};
pub use statement::{ModuleStatement, StatementKind};
pub use types::{
    LintResult, Location, Replacement, Severity, Suggestion, Violation, ViolationDiagnostic,
};
pub use utils::allowance::AllowCheck;
