//! # scope-lint-rules
//!
//! Built-in module-boundary rules for scope-lint.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | SM001-SM006 | `scoped-modules` | Barrel completeness and marker-prefix visibility |
//! | SH001 | `import-path-strict-hierarchy` | Allowed imports between top-level groups |
//!
//! ## Usage
//!
//! ```ignore
//! use scope_lint_core::Analyzer;
//! use scope_lint_rules::{ScopedModules, StrictHierarchy};
//! use scope_lint_ts::TypeScriptExtractor;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .extractor(TypeScriptExtractor::new())
//!     .rule(ScopedModules::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod completeness;
mod hierarchy;
mod presets;
mod scoped_modules;
mod visibility;

/// Directory snapshots and their cache.
pub mod snapshot;

pub use hierarchy::StrictHierarchy;
pub use presets::{all_rules, rules_from_config, RULES};
pub use scoped_modules::ScopedModules;
pub use snapshot::{DirectoryEntry, DirectorySnapshot, EntryKind, SnapshotError, SnapshotProvider};
pub use visibility::Visibility;

/// Re-export core types for convenience.
pub use scope_lint_core::{Rule, Severity, Violation};
