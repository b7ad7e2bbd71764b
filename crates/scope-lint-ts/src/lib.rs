//! # scope-lint-ts
//!
//! Tree-sitter based statement classification for TypeScript and
//! JavaScript sources.
//!
//! Plugs into `scope-lint-core` through the
//! [`StatementExtractor`](scope_lint_core::StatementExtractor) trait:
//!
//! - [`TypeScriptExtractor`] for `.ts`, `.tsx`, `.js` and `.jsx` files

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod typescript;

pub use typescript::TypeScriptExtractor;
