//! Module statements extracted from source files.
//!
//! A [`ModuleStatement`] is the immutable, language-agnostic view of one
//! top-level `import`/`export ... from` statement, or of an `import()` or
//! `require()` call anywhere in the file. Extractors produce them once per
//! file; every rule reads the same slice.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Kind of a module statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatementKind {
    /// `import ... from './x'`, `import './x'`, `import x = require('./x')`
    Import,
    /// `export * from './x'`, `export { a } from './x'`
    Export,
    /// `export * as X from './x'`
    ExportAs,
    /// `import('./x')` or `require('./x')`, at any depth
    ImportCall,
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Import => write!(f, "import"),
            Self::Export => write!(f, "export"),
            Self::ExportAs => write!(f, "export-as"),
            Self::ImportCall => write!(f, "import-call"),
        }
    }
}

/// A classified import/export statement or import call with a literal
/// specifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleStatement {
    /// Statement kind.
    pub kind: StatementKind,
    /// Module specifier without surrounding quotes (e.g. `./foo`).
    pub specifier: String,
    /// Byte range of the whole statement.
    pub range: Range<usize>,
    /// Start of the leading trivia (whitespace and comments) before the
    /// statement: the end of the previous token, or 0.
    pub leading_trivia_start: usize,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl ModuleStatement {
    /// Creates a statement with no leading trivia and a 1:1 position.
    ///
    /// Mostly useful for tests; extractors fill every field themselves.
    #[must_use]
    pub fn new(kind: StatementKind, specifier: impl Into<String>, range: Range<usize>) -> Self {
        Self {
            kind,
            specifier: specifier.into(),
            leading_trivia_start: range.start,
            range,
            line: 1,
            column: 1,
        }
    }

    /// Sets the line and column.
    #[must_use]
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Sets the leading trivia start.
    #[must_use]
    pub fn with_leading_trivia(mut self, start: usize) -> Self {
        self.leading_trivia_start = start;
        self
    }

    /// Byte range including leading trivia.
    #[must_use]
    pub fn full_range(&self) -> Range<usize> {
        self.leading_trivia_start..self.range.end
    }
}
