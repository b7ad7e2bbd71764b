//! Language-agnostic statement extraction.
//!
//! `StatementExtractor` is the extension point for adding new languages.
//! Implement it to teach the analyzer how to classify a language's
//! import/export statements.

use crate::statement::ModuleStatement;

/// Errors raised while extracting statements from a source file.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The grammar could not be loaded into the parser.
    #[error("failed to load {language} grammar: {message}")]
    Language {
        /// Language identifier.
        language: &'static str,
        /// Loader error detail.
        message: String,
    },
    /// The parser produced no tree.
    #[error("{language} parser returned no syntax tree")]
    NoTree {
        /// Language identifier.
        language: &'static str,
    },
}

/// Trait for language-specific statement classification.
///
/// The extractor receives raw source text and returns the file's top-level
/// import/export statements in source order. Statements whose specifier is
/// not a static string literal are omitted.
pub trait StatementExtractor: Send + Sync {
    /// Language identifier (e.g., `"typescript"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this extractor handles (e.g., `&[".ts", ".tsx"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Extracts module statements from source code of the given file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be parsed at all.
    fn extract(&self, file_name: &str, source: &str) -> Result<Vec<ModuleStatement>, ExtractError>;

    /// Returns true if this extractor handles the given file name.
    fn handles(&self, file_name: &str) -> bool {
        let lower = file_name.to_ascii_lowercase();
        self.extensions().iter().any(|ext| lower.ends_with(ext))
    }
}
