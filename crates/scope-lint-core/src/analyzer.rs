//! Core analyzer for orchestrating lint execution.
//!
//! Each file goes through two phases: its statements are classified once
//! into an immutable list, then every enabled rule runs over that list.
//! Files are independent, so they are processed in parallel.

use crate::config::Config;
use crate::context::FileContext;
use crate::extractor::{ExtractError, StatementExtractor};
use crate::fix::{self, MAX_FIX_PASSES};
use crate::rule::{Rule, RuleBox};
use crate::types::{LintResult, Replacement, Violation};
use crate::utils::check_allow_with_reason;

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading or writing files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error classifying a source file.
    #[error("Parse error in {path}: {source}")]
    Extract {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Extractor error.
        source: ExtractError,
    },

    /// Error walking the source tree.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// Worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// No extractor registered.
    #[error("No statement extractor registered")]
    NoExtractor,
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    extractors: Vec<Box<dyn StatementExtractor>>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    fail_on_parse_error: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a per-file rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed per-file rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Registers a statement extractor.
    #[must_use]
    pub fn extractor<E: StatementExtractor + 'static>(mut self, extractor: E) -> Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether to fail on parse errors (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Shares a cancellation flag; once set, unprocessed files are skipped.
    #[must_use]
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, no extractor was
    /// registered, or the current directory cannot be determined.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        if self.extractors.is_empty() {
            return Err(AnalyzerError::NoExtractor);
        }

        let config = self.config.unwrap_or_default();
        config.validate()?;

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());

        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };
        let root = crate::specifier::normalize_path(&root);

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.clone());

        Ok(Analyzer {
            root,
            rules: self.rules,
            extractors: self.extractors,
            exclude_patterns,
            config,
            fail_on_parse_error: self.fail_on_parse_error,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    extractors: Vec<Box<dyn StatementExtractor>>,
    exclude_patterns: Vec<String>,
    config: Config,
    fail_on_parse_error: bool,
    cancel: Arc<AtomicBool>,
}

/// Outcome of processing one file.
struct FileOutcome {
    violations: Vec<Violation>,
    fixed: bool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the cancellation flag for this run.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Analyzes all files and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails, or a file fails to parse
    /// while `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        self.run(false)
    }

    /// Applies automatic fixes to all files, then returns the violations
    /// that remain.
    ///
    /// # Errors
    ///
    /// Same as [`Analyzer::analyze`], plus failures writing fixed files.
    pub fn fix(&self) -> Result<LintResult, AnalyzerError> {
        self.run(true)
    }

    fn run(&self, apply_fixes: bool) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());

        for rule in &self.rules {
            rule.begin_run();
        }

        let work = || -> Vec<Result<Option<FileOutcome>, AnalyzerError>> {
            files
                .par_iter()
                .map(|path| {
                    if self.cancel.load(Ordering::Relaxed) {
                        return Ok(None);
                    }
                    self.process_file(path, apply_fixes)
                })
                .collect()
        };

        let outcomes = match self.config.analyzer.parallelism {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(work),
            None => work(),
        };

        let mut result = LintResult::new();
        for outcome in outcomes {
            if let Some(outcome) = outcome? {
                result.violations.extend(outcome.violations);
                result.files_checked += 1;
                if outcome.fixed {
                    result.files_fixed += 1;
                }
            }
        }

        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Processes one file. `Ok(None)` means the file was skipped.
    fn process_file(
        &self,
        path: &Path,
        apply_fixes: bool,
    ) -> Result<Option<FileOutcome>, AnalyzerError> {
        debug!("Analyzing: {}", path.display());

        let original = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping unreadable file {}: {}", path.display(), e);
                return Ok(None);
            }
        };

        let outcome = if apply_fixes {
            self.fix_content(path, &original)
        } else {
            self.check_source(path, &original)
                .map(|violations| (original.clone(), violations))
        };

        let (content, violations) = match outcome {
            Ok(outcome) => outcome,
            Err(AnalyzerError::Extract { path, source }) => {
                warn!("Failed to parse {}: {}", path.display(), source);
                if self.fail_on_parse_error {
                    return Err(AnalyzerError::Extract { path, source });
                }
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let fixed = content != original;
        if fixed {
            debug!("Writing fixes to {}", path.display());
            std::fs::write(path, &content)?;
        }

        Ok(Some(FileOutcome { violations, fixed }))
    }

    /// Runs classify -> check -> apply until no fix applies.
    fn fix_content(
        &self,
        path: &Path,
        original: &str,
    ) -> Result<(String, Vec<Violation>), AnalyzerError> {
        let mut content = original.to_owned();
        let mut violations = self.check_source(path, &content)?;

        for pass in 0..MAX_FIX_PASSES {
            let fixes: Vec<&Replacement> = violations.iter().filter_map(Violation::fix).collect();
            if fixes.is_empty() {
                break;
            }

            let (next, applied) = fix::apply(&content, &fixes);
            debug!(
                "Fix pass {} on {}: {} of {} applied",
                pass + 1,
                path.display(),
                applied,
                fixes.len()
            );
            if applied == 0 || next == content {
                break;
            }

            content = next;
            violations = self.check_source(path, &content)?;
        }

        Ok((content, violations))
    }

    /// Classifies and checks one file's content.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Extract`] if the content cannot be parsed,
    /// or [`AnalyzerError::NoExtractor`] if no extractor handles the file.
    pub fn check_source(&self, path: &Path, content: &str) -> Result<Vec<Violation>, AnalyzerError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let extractor = self
            .extractors
            .iter()
            .find(|e| e.handles(&file_name))
            .ok_or(AnalyzerError::NoExtractor)?;

        let statements =
            extractor
                .extract(&file_name, content)
                .map_err(|source| AnalyzerError::Extract {
                    path: path.to_path_buf(),
                    source,
                })?;

        let ctx = FileContext::new(path, content, &self.root);
        let mut violations = Vec::new();

        for rule in &self.rules {
            if !self.config.is_rule_enabled(rule.name()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }

            let mut rule_violations = rule.check(&ctx, &statements);
            rule_violations.retain(|v| {
                let allow =
                    check_allow_with_reason(content, v.location.line, &[&v.rule, &v.code]);
                if let Some(reason) = allow.reason() {
                    debug!("{} allowed at {}: {}", v.code, v.location.line, reason);
                }
                !allow.is_allowed()
            });
            violations.extend(self.apply_severity_override(rule.name(), rule_violations));
        }

        Ok(violations)
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        rule_name: &str,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = self.config.rule_severity(rule_name) {
            for v in &mut violations {
                v.severity = severity;
            }
        }
        violations
    }

    /// Discovers all source files handled by a registered extractor.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(self.config.analyzer.respect_gitignore)
            .require_git(false);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if !self.extractors.iter().any(|e| e.handles(&file_name)) {
                continue;
            }

            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let relative_str = relative.to_string_lossy();

        for pattern in &self.exclude_patterns {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) || glob_pattern.matches(&relative_str) {
                    return true;
                }
            }

            // Also check as substring for patterns like "**/node_modules/**"
            let normalized_pattern = pattern.replace("**", "");
            if !normalized_pattern.is_empty()
                && normalized_pattern != "/"
                && path_str.contains(&normalized_pattern)
            {
                return true;
            }
        }

        false
    }
}
