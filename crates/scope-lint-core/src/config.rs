//! Configuration types for scope-lint.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

/// Top-level configuration for scope-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Severity threshold for a failing run (default: "error").
    #[serde(default)]
    pub fail_on: Option<crate::Severity>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-rule configurations.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,

    /// Group hierarchy; the hierarchy rule is active only when present.
    #[serde(default)]
    pub hierarchy: Option<HierarchyConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<crate::Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// Gets the options of a rule, if configured.
    #[must_use]
    pub fn rule_config(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.rules.get(rule_name)
    }

    /// Validate config consistency.
    ///
    /// # Errors
    ///
    /// Returns error describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analyzer.parallelism == Some(0) {
            return Err(ConfigError::Validation(
                "analyzer.parallelism: must be at least 1".into(),
            ));
        }

        for pattern in &self.analyzer.exclude {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(ConfigError::Validation(format!(
                    "analyzer.exclude: invalid pattern '{pattern}': {e}"
                )));
            }
        }

        for (name, rule) in &self.rules {
            if let Some(marker) = rule.options.get("marker") {
                let Some(marker) = marker.as_str() else {
                    return Err(ConfigError::Validation(format!(
                        "rules.{name}.marker: expected a string"
                    )));
                };
                if marker.is_empty() || marker.contains(['/', '\\', '.']) {
                    return Err(ConfigError::Validation(format!(
                        "rules.{name}.marker: '{marker}' is not a valid path segment prefix"
                    )));
                }
            }
        }

        if let Some(hierarchy) = &self.hierarchy {
            hierarchy.validate()?;
        }

        Ok(())
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Maximum number of parallel file analyses.
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: default_exclude(),
            respect_gitignore: true,
            parallelism: None,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_exclude() -> Vec<String> {
    vec!["**/node_modules/**".to_string(), "**/dist/**".to_string()]
}

fn default_true() -> bool {
    true
}

/// Group hierarchy configuration.
///
/// ```toml
/// [hierarchy]
/// base_url = "src"
///
/// [hierarchy.groups]
/// ui = ["api"]
/// api = ["core"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyConfig {
    /// Directory whose immediate children are the groups.
    #[serde(default, alias = "baseUrl")]
    pub base_url: Option<PathBuf>,

    /// When set, `base_url` is resolved against the nearest ancestor
    /// directory of each file containing this file name (e.g. `tsconfig.json`).
    #[serde(default, alias = "searchName")]
    pub search_name: Option<String>,

    /// Follow allowed groups transitively (default: true).
    #[serde(default = "default_true")]
    pub transitive: bool,

    /// Group name -> ordered list of groups it may import.
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
}

impl HierarchyConfig {
    /// Validates group names and edges.
    ///
    /// # Errors
    ///
    /// Returns error describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_none() {
            return Err(ConfigError::Validation(
                "hierarchy.base_url is required".into(),
            ));
        }

        if let Some(name) = &self.search_name {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(ConfigError::Validation(format!(
                    "hierarchy.search_name: '{name}' must be a plain file name"
                )));
            }
        }

        for (group, allowed) in &self.groups {
            check_group_name(group)?;
            let mut seen = HashSet::new();
            for dep in allowed {
                check_group_name(dep)?;
                if dep == group {
                    return Err(ConfigError::Validation(format!(
                        "hierarchy.groups.{group}: self-dependency"
                    )));
                }
                if !seen.insert(dep) {
                    return Err(ConfigError::Validation(format!(
                        "hierarchy.groups.{group}: duplicate entry '{dep}'"
                    )));
                }
            }
        }

        Ok(())
    }
}

fn check_group_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "hierarchy.groups: '{name}' is not a valid group name"
        )));
    }
    Ok(())
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<crate::Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets a string option with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Config is structurally invalid.
    #[error("config validation: {0}")]
    Validation(String),
}
