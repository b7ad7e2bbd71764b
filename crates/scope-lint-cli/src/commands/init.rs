//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# scope-lint configuration

# Exit with failure when violations at or above this severity remain
# fail_on = "error"

[analyzer]
# Root directory to analyze (default: the checked path)
# root = "./src"

# Glob patterns to exclude from analysis
exclude = [
    "**/node_modules/**",
    "**/dist/**",
]

# Respect .gitignore files
respect_gitignore = true

# Maximum number of files analyzed in parallel (default: all cores)
# parallelism = 4

[rules.scoped-modules]
enabled = true
# severity = "warning"  # Override default severity
# Path segments starting with the marker are private to their parent directory
marker = "@"

# Group hierarchy: each group lists the groups it may import.
# The import-path-strict-hierarchy rule runs only when this section exists.
# [hierarchy]
# base_url = "src"
# search_name = "tsconfig.json"  # resolve base_url next to the nearest tsconfig.json
# transitive = true
#
# [hierarchy.groups]
# ui = ["api"]
# api = ["core"]
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("scope-lint.toml"), force)?;

    println!("Created scope-lint.toml");
    println!("\nNext steps:");
    println!("  1. Edit scope-lint.toml to configure rules and the group hierarchy");
    println!("  2. Run: scope-lint check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scope_lint_core::Config;

    #[test]
    fn template_is_valid_config() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.hierarchy.is_none());
        assert!(config.is_rule_enabled("scoped-modules"));
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("scope-lint.toml");
        std::fs::write(&path, "# mine").unwrap();

        assert!(write_config(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine");

        write_config(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
