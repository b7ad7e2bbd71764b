//! Comment-based allowance directives.
//!
//! Supports directives like:
//! ```text
//! // scope-lint: allow(import-path-strict-hierarchy) reason="legacy bridge"
//! ```
//!
//! A directive applies to the line it is on and the line below it.

use std::collections::HashSet;

/// Result of checking for allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Rule is not allowed.
    Denied,
    /// Rule is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed allowance directive.
#[derive(Debug, Clone)]
struct AllowDirective {
    rules: HashSet<String>,
    reason: Option<String>,
}

/// Checks source code for an allowance comment covering `line`.
///
/// Both the rule name (`scoped-modules`) and a violation code (`SM002`)
/// are accepted, as is `all`.
///
/// # Arguments
///
/// * `content` - Source code content
/// * `line` - Line number to check (1-indexed)
/// * `names` - Rule name and/or code to look for
#[must_use]
pub fn check_allow_with_reason(content: &str, line: usize, names: &[&str]) -> AllowCheck {
    let lines: Vec<&str> = content.lines().collect();

    for check_line in [line.saturating_sub(1), line] {
        if check_line == 0 || check_line > lines.len() {
            continue;
        }

        if let Some(directive) = parse_allow_directive(lines[check_line - 1]) {
            if directive.rules.contains("all")
                || names.iter().any(|n| directive.rules.contains(*n))
            {
                return AllowCheck::Allowed {
                    reason: directive.reason,
                };
            }
        }
    }

    AllowCheck::Denied
}

/// Parses an allowance directive from a line, which may carry code
/// before a trailing `//` comment.
fn parse_allow_directive(line: &str) -> Option<AllowDirective> {
    let comment_start = line.find("//")?;
    let comment_content = line[comment_start + 2..].trim();

    let directive = comment_content.strip_prefix("scope-lint:")?.trim();
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let rules: HashSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if rules.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest.strip_prefix("reason=").and_then(|reason_part| {
        let quoted = reason_part.trim().strip_prefix('"')?;
        let end = quoted.find('"')?;
        Some(quoted[..end].to_string())
    });

    Some(AllowDirective { rules, reason })
}
