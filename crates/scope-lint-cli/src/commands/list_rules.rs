//! List rules command implementation.

use scope_lint_rules::RULES;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<14} {:<30} Description", "Codes", "Name");
    println!("{}", "-".repeat(100));

    for (name, codes, description) in RULES {
        let codes = match codes {
            [only] => (*only).to_string(),
            [first, .., last] => format!("{first}-{last}"),
            [] => String::new(),
        };
        println!("{codes:<14} {name:<30} {description}");
    }

    println!("\nimport-path-strict-hierarchy runs only when a [hierarchy] section is configured.");

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  scope-lint check --rules scoped-modules");
    println!("  scope-lint check --rules SM003,SH001");
}
