//! TypeScript/JavaScript statement extractor using Tree-sitter.

use scope_lint_core::{ExtractError, ModuleStatement, StatementExtractor, StatementKind};
use tracing::debug;
use tree_sitter::{Language, Node, Parser};

const LANGUAGE_ID: &str = "typescript";

/// Classifies top-level `import`/`export ... from` statements, plus
/// `import()`/`require()` calls with a literal specifier anywhere in the file.
///
/// `.tsx` and `.jsx` files are parsed with the TSX grammar, everything
/// else with the TypeScript grammar (a superset of JavaScript).
pub struct TypeScriptExtractor {
    typescript: Language,
    tsx: Language,
}

impl TypeScriptExtractor {
    /// Creates a new extractor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            typescript: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            tsx: tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    fn language_for(&self, file_name: &str) -> &Language {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".tsx") || lower.ends_with(".jsx") {
            &self.tsx
        } else {
            &self.typescript
        }
    }

    fn text<'a>(node: &Node<'_>, src: &'a str) -> &'a str {
        src.get(node.byte_range()).unwrap_or("")
    }

    /// Unquotes a `string` node. Anything else is not a static specifier.
    fn string_literal(node: &Node<'_>, src: &str) -> Option<String> {
        if node.kind() != "string" {
            return None;
        }
        let raw = Self::text(node, src);
        let quote = raw.chars().next().filter(|c| *c == '\'' || *c == '"')?;
        let inner = raw.strip_prefix(quote)?.strip_suffix(quote)?;
        Some(inner.to_owned())
    }

    /// Like [`Self::string_literal`], also accepting a template string
    /// without substitutions.
    fn literal_argument(node: &Node<'_>, src: &str) -> Option<String> {
        if node.kind() != "template_string" {
            return Self::string_literal(node, src);
        }
        if Self::has_child(node, "template_substitution") {
            return None;
        }
        let raw = Self::text(node, src);
        let inner = raw.strip_prefix('`')?.strip_suffix('`')?;
        Some(inner.to_owned())
    }

    /// Specifier of `import('<s>')` or `require('<s>')` with exactly one
    /// literal argument.
    fn call_specifier(node: &Node<'_>, src: &str) -> Option<String> {
        let function = node.child_by_field_name("function")?;
        let callee = match function.kind() {
            "import" => true,
            "identifier" => Self::text(&function, src) == "require",
            _ => false,
        };
        if !callee {
            return None;
        }

        let arguments = node.child_by_field_name("arguments")?;
        let mut cursor = arguments.walk();
        let mut named = arguments
            .named_children(&mut cursor)
            .filter(|c| c.kind() != "comment");
        let argument = named.next()?;
        if named.next().is_some() {
            return None;
        }
        Self::literal_argument(&argument, src)
    }

    /// Collects import calls from the whole tree below `root`.
    fn import_calls(root: Node<'_>, src: &str, out: &mut Vec<ModuleStatement>) {
        let mut cursor = root.walk();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            if node.kind() == "call_expression" {
                if let Some(specifier) = Self::call_specifier(&node, src) {
                    let position = node.start_position();
                    out.push(
                        ModuleStatement::new(StatementKind::ImportCall, specifier, node.byte_range())
                            .at(position.row + 1, position.column + 1),
                    );
                }
            }
            stack.extend(node.named_children(&mut cursor));
        }
    }

    fn has_child(node: &Node<'_>, kind: &str) -> bool {
        let mut cursor = node.walk();
        let found = node.children(&mut cursor).any(|c| c.kind() == kind);
        found
    }

    fn import_source<'t>(node: &Node<'t>) -> Option<Node<'t>> {
        if let Some(source) = node.child_by_field_name("source") {
            return Some(source);
        }
        // import x = require('./x')
        let mut cursor = node.walk();
        let require = node
            .children(&mut cursor)
            .find(|c| c.kind() == "import_require_clause")?;
        require.child_by_field_name("source")
    }

    fn classify(node: &Node<'_>, src: &str) -> Option<(StatementKind, String)> {
        match node.kind() {
            "import_statement" => {
                let source = Self::import_source(node)?;
                Some((StatementKind::Import, Self::string_literal(&source, src)?))
            }
            "export_statement" => {
                let source = node.child_by_field_name("source")?;
                let kind = if Self::has_child(node, "namespace_export") {
                    StatementKind::ExportAs
                } else {
                    StatementKind::Export
                };
                Some((kind, Self::string_literal(&source, src)?))
            }
            _ => None,
        }
    }
}

impl Default for TypeScriptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementExtractor for TypeScriptExtractor {
    fn language_id(&self) -> &'static str {
        LANGUAGE_ID
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".ts", ".tsx", ".js", ".jsx"]
    }

    fn extract(&self, file_name: &str, source: &str) -> Result<Vec<ModuleStatement>, ExtractError> {
        let mut parser = Parser::new();
        parser
            .set_language(self.language_for(file_name))
            .map_err(|e| ExtractError::Language {
                language: LANGUAGE_ID,
                message: e.to_string(),
            })?;

        let tree = parser
            .parse(source, None)
            .ok_or(ExtractError::NoTree {
                language: LANGUAGE_ID,
            })?;
        let root = tree.root_node();
        if root.has_error() {
            debug!("{file_name}: syntax errors, classifying intact statements only");
        }

        let mut statements = Vec::new();
        let mut previous_end = 0;

        let mut cursor = root.walk();
        for node in root.children(&mut cursor) {
            if node.kind() == "comment" {
                continue;
            }

            if let Some((kind, specifier)) = Self::classify(&node, source) {
                let position = node.start_position();
                statements.push(
                    ModuleStatement::new(kind, specifier, node.byte_range())
                        .at(position.row + 1, position.column + 1)
                        .with_leading_trivia(previous_end),
                );
            }

            previous_end = node.end_byte();
        }

        Self::import_calls(root, source, &mut statements);
        statements.sort_by_key(|s| s.range.start);

        Ok(statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(file_name: &str, src: &str) -> Vec<ModuleStatement> {
        TypeScriptExtractor::new()
            .extract(file_name, src)
            .expect("extract should succeed")
    }

    fn summary(statements: &[ModuleStatement]) -> String {
        statements
            .iter()
            .map(|s| format!("{} {}", s.kind, s.specifier))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn classifies_statement_forms() {
        let src = r#"import a from './a';
import './side-effect';
import { b, c } from "../b.js";
import * as d from '@scope/d';
import e = require('./e');
export * from './f';
export { g } from './g';
export * as H from './namespace';
export const local = 1;
export { local as alias };
"#;
        let statements = extract("index.ts", src);
        insta::assert_snapshot!(summary(&statements), @r"
        import ./a
        import ./side-effect
        import ../b.js
        import @scope/d
        import ./e
        export ./f
        export ./g
        export-as ./namespace
        ");
    }

    #[test]
    fn classifies_literal_import_calls_at_any_depth() {
        let src = r#"import a from './a';
const m = import('./lazy');
function f() {
  return require("./r");
}
const t = import(`./tpl`);
"#;
        let statements = extract("a.ts", src);
        insta::assert_snapshot!(summary(&statements), @r"
        import ./a
        import-call ./lazy
        import-call ./r
        import-call ./tpl
        ");

        let nested = &statements[2];
        assert_eq!(&src[nested.range.clone()], "require(\"./r\")");
        assert_eq!((nested.line, nested.column), (4, 10));
        assert_eq!(nested.full_range(), nested.range);
    }

    #[test]
    fn skips_computed_import_calls() {
        let src = "const name = './x';\nimport(name);\nrequire('./a', extra);\nimport(`./${name}`);\nobj.require('./b');\nrequire();\n";
        assert!(extract("a.ts", src).is_empty());
    }

    #[test]
    fn records_ranges_and_positions() {
        let src = "import a from './a';\n  export * from './b';\n";
        let statements = extract("a.ts", src);
        assert_eq!(statements.len(), 2);

        assert_eq!(statements[0].range, 0..20);
        assert_eq!((statements[0].line, statements[0].column), (1, 1));
        assert_eq!(&src[statements[1].range.clone()], "export * from './b';");
        assert_eq!((statements[1].line, statements[1].column), (2, 3));
    }

    #[test]
    fn leading_trivia_includes_comments() {
        let src = "import a from './a';\n// note\nexport * from './b';\n";
        let statements = extract("index.ts", src);
        assert_eq!(statements[0].leading_trivia_start, 0);
        assert_eq!(statements[1].leading_trivia_start, 20);
        assert_eq!(
            &src[statements[1].full_range()],
            "\n// note\nexport * from './b';"
        );
    }

    #[test]
    fn parses_jsx_with_tsx_grammar() {
        let src = "import React from 'react';\nexport * from './Button';\nexport const A = () => <div />;\n";
        let statements = extract("index.jsx", src);
        assert_eq!(summary(&statements), "import react\nexport ./Button");
    }

    #[test]
    fn handles_declared_extensions() {
        let extractor = TypeScriptExtractor::new();
        assert!(extractor.handles("index.ts"));
        assert!(extractor.handles("types.d.ts"));
        assert!(extractor.handles("Button.TSX"));
        assert!(!extractor.handles("style.css"));
        assert_eq!(extractor.language_id(), "typescript");
    }
}
