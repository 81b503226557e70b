//! Parse diagnostics for converted output
//!
//! Output is parsed as TypeScript with tree-sitter. Error and missing nodes
//! are counted; the parse itself never rejects a file.

use tree_sitter::{Node, Parser};

use cy2pw_pattern::SyntaxReport;

use crate::error::{ConvertError, ConvertResult};

/// Parse `source` as TypeScript and report error nodes
///
/// # Errors
///
/// Returns [`ConvertError::Parser`] when the grammar cannot be loaded or
/// the parser gives up.
pub fn check_syntax(source: &str) -> ConvertResult<SyntaxReport> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
        .map_err(|e| ConvertError::Parser(format!("failed to load TypeScript grammar: {e}")))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ConvertError::Parser("parse returned no tree".to_string()))?;

    let mut report = SyntaxReport::default();
    collect_errors(tree.root_node(), &mut report);
    Ok(report)
}

fn collect_errors(root: Node<'_>, report: &mut SyntaxReport) {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let broken = node.is_error() || node.is_missing();
        if broken {
            report.error_count += 1;
            let line = node.start_position().row + 1;
            report.first_error_line = Some(report.first_error_line.map_or(line, |l| l.min(line)));
        }
        // Error subtrees are counted once
        if !broken && node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_output() {
        let report = check_syntax(
            "import { test, expect } from '@playwright/test';\n\ntest('a', async ({ page }) => {\n  await page.goto('/');\n});\n",
        )
        .unwrap();
        assert!(report.is_clean());
        assert_eq!(report.first_error_line, None);
    }

    #[test]
    fn broken_output_is_located() {
        let report = check_syntax("const a = 1;\n\ntest('a', async () => {\n  await page.goto(;\n").unwrap();
        assert!(!report.is_clean());
        assert!(report.first_error_line.is_some());
    }
}
