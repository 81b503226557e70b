//! Output snippet helpers

use cy2pw_pattern::scan::{is_comment_only, is_ident_byte, terminate};

use crate::context::Context;

/// Prefix of every manual-review block comment
pub const MANUAL_REVIEW: &str = "MANUAL REVIEW";

/// Preserve `original` verbatim inside a manual-review block comment
#[must_use]
pub fn manual_review_block(reason: &str, original: &str) -> String {
    format!(
        "/* {MANUAL_REVIEW}: {reason}\n{}\n*/",
        original.trim().replace("*/", "*\\/")
    )
}

/// Whether `statement` needs an `await` in front
///
/// Assertions, page calls and locator member calls are awaited; anything
/// already awaited, declared or returned is left alone.
#[must_use]
pub fn needs_await(statement: &str, ctx: &Context<'_>) -> bool {
    let s = statement.trim_start();
    if s.starts_with("await ") || is_comment_only(s) {
        return false;
    }
    if s.starts_with("expect(") {
        return true;
    }
    let ident_len = s.bytes().take_while(|&b| is_ident_byte(b)).count();
    let ident = &s[..ident_len];
    if !s[ident_len..].starts_with('.') {
        return false;
    }
    ident == ctx.page() || ctx.is_locator(ident)
}

/// Insert `await` where needed and terminate the statement
#[must_use]
pub fn finish(statement: &str, ctx: &Context<'_>) -> String {
    let statement = statement.trim();
    if needs_await(statement, ctx) {
        terminate(&format!("await {statement}"))
    } else {
        terminate(statement)
    }
}

/// Indent every non-empty line of `text` by `indent`
#[must_use]
pub fn indent_block(text: &str, indent: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Join statements one per line
#[must_use]
pub fn join(statements: &[String]) -> String {
    statements.join("\n")
}

/// Strip one pair of parentheses wrapping the whole expression
#[must_use]
pub fn strip_outer_parens(expr: &str) -> &str {
    let expr = expr.trim();
    if expr.starts_with('(')
        && cy2pw_pattern::scan::find_matching_close(expr, 0) == Some(expr.len() - 1)
    {
        expr[1..expr.len() - 1].trim()
    } else {
        expr
    }
}
