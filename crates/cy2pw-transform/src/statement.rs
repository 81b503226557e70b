//! Statement-level conversion of callback and block bodies
//!
//! Every statement is routed by what it is: command chains go to the
//! converter for their kind, `expect` statements to the assertion rewriter,
//! control-flow statements have their blocks converted in place, and
//! anything else gets accessor rewriting and `await` insertion.

use cy2pw_pattern::chain::{anchors, CommandChain};
use cy2pw_pattern::extract::classify_chain;
use cy2pw_pattern::scan::{
    contains_in_code, dedent, is_comment_only, is_ident_byte, line_indent, matching_close,
    replace_identifier, split_statements, split_trailing_comment, RegionMap,
};
use cy2pw_pattern::PatternKind;

use crate::accessor::rewrite_accessors;
use crate::assertion::{rewrite_expect, AssertionRewrite};
use crate::callback::Callback;
use crate::command;
use crate::context::Context;
use crate::snippet::{finish, indent_block, join, manual_review_block};
use crate::{intercept, then, wait};

/// Convert one statement; unconvertible pieces become manual-review blocks
pub fn convert_statement(statement: &str, ctx: &mut Context<'_>) -> Vec<String> {
    let statement = statement.trim();
    if statement.is_empty() {
        return Vec::new();
    }
    if is_comment_only(statement) {
        return vec![statement.to_string()];
    }
    let (code, comment) = split_trailing_comment(statement);
    let code = code.trim_end_matches(';').trim_end();
    let mut lines = convert_code(code, ctx);
    if let Some(comment) = comment {
        match lines.last_mut() {
            Some(last) => {
                last.push(' ');
                last.push_str(comment);
            }
            None => lines.push(comment.to_string()),
        }
    }
    lines
}

fn convert_code(code: &str, ctx: &mut Context<'_>) -> Vec<String> {
    if let Some(rest) = code.strip_prefix("return ") {
        if let Some(chain) = CommandChain::parse(rest) {
            ctx.report.note("`return` of a command chain dropped; the chain is awaited in place");
            return convert_chain_statement(&chain, rest, ctx);
        }
    }
    if let Some(chain) = CommandChain::parse(code) {
        return convert_chain_statement(&chain, code, ctx);
    }
    if let Some(rewrite) = rewrite_expect(code, ctx) {
        if matches!(rewrite, AssertionRewrite::Unsupported(_)) {
            ctx.report.review("assertion without a Playwright matcher left as written");
        }
        return vec![rewrite.text().to_string()];
    }

    let mapped = map_blocks(code, &mut |body| {
        Some(
            split_statements(body)
                .iter()
                .flat_map(|s| convert_statement(s, ctx))
                .collect(),
        )
    });
    let regions = RegionMap::new(&mapped);
    if !anchors(&mapped, &regions).is_empty() {
        ctx.report.unconverted("command chain used inside an expression");
        return vec![manual_review_block("command chain used inside an expression", code)];
    }
    vec![finish(&rewrite_accessors(&mapped, ctx), ctx)]
}

/// Convert a `cy` chain standing alone as a statement
pub fn convert_chain_statement(chain: &CommandChain, text: &str, ctx: &mut Context<'_>) -> Vec<String> {
    match classify_chain(chain) {
        PatternKind::Then => then::convert_then_chain(chain, ctx)
            .map(|attached| attached.lines)
            .unwrap_or_else(|reason| {
                ctx.report.unconverted(format!("callback chain not converted: {reason}"));
                vec![manual_review_block(&reason, text)]
            }),
        PatternKind::Wait => wait::convert_wait(chain, text, ctx).lines,
        PatternKind::Intercept => intercept::convert_intercept(chain, text, ctx).lines,
        PatternKind::CustomCommand => match command::convert_chain(chain, ctx) {
            Ok(converted) => converted.statements,
            Err(unsupported) => {
                let reason = unsupported.to_string();
                ctx.report.unconverted(format!("command not converted: {reason}"));
                vec![manual_review_block(&reason, text)]
            }
        },
    }
}

/// Convert a callback body
///
/// `rename` replaces the callback parameter with its binding. With a `block`
/// number, an outer body resuming after a nested callback is marked
/// `// block N (continued)`.
pub fn convert_body(
    callback: &Callback,
    rename: Option<(String, String)>,
    block: Option<usize>,
    ctx: &mut Context<'_>,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut resumed = false;
    for statement in callback.statements() {
        let statement = match &rename {
            Some((param, binding)) => replace_identifier(&statement, param, binding),
            None => statement,
        };
        let nested = CommandChain::parse(split_trailing_comment(&statement).0.trim_end_matches(';'))
            .is_some_and(|chain| classify_chain(&chain) == PatternKind::Then);
        if resumed && !nested && !is_comment_only(&statement) {
            if let Some(n) = block {
                lines.push(format!("// block {n} (continued)"));
            }
            resumed = false;
        }
        lines.extend(convert_statement(&statement, ctx));
        if nested && ctx.flattening() {
            resumed = true;
        }
    }
    lines
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opener {
    /// Not a statement block (object literal, class body, `switch`)
    None,
    /// `if (…) {`, `else {`, `try {`, `function f() {`
    Block,
    /// Arrow function body; the parameter list starts at the offset
    Arrow(usize),
}

/// Rewrite the contents of every outermost statement block in `text`
///
/// `convert` receives each dedented block body and returns the replacement
/// statements, or `None` to leave the block untouched. Arrow functions whose
/// converted body awaits are made `async`.
pub(crate) fn map_blocks(text: &str, convert: &mut dyn FnMut(&str) -> Option<Vec<String>>) -> String {
    let regions = RegionMap::new(text);
    let bytes = text.as_bytes();
    let mut edits: Vec<(usize, usize, String)> = Vec::new();
    let mut idx = 0;

    while idx < bytes.len() {
        if bytes[idx] != b'{' || !regions.is_code(idx) {
            idx += 1;
            continue;
        }
        let Some(close) = matching_close(text, &regions, idx) else {
            break;
        };
        let opener = block_opener(text, &regions, idx);
        if opener == Opener::None {
            idx += 1;
            continue;
        }
        let body = dedent(&text[idx + 1..close]);
        if let Some(lines) = convert(&body) {
            let indent = line_indent(text, close);
            if let Opener::Arrow(params) = opener {
                let awaits = lines.iter().any(|l| contains_in_code(l, "await "));
                if awaits && !text[..params].trim_end().ends_with("async") {
                    edits.push((params, params, "async ".to_string()));
                }
            }
            let replacement = if lines.is_empty() {
                String::new()
            } else {
                format!("\n{}\n{indent}", indent_block(&join(&lines), &format!("{indent}  ")))
            };
            edits.push((idx + 1, close, replacement));
        }
        idx = close + 1;
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, end, replacement) in edits {
        out.push_str(&text[last..start]);
        out.push_str(&replacement);
        last = end;
    }
    out.push_str(&text[last..]);
    out
}

fn block_opener(text: &str, regions: &RegionMap, open: usize) -> Opener {
    let bytes = text.as_bytes();
    let Some(prev) = previous_code(text, regions, open) else {
        return Opener::None;
    };
    match bytes[prev] {
        b'>' if prev > 0 && bytes[prev - 1] == b'=' => {
            arrow_params(text, regions, prev - 1).map_or(Opener::None, Opener::Arrow)
        }
        b')' => {
            let Some(paren) = matching_open(text, regions, prev) else {
                return Opener::None;
            };
            if word_before(text, paren) == "switch" {
                Opener::None
            } else {
                Opener::Block
            }
        }
        b if is_ident_byte(b) => {
            if matches!(word_before(text, prev + 1), "else" | "try" | "finally" | "do") {
                Opener::Block
            } else {
                Opener::None
            }
        }
        _ => Opener::None,
    }
}

/// Last code byte before `pos` that is not whitespace
pub(crate) fn previous_code(text: &str, regions: &RegionMap, pos: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    (0..pos)
        .rev()
        .find(|&i| regions.is_code(i) && !bytes[i].is_ascii_whitespace())
}

fn word_before(text: &str, end: usize) -> &str {
    let head = text[..end].trim_end();
    let start = head
        .bytes()
        .rposition(|b| !is_ident_byte(b))
        .map_or(0, |p| p + 1);
    &head[start..]
}

/// Delimiter opening the one closed at `close`
fn matching_open(text: &str, regions: &RegionMap, close: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    for i in (0..=close).rev() {
        if !regions.is_code(i) {
            continue;
        }
        match bytes[i] {
            b')' | b']' | b'}' => depth += 1,
            b'(' | b'[' | b'{' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Start of the parameter list of the arrow at `arrow`
pub(crate) fn arrow_params(text: &str, regions: &RegionMap, arrow: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let end = previous_code(text, regions, arrow)?;
    if bytes[end] == b')' {
        return matching_open(text, regions, end);
    }
    if !is_ident_byte(bytes[end]) {
        return None;
    }
    let start = text[..=end]
        .bytes()
        .rposition(|b| !is_ident_byte(b))
        .map_or(0, |p| p + 1);
    Some(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TransformOptions;
    use cy2pw_symbol::FileScope;
    use pretty_assertions::assert_eq;

    fn convert(source: &str, statement: &str) -> (Vec<String>, usize) {
        let options = TransformOptions::default();
        let mut scope = FileScope::new(source);
        let mut ctx = Context::new(&options, &mut scope);
        let lines = convert_statement(statement, &mut ctx);
        (lines, ctx.report.unconverted)
    }

    #[test]
    fn chains_and_plain_statements() {
        let (lines, _) = convert("", "cy.get('#save').click(); // save it");
        assert_eq!(lines, vec!["await page.locator('#save').click(); // save it"]);
        let (lines, _) = convert("", "const total = 3");
        assert_eq!(lines, vec!["const total = 3;"]);
        let (lines, _) = convert("", "return cy.visit('/')");
        assert_eq!(lines, vec!["await page.goto('/');"]);
    }

    #[test]
    fn control_flow_blocks_are_converted() {
        let (lines, _) = convert(
            "",
            "if (admin) {\n  cy.get('#admin').click();\n} else {\n  cy.visit('/home');\n}",
        );
        assert_eq!(
            lines,
            vec!["if (admin) {\n  await page.locator('#admin').click();\n} else {\n  await page.goto('/home');\n}"]
        );
    }

    #[test]
    fn arrow_bodies_become_async() {
        let (lines, _) = convert("", "items.forEach((item) => {\n  cy.get(item).click();\n})");
        assert_eq!(
            lines,
            vec!["items.forEach(async (item) => {\n  await page.locator(item).click();\n});"]
        );
    }

    #[test]
    fn object_literals_are_left_alone() {
        let (lines, _) = convert("", "const user = { name: 'Ada', tags: [] }");
        assert_eq!(lines, vec!["const user = { name: 'Ada', tags: [] };"]);
    }

    #[test]
    fn chains_in_expressions_need_review() {
        let (lines, unconverted) = convert("", "const t = cy.get('a').invoke('text')");
        assert_eq!(unconverted, 1);
        assert!(lines[0].starts_with("/* MANUAL REVIEW: command chain used inside an expression"));
    }

    #[test]
    fn unsupported_commands_are_preserved() {
        let (lines, unconverted) = convert("", "cy.get('@row').click()");
        assert_eq!(unconverted, 1);
        assert!(lines[0].contains("cy.get('@row').click()"));
        assert!(lines[0].starts_with("/* MANUAL REVIEW"));
    }
}
