//! Substituting converted units back into the working buffer
//!
//! Units carry unindented text. Each replacement is reindented to the line
//! it lands on; a unit that replaced the expression body of an arrow
//! function is wrapped in a block and the arrow made `async`.

use std::ops::Range;

use cy2pw_pattern::scan::{line_indent, RegionMap};
use cy2pw_pattern::ConversionUnit;

use crate::error::{TransformError, TransformResult};
use crate::snippet::indent_block;
use crate::statement::{arrow_params, previous_code};

/// One pending substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Byte span in the buffer
    pub span: Range<usize>,
    /// Text expected at the span
    pub original: String,
    /// Replacement text, unindented
    pub text: String,
    /// Line of the span, for diagnostics
    pub line: usize,
}

impl Replacement {
    /// Create replacement
    #[must_use]
    pub fn new(span: Range<usize>, original: impl Into<String>, text: impl Into<String>, line: usize) -> Self {
        Self {
            span,
            original: original.into(),
            text: text.into(),
            line,
        }
    }

    /// Replacement of a unit's pattern by its rewritten text
    #[must_use]
    pub fn from_unit(unit: &ConversionUnit) -> Self {
        let pattern = unit.original_pattern();
        Self::new(
            pattern.span(),
            pattern.raw_text(),
            unit.rewritten_text(),
            pattern.line(),
        )
    }
}

/// Apply `replacements` to `buffer` in one pass
///
/// # Errors
///
/// Fails when a span is out of range, overlaps another, or no longer holds
/// the text it was extracted from.
pub fn splice(buffer: &str, replacements: &[Replacement]) -> TransformResult<String> {
    let mut ordered: Vec<&Replacement> = replacements.iter().collect();
    ordered.sort_by_key(|r| r.span.start);

    let regions = RegionMap::new(buffer);
    let mut edits: Vec<(usize, usize, String)> = Vec::with_capacity(ordered.len());
    let mut previous: Option<&Range<usize>> = None;
    let mut last_end = 0;

    for replacement in ordered {
        let span = &replacement.span;
        let Some(current) = buffer.get(span.clone()) else {
            return Err(TransformError::out_of_range(span.clone(), buffer.len()));
        };
        if let Some(prev) = previous {
            if span.start < prev.end {
                return Err(TransformError::overlapping(prev.clone(), span.clone()));
            }
        }
        if current != replacement.original {
            return Err(TransformError::StalePattern { line: replacement.line });
        }

        let indent = line_indent(buffer, span.start);
        let arrow = previous_code(buffer, &regions, span.start)
            .filter(|&p| p > 0 && buffer.as_bytes().get(p - 1..=p) == Some(b"=>".as_slice()))
            .map(|p| p - 1);
        let mut end = span.end;
        let text = match arrow {
            Some(arrow) if !replacement.text.is_empty() => {
                if let Some(params) = arrow_params(buffer, &regions, arrow) {
                    let is_async = buffer[..params].trim_end().ends_with("async");
                    if !is_async && params >= last_end && replacement.text.contains("await ") {
                        edits.push((params, params, "async ".to_string()));
                    }
                }
                format!(
                    "{{\n{}\n{indent}}}",
                    indent_block(&replacement.text, &format!("{indent}  "))
                )
            }
            _ => {
                let text = indent_block(&replacement.text, indent).trim_start().to_string();
                match trailing_statement(buffer, span, &replacement.original) {
                    Some(next) if text.contains('\n') => {
                        end = next;
                        format!("{text}\n{indent}")
                    }
                    _ => text,
                }
            }
        };
        edits.push((span.start, end, text));
        last_end = end;
        previous = Some(span);
    }

    let mut out = String::with_capacity(buffer.len());
    let mut last = 0;
    for (start, end, text) in edits {
        out.push_str(&buffer[last..start]);
        out.push_str(&text);
        last = end;
    }
    out.push_str(&buffer[last..]);
    Ok(out)
}

/// Start of further code on the line after a complete statement at `span`
fn trailing_statement(buffer: &str, span: &Range<usize>, original: &str) -> Option<usize> {
    if !original.trim_end().ends_with(';') {
        return None;
    }
    let line_end = buffer[span.end..]
        .find('\n')
        .map_or(buffer.len(), |p| span.end + p);
    let rest = buffer[span.end..line_end].trim_start();
    if rest.is_empty() || rest.starts_with("//") || rest.starts_with("/*") {
        return None;
    }
    Some(line_end - rest.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(buffer: &str, original: &str, text: &str) -> Replacement {
        let start = buffer.find(original).unwrap();
        Replacement::new(start..start + original.len(), original, text, 1)
    }

    #[test]
    fn reindents_to_the_landing_line() {
        let buffer = "it('a', () => {\n  cy.get('a').then(($a) => {});\n});";
        let out = splice(
            buffer,
            &[at(buffer, "cy.get('a').then(($a) => {});", "const a = page.locator('a');\nawait expect(a).toBeVisible();")],
        )
        .unwrap();
        assert_eq!(
            out,
            "it('a', () => {\n  const a = page.locator('a');\n  await expect(a).toBeVisible();\n});"
        );
    }

    #[test]
    fn arrow_expression_bodies_become_blocks() {
        let buffer = "it('a', () => cy.visit('/'));";
        let out = splice(buffer, &[at(buffer, "cy.visit('/')", "await page.goto('/');")]).unwrap();
        assert_eq!(out, "it('a', async () => {\n  await page.goto('/');\n});");
    }

    #[test]
    fn applies_in_span_order() {
        let buffer = "cy.a();\ncy.b();";
        let out = splice(buffer, &[at(buffer, "cy.b();", "B;"), at(buffer, "cy.a();", "A;")]).unwrap();
        assert_eq!(out, "A;\nB;");
    }

    #[test]
    fn multi_line_text_ends_its_line() {
        let buffer = "  cy.a(); cy.b();\n  cy.c(); // c";
        let out = splice(
            buffer,
            &[
                at(buffer, "cy.a();", "one({\n});"),
                at(buffer, "cy.b();", "B;"),
                at(buffer, "cy.c();", "three({\n});"),
            ],
        )
        .unwrap();
        assert_eq!(out, "  one({\n  });\n  B;\n  three({\n  }); // c");
    }

    #[test]
    fn multi_byte_text_before_a_span() {
        let buffer = "const x = 名前\ncy.a();";
        let out = splice(buffer, &[at(buffer, "cy.a();", "A;")]).unwrap();
        assert_eq!(out, "const x = 名前\nA;");
    }

    #[test]
    fn rejects_bad_spans() {
        let buffer = "cy.a();";
        let err = splice(buffer, &[Replacement::new(0..50, "x", "y", 1)]).unwrap_err();
        assert!(matches!(err, TransformError::SpanOutOfRange { .. }));

        let err = splice(buffer, &[Replacement::new(0..3, "xx.", "y", 4)]).unwrap_err();
        assert!(matches!(err, TransformError::StalePattern { line: 4 }));

        let err = splice(
            buffer,
            &[Replacement::new(0..4, "cy.a", "y", 1), Replacement::new(2..6, ".a()", "z", 1)],
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::OverlappingSpans { .. }));
    }
}
