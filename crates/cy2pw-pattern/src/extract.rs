//! Pattern extraction
//!
//! Extraction is structural: every `cy` anchor in code is parsed into a
//! command chain with balanced scanning, chains contained in another chain are
//! dropped (the outermost span owns its body), and the survivors are
//! classified into families. Malformed chains simply do not match.

use serde::Serialize;
use tracing::debug;

use crate::chain::{anchors, parse_at, CommandChain};
use crate::pattern::{Complexity, Pattern, PatternKind};
use crate::scan::{contains_in_code, line_number, RegionMap};

/// Pattern family requested from the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Family {
    /// Chains carrying `.then()` callbacks
    Callback,
    /// `cy.wait` and `cy.intercept` statements
    WaitIntercept,
    /// Everything else
    CustomCommand,
}

impl Family {
    /// Families in orchestration order
    pub const ALL: [Family; 3] = [Family::Callback, Family::WaitIntercept, Family::CustomCommand];

    /// Family a pattern kind belongs to
    #[must_use]
    pub fn of(kind: PatternKind) -> Self {
        match kind {
            PatternKind::Then => Self::Callback,
            PatternKind::Wait | PatternKind::Intercept => Self::WaitIntercept,
            PatternKind::CustomCommand => Self::CustomCommand,
        }
    }

    /// Stable name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Callback => "callback",
            Self::WaitIntercept => "waitIntercept",
            Self::CustomCommand => "customCommand",
        }
    }
}

/// Kind of a parsed chain
#[must_use]
pub fn classify_chain(chain: &CommandChain) -> PatternKind {
    match chain.command() {
        "wait" => PatternKind::Wait,
        "intercept" => PatternKind::Intercept,
        _ if chain.has("then") => PatternKind::Then,
        _ => PatternKind::CustomCommand,
    }
}

/// Coarse complexity of a chain
#[must_use]
pub fn estimate_complexity(kind: PatternKind, chain: &CommandChain) -> Complexity {
    let callbacks: Vec<_> = chain
        .segments()
        .iter()
        .filter(|s| s.name == "then")
        .collect();
    let nested = callbacks.iter().any(|s| contains_in_code(&s.args, ".then("));
    let multiline = chain.segments().iter().skip(1).any(|s| s.args.contains('\n'));

    match kind {
        PatternKind::Then if callbacks.len() > 1 || nested => Complexity::High,
        PatternKind::Wait if !callbacks.is_empty() => Complexity::Medium,
        _ if multiline => Complexity::Medium,
        _ => Complexity::Low,
    }
}

/// Every outermost pattern in `source`, in source order
#[must_use]
pub fn extract_all(source: &str) -> Vec<Pattern> {
    let regions = RegionMap::new(source);
    let mut chains: Vec<CommandChain> = anchors(source, &regions)
        .into_iter()
        .filter_map(|pos| parse_at(source, &regions, pos))
        .collect();

    chains.sort_by(|a, b| {
        a.span()
            .start
            .cmp(&b.span().start)
            .then(b.span().end.cmp(&a.span().end))
    });

    let mut patterns = Vec::new();
    let mut covered_to = 0usize;
    for chain in chains {
        let span = chain.span();
        if span.start < covered_to {
            continue;
        }
        let end = statement_end(source, span.end);
        covered_to = end;

        let kind = classify_chain(&chain);
        let complexity = estimate_complexity(kind, &chain);
        let line = line_number(source, span.start);
        debug!(kind = %kind, line, "extracted pattern");
        patterns.push(Pattern::new(
            kind,
            &source[span.start..end],
            complexity,
            span.start..end,
            line,
        ));
    }
    patterns
}

/// Outermost patterns of one family, in source order
#[must_use]
pub fn extract(source: &str, family: Family) -> Vec<Pattern> {
    extract_all(source)
        .into_iter()
        .filter(|p| Family::of(p.kind()) == family)
        .collect()
}

/// Extend a chain end over an immediately following `;`
fn statement_end(source: &str, end: usize) -> usize {
    let bytes = source.as_bytes();
    let mut idx = end;
    while idx < bytes.len() && matches!(bytes[idx], b' ' | b'\t') {
        idx += 1;
    }
    if bytes.get(idx) == Some(&b';') {
        idx + 1
    } else {
        end
    }
}
