//! Extracted pattern spans

use serde::Serialize;
use std::fmt;
use std::ops::Range;

use crate::chain::CommandChain;

/// Kind of an extracted pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PatternKind {
    /// Command chain with one or more `.then()` callbacks
    Then,
    /// `cy.wait(...)` statement
    Wait,
    /// `cy.intercept(...)` declaration
    Intercept,
    /// Any other command chain
    CustomCommand,
}

impl PatternKind {
    /// Stable lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Then => "then",
            Self::Wait => "wait",
            Self::Intercept => "intercept",
            Self::CustomCommand => "customCommand",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural complexity, ordered `Low < Medium < High`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Complexity {
    /// Flat, single-step rewrite
    #[default]
    Low,
    /// Multi-line or network-bound rewrite
    Medium,
    /// Nested, chained or data-extracting rewrite
    High,
}

impl Complexity {
    /// Stable lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tagged span of source text
///
/// `raw_text` always equals `buffer[span]` for the buffer the pattern was
/// extracted from, and is a balanced, self-contained statement or expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    kind: PatternKind,
    raw_text: String,
    complexity: Complexity,
    span: Range<usize>,
    line: usize,
}

impl Pattern {
    /// Create a pattern
    #[inline]
    #[must_use]
    pub fn new(
        kind: PatternKind,
        raw_text: impl Into<String>,
        complexity: Complexity,
        span: Range<usize>,
        line: usize,
    ) -> Self {
        Self {
            kind,
            raw_text: raw_text.into(),
            complexity,
            span,
            line,
        }
    }

    /// Build a detached pattern from a snippet, as if it were a whole buffer
    #[must_use]
    pub fn detached(kind: PatternKind, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let span = 0..raw_text.len();
        Self::new(kind, raw_text, Complexity::Low, span, 1)
    }

    /// Pattern kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Source text of the span
    #[inline]
    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Extractor's coarse complexity estimate
    #[inline]
    #[must_use]
    pub fn complexity(&self) -> Complexity {
        self.complexity
    }

    /// Byte range in the extraction buffer
    #[inline]
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// 1-based line of the span start
    #[inline]
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Raw text without the trailing statement terminator
    #[must_use]
    pub fn expression(&self) -> &str {
        self.raw_text.trim_end().trim_end_matches(';').trim_end()
    }

    /// Parse the raw text as a command chain
    #[must_use]
    pub fn chain(&self) -> Option<CommandChain> {
        CommandChain::parse(self.expression())
    }
}
