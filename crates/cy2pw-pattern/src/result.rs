//! File-level aggregation

use serde::Serialize;
use std::collections::BTreeMap;

use crate::pattern::{Complexity, PatternKind};
use crate::unit::ConversionUnit;

/// Count of units per complexity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityHistogram {
    /// Low-complexity units
    pub low: usize,
    /// Medium-complexity units
    pub medium: usize,
    /// High-complexity units
    pub high: usize,
}

impl ComplexityHistogram {
    /// Count one unit
    pub fn record(&mut self, complexity: Complexity) {
        match complexity {
            Complexity::Low => self.low += 1,
            Complexity::Medium => self.medium += 1,
            Complexity::High => self.high += 1,
        }
    }

    /// Count for one complexity
    #[must_use]
    pub fn get(&self, complexity: Complexity) -> usize {
        match complexity {
            Complexity::Low => self.low,
            Complexity::Medium => self.medium,
            Complexity::High => self.high,
        }
    }

    /// Most frequent complexity; ties go to the higher level
    #[must_use]
    pub fn dominant(&self) -> Option<Complexity> {
        [Complexity::High, Complexity::Medium, Complexity::Low]
            .into_iter()
            .filter(|&c| self.get(c) > 0)
            .fold(None, |best: Option<Complexity>, c| match best {
                Some(b) if self.get(b) >= self.get(c) => Some(b),
                _ => Some(c),
            })
    }
}

/// Aggregate over every unit of one file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummary {
    /// Units produced
    pub total_patterns: usize,
    /// Units whose conversion succeeded
    pub succeeded: usize,
    /// Units whose conversion failed
    pub failed: usize,
    /// Units flagged for manual review
    pub manual_review: usize,
    /// Units whose own replacement text is unbalanced or malformed
    pub invalid_units: usize,
    /// Units per pattern kind
    pub by_kind: BTreeMap<PatternKind, usize>,
    /// Units per complexity
    pub complexity: ComplexityHistogram,
    /// `succeeded / total_patterns`, `1.0` when there are no units
    pub success_rate: f64,
}

impl ConversionSummary {
    /// Derive the summary from a file's units
    #[must_use]
    pub fn from_units(units: &[ConversionUnit]) -> Self {
        let mut summary = Self {
            total_patterns: units.len(),
            ..Self::default()
        };
        for unit in units {
            if unit.conversion_succeeded() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
            if unit.requires_manual_review() {
                summary.manual_review += 1;
            }
            if !unit.is_structurally_valid() {
                summary.invalid_units += 1;
            }
            *summary
                .by_kind
                .entry(unit.original_pattern().kind())
                .or_default() += 1;
            summary.complexity.record(unit.metadata().complexity);
        }
        summary.success_rate = if units.is_empty() {
            1.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let rate = summary.succeeded as f64 / units.len() as f64;
            rate
        };
        summary
    }

    /// Units of one kind
    #[must_use]
    pub fn count(&self, kind: PatternKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }
}

/// Tree-sitter parse diagnostics of the converted output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxReport {
    /// Error and missing nodes in the parse tree
    pub error_count: usize,
    /// 1-based line of the first error
    pub first_error_line: Option<usize>,
}

impl SyntaxReport {
    /// Whether the parse was clean
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.error_count == 0
    }
}

/// Result of converting one file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConversionResult {
    /// Path the caller associated with the source
    pub file_path: String,
    /// Input text
    pub original_code: String,
    /// Output text
    pub converted_code: String,
    /// Output is balanced and free of malformed markers
    pub is_valid: bool,
    /// No fatal error and `is_valid`
    pub conversion_succeeded: bool,
    /// Aggregate over `detailed_results`
    pub summary: ConversionSummary,
    /// Human-readable notes
    pub notes: Vec<String>,
    /// Every unit produced, in application order
    pub detailed_results: Vec<ConversionUnit>,
    /// Parse diagnostics, when enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax: Option<SyntaxReport>,
    /// Fatal error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileConversionResult {
    /// Whole-file failure: the source is returned unchanged
    #[must_use]
    pub fn failure(file_path: impl Into<String>, source: &str, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            file_path: file_path.into(),
            original_code: source.to_string(),
            converted_code: source.to_string(),
            is_valid: false,
            conversion_succeeded: false,
            summary: ConversionSummary::default(),
            notes: vec![format!("Conversion failed: {error}")],
            detailed_results: Vec::new(),
            syntax: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use crate::unit::{CustomStrategy, UnitDetail, UnitMetadata};

    fn unit(kind: PatternKind, complexity: Complexity, ok: bool) -> ConversionUnit {
        let metadata = UnitMetadata::new(
            complexity,
            UnitDetail::Custom {
                command: "x".into(),
                strategy: CustomStrategy::Direct,
            },
        );
        let pattern = Pattern::detached(kind, "cy.x()");
        if ok {
            ConversionUnit::converted(pattern, "await x();", metadata)
        } else {
            ConversionUnit::failed(pattern, "/* cy.x() */", metadata)
        }
    }

    #[test]
    fn summary_counts() {
        let units = vec![
            unit(PatternKind::Then, Complexity::Low, true),
            unit(PatternKind::Then, Complexity::High, true),
            unit(PatternKind::Wait, Complexity::Medium, false),
            unit(PatternKind::Wait, Complexity::Medium, true),
        ];
        let summary = ConversionSummary::from_units(&units);
        assert_eq!(summary.total_patterns, 4);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.manual_review, 1);
        assert_eq!(summary.count(PatternKind::Then), 2);
        assert_eq!(summary.count(PatternKind::Intercept), 0);
        assert_eq!(summary.complexity.dominant(), Some(Complexity::Medium));
        assert!((summary.success_rate - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_summary() {
        let summary = ConversionSummary::from_units(&[]);
        assert_eq!(summary.complexity.dominant(), None);
        assert!((summary.success_rate - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn dominant_ties_prefer_higher() {
        let histogram = ComplexityHistogram {
            low: 2,
            medium: 0,
            high: 2,
        };
        assert_eq!(histogram.dominant(), Some(Complexity::High));
    }

    #[test]
    fn failure_keeps_source() {
        let result = FileConversionResult::failure("a.cy.ts", "cy.visit('/')", "boom");
        assert_eq!(result.converted_code, "cy.visit('/')");
        assert!(!result.conversion_succeeded);
        assert_eq!(result.error.as_deref(), Some("boom"));
    }
}
