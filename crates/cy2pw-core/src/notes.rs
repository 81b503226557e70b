//! File-level notes
//!
//! Human-readable lines derived from the units of one file and the alias
//! table of its scope.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use cy2pw_pattern::{ConversionSummary, ConversionUnit, Family, PatternKind, UnitDetail};
use cy2pw_symbol::AliasTable;

static FIXTURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"cy\.fixture\s*\(|['"]fixture:|\bfixture\s*:"#).expect("fixture regex is valid")
});

/// Whether any analysed pattern references fixture data
fn uses_fixtures(units: &[ConversionUnit]) -> bool {
    units
        .iter()
        .any(|u| FIXTURE.is_match(u.original_pattern().raw_text()))
}

/// Aliases waited on but never bound, in first-seen order
fn unresolved_aliases(units: &[ConversionUnit]) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for unit in units {
        if let UnitDetail::Wait { unresolved, .. } = &unit.metadata().detail {
            for alias in unresolved {
                if seen.insert(alias.as_str()) {
                    out.push(alias.as_str());
                }
            }
        }
    }
    out
}

fn family_counts(summary: &ConversionSummary) -> String {
    let callbacks = summary.count(PatternKind::Then);
    let network = summary.count(PatternKind::Wait) + summary.count(PatternKind::Intercept);
    let custom = summary.count(PatternKind::CustomCommand);
    format!(
        "{} {callbacks}, {} {network}, {} {custom}",
        Family::Callback.as_str(),
        Family::WaitIntercept.as_str(),
        Family::CustomCommand.as_str(),
    )
}

/// Notes for one converted file
#[must_use]
pub fn summarize(summary: &ConversionSummary, units: &[ConversionUnit], aliases: &AliasTable) -> Vec<String> {
    if units.is_empty() {
        return vec!["No convertible patterns found".to_string()];
    }

    let mut notes = vec![
        format!("Converted {} patterns ({})", summary.total_patterns, family_counts(summary)),
        format!(
            "Success rate: {:.0}% ({}/{})",
            summary.success_rate * 100.0,
            summary.succeeded,
            summary.total_patterns
        ),
    ];
    if let Some(dominant) = summary.complexity.dominant() {
        notes.push(format!("Dominant complexity: {}", dominant.as_str()));
    }
    if summary.manual_review > 0 {
        notes.push(format!("{} patterns need manual review", summary.manual_review));
    }
    if summary.invalid_units > 0 {
        let lines: Vec<String> = units
            .iter()
            .filter(|u| !u.is_structurally_valid())
            .map(|u| u.original_pattern().line().to_string())
            .collect();
        notes.push(format!(
            "{} conversions produced unbalanced code (lines {})",
            summary.invalid_units,
            lines.join(", ")
        ));
    }
    if uses_fixtures(units) {
        notes.push("Fixture data is referenced; check fixture paths and loading".to_string());
    }
    let unresolved = unresolved_aliases(units);
    if !unresolved.is_empty() {
        let names: Vec<String> = unresolved.iter().map(|a| format!("@{a}")).collect();
        notes.push(format!("Unresolved aliases: {}", names.join(", ")));
    }
    for rebind in aliases.rebinds() {
        notes.push(format!(
            "Alias @{} declared on line {} is redeclared on line {}",
            rebind.alias, rebind.previous_line, rebind.line
        ));
    }
    notes
}
