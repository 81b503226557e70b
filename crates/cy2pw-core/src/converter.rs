//! Complex pattern converter
//!
//! Runs the pattern families over one file, rewrites test structure,
//! injects imports and validates the result.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use cy2pw_pattern::{
    is_structurally_valid, ConversionSummary, ConversionUnit, FileConversionResult, SyntaxReport,
};
use cy2pw_symbol::FileScope;
use cy2pw_transform::{splice, CustomCommandHandler, DefaultCommandHandler, Replacement};

use crate::config::ConvertConfig;
use crate::error::{ConvertError, ConvertResult};
use crate::family::{CallbackFamily, CustomFamily, NetworkFamily, PatternFamily};
use crate::imports::inject_imports;
use crate::notes::summarize;
use crate::structure::rewrite_structure;
use crate::syntax::check_syntax;

/// Buffer and units after the family passes
struct FamilyOutput {
    buffer: String,
    units: Vec<ConversionUnit>,
}

/// File-level Cypress to Playwright converter
///
/// Holds only configuration; every `convert` call builds its own
/// [`FileScope`], so one converter can be shared across threads.
pub struct ComplexPatternConverter {
    config: ConvertConfig,
    families: Vec<Box<dyn PatternFamily>>,
}

impl ComplexPatternConverter {
    /// Create converter with the default command handler
    #[must_use]
    pub fn new(config: ConvertConfig) -> Self {
        let handler = DefaultCommandHandler::new(config.transform.clone());
        Self::with_handler(config, Box::new(handler))
    }

    /// Create converter delegating leftover commands to `handler`
    #[must_use]
    pub fn with_handler(config: ConvertConfig, handler: Box<dyn CustomCommandHandler>) -> Self {
        let families: Vec<Box<dyn PatternFamily>> = vec![
            Box::new(CallbackFamily::new(config.transform.clone())),
            Box::new(NetworkFamily::new(config.transform.clone())),
            Box::new(CustomFamily::new(handler)),
        ];
        Self { config, families }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Convert one file's source text
    ///
    /// Never fails: an internal error, including a panic in any pass, yields
    /// a failed result carrying the unchanged source and the error message.
    #[must_use]
    pub fn convert(&self, source: &str, file_path: &str) -> FileConversionResult {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.try_convert(source, file_path)))
            .unwrap_or_else(|payload| Err(ConvertError::from_panic(payload.as_ref())));
        match outcome {
            Ok(result) => result,
            Err(err) => {
                tracing::error!("Conversion of {} failed: {}", file_path, err);
                FileConversionResult::failure(file_path, source, err.to_string())
            }
        }
    }

    /// Read and convert the file at `path`
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Io`] when the file cannot be read.
    pub fn convert_file(&self, path: impl AsRef<Path>) -> ConvertResult<FileConversionResult> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
        Ok(self.convert(&source, &path.display().to_string()))
    }

    fn run_families(&self, source: &str, scope: &mut FileScope) -> ConvertResult<FamilyOutput> {
        let mut buffer = source.to_string();
        let mut units = Vec::new();

        for family in &self.families {
            let patterns = family.extract(&buffer);
            if patterns.is_empty() {
                continue;
            }
            tracing::debug!(
                "{} family: {} patterns",
                family.family().as_str(),
                patterns.len()
            );

            let converted: Vec<ConversionUnit> = patterns
                .iter()
                .map(|pattern| {
                    let unit = family.transform(pattern, scope);
                    tracing::debug!(
                        "line {}: {} ({}) succeeded={}",
                        pattern.line(),
                        pattern.kind().as_str(),
                        unit.metadata().complexity,
                        unit.conversion_succeeded()
                    );
                    log_unit(&unit);
                    unit
                })
                .collect();

            let replacements: Vec<Replacement> = converted.iter().map(Replacement::from_unit).collect();
            buffer = splice(&buffer, &replacements)?;
            units.extend(converted);
        }
        Ok(FamilyOutput { buffer, units })
    }

    fn try_convert(&self, source: &str, file_path: &str) -> ConvertResult<FileConversionResult> {
        let mut scope = FileScope::new(source);
        let FamilyOutput { mut buffer, units } = self.run_families(source, &mut scope)?;

        let summary = ConversionSummary::from_units(&units);
        let mut notes = summarize(&summary, &units, scope.aliases());

        if self.config.rewrite_structure {
            let rewrite = rewrite_structure(&buffer, &self.config.transform.page);
            if rewrite.rewritten > 0 {
                notes.push(format!("Rewrote {} test declarations", rewrite.rewritten));
            }
            notes.extend(rewrite.notes);
            buffer = rewrite.text;
        }

        let mut imports = vec![self.config.base_import.clone()];
        for unit in &units {
            imports.extend(unit.metadata().required_imports.iter().cloned());
        }
        let (with_imports, inserted) = inject_imports(&buffer, &imports);
        buffer = with_imports;
        for line in inserted {
            notes.push(format!("Added import: {line}"));
        }

        let is_valid = is_structurally_valid(&buffer);
        if !is_valid {
            tracing::warn!("{}: converted output is structurally invalid", file_path);
            notes.push("Converted output has unbalanced delimiters or malformed code".to_string());
        }

        let syntax = if self.config.syntax_check {
            syntax_report(&buffer, file_path, &mut notes)
        } else {
            None
        };

        tracing::info!(
            "Converted {}: {} patterns, {} succeeded, valid={}",
            file_path,
            summary.total_patterns,
            summary.succeeded,
            is_valid
        );

        Ok(FileConversionResult {
            file_path: file_path.to_string(),
            original_code: source.to_string(),
            converted_code: buffer,
            is_valid,
            conversion_succeeded: is_valid,
            summary,
            notes,
            detailed_results: units,
            syntax,
            error: None,
        })
    }
}

impl Default for ComplexPatternConverter {
    fn default() -> Self {
        Self::new(ConvertConfig::default())
    }
}

impl std::fmt::Debug for ComplexPatternConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let families: Vec<&str> = self.families.iter().map(|f| f.family().as_str()).collect();
        f.debug_struct("ComplexPatternConverter")
            .field("config", &self.config)
            .field("families", &families)
            .finish()
    }
}

fn syntax_report(buffer: &str, file_path: &str, notes: &mut Vec<String>) -> Option<SyntaxReport> {
    match check_syntax(buffer) {
        Ok(report) => {
            if let Some(line) = report.first_error_line {
                tracing::warn!(
                    "{}: {} syntax errors, first on line {}",
                    file_path,
                    report.error_count,
                    line
                );
                notes.push(format!(
                    "Syntax check found {} errors (first on line {line})",
                    report.error_count
                ));
            }
            Some(report)
        }
        Err(err) => {
            tracing::warn!("{}: syntax check skipped: {}", file_path, err);
            notes.push(format!("Syntax check skipped: {err}"));
            None
        }
    }
}

fn log_unit(unit: &ConversionUnit) {
    if !unit.conversion_succeeded() {
        tracing::warn!(
            "line {}: pattern kept for manual review",
            unit.original_pattern().line()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cy2pw_pattern::{CustomStrategy, Pattern, UnitDetail, UnitMetadata};
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_commands_convert() {
        let converter = ComplexPatternConverter::default();
        let result = converter.convert("cy.visit('/');\ncy.get('#go').click();\n", "a.cy.ts");
        assert_eq!(
            result.converted_code,
            "import { test, expect } from '@playwright/test';\n\nawait page.goto('/');\nawait page.locator('#go').click();\n"
        );
        assert!(result.conversion_succeeded);
        assert_eq!(result.summary.total_patterns, 2);
    }

    #[test]
    fn handlers_are_pluggable() {
        struct Keep;
        impl CustomCommandHandler for Keep {
            fn convert_custom_command(&self, pattern: &Pattern, _scope: &mut FileScope) -> ConversionUnit {
                let metadata = UnitMetadata::new(
                    pattern.complexity(),
                    UnitDetail::Custom {
                        command: "keep".into(),
                        strategy: CustomStrategy::Manual,
                    },
                );
                ConversionUnit::failed(pattern.clone(), format!("// kept: {}", pattern.raw_text()), metadata)
            }
        }

        let config = ConvertConfig::default().with_syntax_check(false);
        let converter = ComplexPatternConverter::with_handler(config, Box::new(Keep));
        let result = converter.convert("cy.login('a');", "a.cy.ts");
        assert!(result.converted_code.contains("// kept: cy.login('a');"));
        assert_eq!(result.summary.failed, 1);
        assert!(result.conversion_succeeded);
    }

    #[test]
    fn panicking_handlers_fail_the_file() {
        struct Explode;
        impl CustomCommandHandler for Explode {
            fn convert_custom_command(&self, _pattern: &Pattern, _scope: &mut FileScope) -> ConversionUnit {
                panic!("handler exploded")
            }
        }

        let config = ConvertConfig::default().with_syntax_check(false);
        let converter = ComplexPatternConverter::with_handler(config, Box::new(Explode));
        let source = "cy.login('a');
";
        let result = converter.convert(source, "a.cy.ts");
        assert!(!result.conversion_succeeded);
        assert_eq!(result.converted_code, source);
        assert_eq!(result.error.as_deref(), Some("internal error: handler exploded"));
    }

    #[test]
    fn missing_files_are_io_errors() {
        let err = ComplexPatternConverter::default()
            .convert_file("/nonexistent/a.cy.ts")
            .unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
    }
}
