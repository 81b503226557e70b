//! Custom command handling
//!
//! Invocations no other family claimed are delegated to a
//! [`CustomCommandHandler`]. The default handler converts built-in commands
//! directly and routes unknown commands to page objects or helper functions.

use tracing::debug;

use cy2pw_pattern::{Complexity, ConversionUnit, CustomStrategy, Pattern, UnitDetail, UnitMetadata};
use cy2pw_symbol::FileScope;

use crate::command::convert_chain;
use crate::context::Context;
use crate::options::TransformOptions;
use crate::snippet::{join, manual_review_block};

/// Converts invocations not claimed by the callback or network families
pub trait CustomCommandHandler: Send + Sync {
    /// Convert one custom-command pattern
    fn convert_custom_command(&self, pattern: &Pattern, scope: &mut FileScope) -> ConversionUnit;
}

/// Built-in handler
#[derive(Debug, Clone, Default)]
pub struct DefaultCommandHandler {
    options: TransformOptions,
}

impl DefaultCommandHandler {
    /// Create handler
    #[inline]
    #[must_use]
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }
}

impl CustomCommandHandler for DefaultCommandHandler {
    fn convert_custom_command(&self, pattern: &Pattern, scope: &mut FileScope) -> ConversionUnit {
        let Some(chain) = pattern.chain() else {
            return manual(pattern, String::new(), "not a command chain");
        };
        let command = chain.command().to_string();
        let mut ctx = Context::new(&self.options, scope);
        ctx.report.raise(pattern.complexity());

        match convert_chain(&chain, &mut ctx) {
            Ok(converted) => {
                let report = ctx.report;
                debug!(line = pattern.line(), %command, strategy = ?converted.strategy, "converted command");
                let review = report.manual_review || report.complexity == Complexity::High;
                let metadata = UnitMetadata::new(
                    report.complexity,
                    UnitDetail::Custom {
                        command,
                        strategy: converted.strategy,
                    },
                )
                .with_manual_review(review)
                .with_imports(report.imports);
                ConversionUnit::converted(pattern.clone(), join(&converted.statements), metadata)
                    .with_notes(report.notes)
            }
            Err(unsupported) => manual(pattern, command, &unsupported.to_string()),
        }
    }
}

fn manual(pattern: &Pattern, command: String, reason: &str) -> ConversionUnit {
    let metadata = UnitMetadata::new(
        pattern.complexity(),
        UnitDetail::Custom {
            command,
            strategy: CustomStrategy::Manual,
        },
    );
    ConversionUnit::failed(
        pattern.clone(),
        manual_review_block(reason, pattern.raw_text()),
        metadata,
    )
    .with_note(format!("line {}: {reason}; original kept", pattern.line()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cy2pw_pattern::{extract, Family};
    use pretty_assertions::assert_eq;

    fn convert_with(options: TransformOptions, source: &str) -> Vec<ConversionUnit> {
        let handler = DefaultCommandHandler::new(options);
        let mut scope = FileScope::new(source);
        extract(source, Family::CustomCommand)
            .iter()
            .map(|p| handler.convert_custom_command(p, &mut scope))
            .collect()
    }

    fn strategy(unit: &ConversionUnit) -> CustomStrategy {
        match &unit.metadata().detail {
            UnitDetail::Custom { strategy, .. } => *strategy,
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn built_in_commands_convert_directly() {
        let units = convert_with(TransformOptions::default(), "cy.visit('/login');\ncy.get('#user').type('ada');");
        assert_eq!(units[0].rewritten_text(), "await page.goto('/login');");
        assert_eq!(units[1].rewritten_text(), "await page.locator('#user').fill('ada');");
        assert_eq!(strategy(&units[0]), CustomStrategy::Direct);
    }

    #[test]
    fn unknown_commands_use_helpers() {
        let units = convert_with(TransformOptions::default(), "cy.login('ada', 'secret');");
        assert_eq!(units[0].rewritten_text(), "await login(page, 'ada', 'secret');");
        assert_eq!(strategy(&units[0]), CustomStrategy::Utility);
        assert!(units[0].notes().iter().any(|n| n.contains("must be defined")));
    }

    #[test]
    fn page_objects_take_precedence() {
        let options = TransformOptions::default().with_page_object("login", "loginPage.login");
        let units = convert_with(options, "cy.login('ada', 'secret');");
        assert_eq!(units[0].rewritten_text(), "await loginPage.login('ada', 'secret');");
        assert_eq!(strategy(&units[0]), CustomStrategy::PageObject);
    }

    #[test]
    fn manual_when_fallback_disabled() {
        let options = TransformOptions::default().with_utility_fallback(false);
        let units = convert_with(options, "cy.login('ada');");
        assert!(!units[0].conversion_succeeded());
        assert_eq!(strategy(&units[0]), CustomStrategy::Manual);
        assert!(units[0].rewritten_text().contains("cy.login('ada');"));
    }
}
