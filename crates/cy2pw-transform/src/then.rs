//! Callback-chain transformer
//!
//! `cy.get(…).then(($el) => { … })` becomes a binding for the base command
//! followed by the callback body in place, with the parameter renamed to
//! the binding. Nested callbacks are flattened in textual order; several
//! attachments on one base share a single binding.

use tracing::{debug, warn};

use cy2pw_pattern::chain::CommandChain;
use cy2pw_pattern::{CallbackShape, Complexity, ConversionUnit, Pattern, UnitDetail, UnitMetadata};
use cy2pw_symbol::FileScope;

use crate::callback::{classify_shape, Callback};
use crate::command::{bind_param, convert_segments};
use crate::context::Context;
use crate::options::TransformOptions;
use crate::snippet::{join, manual_review_block};
use crate::statement::convert_body;

/// Output of one converted callback chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attached {
    /// Output statements
    pub lines: Vec<String>,
    /// Binding declared for the base command
    pub binding: Option<String>,
}

/// Convert a callback chain in the current context
///
/// Errors carry the reason the chain was left alone.
pub fn convert_then_chain(chain: &CommandChain, ctx: &mut Context<'_>) -> Result<Attached, String> {
    let first_then = chain
        .first_then()
        .ok_or_else(|| "no callback attached".to_string())?;
    if first_then == 0 {
        return Err("callback attached to nothing".into());
    }
    let tail = &chain.segments()[first_then..];
    if let Some(other) = tail.iter().find(|s| s.name != "then") {
        return Err(format!("`{}` after a callback", other.name));
    }
    let callbacks = tail
        .iter()
        .map(|s| Callback::parse(&s.args))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| "callback is not an inline function".to_string())?;

    let base = convert_segments(&chain.segments()[..first_then], ctx).map_err(|u| u.to_string())?;
    let subject = base
        .subject
        .clone()
        .ok_or_else(|| "base command yields nothing".to_string())?;

    let block = ctx.open_block();
    let mut lines = Vec::new();
    if let Some(n) = block {
        lines.push(format!("// block {n}"));
    }
    lines.extend(base.statements);

    if let [callback] = callbacks.as_slice() {
        let rename = bind_param(callback.param(), &subject, ctx, &mut lines).map_err(|u| u.to_string())?;
        let binding = rename.as_ref().map(|(_, b)| b.clone());
        lines.extend(convert_body(callback, rename, block, ctx));
        return Ok(Attached { lines, binding });
    }

    let shared = ctx.options().chained_binding.clone();
    let rename = bind_param(Some(&shared), &subject, ctx, &mut lines).map_err(|u| u.to_string())?;
    let binding = rename.map(|(_, b)| b);
    let last = callbacks.len() - 1;
    for (idx, callback) in callbacks.iter().enumerate() {
        let rename = match (callback.param(), &binding) {
            (Some(param), _) if param.starts_with('{') || param.starts_with('[') => {
                return Err("destructured parameter on a chained callback".into());
            }
            (Some(param), Some(binding)) => Some((param.to_string(), binding.clone())),
            _ => None,
        };
        if idx < last && callback.is_block && callback.returns_value() {
            ctx.report.note(format!(
                "return value of callback {} is not passed on; every callback receives the base result",
                idx + 1
            ));
        }
        lines.extend(convert_body(callback, rename, block, ctx));
    }
    Ok(Attached { lines, binding })
}

/// Transformer for callback-chain patterns
#[derive(Debug, Clone, Default)]
pub struct CallbackTransformer {
    options: TransformOptions,
}

impl CallbackTransformer {
    /// Create transformer
    #[inline]
    #[must_use]
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }

    /// Options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Convert one callback-chain pattern
    #[must_use]
    pub fn transform(&self, pattern: &Pattern, scope: &mut FileScope) -> ConversionUnit {
        let Some(chain) = pattern.chain() else {
            return unrecognized(pattern, CallbackShape::Unrecognized, 0, "not a command chain");
        };
        let shape = classify_shape(&chain);
        let callbacks = chain.then_count();
        if shape == CallbackShape::Unrecognized {
            warn!(line = pattern.line(), "unrecognized callback shape");
            return unrecognized(pattern, shape, callbacks, "callback shape not recognized");
        }

        let mut ctx = Context::new(&self.options, scope);
        ctx.set_flatten(shape == CallbackShape::Nested);
        ctx.report.raise(pattern.complexity());
        ctx.report.raise(match shape {
            CallbackShape::Simple => Complexity::Low,
            CallbackShape::MultiStep => Complexity::Medium,
            _ => Complexity::High,
        });

        match convert_then_chain(&chain, &mut ctx) {
            Ok(attached) => {
                debug!(line = pattern.line(), ?shape, "converted callback chain");
                let report = ctx.report;
                let review = report.manual_review || report.complexity == Complexity::High;
                let metadata = UnitMetadata::new(
                    report.complexity,
                    UnitDetail::Callback {
                        shape,
                        callbacks,
                        binding: attached.binding,
                    },
                )
                .with_manual_review(review)
                .with_imports(report.imports);
                ConversionUnit::converted(pattern.clone(), join(&attached.lines), metadata)
                    .with_notes(report.notes)
            }
            Err(reason) => {
                warn!(line = pattern.line(), %reason, "callback chain left for manual review");
                unrecognized(pattern, shape, callbacks, &reason)
            }
        }
    }
}

fn unrecognized(pattern: &Pattern, shape: CallbackShape, callbacks: usize, reason: &str) -> ConversionUnit {
    let metadata = UnitMetadata::new(
        pattern.complexity(),
        UnitDetail::Callback {
            shape,
            callbacks,
            binding: None,
        },
    );
    ConversionUnit::failed(
        pattern.clone(),
        manual_review_block(reason, pattern.raw_text()),
        metadata,
    )
    .with_note(format!("line {}: {reason}; original kept", pattern.line()))
}
