//! Pattern families run by the orchestrator
//!
//! A family pairs extraction of one pattern kind with the transformer for
//! it. The converter runs its families in order, each against the buffer the
//! previous family left behind.

use cy2pw_pattern::{extract, ConversionUnit, Family, Pattern};
use cy2pw_symbol::FileScope;
use cy2pw_transform::{CallbackTransformer, CustomCommandHandler, TransformOptions, WaitInterceptTransformer};

/// One `(extract, transform)` pair
pub trait PatternFamily: Send + Sync {
    /// Family tag
    fn family(&self) -> Family;

    /// Outermost patterns of this family in `source`
    fn extract(&self, source: &str) -> Vec<Pattern> {
        extract(source, self.family())
    }

    /// Convert one extracted pattern
    fn transform(&self, pattern: &Pattern, scope: &mut FileScope) -> ConversionUnit;
}

/// `.then()` callback chains
#[derive(Debug, Clone, Default)]
pub struct CallbackFamily {
    transformer: CallbackTransformer,
}

impl CallbackFamily {
    /// Create family
    #[must_use]
    pub fn new(options: TransformOptions) -> Self {
        Self {
            transformer: CallbackTransformer::new(options),
        }
    }
}

impl PatternFamily for CallbackFamily {
    fn family(&self) -> Family {
        Family::Callback
    }

    fn transform(&self, pattern: &Pattern, scope: &mut FileScope) -> ConversionUnit {
        self.transformer.transform(pattern, scope)
    }
}

/// Waits and interceptions
#[derive(Debug, Clone, Default)]
pub struct NetworkFamily {
    transformer: WaitInterceptTransformer,
}

impl NetworkFamily {
    /// Create family
    #[must_use]
    pub fn new(options: TransformOptions) -> Self {
        Self {
            transformer: WaitInterceptTransformer::new(options),
        }
    }
}

impl PatternFamily for NetworkFamily {
    fn family(&self) -> Family {
        Family::WaitIntercept
    }

    fn transform(&self, pattern: &Pattern, scope: &mut FileScope) -> ConversionUnit {
        self.transformer.transform(pattern, scope)
    }
}

/// Invocations left over, delegated to a [`CustomCommandHandler`]
pub struct CustomFamily {
    handler: Box<dyn CustomCommandHandler>,
}

impl CustomFamily {
    /// Create family around `handler`
    #[must_use]
    pub fn new(handler: Box<dyn CustomCommandHandler>) -> Self {
        Self { handler }
    }
}

impl std::fmt::Debug for CustomFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomFamily").finish_non_exhaustive()
    }
}

impl PatternFamily for CustomFamily {
    fn family(&self) -> Family {
        Family::CustomCommand
    }

    fn transform(&self, pattern: &Pattern, scope: &mut FileScope) -> ConversionUnit {
        self.handler.convert_custom_command(pattern, scope)
    }
}
