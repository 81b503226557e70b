//! cy2pw Transformers
//!
//! Rewrites extracted patterns into Playwright Test code.
//!
//! # Overview
//!
//! - **then**: callback chains (`cy.get(…).then(($el) => …)`) in simple,
//!   multi-step, nested and chained shapes
//! - **wait** / **intercept** / **route**: alias and time waits, interception
//!   declarations and route handlers
//! - **custom**: the custom-command handler contract and its default
//! - **command** / **statement** / **assertion** / **accessor**: the shared
//!   per-command, per-statement and per-assertion rewriting
//! - **splice**: substituting converted units into the working buffer
//!
//! Transformers never fail: input they cannot express is preserved in a
//! `/* MANUAL REVIEW: … */` block and the unit is flagged.
//!
//! # Example
//!
//! ```rust
//! use cy2pw_pattern::{extract, Family};
//! use cy2pw_symbol::FileScope;
//! use cy2pw_transform::WaitInterceptTransformer;
//!
//! let source = "cy.wait(500);";
//! let mut scope = FileScope::new(source);
//! let pattern = &extract(source, Family::WaitIntercept)[0];
//!
//! let unit = WaitInterceptTransformer::default().transform(pattern, &mut scope);
//! assert_eq!(unit.rewritten_text(), "await page.waitForTimeout(500);");
//! ```

pub mod accessor;
pub mod assertion;
pub mod callback;
pub mod command;
pub mod context;
pub mod custom;
pub mod error;
pub mod intercept;
pub mod options;
pub mod route;
pub mod snippet;
pub mod splice;
pub mod statement;
pub mod then;
pub mod wait;

// Re-exports
pub use assertion::{rewrite_expect, rewrite_should, AssertionRewrite, Subject};
pub use callback::Callback;
pub use command::{convert_chain, Converted, Unsupported};
pub use context::{Context, Report};
pub use custom::{CustomCommandHandler, DefaultCommandHandler};
pub use error::{TransformError, TransformResult};
pub use intercept::{convert_intercept, route_matcher, InterceptConversion};
pub use options::TransformOptions;
pub use snippet::{manual_review_block, MANUAL_REVIEW};
pub use splice::{splice, Replacement};
pub use statement::convert_statement;
pub use then::{convert_then_chain, CallbackTransformer};
pub use wait::{convert_wait, WaitConversion, WaitInterceptTransformer};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for transformers
    pub use crate::{
        CallbackTransformer, CustomCommandHandler, DefaultCommandHandler, TransformError,
        TransformOptions, TransformResult, WaitInterceptTransformer,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
