//! cy2pw Orchestrator
//!
//! File-level conversion of Cypress specs into Playwright Test code.
//!
//! # Overview
//!
//! - **converter**: [`ComplexPatternConverter`], running the pattern families
//!   in order against one working buffer per file
//! - **family**: the `(extract, transform)` pairs the converter runs
//! - **structure**: `describe`/`it`/hook declarations to `test.*`
//! - **imports**: injecting the imports converted code needs
//! - **syntax**: tree-sitter diagnostics on the output
//! - **notes**: human-readable file summary
//! - **config**: TOML configuration
//!
//! # Example
//!
//! ```rust
//! use cy2pw_core::ComplexPatternConverter;
//!
//! let converter = ComplexPatternConverter::default();
//! let result = converter.convert("cy.visit('/');", "home.cy.ts");
//!
//! assert!(result.conversion_succeeded);
//! assert!(result.converted_code.contains("await page.goto('/');"));
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod family;
pub mod imports;
pub mod notes;
pub mod structure;
pub mod syntax;

// Re-exports
pub use config::{ConvertConfig, DEFAULT_BASE_IMPORT};
pub use converter::ComplexPatternConverter;
pub use error::{ConvertError, ConvertResult};
pub use family::{CallbackFamily, CustomFamily, NetworkFamily, PatternFamily};
pub use imports::inject_imports;
pub use structure::{rewrite_structure, StructureRewrite};
pub use syntax::check_syntax;

pub use cy2pw_pattern::{ConversionSummary, ConversionUnit, FileConversionResult, SyntaxReport};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for converting files
    pub use crate::{
        ComplexPatternConverter, ConvertConfig, ConvertError, ConvertResult, FileConversionResult,
    };
    pub use cy2pw_transform::{CustomCommandHandler, TransformOptions};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
