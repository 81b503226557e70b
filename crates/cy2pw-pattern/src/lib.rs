//! cy2pw Pattern Model
//!
//! Shared data model and structural scanning for the migration engine.
//!
//! # Overview
//!
//! - **scan**: delimiter-aware scanning (regions, matching closers, statement
//!   and argument splitting, identifier replacement)
//! - **chain**: `cy.name(args)…` command chain parsing
//! - **extract**: outermost pattern extraction per family
//! - **unit** / **result**: per-pattern and per-file results
//! - **balance**: raw delimiter balance and malformed markers
//!
//! # Example
//!
//! ```rust
//! use cy2pw_pattern::{extract, Family, PatternKind};
//!
//! let source = "cy.get('#submit').then(($el) => { expect($el).to.be.visible; });";
//! let patterns = extract(source, Family::Callback);
//! assert_eq!(patterns.len(), 1);
//! assert_eq!(patterns[0].kind(), PatternKind::Then);
//! ```

pub mod balance;
pub mod chain;
pub mod extract;
pub mod pattern;
pub mod result;
pub mod scan;
pub mod unit;

// Re-exports
pub use balance::{is_structurally_valid, malformed_markers, DelimiterBalance, MALFORMED_MARKERS};
pub use chain::{CommandChain, Segment};
pub use extract::{classify_chain, extract, extract_all, Family};
pub use pattern::{Complexity, Pattern, PatternKind};
pub use result::{ComplexityHistogram, ConversionSummary, FileConversionResult, SyntaxReport};
pub use unit::{
    CallbackShape, ConversionUnit, CustomStrategy, DataAccessor, InterceptShape, UnitDetail,
    UnitMetadata, WaitType,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for pattern handling
    pub use crate::{
        CommandChain, Complexity, ConversionUnit, Family, Pattern, PatternKind, UnitDetail,
        UnitMetadata,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
