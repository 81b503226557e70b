//! cy2pw Symbol System
//!
//! Per-file symbol state for the migration engine.
//!
//! # Overview
//!
//! - **AliasTable**: `alias → url` bindings from `cy.intercept(...).as(...)`
//! - **InterceptSignature**: decomposed intercept arguments
//! - **FileScope**: alias table plus binding-name allocator, one per file
//!
//! # Example
//!
//! ```rust
//! use cy2pw_symbol::FileScope;
//!
//! let source = "cy.wait('@getUsers');\ncy.intercept('GET', '/api/users').as('getUsers');";
//! let scope = FileScope::new(source);
//!
//! let binding = scope.aliases().resolve("@getUsers").unwrap();
//! assert_eq!(binding.method.as_deref(), Some("GET"));
//! ```

pub mod alias;
pub mod scope;

// Re-exports
pub use alias::{AliasBinding, AliasTable, InterceptSignature, Rebind, UrlPattern, HTTP_METHODS};
pub use scope::{FileScope, NameAllocator};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for symbol handling
    pub use crate::{AliasBinding, AliasTable, FileScope, UrlPattern};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
