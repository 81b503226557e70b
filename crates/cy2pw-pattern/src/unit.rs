//! Per-pattern conversion results

use serde::Serialize;

use crate::balance::is_structurally_valid;
use crate::pattern::{Complexity, Pattern};

/// Callback shape, in classification priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CallbackShape {
    /// One command chained into one flat callback
    Simple,
    /// Callback body issuing further commands
    MultiStep,
    /// Callback body containing another callback
    Nested,
    /// Several callbacks on one base command
    Chained,
    /// None of the above
    Unrecognized,
}

/// Classified wait statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WaitType {
    /// `cy.wait('@alias')`
    Alias,
    /// `cy.wait(['@a', '@b'])`
    MultiAlias,
    /// `cy.wait(500)`
    Time,
    /// Could not be classified
    Unknown,
}

/// Classified interception declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InterceptShape {
    /// Inline StaticResponse object or body
    InlineObject,
    /// Fixture-file response
    Fixture,
    /// Regex-matched URL
    RegexUrl,
    /// No response: request passes through
    PassThrough,
    /// Request handler callback
    Handler,
    /// Could not be classified
    Unknown,
}

/// Strategy used for an unrecognized command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomStrategy {
    /// Built-in command with a direct equivalent
    Direct,
    /// Delegated to a configured page-object method
    PageObject,
    /// Delegated to a helper function
    Utility,
    /// Left for manual review
    Manual,
}

/// Request/response property read inside a wait callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DataAccessor {
    /// `.response.statusCode`
    ResponseStatus,
    /// `.response.body`
    ResponseBody,
    /// `.response.headers`
    ResponseHeaders,
    /// `.request.url`
    RequestUrl,
    /// `.request.body`
    RequestBody,
    /// `.request.headers`
    RequestHeaders,
    /// `.request.method`
    RequestMethod,
}

/// Kind-specific metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum UnitDetail {
    /// Callback-chain conversion
    Callback {
        /// Classified shape
        shape: CallbackShape,
        /// Number of callbacks converted
        callbacks: usize,
        /// Binding introduced for the base command
        binding: Option<String>,
    },
    /// Wait conversion
    Wait {
        /// Classified wait
        wait_type: WaitType,
        /// Aliases referenced
        aliases: Vec<String>,
        /// Aliases found in the alias table
        resolved: Vec<String>,
        /// Aliases missing from the alias table
        unresolved: Vec<String>,
        /// Request/response data read by a chained callback
        data_access: Vec<DataAccessor>,
    },
    /// Interception conversion
    Intercept {
        /// Classified shape
        shape: InterceptShape,
        /// URL argument as written
        url: Option<String>,
        /// HTTP method filter
        method: Option<String>,
        /// Alias bound by `.as()`
        alias: Option<String>,
    },
    /// Custom command conversion
    Custom {
        /// First command name
        command: String,
        /// Strategy applied
        strategy: CustomStrategy,
    },
}

/// Metadata attached to every conversion unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitMetadata {
    /// Final complexity (may exceed the extractor's estimate)
    pub complexity: Complexity,
    /// Whether a human must review the output
    pub requires_manual_review: bool,
    /// Import lines the rewritten text depends on
    pub required_imports: Vec<String>,
    /// Kind-specific fields
    pub detail: UnitDetail,
}

impl UnitMetadata {
    /// Metadata with no imports and no review flag
    #[inline]
    #[must_use]
    pub fn new(complexity: Complexity, detail: UnitDetail) -> Self {
        Self {
            complexity,
            requires_manual_review: false,
            required_imports: Vec::new(),
            detail,
        }
    }

    /// Set the manual-review flag
    #[inline]
    #[must_use]
    pub fn with_manual_review(mut self, review: bool) -> Self {
        self.requires_manual_review = review;
        self
    }

    /// Add required import lines, skipping duplicates
    #[must_use]
    pub fn with_imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for import in imports {
            let import = import.into();
            if !self.required_imports.contains(&import) {
                self.required_imports.push(import);
            }
        }
        self
    }
}

/// Result of converting one pattern
///
/// Built once by a transformer and never mutated after aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionUnit {
    original_pattern: Pattern,
    rewritten_text: String,
    is_structurally_valid: bool,
    conversion_succeeded: bool,
    notes: Vec<String>,
    metadata: UnitMetadata,
}

impl ConversionUnit {
    fn build(
        pattern: Pattern,
        rewritten: String,
        succeeded: bool,
        metadata: UnitMetadata,
    ) -> Self {
        Self {
            is_structurally_valid: is_structurally_valid(&rewritten),
            original_pattern: pattern,
            rewritten_text: rewritten,
            conversion_succeeded: succeeded,
            notes: Vec::new(),
            metadata,
        }
    }

    /// Successful conversion
    #[must_use]
    pub fn converted(pattern: Pattern, rewritten: impl Into<String>, metadata: UnitMetadata) -> Self {
        Self::build(pattern, rewritten.into(), true, metadata)
    }

    /// Failed conversion; always flagged for manual review
    #[must_use]
    pub fn failed(pattern: Pattern, rewritten: impl Into<String>, metadata: UnitMetadata) -> Self {
        Self::build(pattern, rewritten.into(), false, metadata.with_manual_review(true))
    }

    /// Append a note
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Append several notes
    #[must_use]
    pub fn with_notes<I, S>(mut self, notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.notes.extend(notes.into_iter().map(Into::into));
        self
    }

    /// The pattern this unit converts
    #[inline]
    #[must_use]
    pub fn original_pattern(&self) -> &Pattern {
        &self.original_pattern
    }

    /// Replacement text
    #[inline]
    #[must_use]
    pub fn rewritten_text(&self) -> &str {
        &self.rewritten_text
    }

    /// Balanced delimiters and no malformed markers in the replacement
    #[inline]
    #[must_use]
    pub fn is_structurally_valid(&self) -> bool {
        self.is_structurally_valid
    }

    /// Whether the transformer produced a real conversion
    #[inline]
    #[must_use]
    pub fn conversion_succeeded(&self) -> bool {
        self.conversion_succeeded
    }

    /// Explanatory notes
    #[inline]
    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Metadata
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &UnitMetadata {
        &self.metadata
    }

    /// Shortcut for `metadata().requires_manual_review`
    #[inline]
    #[must_use]
    pub fn requires_manual_review(&self) -> bool {
        self.metadata.requires_manual_review
    }
}
