//! Error types for the transformers
//!
//! Transformers degrade unsupported input to manual-review output instead of
//! failing. These errors cover substituting converted text back into a
//! working buffer, where a failure means the file cannot be trusted.

use std::ops::Range;

/// Internal transformer failure
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Two replacements claim overlapping bytes
    #[error("overlapping replacement spans {first:?} and {second:?}")]
    OverlappingSpans {
        /// Earlier span
        first: Range<usize>,
        /// Later span
        second: Range<usize>,
    },

    /// A span does not fit the buffer
    #[error("span {span:?} out of range for buffer of {len} bytes")]
    SpanOutOfRange {
        /// Offending span
        span: Range<usize>,
        /// Buffer length
        len: usize,
    },

    /// A pattern's raw text no longer matches the buffer
    #[error("stale pattern at line {line}: buffer text differs from extracted text")]
    StalePattern {
        /// Line of the pattern
        line: usize,
    },
}

impl TransformError {
    /// Create span-out-of-range error
    #[must_use]
    pub fn out_of_range(span: Range<usize>, len: usize) -> Self {
        Self::SpanOutOfRange { span, len }
    }

    /// Create overlapping-spans error
    #[must_use]
    pub fn overlapping(first: Range<usize>, second: Range<usize>) -> Self {
        Self::OverlappingSpans { first, second }
    }
}

/// Result alias for transformer operations
pub type TransformResult<T> = Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = TransformError::out_of_range(4..10, 6);
        assert_eq!(err.to_string(), "span 4..10 out of range for buffer of 6 bytes");
        let err = TransformError::overlapping(0..5, 3..8);
        assert_eq!(err.to_string(), "overlapping replacement spans 0..5 and 3..8");
    }
}
