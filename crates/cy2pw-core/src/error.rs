//! Error types for the orchestrator
//!
//! `convert` itself never fails; these errors cover configuration and file
//! IO at the crate boundary and the parser used for syntax diagnostics.

use std::path::PathBuf;

use cy2pw_transform::TransformError;

/// Orchestrator error
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Reading or writing a file failed
    #[error("io error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Substituting converted text failed
    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),

    /// The TypeScript grammar could not be loaded
    #[error("syntax parser unavailable: {0}")]
    Parser(String),

    /// A conversion pass panicked
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// Create io error for `path`
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Internal error from a caught panic payload
    #[must_use]
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "conversion panicked".to_string()
        };
        Self::Internal(message)
    }
}

/// Result alias for orchestrator operations
pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_message_names_the_file() {
        let err = ConvertError::io(
            "specs/login.cy.ts",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.to_string(), "io error on specs/login.cy.ts: missing");
    }

    #[test]
    fn panic_payloads_become_internal_errors() {
        let payload = std::panic::catch_unwind(|| -> u8 { panic!("index {} out of range", 3) }).unwrap_err();
        let err = ConvertError::from_panic(payload.as_ref());
        assert_eq!(err.to_string(), "internal error: index 3 out of range");

        let payload = std::panic::catch_unwind(|| -> u8 { std::panic::panic_any(7u8) }).unwrap_err();
        assert_eq!(
            ConvertError::from_panic(payload.as_ref()).to_string(),
            "internal error: conversion panicked"
        );
    }

    #[test]
    fn transform_errors_convert() {
        let err: ConvertError = TransformError::StalePattern { line: 3 }.into();
        assert!(err.to_string().starts_with("transform failed: stale pattern at line 3"));
    }
}
