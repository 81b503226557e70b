//! Converter configuration
//!
//! Loaded from TOML; every field has a default so partial files work.
//!
//! ```toml
//! base_import = "import { test, expect } from '@playwright/test';"
//! rewrite_structure = true
//! syntax_check = false
//!
//! [transform]
//! page = "page"
//! fixtures_dir = "cypress/fixtures"
//!
//! [transform.page_objects]
//! login = "loginPage.login"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use cy2pw_transform::TransformOptions;

use crate::error::{ConvertError, ConvertResult};

/// Import every converted file needs
pub const DEFAULT_BASE_IMPORT: &str = "import { test, expect } from '@playwright/test';";

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Import injected when missing
    pub base_import: String,
    /// Rewrite `describe`/`it`/hooks into `test.*`
    pub rewrite_structure: bool,
    /// Parse the output with tree-sitter and report errors
    pub syntax_check: bool,
    /// Options handed to the transformers
    pub transform: TransformOptions,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            base_import: DEFAULT_BASE_IMPORT.to_string(),
            rewrite_structure: true,
            syntax_check: true,
            transform: TransformOptions::default(),
        }
    }
}

impl ConvertConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Config`] when the text is not valid TOML for
    /// this structure.
    pub fn from_toml_str(text: &str) -> ConvertResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Io`] when the file cannot be read and
    /// [`ConvertError::Config`] when it does not parse.
    pub fn load(path: impl AsRef<Path>) -> ConvertResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// With base import line
    #[inline]
    #[must_use]
    pub fn with_base_import(mut self, line: impl Into<String>) -> Self {
        self.base_import = line.into();
        self
    }

    /// With test-structure rewriting on or off
    #[inline]
    #[must_use]
    pub fn with_structure_rewrite(mut self, enabled: bool) -> Self {
        self.rewrite_structure = enabled;
        self
    }

    /// With syntax diagnostics on or off
    #[inline]
    #[must_use]
    pub fn with_syntax_check(mut self, enabled: bool) -> Self {
        self.syntax_check = enabled;
        self
    }

    /// With transformer options
    #[inline]
    #[must_use]
    pub fn with_transform(mut self, options: TransformOptions) -> Self {
        self.transform = options;
        self
    }
}
