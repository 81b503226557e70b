//! Transformer options

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Options shared by every transformer
///
/// Immutable once a converter is built; the same options are shared by every
/// file and thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TransformOptions {
    /// Identifier of the Playwright page fixture
    pub page: String,
    /// Binding shared by chained callbacks
    pub chained_binding: String,
    /// Directory fixture files are resolved against
    pub fixtures_dir: String,
    /// `command → object.method` delegation for custom commands
    pub page_objects: IndexMap<String, String>,
    /// Convert unknown commands to helper calls instead of manual review
    pub utility_fallback: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            page: "page".to_string(),
            chained_binding: "result".to_string(),
            fixtures_dir: "cypress/fixtures".to_string(),
            page_objects: IndexMap::new(),
            utility_fallback: true,
        }
    }
}

impl TransformOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page identifier
    #[inline]
    #[must_use]
    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = page.into();
        self
    }

    /// Set the chained-callback binding
    #[inline]
    #[must_use]
    pub fn with_chained_binding(mut self, name: impl Into<String>) -> Self {
        self.chained_binding = name.into();
        self
    }

    /// Set the fixtures directory
    #[inline]
    #[must_use]
    pub fn with_fixtures_dir(mut self, dir: impl Into<String>) -> Self {
        self.fixtures_dir = dir.into();
        self
    }

    /// Delegate `command` to `target` (`object.method`)
    #[must_use]
    pub fn with_page_object(mut self, command: impl Into<String>, target: impl Into<String>) -> Self {
        self.page_objects.insert(command.into(), target.into());
        self
    }

    /// Enable or disable the helper-function fallback
    #[inline]
    #[must_use]
    pub fn with_utility_fallback(mut self, enabled: bool) -> Self {
        self.utility_fallback = enabled;
        self
    }

    /// Fixture path for a fixture name
    #[must_use]
    pub fn fixture_path(&self, name: &str) -> String {
        let dir = self.fixtures_dir.trim_end_matches('/');
        if dir.is_empty() {
            name.to_string()
        } else {
            format!("{dir}/{name}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = TransformOptions::default();
        assert_eq!(options.page, "page");
        assert_eq!(options.chained_binding, "result");
        assert_eq!(options.fixture_path("users.json"), "cypress/fixtures/users.json");
    }

    #[test]
    fn deserializes_partial_toml() {
        let options: TransformOptions = toml::from_str(
            "fixtures_dir = \"tests/fixtures/\"\n[page_objects]\nlogin = \"loginPage.login\"\n",
        )
        .unwrap();
        assert_eq!(options.page, "page");
        assert_eq!(options.fixture_path("a.json"), "tests/fixtures/a.json");
        assert_eq!(options.page_objects["login"], "loginPage.login");
    }
}
