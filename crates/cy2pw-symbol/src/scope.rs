//! Per-file conversion state

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::alias::AliasTable;

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:const|let|var|function)\s+([A-Za-z_$][A-Za-z0-9_$]*)")
        .expect("declaration regex is valid")
});

/// Hands out binding names unique within one file
#[derive(Debug, Clone, Default)]
pub struct NameAllocator {
    used: HashSet<String>,
}

impl NameAllocator {
    /// Create empty allocator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator that avoids every name the source already declares
    #[must_use]
    pub fn seeded(source: &str) -> Self {
        let mut allocator = Self::new();
        for capture in DECLARATION.captures_iter(source) {
            allocator.reserve(&capture[1]);
        }
        allocator
    }

    /// Mark a name as taken
    pub fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    /// Whether `name` is taken
    #[must_use]
    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// `base`, or `base2`, `base3`, … when taken
    pub fn allocate(&mut self, base: &str) -> String {
        let base = sanitize(base);
        let mut name = base.clone();
        let mut n = 2;
        while self.used.contains(&name) {
            name = format!("{base}{n}");
            n += 1;
        }
        self.used.insert(name.clone());
        name
    }
}

/// Identifier form of a binding base: `$el` → `el`, empty → `value`
fn sanitize(base: &str) -> String {
    let trimmed: String = base
        .trim_start_matches('$')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    match trimmed.chars().next() {
        None => "value".to_string(),
        Some(c) if c.is_ascii_digit() => format!("v{trimmed}"),
        Some(_) => trimmed,
    }
}

/// Everything one `convert` call knows about its file
///
/// Created per call and passed by `&mut` to transformers, so nothing leaks
/// between files.
#[derive(Debug, Clone, Default)]
pub struct FileScope {
    aliases: AliasTable,
    names: NameAllocator,
}

impl FileScope {
    /// Run the bind pass and seed the name allocator from `source`
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self {
            aliases: AliasTable::scan(source),
            names: NameAllocator::seeded(source),
        }
    }

    /// Scope with a prepared alias table and no reserved names
    #[must_use]
    pub fn with_aliases(aliases: AliasTable) -> Self {
        Self {
            aliases,
            names: NameAllocator::new(),
        }
    }

    /// Alias table
    #[inline]
    #[must_use]
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Name allocator
    #[inline]
    pub fn names(&mut self) -> &mut NameAllocator {
        &mut self.names
    }

    /// Shortcut for `names().allocate(base)`
    pub fn allocate(&mut self, base: &str) -> String {
        self.names.allocate(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_deduplicates() {
        let mut names = NameAllocator::new();
        assert_eq!(names.allocate("$el"), "el");
        assert_eq!(names.allocate("el"), "el2");
        assert_eq!(names.allocate("$el"), "el3");
        assert_eq!(names.allocate("$"), "value");
        assert_eq!(names.allocate("1x"), "v1x");
    }

    #[test]
    fn seeding_reserves_declarations() {
        let mut names = NameAllocator::seeded("const result = 1;\nlet el = 2;\nfunction login() {}");
        assert!(names.is_used("login"));
        assert_eq!(names.allocate("result"), "result2");
        assert_eq!(names.allocate("el"), "el2");
    }

    #[test]
    fn scopes_are_independent() {
        let mut a = FileScope::new("cy.intercept('/a').as('a');");
        let b = FileScope::new("cy.wait('@a');");
        assert!(a.aliases().contains("a"));
        assert!(!b.aliases().contains("a"));
        assert_eq!(a.allocate("x"), "x");
    }
}
