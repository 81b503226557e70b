//! Conversion context threaded through one pattern's rewrite

use std::collections::HashSet;

use cy2pw_pattern::{Complexity, DataAccessor};
use cy2pw_symbol::{AliasTable, FileScope};

use crate::options::TransformOptions;

/// Everything learned while rewriting one pattern
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Notes for the unit
    pub notes: Vec<String>,
    /// Import lines the output depends on
    pub imports: Vec<String>,
    /// Whether a human must review the output
    pub manual_review: bool,
    /// Pieces preserved in manual-review comments
    pub unconverted: usize,
    /// Highest complexity reached
    pub complexity: Complexity,
    /// Aliases waited on
    pub aliases: Vec<String>,
    /// Aliases resolved through the alias table
    pub resolved: Vec<String>,
    /// Aliases missing from the alias table
    pub unresolved: Vec<String>,
    /// Request/response data read in wait callbacks
    pub data_access: Vec<DataAccessor>,
}

impl Report {
    /// Add a note once
    pub fn note(&mut self, note: impl Into<String>) {
        let note = note.into();
        if !self.notes.contains(&note) {
            self.notes.push(note);
        }
    }

    /// Require an import line once
    pub fn import(&mut self, line: impl Into<String>) {
        let line = line.into();
        if !self.imports.contains(&line) {
            self.imports.push(line);
        }
    }

    /// Raise complexity to at least `complexity`
    pub fn raise(&mut self, complexity: Complexity) {
        self.complexity = self.complexity.max(complexity);
    }

    /// Flag for manual review
    pub fn review(&mut self, note: impl Into<String>) {
        self.manual_review = true;
        self.note(note);
    }

    /// Record a piece left unconverted
    pub fn unconverted(&mut self, note: impl Into<String>) {
        self.unconverted += 1;
        self.review(note);
    }

    /// Record a data accessor once
    pub fn access(&mut self, accessor: DataAccessor) {
        if !self.data_access.contains(&accessor) {
            self.data_access.push(accessor);
            self.data_access.sort();
        }
    }

    fn push_unique(list: &mut Vec<String>, alias: &str) {
        if !list.iter().any(|a| a == alias) {
            list.push(alias.to_string());
        }
    }

    /// Record an alias lookup outcome
    pub fn alias(&mut self, alias: &str, resolved: bool) {
        Self::push_unique(&mut self.aliases, alias);
        if resolved {
            Self::push_unique(&mut self.resolved, alias);
        } else {
            Self::push_unique(&mut self.unresolved, alias);
        }
    }
}

/// Mutable state for rewriting one pattern
///
/// Borrows the file's [`FileScope`]; dropped once the unit is built.
#[derive(Debug)]
pub struct Context<'a> {
    options: &'a TransformOptions,
    scope: &'a mut FileScope,
    root: String,
    locators: HashSet<String>,
    responses: HashSet<String>,
    flatten: bool,
    blocks: usize,
    /// Accumulated findings
    pub report: Report,
}

impl<'a> Context<'a> {
    /// Create a context rooted at the page
    #[must_use]
    pub fn new(options: &'a TransformOptions, scope: &'a mut FileScope) -> Self {
        Self {
            root: options.page.clone(),
            options,
            scope,
            locators: HashSet::new(),
            responses: HashSet::new(),
            flatten: false,
            blocks: 0,
            report: Report::default(),
        }
    }

    /// Options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &TransformOptions {
        self.options
    }

    /// Page identifier
    #[inline]
    #[must_use]
    pub fn page(&self) -> &str {
        &self.options.page
    }

    /// Receiver for root queries (`page`, or a `within` binding)
    #[inline]
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// The file's alias table
    #[inline]
    #[must_use]
    pub fn aliases(&self) -> &AliasTable {
        self.scope.aliases()
    }

    /// Allocate a binding name unique in the file
    pub fn allocate(&mut self, base: &str) -> String {
        self.scope.allocate(base)
    }

    /// Record `name` as a locator binding
    pub fn mark_locator(&mut self, name: &str) {
        self.locators.insert(name.to_string());
    }

    /// Whether `name` is a locator binding
    #[must_use]
    pub fn is_locator(&self, name: &str) -> bool {
        self.locators.contains(name)
    }

    /// Record `name` as an API response binding
    pub fn mark_response(&mut self, name: &str) {
        self.responses.insert(name.to_string());
    }

    /// Whether `name` is an API response binding
    #[must_use]
    pub fn is_response(&self, name: &str) -> bool {
        self.responses.contains(name)
    }

    /// Locator bindings
    pub fn locators(&self) -> impl Iterator<Item = &str> {
        self.locators.iter().map(String::as_str)
    }

    /// API response bindings
    pub fn responses(&self) -> impl Iterator<Item = &str> {
        self.responses.iter().map(String::as_str)
    }

    /// Number nested callback blocks with `// block N` comments
    pub fn set_flatten(&mut self, flatten: bool) {
        self.flatten = flatten;
    }

    /// Whether callback blocks are being numbered
    #[inline]
    #[must_use]
    pub fn flattening(&self) -> bool {
        self.flatten
    }

    /// Number of the next callback block, when flattening
    pub fn open_block(&mut self) -> Option<usize> {
        if !self.flatten {
            return None;
        }
        self.blocks += 1;
        Some(self.blocks)
    }

    /// Run `f` with root queries scoped to `root`
    pub fn with_root<T>(&mut self, root: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = std::mem::replace(&mut self.root, root.to_string());
        let out = f(self);
        self.root = previous;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_deduplicates() {
        let mut report = Report::default();
        report.note("a");
        report.note("a");
        report.import("x");
        report.import("x");
        report.alias("u", false);
        report.alias("u", false);
        report.access(DataAccessor::ResponseBody);
        report.access(DataAccessor::ResponseStatus);
        report.access(DataAccessor::ResponseBody);
        assert_eq!(report.notes.len(), 1);
        assert_eq!(report.imports.len(), 1);
        assert_eq!(report.unresolved, vec!["u"]);
        assert_eq!(
            report.data_access,
            vec![DataAccessor::ResponseStatus, DataAccessor::ResponseBody]
        );
    }

    #[test]
    fn root_is_restored() {
        let options = TransformOptions::default();
        let mut scope = FileScope::default();
        let mut ctx = Context::new(&options, &mut scope);
        let inner = ctx.with_root("form", |ctx| ctx.root().to_string());
        assert_eq!(inner, "form");
        assert_eq!(ctx.root(), "page");
    }

    #[test]
    fn blocks_number_only_when_flattening() {
        let options = TransformOptions::default();
        let mut scope = FileScope::default();
        let mut ctx = Context::new(&options, &mut scope);
        assert_eq!(ctx.open_block(), None);
        ctx.set_flatten(true);
        assert_eq!(ctx.open_block(), Some(1));
        assert_eq!(ctx.open_block(), Some(2));
    }

    #[test]
    fn complexity_only_rises() {
        let mut report = Report::default();
        report.raise(Complexity::High);
        report.raise(Complexity::Low);
        assert_eq!(report.complexity, Complexity::High);
    }
}
