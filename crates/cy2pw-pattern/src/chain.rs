//! `cy.name(args).name(args)…` command chains

use std::ops::Range;

use crate::scan::{is_ident_byte, matching_close, split_top_level, RegionMap};

/// Receiver identifier that anchors a command chain
pub const ANCHOR: &str = "cy";

/// One `.name(args)` call of a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Command or method name
    pub name: String,
    /// Text between the parentheses, trimmed
    pub args: String,
    /// Byte range of `name(args)` in the parsed text
    pub span: Range<usize>,
}

impl Segment {
    /// Top-level arguments
    #[must_use]
    pub fn arguments(&self) -> Vec<&str> {
        split_top_level(&self.args, b',')
    }

    /// Argument at `idx`
    #[must_use]
    pub fn argument(&self, idx: usize) -> Option<&str> {
        self.arguments().get(idx).copied()
    }
}

/// A parsed command chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandChain {
    segments: Vec<Segment>,
    span: Range<usize>,
}

impl CommandChain {
    /// Parse `text` as exactly one chain (leading/trailing whitespace allowed)
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let start = text.len() - text.trim_start().len();
        let regions = RegionMap::new(text);
        let chain = parse_at(text, &regions, start)?;
        text[chain.span.end..].trim().is_empty().then_some(chain)
    }

    /// Call segments in order; the first is the `cy` command
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// First command segment
    #[must_use]
    pub fn first(&self) -> &Segment {
        &self.segments[0]
    }

    /// First command name (`get` for `cy.get(...)`)
    #[must_use]
    pub fn command(&self) -> &str {
        &self.segments[0].name
    }

    /// Byte range of the chain in the parsed text
    #[inline]
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Whether any segment is named `name`
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.segments.iter().any(|s| s.name == name)
    }

    /// Index of the first `.then()` segment
    #[must_use]
    pub fn first_then(&self) -> Option<usize> {
        self.segments.iter().position(|s| s.name == "then")
    }

    /// Number of `.then()` segments
    #[must_use]
    pub fn then_count(&self) -> usize {
        self.segments.iter().filter(|s| s.name == "then").count()
    }

    /// Alias bound by a trailing `.as('name')`
    #[must_use]
    pub fn alias(&self) -> Option<String> {
        self.segments
            .iter()
            .skip(1)
            .find(|s| s.name == "as")
            .and_then(|s| crate::scan::unquote(&s.args).map(str::to_string))
    }
}

/// Parse the chain anchored at `pos` (which must start `cy`)
///
/// Returns `None` when the anchor is not a standalone `cy` identifier in code
/// followed by `.name(`, or when a call's parentheses never balance.
#[must_use]
pub fn parse_at(text: &str, regions: &RegionMap, pos: usize) -> Option<CommandChain> {
    if !is_anchor(text, regions, pos) {
        return None;
    }
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut cursor = pos + ANCHOR.len();
    let mut end = cursor;

    loop {
        let dot = skip_whitespace(bytes, cursor);
        if bytes.get(dot) != Some(&b'.') || !regions.is_code(dot) {
            break;
        }
        let name_start = skip_whitespace(bytes, dot + 1);
        let mut name_end = name_start;
        while name_end < bytes.len() && is_ident_byte(bytes[name_end]) {
            name_end += 1;
        }
        if name_end == name_start {
            break;
        }
        let open = skip_whitespace(bytes, name_end);
        if bytes.get(open) != Some(&b'(') {
            break;
        }
        let close = matching_close(text, regions, open)?;
        segments.push(Segment {
            name: text[name_start..name_end].to_string(),
            args: text[open + 1..close].trim().to_string(),
            span: name_start..close + 1,
        });
        cursor = close + 1;
        end = cursor;
    }

    if segments.is_empty() {
        return None;
    }
    Some(CommandChain {
        segments,
        span: pos..end,
    })
}

/// Whether `pos` starts a standalone `cy` receiver in code
#[must_use]
pub fn is_anchor(text: &str, regions: &RegionMap, pos: usize) -> bool {
    let bytes = text.as_bytes();
    if !text[pos..].starts_with(ANCHOR) || !regions.is_code(pos) {
        return false;
    }
    if pos > 0 {
        let prev = bytes[pos - 1];
        if is_ident_byte(prev) || prev == b'.' {
            return false;
        }
    }
    let after = pos + ANCHOR.len();
    if bytes.get(after).copied().is_some_and(is_ident_byte) {
        return false;
    }
    bytes.get(skip_whitespace(bytes, after)) == Some(&b'.')
}

/// Positions of every chain anchor in `text`
#[must_use]
pub fn anchors(text: &str, regions: &RegionMap) -> Vec<usize> {
    text.match_indices(ANCHOR)
        .map(|(pos, _)| pos)
        .filter(|&pos| is_anchor(text, regions, pos))
        .collect()
}

fn skip_whitespace(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx += 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_multiline_chain() {
        let chain = CommandChain::parse("cy.get('#a')\n  .find('li')\n  .then(($li) => { x(); })").unwrap();
        let names: Vec<_> = chain.segments().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["get", "find", "then"]);
        assert_eq!(chain.first().args, "'#a'");
        assert_eq!(chain.first_then(), Some(2));
    }

    #[test]
    fn rejects_member_access_and_longer_identifiers() {
        let text = "foo.cy.get('a'); cypress.get('b'); mycy.get('c')";
        let regions = RegionMap::new(text);
        assert!(anchors(text, &regions).is_empty());
    }

    #[test]
    fn ignores_anchors_in_literals_and_comments() {
        let text = "'cy.get(1)' // cy.get(2)\n/* cy.get(3) */ cy.get(4)";
        let regions = RegionMap::new(text);
        let found = anchors(text, &regions);
        assert_eq!(found.len(), 1);
        assert_eq!(&text[found[0]..], "cy.get(4)");
    }

    #[test]
    fn unbalanced_chain_yields_none() {
        let text = "cy.get('a').then(($a) => { expect($a)";
        let regions = RegionMap::new(text);
        assert!(parse_at(text, &regions, 0).is_none());
    }

    #[test]
    fn trailing_property_ends_chain() {
        let text = "cy.get('a').its('length').should";
        let regions = RegionMap::new(text);
        let chain = parse_at(text, &regions, 0).unwrap();
        assert_eq!(chain.segments().len(), 2);
        assert!(CommandChain::parse(text).is_none());
    }

    #[test]
    fn alias_and_arguments() {
        let chain =
            CommandChain::parse("cy.intercept('GET', '/api/users', { statusCode: 200 }).as('getUsers')")
                .unwrap();
        assert_eq!(chain.alias().as_deref(), Some("getUsers"));
        assert_eq!(
            chain.first().arguments(),
            vec!["'GET'", "'/api/users'", "{ statusCode: 200 }"]
        );
    }
}
