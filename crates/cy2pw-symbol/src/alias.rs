//! Alias Symbol Table
//!
//! Built by a bind pass over the whole original file before anything is
//! rewritten, so a wait may reference an interception declared earlier or
//! later in the file.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use cy2pw_pattern::chain::{anchors, parse_at, CommandChain};
use cy2pw_pattern::scan::{is_regex_literal, line_number, object_entries, unquote, RegionMap};

/// HTTP methods recognised as a leading intercept argument
pub const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

/// URL matcher of an interception
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UrlPattern {
    /// String literal URL or path
    Literal {
        /// Literal content
        value: String,
    },
    /// Regular expression literal
    Regex {
        /// Pattern between the slashes
        source: String,
        /// Trailing flags
        flags: String,
    },
    /// Any other expression (variable, template literal, call)
    Expression {
        /// Expression text
        text: String,
    },
}

impl UrlPattern {
    /// Classify an intercept URL argument
    #[must_use]
    pub fn from_argument(arg: &str) -> Self {
        let arg = arg.trim();
        if let Some(value) = unquote(arg) {
            return Self::Literal {
                value: value.to_string(),
            };
        }
        if is_regex_literal(arg) {
            if let Some(last) = arg.rfind('/') {
                return Self::Regex {
                    source: arg[1..last].to_string(),
                    flags: arg[last + 1..].to_string(),
                };
            }
        }
        Self::Expression {
            text: arg.to_string(),
        }
    }

    /// Source form of the matcher (`'/api'`, `/re/i`, `expr`)
    #[must_use]
    pub fn to_source(&self) -> String {
        match self {
            Self::Literal { value } => cy2pw_pattern::scan::quote(value),
            Self::Regex { source, flags } => format!("/{source}/{flags}"),
            Self::Expression { text } => text.clone(),
        }
    }

    /// Whether this is a regex matcher
    #[inline]
    #[must_use]
    pub fn is_regex(&self) -> bool {
        matches!(self, Self::Regex { .. })
    }
}

/// One `alias → url` binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasBinding {
    /// Alias name without `@`
    pub alias: String,
    /// URL matcher
    pub url: UrlPattern,
    /// HTTP method filter
    pub method: Option<String>,
    /// 1-based line of the declaration
    pub line: usize,
}

/// An alias declared more than once; the later declaration wins
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rebind {
    /// Alias name
    pub alias: String,
    /// Line of the replaced declaration
    pub previous_line: usize,
    /// Line of the winning declaration
    pub line: usize,
}

/// Decomposed `cy.intercept(...)` arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptSignature {
    /// Method filter, from a leading method argument or a route matcher
    pub method: Option<String>,
    /// URL matcher
    pub url: UrlPattern,
    /// Response argument (StaticResponse, body, fixture string or handler)
    pub response: Option<String>,
}

impl InterceptSignature {
    /// Parse the first segment of an intercept chain
    #[must_use]
    pub fn parse(chain: &CommandChain) -> Option<Self> {
        if chain.command() != "intercept" {
            return None;
        }
        let args = chain.first().arguments();
        let (first, rest) = args.split_first()?;

        let leading_method = unquote(first)
            .filter(|m| rest.first().is_some() && HTTP_METHODS.contains(&m.to_ascii_uppercase().as_str()))
            .map(str::to_ascii_uppercase);

        if let Some(method) = leading_method {
            return Some(Self {
                method: Some(method),
                url: UrlPattern::from_argument(rest[0]),
                response: rest.get(1).map(|r| (*r).to_string()),
            });
        }

        if first.trim_start().starts_with('{') {
            let entries = object_entries(first)?;
            let lookup = |key: &str| {
                entries
                    .iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.as_str())
            };
            let url = lookup("url").or_else(|| lookup("pathname")).or_else(|| lookup("path"))?;
            return Some(Self {
                method: lookup("method")
                    .and_then(unquote)
                    .map(str::to_ascii_uppercase),
                url: UrlPattern::from_argument(url),
                response: rest.first().map(|r| (*r).to_string()),
            });
        }

        Some(Self {
            method: None,
            url: UrlPattern::from_argument(first),
            response: rest.first().map(|r| (*r).to_string()),
        })
    }
}

/// Per-file `alias → binding` table
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasTable {
    bindings: IndexMap<String, AliasBinding>,
    rebinds: Vec<Rebind>,
}

impl AliasTable {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind pass: every `cy.intercept(...).as('name')` in `source`
    ///
    /// Intercepts nested inside callbacks and hooks are included.
    #[must_use]
    pub fn scan(source: &str) -> Self {
        let regions = RegionMap::new(source);
        let mut table = Self::new();
        for pos in anchors(source, &regions) {
            let Some(chain) = parse_at(source, &regions, pos) else {
                continue;
            };
            let (Some(alias), Some(signature)) = (chain.alias(), InterceptSignature::parse(&chain))
            else {
                continue;
            };
            table.bind(AliasBinding {
                alias,
                url: signature.url,
                method: signature.method,
                line: line_number(source, pos),
            });
        }
        debug!(aliases = table.len(), rebinds = table.rebinds.len(), "alias bind pass complete");
        table
    }

    /// Insert a binding; returns the binding it replaced
    pub fn bind(&mut self, binding: AliasBinding) -> Option<AliasBinding> {
        let previous = self.bindings.insert(binding.alias.clone(), binding.clone());
        if let Some(previous) = &previous {
            debug!(alias = %binding.alias, previous_line = previous.line, line = binding.line, "alias rebound");
            self.rebinds.push(Rebind {
                alias: binding.alias.clone(),
                previous_line: previous.line,
                line: binding.line,
            });
        }
        previous
    }

    /// Look up an alias; a leading `@` is ignored
    #[must_use]
    pub fn resolve(&self, alias: &str) -> Option<&AliasBinding> {
        self.bindings.get(alias.trim_start_matches('@'))
    }

    /// Whether the alias is bound
    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.resolve(alias).is_some()
    }

    /// Bindings in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &AliasBinding> {
        self.bindings.values()
    }

    /// Aliases declared more than once
    #[inline]
    #[must_use]
    pub fn rebinds(&self) -> &[Rebind] {
        &self.rebinds
    }

    /// Number of bound aliases
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no alias is bound
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
