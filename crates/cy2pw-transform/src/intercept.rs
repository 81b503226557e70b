//! Interception declarations as route registrations

use tracing::warn;

use cy2pw_pattern::chain::CommandChain;
use cy2pw_pattern::scan::quote;
use cy2pw_pattern::{Complexity, InterceptShape};
use cy2pw_symbol::{InterceptSignature, UrlPattern};

use crate::context::Context;
use crate::route::route_body;
use crate::snippet::{indent_block, join, manual_review_block};

/// Converted interception
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptConversion {
    /// Output statements
    pub lines: Vec<String>,
    /// Response shape
    pub shape: InterceptShape,
    /// URL argument as written
    pub url: Option<String>,
    /// Method filter
    pub method: Option<String>,
    /// Alias from `.as(…)`
    pub alias: Option<String>,
}

/// `page.route` matcher for a URL pattern
///
/// Plain paths become globs (`/api/users` → `**/api/users`); regexes are
/// passed through.
#[must_use]
pub fn route_matcher(url: &UrlPattern) -> String {
    match url {
        UrlPattern::Literal { value } => {
            let glob = if value.starts_with("http") || value.starts_with('*') {
                value.clone()
            } else if value.starts_with('/') {
                format!("**{value}")
            } else {
                format!("**/{value}")
            };
            quote(&glob)
        }
        UrlPattern::Regex { .. } => url.to_source(),
        UrlPattern::Expression { text } => text.clone(),
    }
}

/// Convert an interception chain in the current context
pub fn convert_intercept(chain: &CommandChain, text: &str, ctx: &mut Context<'_>) -> InterceptConversion {
    let alias = chain.alias();
    let unknown = |reason: &str, ctx: &mut Context<'_>| {
        warn!(%reason, "interception left for manual review");
        ctx.report.unconverted(reason);
        InterceptConversion {
            lines: vec![manual_review_block(reason, text)],
            shape: InterceptShape::Unknown,
            url: None,
            method: None,
            alias: alias.clone(),
        }
    };

    let Some(signature) = InterceptSignature::parse(chain) else {
        return unknown("interception arguments not recognized", ctx);
    };
    if let Some(other) = chain.segments()[1..].iter().find(|s| s.name != "as") {
        return unknown(&format!("`{}` chained on an interception", other.name), ctx);
    }

    ctx.report.raise(Complexity::Medium);
    if let UrlPattern::Expression { text } = &signature.url {
        ctx.report.review(format!("URL `{text}` is computed; check it is a glob or regex"));
    }
    let route = route_body(signature.response.as_deref(), ctx);
    if route.shape == InterceptShape::Unknown {
        return InterceptConversion {
            lines: vec![manual_review_block("request handler not convertible", text)],
            shape: route.shape,
            url: Some(signature.url.to_source()),
            method: signature.method,
            alias,
        };
    }
    let shape = match route.shape {
        InterceptShape::InlineObject | InterceptShape::PassThrough if signature.url.is_regex() => {
            InterceptShape::RegexUrl
        }
        shape => shape,
    };

    let mut body = Vec::new();
    if let Some(method) = &signature.method {
        body.push(format!(
            "if (route.request().method() !== {}) return route.fallback();",
            quote(method)
        ));
    }
    body.extend(route.lines);
    let line = format!(
        "await {}.route({}, async (route) => {{\n{}\n}});",
        ctx.page(),
        route_matcher(&signature.url),
        indent_block(&join(&body), "  ")
    );

    InterceptConversion {
        lines: vec![line],
        shape,
        url: Some(signature.url.to_source()),
        method: signature.method,
        alias,
    }
}
