//! Callback parsing and shape classification

use cy2pw_pattern::chain::{anchors, parse_at};
use cy2pw_pattern::scan::{
    dedent, find_matching_close, find_top_level, is_ident_byte, split_statements, split_top_level,
    RegionMap,
};
use cy2pw_pattern::{CallbackShape, CommandChain};

/// A parsed arrow function or function expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback {
    /// Parameters with type annotations and defaults removed
    pub params: Vec<String>,
    /// Block contents (dedented) or expression body
    pub body: String,
    /// Whether the body is a `{ … }` block
    pub is_block: bool,
}

impl Callback {
    /// Parse `text` as one callback; `None` for references and other
    /// expressions
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut text = text.trim();
        if let Some(rest) = text.strip_prefix("async") {
            if rest.starts_with(|c: char| c.is_whitespace() || c == '(') {
                text = rest.trim_start();
            }
        }

        if let Some(rest) = text.strip_prefix("function") {
            let rest = rest.trim_start();
            let name_len = rest.bytes().take_while(|&b| is_ident_byte(b)).count();
            let rest = rest[name_len..].trim_start();
            if !rest.starts_with('(') {
                return None;
            }
            let close = find_matching_close(rest, 0)?;
            let params = parse_params(&rest[1..close]);
            let body = rest[close + 1..].trim();
            if !body.starts_with('{') || find_matching_close(body, 0)? != body.len() - 1 {
                return None;
            }
            return Some(Self {
                params,
                body: dedent(&body[1..body.len() - 1]),
                is_block: true,
            });
        }

        let (params, after) = if text.starts_with('(') {
            let close = find_matching_close(text, 0)?;
            (parse_params(&text[1..close]), &text[close + 1..])
        } else {
            let len = text.bytes().take_while(|&b| is_ident_byte(b)).count();
            if len == 0 {
                return None;
            }
            (vec![text[..len].to_string()], &text[len..])
        };

        let after = after.trim_start();
        let after = strip_return_annotation(after);
        let body = after.strip_prefix("=>")?.trim();
        if body.is_empty() {
            return None;
        }
        if body.starts_with('{') && find_matching_close(body, 0) == Some(body.len() - 1) {
            Some(Self {
                params,
                body: dedent(&body[1..body.len() - 1]),
                is_block: true,
            })
        } else {
            Some(Self {
                params,
                body: body.to_string(),
                is_block: false,
            })
        }
    }

    /// First parameter
    #[must_use]
    pub fn param(&self) -> Option<&str> {
        self.params.first().map(String::as_str)
    }

    /// Body statements
    #[must_use]
    pub fn statements(&self) -> Vec<String> {
        if self.is_block {
            split_statements(&self.body)
        } else {
            vec![self.body.clone()]
        }
    }

    /// Whether the body returns a value at its own level
    #[must_use]
    pub fn returns_value(&self) -> bool {
        if !self.is_block {
            return true;
        }
        self.statements().iter().any(|s| {
            s.strip_prefix("return")
                .is_some_and(|rest| !rest.trim().is_empty() && !rest.starts_with(|c: char| c.is_ascii_alphanumeric()))
        })
    }

    /// Whether the body issues any `cy` command
    #[must_use]
    pub fn issues_commands(&self) -> bool {
        let regions = RegionMap::new(&self.body);
        !anchors(&self.body, &regions).is_empty()
    }

    /// Whether the body attaches another callback to a command chain
    #[must_use]
    pub fn has_nested_callback(&self) -> bool {
        let regions = RegionMap::new(&self.body);
        anchors(&self.body, &regions)
            .into_iter()
            .filter_map(|pos| parse_at(&self.body, &regions, pos))
            .any(|chain| chain.has("then"))
    }
}

/// `(a: string)` → `a`; destructuring patterns are kept whole
fn parse_params(text: &str) -> Vec<String> {
    split_top_level(text, b',')
        .into_iter()
        .map(|p| {
            if p.starts_with('{') || p.starts_with('[') {
                return find_matching_close(p, 0).map_or(p, |close| &p[..=close]).to_string();
            }
            let p = find_top_level(p, b'=').map_or(p, |eq| &p[..eq]);
            find_top_level(p, b':').map_or(p, |colon| &p[..colon]).trim().to_string()
        })
        .filter(|p| !p.is_empty())
        .collect()
}

/// Skip a TypeScript return type annotation before `=>`
fn strip_return_annotation(text: &str) -> &str {
    match text.strip_prefix(':') {
        Some(rest) => rest.find("=>").map_or(text, |arrow| &rest[arrow..]),
        None => text,
    }
}

/// Classify a callback chain, evaluating shape predicates in priority order
#[must_use]
pub fn classify_shape(chain: &CommandChain) -> CallbackShape {
    let Some(first_then) = chain.first_then() else {
        return CallbackShape::Unrecognized;
    };
    let tail = &chain.segments()[first_then..];
    if first_then == 0 || tail.iter().any(|s| s.name != "then") {
        return CallbackShape::Unrecognized;
    }
    let callbacks: Option<Vec<Callback>> = tail.iter().map(|s| Callback::parse(&s.args)).collect();
    let Some(callbacks) = callbacks else {
        return CallbackShape::Unrecognized;
    };
    if callbacks.iter().any(|c| c.params.len() > 1) {
        return CallbackShape::Unrecognized;
    }

    let single = callbacks.len() == 1;
    let nested = callbacks.iter().any(Callback::has_nested_callback);
    let commands = callbacks.iter().any(Callback::issues_commands);

    let predicates: [(CallbackShape, bool); 4] = [
        (CallbackShape::Simple, single && !commands),
        (CallbackShape::MultiStep, single && commands && !nested),
        (CallbackShape::Nested, nested),
        (CallbackShape::Chained, !single),
    ];
    predicates
        .into_iter()
        .find(|(_, matches)| *matches)
        .map_or(CallbackShape::Unrecognized, |(shape, _)| shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shape(text: &str) -> CallbackShape {
        classify_shape(&CommandChain::parse(text).unwrap())
    }

    #[test]
    fn parses_arrow_forms() {
        let cb = Callback::parse("($el) => {\n    expect($el).to.be.visible;\n  }").unwrap();
        assert_eq!(cb.params, vec!["$el"]);
        assert!(cb.is_block);
        assert_eq!(cb.body, "expect($el).to.be.visible;");

        let cb = Callback::parse("el => el.click()").unwrap();
        assert_eq!(cb.param(), Some("el"));
        assert!(!cb.is_block);

        let cb = Callback::parse("async ({ request, response }: Interception) => {}").unwrap();
        assert_eq!(cb.params, vec!["{ request, response }"]);
    }

    #[test]
    fn parses_function_expressions() {
        let cb = Callback::parse("function (res) { return res.body; }").unwrap();
        assert_eq!(cb.params, vec!["res"]);
        assert!(cb.returns_value());
        let cb = Callback::parse("function named($a: JQuery) {\n  log($a);\n}").unwrap();
        assert_eq!(cb.params, vec!["$a"]);
        assert!(!cb.returns_value());
    }

    #[test]
    fn rejects_references() {
        assert!(Callback::parse("handleResponse").is_none());
        assert!(Callback::parse("this.check.bind(this)").is_none());
    }

    #[test]
    fn shapes_in_priority_order() {
        assert_eq!(
            shape("cy.get('#submit').then(($el) => { expect($el).to.be.visible; })"),
            CallbackShape::Simple
        );
        assert_eq!(
            shape("cy.get('form').then(($f) => {\n  cy.get('input').type('x');\n  expect($f).to.exist;\n})"),
            CallbackShape::MultiStep
        );
        assert_eq!(
            shape("cy.get('ul').then(($ul) => {\n  cy.get('li').then(($li) => { expect($li).to.exist; });\n})"),
            CallbackShape::Nested
        );
        assert_eq!(
            shape("cy.get('a').then(($a) => { x($a); }).then(($b) => { y($b); })"),
            CallbackShape::Chained
        );
        assert_eq!(shape("cy.get('a').then(handle)"), CallbackShape::Unrecognized);
        assert_eq!(
            shape("cy.get('a').then(($a) => {}).should('exist')"),
            CallbackShape::Unrecognized
        );
    }
}
