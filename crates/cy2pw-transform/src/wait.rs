//! Wait and interception transformer
//!
//! Alias waits resolve through the file's alias table, so the predicate
//! matches the URL (and method) the interception declared, wherever in the
//! file that declaration sits.

use tracing::{debug, warn};

use cy2pw_pattern::chain::{CommandChain, Segment};
use cy2pw_pattern::scan::{
    is_ident_byte, is_identifier, object_entries, quote, replace_identifier, split_top_level, unquote,
};
use cy2pw_pattern::{
    Complexity, ConversionUnit, DataAccessor, InterceptShape, Pattern, PatternKind, UnitDetail, UnitMetadata,
    WaitType,
};
use cy2pw_symbol::{AliasBinding, FileScope, UrlPattern};

use crate::accessor::{rewrite_paths, Member};
use crate::assertion::{rewrite_should, Subject};
use crate::callback::Callback;
use crate::context::Context;
use crate::intercept::{convert_intercept, InterceptConversion};
use crate::options::TransformOptions;
use crate::snippet::{indent_block, join, manual_review_block};
use crate::statement::convert_statement;

/// Converted wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitConversion {
    /// Output statements
    pub lines: Vec<String>,
    /// Classified wait
    pub wait_type: WaitType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Aliases(Vec<String>),
    Time(String),
    Unknown,
}

fn classify_target(arg: &str) -> Target {
    let arg = arg.trim();
    if let Some(literal) = unquote(arg) {
        return match literal.strip_prefix('@') {
            Some(alias) if !alias.is_empty() => Target::Aliases(vec![alias.to_string()]),
            _ => Target::Unknown,
        };
    }
    if let Some(inner) = arg.strip_prefix('[').and_then(|a| a.strip_suffix(']')) {
        let aliases: Option<Vec<String>> = split_top_level(inner, b',')
            .into_iter()
            .map(|item| {
                unquote(item)
                    .and_then(|i| i.strip_prefix('@'))
                    .filter(|a| !a.is_empty())
                    .map(str::to_string)
            })
            .collect();
        return match aliases {
            Some(aliases) if !aliases.is_empty() => Target::Aliases(aliases),
            _ => Target::Unknown,
        };
    }
    if is_numeric(arg) {
        return Target::Time(arg.to_string());
    }
    Target::Unknown
}

/// Numeric literal or arithmetic over numeric literals
fn is_numeric(text: &str) -> bool {
    text.bytes().any(|b| b.is_ascii_digit())
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || b"_.+-*/() ".contains(&b))
}

fn timeout_option(args: &[&str]) -> Option<String> {
    let entries = object_entries(args.get(1)?)?;
    entries
        .into_iter()
        .find(|(k, _)| matches!(k.as_str(), "timeout" | "responseTimeout" | "requestTimeout"))
        .map(|(_, v)| v)
}

/// Longest glob-free piece of a literal URL, used as a substring match
fn url_fragment(value: &str) -> &str {
    value
        .split('*')
        .max_by_key(|piece| piece.len())
        .unwrap_or(value)
}

/// `(response) => …` predicate for an alias
fn response_predicate(alias: &str, binding: Option<&AliasBinding>) -> String {
    let Some(binding) = binding else {
        return format!("(response) => response.url().includes({})", quote(alias));
    };
    let url_test = match &binding.url {
        UrlPattern::Literal { value } => {
            format!("response.url().includes({})", quote(url_fragment(value)))
        }
        UrlPattern::Regex { source, flags } => format!("/{source}/{flags}.test(response.url())"),
        UrlPattern::Expression { text } => format!("response.url().includes({text})"),
    };
    match &binding.method {
        Some(method) => format!(
            "(response) => {url_test} && response.request().method() === {}",
            quote(method)
        ),
        None => format!("(response) => {url_test}"),
    }
}

/// Identifier fragment for an alias (`get-users` → `getUsers`)
fn alias_ident(alias: &str) -> String {
    let mut out = String::new();
    let mut upper = false;
    for c in alias.chars() {
        if c.is_ascii() && is_ident_byte(c as u8) && c != '$' {
            if upper {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
            upper = false;
        } else {
            upper = !out.is_empty();
        }
    }
    if out.is_empty() {
        "alias".to_string()
    } else {
        out
    }
}

/// One awaited interception and the data extracted from it
#[derive(Debug)]
struct Interception {
    ident: String,
    response: String,
    body: Option<String>,
    request_body: Option<String>,
    extractions: Vec<String>,
}

impl Interception {
    fn new(alias: &str, ctx: &mut Context<'_>) -> Self {
        let ident = alias_ident(alias);
        Self {
            response: ctx.allocate(&format!("{ident}Response")),
            ident,
            body: None,
            request_body: None,
            extractions: Vec::new(),
        }
    }

    fn body(&mut self, ctx: &mut Context<'_>) -> String {
        if let Some(body) = &self.body {
            return body.clone();
        }
        let body = ctx.allocate(&format!("{}Body", self.ident));
        self.extractions
            .push(format!("const {body} = await {}.json();", self.response));
        self.body = Some(body.clone());
        body
    }

    fn request_body(&mut self, ctx: &mut Context<'_>) -> String {
        if let Some(body) = &self.request_body {
            return body.clone();
        }
        let body = ctx.allocate(&format!("{}RequestBody", self.ident));
        self.extractions
            .push(format!("const {body} = {}.request().postDataJSON();", self.response));
        self.request_body = Some(body.clone());
        body
    }
}

/// Where a member path starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root {
    /// The interception object (`interception.response.body`)
    Interception,
    /// A destructured `response`
    Response,
    /// A destructured `request`
    Request,
}

/// Rewrite an interception member path; returns members consumed and the
/// replacement
fn interception_path(
    ic: &mut Interception,
    root: Root,
    members: &[Member<'_>],
    ctx: &mut Context<'_>,
) -> Option<(usize, String)> {
    let (side, offset) = match root {
        Root::Interception => {
            let first = members.first().filter(|m| m.args.is_none())?;
            (first.name, 1)
        }
        Root::Response => ("response", 0),
        Root::Request => ("request", 0),
    };
    let field = members.get(offset).filter(|m| m.args.is_none()).map(|m| m.name);
    let response = ic.response.clone();
    let mapped = match (side, field) {
        ("response", Some("statusCode")) => Some((DataAccessor::ResponseStatus, format!("{response}.status()"))),
        ("response", Some("statusMessage")) => {
            Some((DataAccessor::ResponseStatus, format!("{response}.statusText()")))
        }
        ("response", Some("body")) => Some((DataAccessor::ResponseBody, ic.body(ctx))),
        ("response", Some("headers")) => Some((DataAccessor::ResponseHeaders, format!("{response}.headers()"))),
        ("request", Some("url")) => Some((DataAccessor::RequestUrl, format!("{response}.request().url()"))),
        ("request", Some("body")) => Some((DataAccessor::RequestBody, ic.request_body(ctx))),
        ("request", Some("headers")) => {
            Some((DataAccessor::RequestHeaders, format!("{response}.request().headers()")))
        }
        ("request", Some("method")) => {
            Some((DataAccessor::RequestMethod, format!("{response}.request().method()")))
        }
        _ => None,
    };
    match (mapped, side) {
        (Some((accessor, replacement)), _) => {
            ctx.report.access(accessor);
            Some((offset + 1, replacement))
        }
        (None, "response") => Some((offset, response)),
        (None, "request") => Some((offset, format!("{response}.request()"))),
        (None, _) => None,
    }
}

/// `.a.b` tail of a property path
fn property_tail(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| {
            if is_identifier(p) {
                format!(".{p}")
            } else {
                format!("[{}]", quote(p))
            }
        })
        .collect()
}

/// Convert a wait chain in the current context
pub fn convert_wait(chain: &CommandChain, text: &str, ctx: &mut Context<'_>) -> WaitConversion {
    let args = chain.first().arguments();
    let tail = &chain.segments()[1..];
    let target = args.first().map_or(Target::Unknown, |a| classify_target(a));
    let timeout = timeout_option(&args);
    let page = ctx.page().to_string();

    let converted = match target {
        Target::Time(ms) => {
            ctx.report.raise(Complexity::Low);
            time_wait(&page, &ms, tail, ctx).map(|lines| (lines, WaitType::Time))
        }
        Target::Aliases(aliases) => {
            ctx.report.raise(Complexity::Medium);
            ctx.report.note(
                "register the response wait before the action that triggers the request when it fires early",
            );
            let wait_type = if aliases.len() > 1 {
                WaitType::MultiAlias
            } else {
                WaitType::Alias
            };
            alias_wait(&page, &aliases, timeout.as_deref(), tail, ctx).map(|lines| (lines, wait_type))
        }
        Target::Unknown => None,
    };

    match converted {
        Some((lines, wait_type)) => {
            if !ctx.report.data_access.is_empty() {
                ctx.report.raise(Complexity::High);
                ctx.report.review("request/response data extracted from a wait");
            }
            WaitConversion { lines, wait_type }
        }
        None => {
            ctx.report.unconverted("wait could not be classified");
            WaitConversion {
                lines: vec![manual_review_block("wait could not be classified", text)],
                wait_type: WaitType::Unknown,
            }
        }
    }
}

fn time_wait(page: &str, ms: &str, tail: &[Segment], ctx: &mut Context<'_>) -> Option<Vec<String>> {
    let mut lines = vec![format!("await {page}.waitForTimeout({ms});")];
    match tail {
        [] => {}
        [then] if then.name == "then" => {
            let callback = Callback::parse(&then.args).filter(|c| c.params.is_empty())?;
            for statement in callback.statements() {
                lines.extend(convert_statement(&statement, ctx));
            }
        }
        _ => return None,
    }
    Some(lines)
}

fn alias_wait(
    page: &str,
    aliases: &[String],
    timeout: Option<&str>,
    tail: &[Segment],
    ctx: &mut Context<'_>,
) -> Option<Vec<String>> {
    let options = timeout.map(|t| format!(", {{ timeout: {t} }}")).unwrap_or_default();
    let mut waits = Vec::new();
    let mut unresolved = Vec::new();
    for alias in aliases {
        let binding = ctx.aliases().resolve(alias).cloned();
        ctx.report.alias(alias, binding.is_some());
        if binding.is_none() {
            warn!(alias = %alias, "unresolved alias");
            ctx.report.review(format!("alias `@{alias}` is not declared in this file"));
            unresolved.push(format!("// unresolved alias: @{alias}"));
        }
        let predicate = response_predicate(alias, binding.as_ref());
        waits.push(format!("{page}.waitForResponse({predicate}{options})"));
    }

    let single = aliases.len() == 1;
    let awaited = if single {
        format!("await {}", waits[0])
    } else {
        format!(
            "await Promise.all([\n{},\n])",
            indent_block(&waits.join(",\n"), "  ")
        )
    };

    if tail.is_empty() {
        let mut lines = Vec::new();
        if single {
            let comment = unresolved.first().map(|c| format!(" {c}")).unwrap_or_default();
            lines.push(format!("{awaited};{comment}"));
        } else {
            lines.extend(unresolved);
            lines.push(format!("{awaited};"));
        }
        return Some(lines);
    }

    let mut interceptions: Vec<Interception> = aliases.iter().map(|a| Interception::new(a, ctx)).collect();
    let declaration = if single {
        format!("const {} = {awaited};", interceptions[0].response)
    } else {
        let names: Vec<&str> = interceptions.iter().map(|ic| ic.response.as_str()).collect();
        format!("const [{}] = {awaited};", names.join(", "))
    };

    let body = match tail {
        [then] if then.name == "then" => {
            let callback = Callback::parse(&then.args)?;
            wait_callback(&callback, &mut interceptions, ctx)?
        }
        [its, assertions @ ..] if its.name == "its" && single => {
            its_assertions(its, assertions, &mut interceptions[0], ctx)?
        }
        _ => return None,
    };

    let mut lines = unresolved;
    lines.push(declaration);
    for ic in &mut interceptions {
        lines.append(&mut ic.extractions);
    }
    lines.extend(body);
    Some(lines)
}

/// Body of a callback chained on an alias wait
fn wait_callback(
    callback: &Callback,
    interceptions: &mut [Interception],
    ctx: &mut Context<'_>,
) -> Option<Vec<String>> {
    let receivers: Vec<(String, usize, Root)> = match callback.param() {
        None => Vec::new(),
        Some(param) if param.starts_with('{') => {
            if interceptions.len() != 1 {
                return None;
            }
            let entries = object_entries(param)?;
            let mut receivers = Vec::new();
            for (key, local) in entries {
                match key.as_str() {
                    "response" => receivers.push((local, 0, Root::Response)),
                    "request" => receivers.push((local, 0, Root::Request)),
                    _ => return None,
                }
            }
            receivers
        }
        Some(param) if interceptions.len() == 1 => vec![(param.to_string(), 0, Root::Interception)],
        Some(param) => (0..interceptions.len())
            .map(|i| (format!("{param}[{i}]"), i, Root::Interception))
            .collect(),
    };

    let mut lines = Vec::new();
    for statement in callback.statements() {
        let mut rewritten = statement;
        for (receiver, idx, root) in &receivers {
            let ic = &mut interceptions[*idx];
            rewritten = rewrite_paths(&rewritten, receiver, |members| interception_path(ic, *root, members, ctx));
        }
        if let (Some(param), [ic]) = (callback.param(), &*interceptions) {
            if !param.starts_with('{') {
                let replaced = replace_identifier(&rewritten, param, &ic.response);
                if replaced != rewritten {
                    ctx.report.review(format!("`{param}` used whole; bound to the response object"));
                    rewritten = replaced;
                }
            }
        }
        lines.extend(convert_statement(&rewritten, ctx));
    }
    Some(lines)
}

/// `.its('response.statusCode').should(…)` on an alias wait
fn its_assertions(
    its: &Segment,
    assertions: &[Segment],
    ic: &mut Interception,
    ctx: &mut Context<'_>,
) -> Option<Vec<String>> {
    let path = unquote(its.argument(0)?)?;
    let parts: Vec<&str> = path.split('.').collect();
    let members: Vec<Member<'_>> = parts.iter().map(|name| Member { name, args: None }).collect();
    let (consumed, head) = interception_path(ic, Root::Interception, &members, ctx)?;
    let subject = Subject::Value(format!("{head}{}", property_tail(&parts[consumed..])));

    let mut lines = Vec::new();
    for segment in assertions {
        if !matches!(segment.name.as_str(), "should" | "and") {
            return None;
        }
        lines.push(rewrite_should(&subject, &segment.arguments())?);
    }
    Some(lines)
}

/// Transformer for wait and interception patterns
#[derive(Debug, Clone, Default)]
pub struct WaitInterceptTransformer {
    options: TransformOptions,
}

impl WaitInterceptTransformer {
    /// Create transformer
    #[inline]
    #[must_use]
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }

    /// Options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Convert one wait or interception pattern
    #[must_use]
    pub fn transform(&self, pattern: &Pattern, scope: &mut FileScope) -> ConversionUnit {
        let chain = pattern.chain();
        let mut ctx = Context::new(&self.options, scope);
        ctx.report.raise(pattern.complexity());

        let (text, detail, succeeded) = match (pattern.kind(), chain) {
            (PatternKind::Wait, Some(chain)) => {
                let WaitConversion { lines, wait_type } = convert_wait(&chain, pattern.raw_text(), &mut ctx);
                let report = &ctx.report;
                let detail = UnitDetail::Wait {
                    wait_type,
                    aliases: report.aliases.clone(),
                    resolved: report.resolved.clone(),
                    unresolved: report.unresolved.clone(),
                    data_access: report.data_access.clone(),
                };
                (join(&lines), detail, wait_type != WaitType::Unknown)
            }
            (PatternKind::Intercept, Some(chain)) => {
                let InterceptConversion {
                    lines,
                    shape,
                    url,
                    method,
                    alias,
                } = convert_intercept(&chain, pattern.raw_text(), &mut ctx);
                let succeeded = shape != InterceptShape::Unknown;
                (join(&lines), UnitDetail::Intercept { shape, url, method, alias }, succeeded)
            }
            (kind, _) => {
                let detail = UnitDetail::Wait {
                    wait_type: WaitType::Unknown,
                    aliases: Vec::new(),
                    resolved: Vec::new(),
                    unresolved: Vec::new(),
                    data_access: Vec::new(),
                };
                let reason = format!("`{kind}` pattern is not a wait or interception");
                let unit = ConversionUnit::failed(
                    pattern.clone(),
                    manual_review_block(&reason, pattern.raw_text()),
                    UnitMetadata::new(pattern.complexity(), detail),
                );
                return unit.with_note(reason);
            }
        };

        let report = ctx.report;
        debug!(line = pattern.line(), kind = %pattern.kind(), succeeded, "converted network pattern");
        let review = report.manual_review || report.complexity == Complexity::High;
        let metadata = UnitMetadata::new(report.complexity, detail)
            .with_manual_review(review)
            .with_imports(report.imports);
        let unit = if succeeded {
            ConversionUnit::converted(pattern.clone(), text, metadata)
        } else {
            ConversionUnit::failed(pattern.clone(), text, metadata)
        };
        unit.with_notes(report.notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cy2pw_pattern::{extract, Family};
    use pretty_assertions::assert_eq;

    fn transform_all(source: &str) -> Vec<ConversionUnit> {
        let mut scope = FileScope::new(source);
        let transformer = WaitInterceptTransformer::default();
        extract(source, Family::WaitIntercept)
            .iter()
            .map(|p| transformer.transform(p, &mut scope))
            .collect()
    }

    #[test]
    fn time_wait() {
        let units = transform_all("cy.wait(500);");
        assert_eq!(units[0].rewritten_text(), "await page.waitForTimeout(500);");
        assert_eq!(units[0].metadata().complexity, Complexity::Low);
    }

    #[test]
    fn alias_wait_resolves_backward_reference() {
        let units = transform_all("cy.wait('@getUsers');\ncy.intercept('GET', '/api/users').as('getUsers');");
        assert_eq!(
            units[0].rewritten_text(),
            "await page.waitForResponse((response) => response.url().includes('/api/users') && response.request().method() === 'GET');"
        );
        assert!(units[0].conversion_succeeded());
        assert!(units[0].notes().iter().any(|n| n.contains("before the action")));
    }

    #[test]
    fn unresolved_alias_still_converts() {
        let units = transform_all("cy.wait('@missing');");
        let unit = &units[0];
        assert_eq!(
            unit.rewritten_text(),
            "await page.waitForResponse((response) => response.url().includes('missing')); // unresolved alias: @missing"
        );
        assert!(unit.conversion_succeeded());
        assert!(unit.requires_manual_review());
        assert!(unit.is_structurally_valid());
    }

    #[test]
    fn interception_callback_reads_status() {
        let source = "cy.intercept('GET', '/api/users', { statusCode: 200, body: { ok: true } }).as('getUsers');\ncy.wait('@getUsers').then((interception) => {\n  expect(interception.response.statusCode).to.equal(200);\n});";
        let units = transform_all(source);
        assert_eq!(
            units[1].rewritten_text(),
            "const getUsersResponse = await page.waitForResponse((response) => response.url().includes('/api/users') && response.request().method() === 'GET');\nawait expect(getUsersResponse.status()).toBe(200);"
        );
        match &units[1].metadata().detail {
            UnitDetail::Wait { wait_type, data_access, resolved, .. } => {
                assert_eq!(*wait_type, WaitType::Alias);
                assert_eq!(data_access, &vec![DataAccessor::ResponseStatus]);
                assert_eq!(resolved, &vec!["getUsers".to_string()]);
            }
            other => panic!("unexpected detail {other:?}"),
        }
        assert_eq!(units[1].metadata().complexity, Complexity::High);
    }

    #[test]
    fn body_extraction_happens_once() {
        let source = "cy.intercept('POST', '/api/login').as('login');\ncy.wait('@login').then(({ request, response }) => {\n  expect(request.body.user).to.eq('ada');\n  expect(response.body.token).to.exist;\n  expect(response.body.id).to.eq(1);\n});";
        let units = transform_all(source);
        assert_eq!(
            units[1].rewritten_text(),
            [
                "const loginResponse = await page.waitForResponse((response) => response.url().includes('/api/login') && response.request().method() === 'POST');",
                "const loginRequestBody = loginResponse.request().postDataJSON();",
                "const loginBody = await loginResponse.json();",
                "await expect(loginRequestBody.user).toBe('ada');",
                "await expect(loginBody.token).toBeDefined();",
                "await expect(loginBody.id).toBe(1);",
            ]
            .join("\n")
        );
    }

    #[test]
    fn multi_alias_wait() {
        let source = "cy.intercept('/api/a').as('a');\ncy.intercept(/\\/api\\/b/).as('b');\ncy.wait(['@a', '@b'], { timeout: 10000 });";
        let units = transform_all(source);
        assert_eq!(
            units[2].rewritten_text(),
            "await Promise.all([\n  page.waitForResponse((response) => response.url().includes('/api/a'), { timeout: 10000 }),\n  page.waitForResponse((response) => /\\/api\\/b/.test(response.url()), { timeout: 10000 }),\n]);"
        );
    }

    #[test]
    fn its_assertion_on_alias() {
        let source = "cy.intercept('/api/save').as('save');\ncy.wait('@save').its('response.statusCode').should('eq', 201);";
        let units = transform_all(source);
        assert_eq!(
            units[1].rewritten_text(),
            "const saveResponse = await page.waitForResponse((response) => response.url().includes('/api/save'));\nawait expect(saveResponse.status()).toBe(201);"
        );
    }

    #[test]
    fn glob_urls_match_longest_fragment() {
        let source = "cy.intercept('**/api/items/*').as('items');\ncy.wait('@items');";
        let units = transform_all(source);
        assert!(units[1].rewritten_text().contains("includes('/api/items/')"));
    }

    #[test]
    fn unknown_wait_is_preserved() {
        let units = transform_all("cy.wait(delay);");
        assert!(!units[0].conversion_succeeded());
        assert!(units[0].rewritten_text().contains("cy.wait(delay);"));
    }

    #[test]
    fn alias_identifiers() {
        assert_eq!(alias_ident("get-users"), "getUsers");
        assert_eq!(alias_ident("save_item"), "save_item");
        assert_eq!(alias_ident("--"), "alias");
    }
}
