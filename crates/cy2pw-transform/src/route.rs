//! Route-handler builder
//!
//! Turns the response argument of an interception (StaticResponse object,
//! bare body, fixture reference or request handler) into the statements of
//! a `page.route` handler whose parameter is `route`.

use cy2pw_pattern::chain::anchors;
use cy2pw_pattern::scan::{
    find_matching_close, is_comment_only, object_entries, quote, replace_identifier,
    split_statements, split_top_level, split_trailing_comment, terminate, unquote, RegionMap,
};
use cy2pw_pattern::InterceptShape;

use crate::accessor::{rewrite_paths, Member};
use crate::callback::Callback;
use crate::context::Context;
use crate::snippet::{indent_block, manual_review_block};
use crate::statement::map_blocks;

const STATIC_KEYS: &[&str] = &[
    "statusCode",
    "body",
    "headers",
    "fixture",
    "delay",
    "delayMs",
    "forceNetworkError",
    "throttleKbps",
];

/// Statements of a route handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteBody {
    /// Handler statements
    pub lines: Vec<String>,
    /// Response shape
    pub shape: InterceptShape,
}

impl RouteBody {
    fn new(lines: Vec<String>, shape: InterceptShape) -> Self {
        Self { lines, shape }
    }
}

/// Build the handler for an interception's response argument
pub fn route_body(response: Option<&str>, ctx: &mut Context<'_>) -> RouteBody {
    let Some(response) = response.map(str::trim).filter(|r| !r.is_empty()) else {
        return RouteBody::new(vec!["await route.continue();".into()], InterceptShape::PassThrough);
    };
    if let Some(callback) = Callback::parse(response) {
        return handler(&callback, ctx);
    }
    response_body(response, ctx)
}

/// Build a fulfilment for a static response (no handler)
fn response_body(response: &str, ctx: &mut Context<'_>) -> RouteBody {
    if let Some(name) = unquote(response).and_then(|r| r.strip_prefix("fixture:")) {
        let mut options = Vec::new();
        let comment = fixture_option(&quote(name), &mut options, ctx);
        return RouteBody::new(vec![comment, fulfill(&options)], InterceptShape::Fixture);
    }
    if let Some(entries) = object_entries(response) {
        if entries.iter().any(|(k, _)| STATIC_KEYS.contains(&k.as_str())) {
            return static_response(&entries, ctx);
        }
    }
    let mut options = vec!["status: 200".to_string()];
    if !response.starts_with('{') && !response.starts_with('[') && unquote(response).is_none() {
        ctx.report.note(format!("response body `{response}` assumed to be JSON"));
    }
    body_options(response, &mut options);
    RouteBody::new(vec![fulfill(&options)], InterceptShape::InlineObject)
}

fn static_response(entries: &[(String, String)], ctx: &mut Context<'_>) -> RouteBody {
    let mut options = Vec::new();
    let mut lines = Vec::new();
    let mut shape = InterceptShape::InlineObject;
    for (key, value) in entries {
        match key.as_str() {
            "statusCode" => options.push(format!("status: {value}")),
            "body" => body_options(value, &mut options),
            "headers" => options.push(format!("headers: {value}")),
            "fixture" => {
                lines.push(fixture_option(value, &mut options, ctx));
                shape = InterceptShape::Fixture;
            }
            "delay" | "delayMs" => {
                lines.push(format!("await new Promise((resolve) => setTimeout(resolve, {value}));"));
            }
            "forceNetworkError" if value == "true" => {
                lines.push("await route.abort();".into());
                return RouteBody::new(lines, shape);
            }
            "forceNetworkError" => {}
            "throttleKbps" => ctx.report.note("`throttleKbps` has no route equivalent and was dropped"),
            "..." => {
                options.push(format!("...{value}"));
                ctx.report.review(format!("spread `...{value}` copied into the fulfilment as-is"));
            }
            other => ctx.report.note(format!("static response key `{other}` dropped")),
        }
    }
    lines.push(fulfill(&options));
    RouteBody::new(lines, shape)
}

/// `body` option; structured values are serialized as JSON
fn body_options(value: &str, options: &mut Vec<String>) {
    if unquote(value).is_some() {
        options.push(format!("body: {value}"));
    } else {
        options.push("contentType: 'application/json'".into());
        options.push(format!("body: JSON.stringify({value})"));
    }
}

/// Push the `path` option for a fixture; returns the comment to emit
fn fixture_option(name: &str, options: &mut Vec<String>, ctx: &mut Context<'_>) -> String {
    let path = match unquote(name) {
        Some(file) => quote(&ctx.options().fixture_path(file)),
        None => format!("`{}/${{{name}}}`", ctx.options().fixtures_dir),
    };
    options.push(format!("path: {path}"));
    ctx.report.review(format!("fixture {name} served from {path}; the file is not checked"));
    "// TODO(manual): verify fixture path".to_string()
}

/// `await route.fulfill({ … });`
fn fulfill(options: &[String]) -> String {
    if options.is_empty() {
        return "await route.fulfill({ status: 200 });".into();
    }
    let body: Vec<String> = options.iter().map(|o| format!("{o},")).collect();
    format!("await route.fulfill({{\n{}\n}});", indent_block(&body.join("\n"), "  "))
}

fn handler(callback: &Callback, ctx: &mut Context<'_>) -> RouteBody {
    if callback.params.len() > 1 {
        let reason = "request handler with more than one parameter";
        ctx.report.unconverted(reason);
        return RouteBody::new(vec![manual_review_block(reason, &callback.body)], InterceptShape::Unknown);
    }
    let request = callback.param().filter(|p| !p.starts_with('{'));
    let mut settles = false;
    let mut lines = Vec::new();
    for statement in callback.statements() {
        lines.extend(handler_statement(&statement, request, &mut settles, false, ctx));
    }
    if !settles {
        lines.push("await route.continue();".into());
    }
    RouteBody::new(lines, InterceptShape::Handler)
}

/// Inner text of `callee(…)` when `code` is exactly that call
fn call_args<'t>(code: &'t str, callee: &str) -> Option<&'t str> {
    let rest = code.strip_prefix(callee)?.trim_start();
    if !rest.starts_with('(') || find_matching_close(rest, 0)? != rest.len() - 1 {
        return None;
    }
    Some(rest[1..rest.len() - 1].trim())
}

/// `settles` is set when the statement answers the request at handler
/// level; answers inside a block return from the handler instead
fn handler_statement(
    statement: &str,
    request: Option<&str>,
    settles: &mut bool,
    nested: bool,
    ctx: &mut Context<'_>,
) -> Vec<String> {
    let statement = statement.trim();
    if statement.is_empty() {
        return Vec::new();
    }
    if is_comment_only(statement) {
        return vec![statement.to_string()];
    }
    let (code, comment) = split_trailing_comment(statement);
    let code = code.trim_end_matches(';').trim_end();
    let mut lines = handler_code(code, request, settles, nested, ctx);
    if let (Some(comment), Some(last)) = (comment, lines.last_mut()) {
        last.push(' ');
        last.push_str(comment);
    }
    lines
}

fn handler_code(
    code: &str,
    request: Option<&str>,
    settles: &mut bool,
    nested: bool,
    ctx: &mut Context<'_>,
) -> Vec<String> {
    if let Some(req) = request {
        let (returned, call) = match code.strip_prefix("return ") {
            Some(rest) => (true, rest.trim()),
            None => (false, code),
        };
        let mut answered = false;
        if let Some(mut lines) = request_call(call, req, &mut answered, ctx) {
            if returned || (nested && answered) {
                lines.push("return;".into());
            }
            if !nested && answered {
                *settles = true;
            }
            return lines;
        }
        if code.starts_with(&format!("{req}.alias")) {
            ctx.report.note("request alias assignment dropped; alias the route instead");
            return Vec::new();
        }
    }

    let mut branch = false;
    let mapped = map_blocks(code, &mut |body| {
        Some(
            split_statements(body)
                .iter()
                .flat_map(|s| handler_statement(s, request, &mut branch, true, ctx))
                .collect(),
        )
    });
    let Some(req) = request else {
        return vec![terminate(&mapped)];
    };
    let rewritten = rewrite_paths(&mapped, req, request_accessor);
    let leftover = replace_identifier(&rewritten, req, "route.request()");
    if leftover != rewritten {
        ctx.report.review(format!("`{req}` used outside a known accessor; mapped to `route.request()`"));
    }
    if !anchors(&leftover, &RegionMap::new(&leftover)).is_empty() {
        ctx.report.unconverted("command inside a request handler");
        return vec![manual_review_block("command inside a request handler", code)];
    }
    vec![terminate(&leftover)]
}

/// `req.reply(…)` and friends as full statements
fn request_call(call: &str, req: &str, settles: &mut bool, ctx: &mut Context<'_>) -> Option<Vec<String>> {
    if let Some(args) = call_args(call, &format!("{req}.reply")) {
        *settles = true;
        return Some(reply(args, ctx));
    }
    if let Some(args) = call_args(call, &format!("{req}.continue")) {
        *settles = true;
        if args.is_empty() {
            return Some(vec!["await route.continue();".into()]);
        }
        let reason = "response modification in `continue` callback";
        ctx.report.unconverted(reason);
        return Some(vec![manual_review_block(reason, call)]);
    }
    if call_args(call, &format!("{req}.destroy")).is_some() {
        *settles = true;
        return Some(vec!["await route.abort();".into()]);
    }
    if let Some(args) = call_args(call, &format!("{req}.redirect")) {
        *settles = true;
        let parts = split_top_level(args, b',');
        let status = parts.get(1).map_or("302", |s| s.trim());
        let location = parts.first().map_or("''", |s| s.trim());
        return Some(vec![format!(
            "await route.fulfill({{ status: {status}, headers: {{ location: {location} }} }});"
        )]);
    }
    if call.starts_with(&format!("{req}.on(")) {
        let reason = "request event listener";
        ctx.report.unconverted(reason);
        return Some(vec![manual_review_block(reason, call)]);
    }
    None
}

/// `req.reply(body)`, `req.reply(status, body, headers)` or `req.reply({ … })`
fn reply(args: &str, ctx: &mut Context<'_>) -> Vec<String> {
    let parts = split_top_level(args, b',');
    match parts.as_slice() {
        [] => vec![fulfill(&[])],
        [response] => response_body(response, ctx).lines,
        [status, rest @ ..] => {
            let mut options = vec![format!("status: {}", status.trim())];
            if let Some(body) = rest.first() {
                body_options(body.trim(), &mut options);
            }
            if let Some(headers) = rest.get(1) {
                options.push(format!("headers: {}", headers.trim()));
            }
            vec![fulfill(&options)]
        }
    }
}

/// Request properties on the route's request
fn request_accessor(members: &[Member<'_>]) -> Option<(usize, String)> {
    let member = members.first().filter(|m| m.args.is_none())?;
    let replacement = match member.name {
        "body" => "route.request().postDataJSON()",
        "headers" => "route.request().headers()",
        "url" => "route.request().url()",
        "method" => "route.request().method()",
        "query" => "Object.fromEntries(new URL(route.request().url()).searchParams)",
        _ => return None,
    };
    Some((1, replacement.to_string()))
}
