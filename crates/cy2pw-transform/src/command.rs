//! Command chain conversion
//!
//! A chain is converted left to right. Each command sees the subject the
//! previous one yielded (a locator, a derived value or an API response) and
//! either emits statements, yields a new subject, or both.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use cy2pw_pattern::chain::{CommandChain, Segment};
use cy2pw_pattern::scan::{is_identifier, object_entries, quote, unquote};
use cy2pw_pattern::{Complexity, CustomStrategy};
use cy2pw_symbol::HTTP_METHODS;

use crate::assertion::{rewrite_should, Subject};
use crate::callback::Callback;
use crate::context::Context;
use crate::snippet::{indent_block, join};
use crate::statement::convert_body;

static KEY_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-zA-Z]+)\}").expect("key token regex is valid"));

/// `type` special keys and their Playwright key names
const SPECIAL_KEYS: &[(&str, &str)] = &[
    ("enter", "Enter"),
    ("esc", "Escape"),
    ("tab", "Tab"),
    ("backspace", "Backspace"),
    ("del", "Delete"),
    ("selectall", "ControlOrMeta+A"),
    ("uparrow", "ArrowUp"),
    ("downarrow", "ArrowDown"),
    ("leftarrow", "ArrowLeft"),
    ("rightarrow", "ArrowRight"),
    ("home", "Home"),
    ("end", "End"),
    ("pageup", "PageUp"),
    ("pagedown", "PageDown"),
];

/// A command the converter cannot express
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsupported {
    /// Offending command
    pub command: String,
    /// Why it was not converted
    pub reason: String,
}

impl Unsupported {
    fn new(command: &str, reason: impl Into<String>) -> Self {
        Self {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`: {}", self.command, self.reason)
    }
}

/// Output of a converted chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    /// Statements in order
    pub statements: Vec<String>,
    /// Subject yielded by the last command
    pub subject: Option<Subject>,
    /// Strategy that produced the output
    pub strategy: CustomStrategy,
    settled: bool,
}

impl Default for Converted {
    fn default() -> Self {
        Self {
            statements: Vec::new(),
            subject: None,
            strategy: CustomStrategy::Direct,
            settled: true,
        }
    }
}

impl Converted {
    fn emit(&mut self, statement: impl Into<String>) {
        self.statements.push(statement.into());
        self.settled = true;
    }

    fn yields(&mut self, subject: Subject) {
        self.subject = Some(subject);
        self.settled = false;
    }

    fn locator(&self, command: &str) -> Result<String, Unsupported> {
        match &self.subject {
            Some(Subject::Locator(l)) => Ok(l.clone()),
            _ => Err(Unsupported::new(command, "needs an element subject")),
        }
    }

    /// Receiver for queries that search from the current element when there
    /// is one
    fn query_root(&self, ctx: &Context<'_>) -> String {
        match &self.subject {
            Some(Subject::Locator(l)) => l.clone(),
            _ => ctx.root().to_string(),
        }
    }

    fn refine(&mut self, command: &str, suffix: &str) -> Result<(), Unsupported> {
        let locator = self.locator(command)?;
        self.yields(Subject::Locator(format!("{locator}{suffix}")));
        Ok(())
    }

    fn act(&mut self, command: &str, call: &str) -> Result<(), Unsupported> {
        let locator = self.locator(command)?;
        self.emit(format!("await {locator}.{call};"));
        Ok(())
    }

    /// Flush a subject nothing consumed
    fn settle(&mut self) {
        if self.settled {
            return;
        }
        match self.subject.clone() {
            Some(Subject::Locator(l)) => self.emit(format!("await {l}.waitFor();")),
            Some(Subject::Response(r)) => self.emit(format!("{r};")),
            Some(other) => {
                let value = other.as_value_expression();
                if value.starts_with("await ") {
                    self.emit(format!("{value};"));
                }
            }
            None => {}
        }
        self.settled = true;
    }
}

/// Convert a whole chain used as a statement
///
/// A subject nothing consumed is flushed: a bare query becomes a `waitFor()`
/// and a request is still sent.
pub fn convert_chain(chain: &CommandChain, ctx: &mut Context<'_>) -> Result<Converted, Unsupported> {
    let mut converted = convert_segments(chain.segments(), ctx)?;
    converted.settle();
    Ok(converted)
}

/// Convert leading chain segments, leaving the final subject unconsumed
pub fn convert_segments(segments: &[Segment], ctx: &mut Context<'_>) -> Result<Converted, Unsupported> {
    let mut converted = Converted::default();
    for (idx, segment) in segments.iter().enumerate() {
        trace!(command = %segment.name, idx, "converting command");
        let has_more = idx + 1 < segments.len();
        step(&mut converted, segment, idx == 0, has_more, ctx)?;
    }
    Ok(converted)
}

fn step(
    out: &mut Converted,
    segment: &Segment,
    first: bool,
    has_more: bool,
    ctx: &mut Context<'_>,
) -> Result<(), Unsupported> {
    let name = segment.name.as_str();
    let args = segment.arguments();
    let page = ctx.page().to_string();

    match name {
        // queries
        "get" => {
            let selector = required(name, &args, 0)?;
            if unquote(selector).is_some_and(|s| s.starts_with('@')) {
                return Err(Unsupported::new(name, "element aliases have no locator equivalent"));
            }
            if args.len() > 1 {
                ctx.report.note("`get` options dropped; Playwright locators wait by default");
            }
            out.yields(Subject::Locator(format!("{}.locator({selector})", ctx.root())));
        }
        "contains" => {
            let receiver = out.query_root(ctx);
            let positional: Vec<&str> = args.iter().copied().filter(|a| !is_object(a)).collect();
            let locator = match positional.as_slice() {
                [text] => format!("{receiver}.getByText({text})"),
                [selector, text] => format!("{receiver}.locator({selector}, {{ hasText: {text} }})"),
                _ => return Err(Unsupported::new(name, "unexpected arguments")),
            };
            out.yields(Subject::Locator(locator));
        }
        "find" => {
            let selector = required(name, &args, 0)?;
            out.refine(name, &format!(".locator({selector})"))?;
        }
        "first" => out.refine(name, ".first()")?,
        "last" => out.refine(name, ".last()")?,
        "eq" => {
            let index = required(name, &args, 0)?;
            if index == "-1" {
                out.refine(name, ".last()")?;
            } else {
                out.refine(name, &format!(".nth({index})"))?;
            }
        }
        "parent" => out.refine(name, ".locator('..')")?,
        "children" => match args.first() {
            None => out.refine(name, ".locator(':scope > *')")?,
            Some(selector) => {
                let selector = unquote(selector)
                    .ok_or_else(|| Unsupported::new(name, "dynamic child selector"))?;
                out.refine(name, &format!(".locator({})", quote(&format!(":scope > {selector}"))))?;
            }
        },
        "next" if args.is_empty() => out.refine(name, ".locator('xpath=following-sibling::*[1]')")?,
        "prev" if args.is_empty() => out.refine(name, ".locator('xpath=preceding-sibling::*[1]')")?,
        "filter" => {
            let selector = required(name, &args, 0)?;
            if !is_literal(selector) {
                return Err(Unsupported::new(name, "filter callbacks need manual review"));
            }
            out.refine(name, &format!(".and({page}.locator({selector}))"))?;
        }
        "focused" => out.yields(Subject::Locator(format!("{page}.locator(':focus')"))),
        "root" => {
            let root = ctx.root().to_string();
            let locator = if root == page {
                format!("{page}.locator(':root')")
            } else {
                root
            };
            out.yields(Subject::Locator(locator));
        }

        // actions
        "click" => out.act(name, &click_call("click", &args, None, ctx))?,
        "dblclick" => out.act(name, &click_call("dblclick", &args, None, ctx))?,
        "rightclick" => out.act(name, &click_call("click", &args, Some("button: 'right'"), ctx))?,
        "type" => {
            let locator = out.locator(name)?;
            let text = required(name, &args, 0)?;
            for statement in type_statements(&locator, text)? {
                out.emit(statement);
            }
        }
        "clear" => out.act(name, "fill('')")?,
        "check" | "uncheck" => {
            if args.iter().any(|a| !is_object(a)) {
                return Err(Unsupported::new(name, "checking by value needs manual review"));
            }
            out.act(name, &format!("{name}()"))?;
        }
        "select" => {
            let values = required(name, &args, 0)?;
            out.act(name, &format!("selectOption({values})"))?;
        }
        "focus" | "blur" | "hover" => out.act(name, &format!("{name}()"))?,
        "scrollIntoView" => out.act(name, "scrollIntoViewIfNeeded()")?,
        "trigger" => {
            let event = required(name, &args, 0)?;
            match unquote(event) {
                Some("mouseover" | "mouseenter") => out.act(name, "hover()")?,
                _ => out.act(name, &format!("dispatchEvent({event})"))?,
            }
        }
        "submit" => out.act(name, "evaluate((form) => form.requestSubmit())")?,

        // assertions
        "should" | "and" => {
            let subject = out
                .subject
                .clone()
                .ok_or_else(|| Unsupported::new(name, "nothing to assert on"))?;
            if let Some(callback) = args.first().and_then(|a| Callback::parse(a)) {
                ctx.report.note("`should` callback runs once; Cypress retried it until it passed");
                for line in bind_and_convert(&callback, &subject, ctx)? {
                    out.emit(line);
                }
                out.settled = true;
            } else {
                let assertion = rewrite_should(&subject, &args)
                    .ok_or_else(|| Unsupported::new(name, "unsupported assertion"))?;
                out.emit(assertion);
            }
        }

        // values
        "invoke" => {
            let method = required(name, &args, 0)?;
            let method = unquote(method).ok_or_else(|| Unsupported::new(name, "dynamic method name"))?;
            let subject = match (out.subject.clone(), method) {
                (Some(Subject::Locator(l)), "text") => Subject::LocatorText(l),
                (Some(Subject::Locator(l)), "val") => Subject::LocatorValue(l),
                (Some(Subject::Locator(l)), "attr") => {
                    Subject::LocatorAttr(l, required(name, &args, 1)?.to_string())
                }
                (Some(Subject::Locator(l)), "html") => Subject::Value(format!("await {l}.innerHTML()")),
                (Some(Subject::Locator(l)), "prop") => {
                    let prop = required(name, &args, 1)?;
                    Subject::Value(format!("await {l}.evaluate((el) => el[{prop}])"))
                }
                (Some(Subject::Locator(_)), _) => {
                    return Err(Unsupported::new(name, "element method has no locator equivalent"));
                }
                (Some(other), method) => {
                    let call_args = args[1..].join(", ");
                    Subject::Value(format!("{}.{method}({call_args})", other.to_expression()))
                }
                (None, _) => return Err(Unsupported::new(name, "nothing to invoke on")),
            };
            out.yields(subject);
        }
        "its" => {
            let path = required(name, &args, 0)?;
            let path = unquote(path).ok_or_else(|| Unsupported::new(name, "dynamic property path"))?;
            let subject = match out.subject.clone() {
                Some(Subject::Locator(l)) if path == "length" => Subject::LocatorCount(l),
                Some(Subject::Locator(_)) => {
                    return Err(Unsupported::new(name, "element property has no locator equivalent"));
                }
                Some(Subject::Response(r)) => Subject::Value(response_path(&r, path)),
                Some(other) => Subject::Value(format!("{}{}", other.to_expression(), property_path(path))),
                None => return Err(Unsupported::new(name, "nothing to read from")),
            };
            out.yields(subject);
        }

        // blocks
        "within" => {
            let locator = out.locator(name)?;
            let callback = callback_arg(name, &args)?;
            let binding = ctx.allocate(callback.param().unwrap_or("scope"));
            ctx.mark_locator(&binding);
            ctx.report.raise(Complexity::Medium);
            out.emit(format!("const {binding} = {locator};"));
            let rename = callback.param().map(|p| (p.to_string(), binding.clone()));
            let lines = ctx.with_root(&binding, |ctx| convert_body(&callback, rename, None, ctx));
            for line in lines {
                out.emit(line);
            }
        }
        "each" => {
            let locator = out.locator(name)?;
            let callback = callback_arg(name, &args)?;
            let element = ctx.allocate(callback.param().unwrap_or("item"));
            ctx.mark_locator(&element);
            ctx.report.raise(Complexity::Medium);
            let head = match callback.params.get(1) {
                Some(index) => format!("for (const [{index}, {element}] of (await {locator}.all()).entries()) {{"),
                None => format!("for (const {element} of await {locator}.all()) {{"),
            };
            let rename = callback.param().map(|p| (p.to_string(), element.clone()));
            let body = convert_body(&callback, rename, None, ctx);
            out.emit(format!("{head}\n{}\n}}", indent_block(&join(&body), "  ")));
        }

        // page
        "visit" => {
            let url = required(name, &args, 0)?;
            if args.len() > 1 {
                ctx.report.note("`visit` options dropped");
            }
            out.emit(format!("await {page}.goto({url});"));
            out.subject = None;
        }
        "reload" => {
            out.emit(format!("await {page}.reload();"));
            out.subject = None;
        }
        "go" => {
            let direction = required(name, &args, 0)?;
            let call = match unquote(direction).unwrap_or(direction) {
                "back" | "-1" => "goBack",
                "forward" | "1" => "goForward",
                _ => return Err(Unsupported::new(name, "only single steps back or forward convert")),
            };
            out.emit(format!("await {page}.{call}();"));
            out.subject = None;
        }
        "viewport" => {
            let (Some(width), Some(height)) = (args.first(), args.get(1)) else {
                return Err(Unsupported::new(name, "viewport presets need manual review"));
            };
            if is_literal(width) {
                return Err(Unsupported::new(name, "viewport presets need manual review"));
            }
            out.emit(format!("await {page}.setViewportSize({{ width: {width}, height: {height} }});"));
        }
        "clearCookies" | "clearAllCookies" => out.emit(format!("await {page}.context().clearCookies();")),
        "clearLocalStorage" | "clearAllLocalStorage" => {
            out.emit(format!("await {page}.evaluate(() => localStorage.clear());"));
        }
        "clearAllSessionStorage" => {
            out.emit(format!("await {page}.evaluate(() => sessionStorage.clear());"));
        }
        "setCookie" => {
            let cookie = required(name, &args, 0)?;
            let value = required(name, &args, 1)?;
            out.emit(format!(
                "await {page}.context().addCookies([{{ name: {cookie}, value: {value}, url: {page}.url() }}]);"
            ));
        }
        "screenshot" => {
            let options = match args.iter().find(|a| !is_object(a)) {
                Some(file) => match unquote(file) {
                    Some(file) => format!("{{ path: {} }}", quote(&format!("{file}.png"))),
                    None => format!("{{ path: `${{{file}}}.png` }}"),
                },
                None => String::new(),
            };
            let target = match &out.subject {
                Some(Subject::Locator(l)) => l.clone(),
                _ => page.clone(),
            };
            out.emit(format!("await {target}.screenshot({options});"));
        }
        "scrollTo" => {
            let script = match args.as_slice() {
                [position] => match unquote(position) {
                    Some("top" | "topLeft") => "window.scrollTo(0, 0)".to_string(),
                    Some("bottom" | "bottomLeft") => "window.scrollTo(0, document.body.scrollHeight)".to_string(),
                    _ => return Err(Unsupported::new(name, "scroll position needs manual review")),
                },
                [x, y, ..] if !is_literal(x) => format!("window.scrollTo({x}, {y})"),
                _ => return Err(Unsupported::new(name, "scroll position needs manual review")),
            };
            if matches!(out.subject, Some(Subject::Locator(_))) {
                return Err(Unsupported::new(name, "scrolling an element needs manual review"));
            }
            out.emit(format!("await {page}.evaluate(() => {script});"));
        }
        "log" => out.emit(format!("console.log({});", args.join(", "))),
        "pause" | "debug" => out.emit(format!("await {page}.pause();")),
        "end" => {
            out.subject = None;
            out.settled = true;
        }
        "url" => out.yields(Subject::Value(format!("{page}.url()"))),
        "title" => out.yields(Subject::Value(format!("await {page}.title()"))),
        "hash" => out.yields(Subject::Value(format!("new URL({page}.url()).hash"))),
        "location" => {
            let value = match args.first() {
                Some(part) => {
                    let part = unquote(part)
                        .filter(|p| is_identifier(p))
                        .ok_or_else(|| Unsupported::new(name, "dynamic location part"))?;
                    format!("new URL({page}.url()).{part}")
                }
                None => format!("new URL({page}.url())"),
            };
            out.yields(Subject::Value(value));
        }
        "wrap" => {
            let value = required(name, &args, 0)?;
            let subject = if ctx.is_locator(value) {
                Subject::Locator(value.to_string())
            } else if ctx.is_response(value) {
                Subject::Response(value.to_string())
            } else {
                Subject::Value(value.to_string())
            };
            out.yields(subject);
        }
        "request" => {
            let fetch = request_call(&args, &page).ok_or_else(|| Unsupported::new(name, "unexpected arguments"))?;
            out.yields(Subject::Response(fetch));
            out.settled = false;
        }
        "fixture" => {
            let file = required(name, &args, 0)?;
            let path = match unquote(file) {
                Some(file) => quote(&ctx.options().fixture_path(file)),
                None => format!("`{}`", ctx.options().fixture_path(&format!("${{{file}}}"))),
            };
            ctx.report.import("import { readFile } from 'fs/promises';");
            out.yields(Subject::Value(format!("JSON.parse(await readFile({path}, 'utf-8'))")));
        }
        "as" => return Err(Unsupported::new(name, "value and element aliases need manual review")),
        "then" => return Err(Unsupported::new(name, "callback attached to a command")),
        "wait" | "intercept" => return Err(Unsupported::new(name, "network command inside a chain")),
        "window" | "document" => {
            return Err(Unsupported::new(name, "browser globals need manual review"));
        }
        "task" | "exec" | "readFile" | "writeFile" | "selectFile" => {
            return Err(Unsupported::new(name, "Node-side command needs manual review"));
        }

        _ if first => custom_command(out, segment, has_more, ctx)?,
        _ => return Err(Unsupported::new(name, "unknown command")),
    }
    Ok(())
}

/// Page-object delegation or helper-function fallback for an unknown command
fn custom_command(
    out: &mut Converted,
    segment: &Segment,
    has_more: bool,
    ctx: &mut Context<'_>,
) -> Result<(), Unsupported> {
    let name = segment.name.as_str();
    let args = segment.arguments();

    if let Some(target) = ctx.options().page_objects.get(name).cloned() {
        out.strategy = CustomStrategy::PageObject;
        out.emit(format!("await {target}({});", args.join(", ")));
        out.subject = None;
        return Ok(());
    }

    if !ctx.options().utility_fallback {
        return Err(Unsupported::new(name, "custom command"));
    }
    if args.iter().any(|a| Callback::parse(a).is_some()) {
        return Err(Unsupported::new(name, "custom command taking a callback"));
    }

    let page = ctx.page().to_string();
    let call = if args.is_empty() {
        format!("{name}({page})")
    } else {
        format!("{name}({page}, {})", args.join(", "))
    };
    out.strategy = CustomStrategy::Utility;
    ctx.report.note(format!("helper `{name}({page}, …)` must be defined"));
    if has_more {
        ctx.report.review(format!("helper `{name}` is assumed to return a locator"));
        out.yields(Subject::Locator(call));
    } else {
        out.emit(format!("await {call};"));
        out.subject = None;
    }
    Ok(())
}

/// Bind a subject to a callback's parameter and convert its body
pub(crate) fn bind_and_convert(
    callback: &Callback,
    subject: &Subject,
    ctx: &mut Context<'_>,
) -> Result<Vec<String>, Unsupported> {
    let mut lines = Vec::new();
    let rename = bind_param(callback.param(), subject, ctx, &mut lines)?;
    lines.extend(convert_body(callback, rename, None, ctx));
    Ok(lines)
}

/// Declare the binding a callback parameter stands for
///
/// Returns the `(parameter, binding)` rename for the body, if any.
pub(crate) fn bind_param(
    param: Option<&str>,
    subject: &Subject,
    ctx: &mut Context<'_>,
    lines: &mut Vec<String>,
) -> Result<Option<(String, String)>, Unsupported> {
    let Some(param) = param else {
        if let Subject::Response(r) = subject {
            lines.push(format!("{r};"));
        }
        return Ok(None);
    };

    if param.starts_with('{') || param.starts_with('[') {
        return bind_destructured(param, subject, ctx, lines).map(|()| None);
    }

    let binding = ctx.allocate(param);
    match subject {
        Subject::Locator(l) => {
            ctx.mark_locator(&binding);
            lines.push(format!("const {binding} = {l};"));
        }
        Subject::Response(r) => {
            ctx.mark_response(&binding);
            lines.push(format!("const {binding} = {r};"));
        }
        other => lines.push(format!("const {binding} = {};", other.as_value_expression())),
    }
    Ok(Some((param.to_string(), binding)))
}

fn bind_destructured(
    pattern: &str,
    subject: &Subject,
    ctx: &mut Context<'_>,
    lines: &mut Vec<String>,
) -> Result<(), Unsupported> {
    match subject {
        Subject::Response(r) => {
            let entries = object_entries(pattern)
                .ok_or_else(|| Unsupported::new("then", "unexpected destructuring"))?;
            let response = ctx.allocate("response");
            ctx.mark_response(&response);
            lines.push(format!("const {response} = {r};"));
            for (key, local) in entries {
                let value = match key.as_str() {
                    "status" => format!("{response}.status()"),
                    "statusText" => format!("{response}.statusText()"),
                    "body" => format!("await {response}.json()"),
                    "headers" => format!("{response}.headers()"),
                    _ => return Err(Unsupported::new("then", format!("response field `{key}`"))),
                };
                lines.push(format!("const {local} = {value};"));
            }
            Ok(())
        }
        Subject::Locator(_) => Err(Unsupported::new("then", "destructured element")),
        other => {
            lines.push(format!("const {pattern} = {};", other.as_value_expression()));
            Ok(())
        }
    }
}

impl Subject {
    /// Right-hand side for a `const` declaration of the subject
    fn as_value_expression(&self) -> String {
        let value = self.to_expression();
        if value.starts_with("(await ") && value.ends_with(')') {
            value[1..value.len() - 1].to_string()
        } else {
            value
        }
    }
}

fn required<'a>(command: &str, args: &[&'a str], idx: usize) -> Result<&'a str, Unsupported> {
    args.get(idx)
        .copied()
        .ok_or_else(|| Unsupported::new(command, format!("missing argument {}", idx + 1)))
}

fn callback_arg(command: &str, args: &[&str]) -> Result<Callback, Unsupported> {
    args.last()
        .and_then(|a| Callback::parse(a))
        .ok_or_else(|| Unsupported::new(command, "expects an inline callback"))
}

fn is_object(arg: &str) -> bool {
    arg.trim_start().starts_with('{')
}

fn is_literal(arg: &str) -> bool {
    unquote(arg).is_some()
}

/// `click` / `dblclick` call with coordinates and `force` carried over
fn click_call(method: &str, args: &[&str], extra: Option<&str>, ctx: &mut Context<'_>) -> String {
    let mut options: Vec<String> = extra.map(str::to_string).into_iter().collect();
    let positional: Vec<&str> = args.iter().copied().filter(|a| !is_object(a)).collect();
    match positional.as_slice() {
        [] => {}
        [x, y] => options.push(format!("position: {{ x: {x}, y: {y} }}")),
        _ => ctx.report.review(format!("`{method}` position argument dropped")),
    }
    if let Some(entries) = args.iter().find(|a| is_object(a)).and_then(|a| object_entries(a)) {
        for (key, value) in entries {
            match key.as_str() {
                "force" | "timeout" => options.push(format!("{key}: {value}")),
                _ => ctx.report.note(format!("`{method}` option `{key}` dropped")),
            }
        }
    }
    if options.is_empty() {
        format!("{method}()")
    } else {
        format!("{method}({{ {} }})", options.join(", "))
    }
}

/// `type` as `fill` / `press` / `pressSequentially` statements
fn type_statements(locator: &str, text: &str) -> Result<Vec<String>, Unsupported> {
    let Some(content) = unquote(text) else {
        return Ok(vec![format!("await {locator}.fill({text});")]);
    };
    if !KEY_TOKEN.is_match(content) {
        return Ok(vec![format!("await {locator}.fill({text});")]);
    }

    let mut statements = Vec::new();
    let mut last = 0;
    let push_text = |statements: &mut Vec<String>, chunk: &str| {
        if chunk.is_empty() {
            return;
        }
        let method = if statements.is_empty() { "fill" } else { "pressSequentially" };
        statements.push(format!("await {locator}.{method}({});", quote(chunk)));
    };
    for token in KEY_TOKEN.captures_iter(content) {
        let (Some(whole), Some(key)) = (token.get(0), token.get(1)) else {
            continue;
        };
        push_text(&mut statements, &content[last..whole.start()]);
        let key = key.as_str().to_ascii_lowercase();
        let mapped = SPECIAL_KEYS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, pw)| *pw)
            .ok_or_else(|| Unsupported::new("type", format!("special key `{{{key}}}`")))?;
        statements.push(format!("await {locator}.press('{mapped}');"));
        last = whole.end();
    }
    push_text(&mut statements, &content[last..]);
    Ok(statements)
}

/// `.a.b` for `'a.b'`, bracket access for non-identifier parts
fn property_path(path: &str) -> String {
    path.split('.')
        .map(|part| {
            if is_identifier(part) {
                format!(".{part}")
            } else {
                format!("[{}]", quote(part))
            }
        })
        .collect()
}

/// `its` path on an API response
fn response_path(response: &str, path: &str) -> String {
    let response = if response.starts_with("await ") {
        format!("({response})")
    } else {
        response.to_string()
    };
    let (head, rest) = path.split_once('.').unwrap_or((path, ""));
    let rest = if rest.is_empty() { String::new() } else { property_path(rest) };
    match head {
        "status" => format!("{response}.status()"),
        "statusText" => format!("{response}.statusText()"),
        "headers" => format!("{response}.headers(){rest}"),
        "body" => format!("(await {response}.json()){rest}"),
        other => format!("{response}{}{rest}", property_path(other)),
    }
}

/// `cy.request` arguments as an awaited `page.request.fetch` call
fn request_call(args: &[&str], page: &str) -> Option<String> {
    let mut options = Vec::new();
    let url = match args {
        [options_object] if is_object(options_object) => {
            let entries = object_entries(options_object)?;
            let mut url = None;
            for (key, value) in entries {
                match key.as_str() {
                    "url" => url = Some(value),
                    "method" => options.push(format!("method: {value}")),
                    "body" => options.push(format!("data: {value}")),
                    "headers" => options.push(format!("headers: {value}")),
                    "qs" => options.push(format!("params: {value}")),
                    "failOnStatusCode" | "timeout" => options.push(format!("{key}: {value}")),
                    _ => {}
                }
            }
            url?
        }
        [url] => (*url).to_string(),
        [method, url, rest @ ..]
            if unquote(method).is_some_and(|m| HTTP_METHODS.contains(&m.to_ascii_uppercase().as_str())) =>
        {
            options.push(format!("method: {}", quote(&unquote(method)?.to_ascii_uppercase())));
            if let Some(body) = rest.first() {
                options.push(format!("data: {body}"));
            }
            (*url).to_string()
        }
        [url, body] => {
            options.push("method: 'POST'".to_string());
            options.push(format!("data: {body}"));
            (*url).to_string()
        }
        _ => return None,
    };
    Some(if options.is_empty() {
        format!("await {page}.request.fetch({url})")
    } else {
        format!("await {page}.request.fetch({url}, {{ {} }})", options.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TransformOptions;
    use cy2pw_symbol::FileScope;
    use pretty_assertions::assert_eq;

    fn convert_with(options: &TransformOptions, text: &str) -> Result<Vec<String>, Unsupported> {
        let mut scope = FileScope::new(text);
        let mut ctx = Context::new(options, &mut scope);
        let chain = CommandChain::parse(text).unwrap();
        convert_chain(&chain, &mut ctx).map(|c| c.statements)
    }

    fn convert(text: &str) -> Vec<String> {
        convert_with(&TransformOptions::default(), text).unwrap()
    }

    #[test]
    fn queries_and_actions() {
        assert_eq!(
            convert("cy.get('#name').type('Ada')"),
            vec!["await page.locator('#name').fill('Ada');"]
        );
        assert_eq!(
            convert("cy.get('ul').find('li').first().click()"),
            vec!["await page.locator('ul').locator('li').first().click();"]
        );
        assert_eq!(
            convert("cy.contains('button', 'Save').click({ force: true })"),
            vec!["await page.locator('button', { hasText: 'Save' }).click({ force: true });"]
        );
        assert_eq!(convert("cy.get('li').eq(2).rightclick()"), vec![
            "await page.locator('li').nth(2).click({ button: 'right' });"
        ]);
    }

    #[test]
    fn special_keys_use_press() {
        assert_eq!(
            convert("cy.get('input').type('hello{enter}')"),
            vec![
                "await page.locator('input').fill('hello');",
                "await page.locator('input').press('Enter');",
            ]
        );
        assert_eq!(
            convert("cy.get('input').type('{selectall}{backspace}new')"),
            vec![
                "await page.locator('input').press('ControlOrMeta+A');",
                "await page.locator('input').press('Backspace');",
                "await page.locator('input').pressSequentially('new');",
            ]
        );
        assert!(convert_with(&TransformOptions::default(), "cy.get('i').type('{shift}a')").is_err());
    }

    #[test]
    fn assertions_on_subjects() {
        assert_eq!(
            convert("cy.get('h1').should('have.text', 'Welcome').and('be.visible')"),
            vec![
                "await expect(page.locator('h1')).toHaveText('Welcome');",
                "await expect(page.locator('h1')).toBeVisible();",
            ]
        );
        assert_eq!(
            convert("cy.get('li').should('have.length', 3)"),
            vec!["await expect(page.locator('li')).toHaveCount(3);"]
        );
        assert_eq!(
            convert("cy.url().should('include', '/dashboard')"),
            vec!["await expect(page.url()).toContain('/dashboard');"]
        );
        assert_eq!(
            convert("cy.get('p').invoke('text').should('contain', 'Hi')"),
            vec!["await expect(page.locator('p')).toContainText('Hi');"]
        );
    }

    #[test]
    fn page_commands() {
        assert_eq!(convert("cy.visit('/login')"), vec!["await page.goto('/login');"]);
        assert_eq!(convert("cy.go('back')"), vec!["await page.goBack();"]);
        assert_eq!(
            convert("cy.viewport(1280, 720)"),
            vec!["await page.setViewportSize({ width: 1280, height: 720 });"]
        );
        assert_eq!(convert("cy.clearCookies()"), vec!["await page.context().clearCookies();"]);
        assert_eq!(
            convert("cy.screenshot('home')"),
            vec!["await page.screenshot({ path: 'home.png' });"]
        );
        assert_eq!(convert("cy.log('done')"), vec!["console.log('done');"]);
    }

    #[test]
    fn bare_query_waits() {
        assert_eq!(convert("cy.get('.toast')"), vec!["await page.locator('.toast').waitFor();"]);
    }

    #[test]
    fn requests_are_sent() {
        assert_eq!(
            convert("cy.request('POST', '/api/reset')"),
            vec!["await page.request.fetch('/api/reset', { method: 'POST' });"]
        );
        assert_eq!(
            convert("cy.request('/api/health').its('status').should('eq', 200)"),
            vec!["await expect((await page.request.fetch('/api/health')).status()).toBe(200);"]
        );
    }

    #[test]
    fn within_scopes_queries() {
        let out = convert("cy.get('form').within(() => {\n  cy.get('input').type('x');\n})");
        assert_eq!(
            out,
            vec![
                "const scope = page.locator('form');",
                "await scope.locator('input').fill('x');",
            ]
        );
    }

    #[test]
    fn each_becomes_loop() {
        let out = convert("cy.get('li').each(($li, i) => {\n  cy.wrap($li).click();\n})");
        assert_eq!(
            out,
            vec!["for (const [i, li] of (await page.locator('li').all()).entries()) {\n  await li.click();\n}"]
        );
    }

    #[test]
    fn custom_commands() {
        let options = TransformOptions::default().with_page_object("login", "loginPage.login");
        assert_eq!(
            convert_with(&options, "cy.login('ada', 'pw')").unwrap(),
            vec!["await loginPage.login('ada', 'pw');"]
        );
        assert_eq!(convert("cy.seedDatabase()"), vec!["await seedDatabase(page);"]);
        assert_eq!(
            convert("cy.getByTestId('save').click()"),
            vec!["await getByTestId(page, 'save').click();"]
        );
        let options = TransformOptions::default().with_utility_fallback(false);
        assert!(convert_with(&options, "cy.seedDatabase()").is_err());
    }

    #[test]
    fn unsupported_commands() {
        let options = TransformOptions::default();
        let err = convert_with(&options, "cy.get('@row').click()").unwrap_err();
        assert_eq!(err.command, "get");
        assert!(convert_with(&options, "cy.window().its('app')").is_err());
        assert!(convert_with(&options, "cy.custom((x) => x)").is_err());
    }

    #[test]
    fn fixture_reads_file() {
        let options = TransformOptions::default();
        let mut scope = FileScope::default();
        let mut ctx = Context::new(&options, &mut scope);
        let chain = CommandChain::parse("cy.fixture('users.json')").unwrap();
        let converted = convert_segments(chain.segments(), &mut ctx).unwrap();
        assert_eq!(
            converted.subject,
            Some(Subject::Value(
                "JSON.parse(await readFile('cypress/fixtures/users.json', 'utf-8'))".into()
            ))
        );
        assert_eq!(ctx.report.imports, vec!["import { readFile } from 'fs/promises';"]);
    }
}
