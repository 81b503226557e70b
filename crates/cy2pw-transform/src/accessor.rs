//! Member-path rewriting on known bindings
//!
//! Element and response accessors (`el.text()`, `response.body`) read state
//! that is asynchronous on the Playwright side, so each is rewritten to an
//! awaited call.

use cy2pw_pattern::scan::{is_ident_byte, matching_close, RegionMap};

use crate::context::Context;

/// One `.name` or `.name(args)` step of a member path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member<'t> {
    /// Property or method name
    pub name: &'t str,
    /// Call arguments, `None` for property access
    pub args: Option<&'t str>,
}

/// Rewrite member paths hanging off `receiver`
///
/// `rewrite` sees every member path following an occurrence of `receiver` in
/// code and returns how many members it consumed with the replacement for
/// `receiver` plus those members. Member accesses on other objects
/// (`x.receiver`) are not matched.
pub fn rewrite_paths<F>(text: &str, receiver: &str, mut rewrite: F) -> String
where
    F: FnMut(&[Member<'_>]) -> Option<(usize, String)>,
{
    if receiver.is_empty() {
        return text.to_string();
    }
    let regions = RegionMap::new(text);
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut search = 0;

    while let Some(found) = text[search..].find(receiver) {
        let pos = search + found;
        let after = pos + receiver.len();
        search = pos + 1;

        if !regions.is_code(pos) || pos < last {
            continue;
        }
        let before_ok = pos == 0 || {
            let p = bytes[pos - 1];
            let spread = pos >= 3 && &text[pos - 3..pos] == "...";
            !is_ident_byte(p) && (p != b'.' || spread)
        };
        let tail_ok = !receiver.as_bytes().last().copied().is_some_and(is_ident_byte)
            || !bytes.get(after).copied().is_some_and(is_ident_byte);
        if !before_ok || !tail_ok {
            continue;
        }

        let (members, ends) = parse_members(text, &regions, after);
        if let Some((consumed, replacement)) = rewrite(&members) {
            let end = if consumed == 0 { after } else { ends[consumed - 1] };
            out.push_str(&text[last..pos]);
            out.push_str(&replacement);
            last = end;
            search = end;
        }
    }
    out.push_str(&text[last..]);
    out
}

fn parse_members<'t>(text: &'t str, regions: &RegionMap, mut idx: usize) -> (Vec<Member<'t>>, Vec<usize>) {
    let bytes = text.as_bytes();
    let mut members = Vec::new();
    let mut ends = Vec::new();
    loop {
        let dot = if bytes.get(idx) == Some(&b'?') && bytes.get(idx + 1) == Some(&b'.') {
            idx + 1
        } else {
            idx
        };
        if bytes.get(dot) != Some(&b'.') || !regions.is_code(dot) {
            break;
        }
        let start = dot + 1;
        let mut end = start;
        while end < bytes.len() && is_ident_byte(bytes[end]) {
            end += 1;
        }
        if end == start {
            break;
        }
        let name = &text[start..end];
        if bytes.get(end) == Some(&b'(') {
            let Some(close) = matching_close(text, regions, end) else {
                break;
            };
            members.push(Member {
                name,
                args: Some(text[end + 1..close].trim()),
            });
            idx = close + 1;
        } else {
            members.push(Member { name, args: None });
            idx = end;
        }
        ends.push(idx);
    }
    (members, ends)
}

/// Replacement for a jQuery-style accessor on a locator binding
///
/// Traversals (`find`, `first`, `last`, `eq`) refine the locator; a
/// following read (`text()`, `length`, …) is awaited.
#[must_use]
pub fn element_accessor(locator: &str, members: &[Member<'_>]) -> Option<(usize, String)> {
    let mut target = locator.to_string();
    let mut consumed = 0;
    for member in members {
        match (member.name, member.args) {
            ("find", Some(args)) if !args.is_empty() => target = format!("{target}.locator({args})"),
            ("first", Some("")) => target.push_str(".first()"),
            ("last", Some("")) => target.push_str(".last()"),
            ("eq", Some(index)) if !index.is_empty() => target = format!("{target}.nth({index})"),
            _ => break,
        }
        consumed += 1;
    }
    match members.get(consumed).and_then(|m| element_read(&target, m)) {
        Some(read) => Some((consumed + 1, read)),
        None if consumed > 0 => Some((consumed, target)),
        None => None,
    }
}

fn element_read(locator: &str, member: &Member<'_>) -> Option<String> {
    let read = match (member.name, member.args) {
        ("text", Some("")) => format!("(await {locator}.textContent())"),
        ("val", Some("")) => format!("(await {locator}.inputValue())"),
        ("html", Some("")) => format!("(await {locator}.innerHTML())"),
        ("attr", Some(args)) if !args.is_empty() => format!("(await {locator}.getAttribute({args}))"),
        ("length", None) => format!("(await {locator}.count())"),
        ("is", Some("':visible'" | "\":visible\"")) => format!("(await {locator}.isVisible())"),
        ("is", Some("':checked'" | "\":checked\"")) => format!("(await {locator}.isChecked())"),
        ("is", Some("':disabled'" | "\":disabled\"")) => format!("(await {locator}.isDisabled())"),
        _ => return None,
    };
    Some(read)
}

/// Replacement for a `cy.request` response property on an API response binding
#[must_use]
pub fn response_accessor(response: &str, members: &[Member<'_>]) -> Option<(usize, String)> {
    let first = members.first()?;
    if first.args.is_some() {
        return None;
    }
    let replacement = match first.name {
        "status" => format!("{response}.status()"),
        "statusText" => format!("{response}.statusText()"),
        "body" => format!("(await {response}.json())"),
        "headers" => format!("{response}.headers()"),
        _ => return None,
    };
    Some((1, replacement))
}

/// Rewrite accessors on every locator and response binding in `ctx`
#[must_use]
pub fn rewrite_accessors(text: &str, ctx: &Context<'_>) -> String {
    let mut out = text.to_string();
    let mut locators: Vec<&str> = ctx.locators().collect();
    locators.sort_unstable();
    for locator in locators {
        out = rewrite_paths(&out, locator, |members| element_accessor(locator, members));
    }
    let mut responses: Vec<&str> = ctx.responses().collect();
    responses.sort_unstable();
    for response in responses {
        out = rewrite_paths(&out, response, |members| response_accessor(response, members));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TransformOptions;
    use cy2pw_symbol::FileScope;
    use pretty_assertions::assert_eq;

    #[test]
    fn paths_are_parsed() {
        let mut seen = Vec::new();
        let _ = rewrite_paths("a.b.c(1, 2)?.d + x.a.b", "a", |members| {
            seen.push(members.iter().map(|m| (m.name.to_string(), m.args.map(str::to_string))).collect::<Vec<_>>());
            None
        });
        assert_eq!(
            seen,
            vec![vec![
                ("b".to_string(), None),
                ("c".to_string(), Some("1, 2".to_string())),
                ("d".to_string(), None),
            ]]
        );
    }

    #[test]
    fn element_accessors() {
        let options = TransformOptions::default();
        let mut scope = FileScope::default();
        let mut ctx = Context::new(&options, &mut scope);
        ctx.mark_locator("el");
        ctx.mark_response("response");
        let out = rewrite_accessors(
            "const t = el.text().trim(); n = el.length; el.attr('href'); 'el.text()'; response.body.id; response.status",
            &ctx,
        );
        assert_eq!(
            out,
            "const t = (await el.textContent()).trim(); n = (await el.count()); (await el.getAttribute('href')); 'el.text()'; (await response.json()).id; response.status()"
        );
    }

    #[test]
    fn traversals_refine_the_locator() {
        let out = rewrite_paths("form.find('input').length + form.find('a').eq(1).click()", "form", |m| {
            element_accessor("form", m)
        });
        assert_eq!(
            out,
            "(await form.locator('input').count()) + form.locator('a').nth(1).click()"
        );
    }

    #[test]
    fn converted_accessors_are_stable() {
        let out = rewrite_paths("response.status()", "response", |m| response_accessor("response", m));
        assert_eq!(out, "response.status()");
    }
}
