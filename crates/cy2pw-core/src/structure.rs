//! Test-structure rewrite
//!
//! Suites, tests and hooks become their `test.*` counterparts. Test and
//! per-test hook callbacks receive the page fixture; all-tests hooks become
//! plain async callbacks. Only bare calls are rewritten, so running the
//! rewrite on its own output changes nothing.

use once_cell::sync::Lazy;
use regex::Regex;

use cy2pw_pattern::scan::{find_matching_close, is_ident_byte, matching_close, split_top_level, unquote, RegionMap};

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(describe|context|it|specify|beforeEach|afterEach|before|after)((?:\.(?:only|skip))?)\s*\(")
        .expect("declaration regex is valid")
});

static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*///[ \t]*<reference\s+types=["']cypress["']\s*/>[ \t]*\r?\n?"#)
        .expect("reference directive regex is valid")
});

/// What a declaration becomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Declaration {
    Suite,
    Test,
    EachHook(&'static str),
    AllHook(&'static str),
}

impl Declaration {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "describe" | "context" => Self::Suite,
            "it" | "specify" => Self::Test,
            "beforeEach" => Self::EachHook("test.beforeEach"),
            "afterEach" => Self::EachHook("test.afterEach"),
            "before" => Self::AllHook("test.beforeAll"),
            "after" => Self::AllHook("test.afterAll"),
            _ => return None,
        })
    }

    fn target(self) -> &'static str {
        match self {
            Self::Suite => "test.describe",
            Self::Test => "test",
            Self::EachHook(t) | Self::AllHook(t) => t,
        }
    }

    fn takes_title(self) -> bool {
        matches!(self, Self::Suite | Self::Test)
    }
}

/// Output of [`rewrite_structure`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureRewrite {
    /// Rewritten text
    pub text: String,
    /// Declarations rewritten
    pub rewritten: usize,
    /// Notes about dropped constructs
    pub notes: Vec<String>,
}

/// Byte offset of `part` inside `whole`; `part` must be a subslice
fn offset_in(whole: &str, part: &str) -> usize {
    part.as_ptr() as usize - whole.as_ptr() as usize
}

fn is_title(arg: &str) -> bool {
    unquote(arg).is_some() || arg.starts_with('`')
}

/// Length of a callback's header (`async (…) =>`, `function name(…)`) and
/// its parameter text
fn callback_header(arg: &str) -> Option<(usize, &str)> {
    let mut idx = 0;
    if let Some(rest) = arg.strip_prefix("async") {
        if rest.starts_with(|c: char| c.is_whitespace() || c == '(') {
            idx = arg.len() - rest.trim_start().len();
        }
    }
    let rest = &arg[idx..];

    if let Some(after) = rest.strip_prefix("function") {
        let paren = after.find('(')?;
        if !after[..paren].trim().bytes().all(is_ident_byte) {
            return None;
        }
        let open = idx + "function".len() + paren;
        let close = open + find_matching_close(&arg[open..], 0)?;
        return Some((close + 1, arg[open + 1..close].trim()));
    }

    let (params, after_params) = if rest.starts_with('(') {
        let close = idx + find_matching_close(rest, 0)?;
        (arg[idx + 1..close].trim(), close + 1)
    } else {
        let len = rest.bytes().take_while(|&b| is_ident_byte(b)).count();
        if len == 0 {
            return None;
        }
        (&rest[..len], idx + len)
    };
    let tail = &arg[after_params..];
    let arrow = tail.find("=>")?;
    if !tail[..arrow].trim().is_empty() && !tail[..arrow].trim_start().starts_with(':') {
        return None;
    }
    Some((after_params + arrow + 2, params))
}

/// Rewrite suites, tests and hooks in `source`
///
/// `page` is the identifier converted code uses for the page fixture.
#[must_use]
pub fn rewrite_structure(source: &str, page: &str) -> StructureRewrite {
    let text = REFERENCE.replace_all(source, "").into_owned();
    let regions = RegionMap::new(&text);
    let bytes = text.as_bytes();
    let fixture = if page == "page" {
        "async ({ page }) =>".to_string()
    } else {
        format!("async ({{ page: {page} }}) =>")
    };

    let mut edits: Vec<(usize, usize, String)> = Vec::new();
    let mut notes = Vec::new();
    let mut rewritten = 0;

    for caps in DECLARATION.captures_iter(&text) {
        let (Some(whole), Some(name), Some(modifier)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let start = whole.start();
        let member = start > 0 && (bytes[start - 1] == b'.' || is_ident_byte(bytes[start - 1]));
        if member || !regions.is_code(start) {
            continue;
        }
        let Some(declaration) = Declaration::parse(name.as_str()) else {
            continue;
        };
        let open = whole.end() - 1;
        let Some(close) = matching_close(&text, &regions, open) else {
            continue;
        };
        let args = split_top_level(&text[open + 1..close], b',');
        if declaration.takes_title() && !args.first().is_some_and(|a| is_title(a)) {
            continue;
        }
        let Some(callback) = args.last().filter(|_| args.len() <= 3) else {
            continue;
        };
        let Some((header_len, params)) = callback_header(callback) else {
            continue;
        };
        let callback_start = offset_in(&text, callback);

        edits.push((
            start,
            modifier.end(),
            format!("{}{}", declaration.target(), modifier.as_str()),
        ));
        let header = match declaration {
            Declaration::Suite => None,
            Declaration::Test | Declaration::EachHook(_) => Some(fixture.clone()),
            Declaration::AllHook(_) => Some("async () =>".to_string()),
        };
        if let Some(header) = header {
            if !params.is_empty() {
                notes.push(format!("callback parameter `{params}` of `{}` dropped", name.as_str()));
            }
            edits.push((callback_start, callback_start + header_len, header));
        }
        rewritten += 1;
    }

    edits.sort_by_key(|(start, _, _)| *start);
    let mut out = String::with_capacity(text.len() + edits.len() * 16);
    let mut last = 0;
    for (start, end, replacement) in edits {
        if start < last {
            continue;
        }
        out.push_str(&text[last..start]);
        out.push_str(&replacement);
        last = end;
    }
    out.push_str(&text[last..]);

    StructureRewrite {
        text: out,
        rewritten,
        notes,
    }
}
