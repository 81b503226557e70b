//! Delimiter-aware text scanning
//!
//! Everything the engine knows about source structure comes from this module:
//! which bytes are code (as opposed to string, template, comment or regex
//! literal text), where a bracket closes, and where statements and arguments
//! split. No syntax tree is built.
//!
//! All positions are byte offsets. Only ASCII bytes are ever compared, so every
//! offset returned here is a valid `str` slice boundary.

/// Lexical region of a single byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Ordinary code
    Code,
    /// String or template literal text, quotes included
    Literal,
    /// Line or block comment
    Comment,
    /// Regular expression literal
    Regex,
}

/// Per-byte region map of a text
#[derive(Debug, Clone)]
pub struct RegionMap {
    regions: Vec<Region>,
}

impl RegionMap {
    /// Classify every byte of `text`
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            regions: classify(text.as_bytes()),
        }
    }

    /// Region of byte `idx`
    #[inline]
    #[must_use]
    pub fn region(&self, idx: usize) -> Option<Region> {
        self.regions.get(idx).copied()
    }

    /// Whether byte `idx` is code
    #[inline]
    #[must_use]
    pub fn is_code(&self, idx: usize) -> bool {
        self.region(idx) == Some(Region::Code)
    }

    /// Number of classified bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the map is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Previous significant token, used to tell a regex literal from a division
#[derive(Debug, Clone, Copy)]
enum Prev {
    Start,
    Punct(u8),
    Word(usize, usize),
    Value,
}

const REGEX_PRECEDERS: &[u8] = b"(,=:[!&|?{};+-*%<>~^";
const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "in", "of", "void", "delete", "instanceof", "new", "throw",
    "yield", "await",
];

fn classify(bytes: &[u8]) -> Vec<Region> {
    let mut out = vec![Region::Code; bytes.len()];
    let mut interpolations: Vec<usize> = Vec::new();
    let mut depth = 0usize;
    let mut prev = Prev::Start;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\'' | b'"' => {
                let end = skip_quoted(bytes, i);
                fill(&mut out, i, end, Region::Literal);
                prev = Prev::Value;
                i = end;
            }
            b'`' => {
                i = scan_template(bytes, i + 1, i, &mut out, &mut interpolations, depth);
                prev = Prev::Value;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = bytes[i..]
                    .iter()
                    .position(|&c| c == b'\n')
                    .map_or(bytes.len(), |p| i + p);
                fill(&mut out, i, end, Region::Comment);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = find_bytes(bytes, i + 2, b"*/").map_or(bytes.len(), |p| p + 2);
                fill(&mut out, i, end, Region::Comment);
                i = end;
            }
            b'/' if regex_allowed(bytes, prev) => match skip_regex(bytes, i) {
                Some(end) => {
                    fill(&mut out, i, end, Region::Regex);
                    prev = Prev::Value;
                    i = end;
                }
                None => {
                    prev = Prev::Punct(b);
                    i += 1;
                }
            },
            b'{' => {
                depth += 1;
                prev = Prev::Punct(b);
                i += 1;
            }
            b'}' if interpolations.last() == Some(&depth) => {
                interpolations.pop();
                i = scan_template(bytes, i + 1, i, &mut out, &mut interpolations, depth);
                prev = Prev::Value;
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                prev = Prev::Punct(b);
                i += 1;
            }
            _ if is_ident_byte(b) => {
                let start = i;
                while i < bytes.len() && is_ident_byte(bytes[i]) {
                    i += 1;
                }
                prev = Prev::Word(start, i);
            }
            _ => {
                if !b.is_ascii_whitespace() {
                    prev = if b == b')' || b == b']' {
                        Prev::Value
                    } else {
                        Prev::Punct(b)
                    };
                }
                i += 1;
            }
        }
    }

    out
}

fn regex_allowed(bytes: &[u8], prev: Prev) -> bool {
    match prev {
        Prev::Start => true,
        Prev::Punct(p) => REGEX_PRECEDERS.contains(&p),
        Prev::Word(start, end) => std::str::from_utf8(&bytes[start..end])
            .map(|w| REGEX_KEYWORDS.contains(&w))
            .unwrap_or(false),
        Prev::Value => false,
    }
}

fn fill(out: &mut [Region], start: usize, end: usize, region: Region) {
    let end = end.min(out.len());
    for slot in &mut out[start..end] {
        *slot = region;
    }
}

fn find_bytes(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return j,
            c if c == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

/// Scan template text starting at `from`; marks `mark_start..` as literal up
/// to and including the closing backtick or an opening `${`.
fn scan_template(
    bytes: &[u8],
    from: usize,
    mark_start: usize,
    out: &mut [Region],
    interpolations: &mut Vec<usize>,
    depth: usize,
) -> usize {
    let mut j = from;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'`' => {
                fill(out, mark_start, j + 1, Region::Literal);
                return j + 1;
            }
            b'$' if bytes.get(j + 1) == Some(&b'{') => {
                fill(out, mark_start, j + 2, Region::Literal);
                interpolations.push(depth);
                return j + 2;
            }
            _ => j += 1,
        }
    }
    fill(out, mark_start, bytes.len(), Region::Literal);
    bytes.len()
}

fn skip_regex(bytes: &[u8], start: usize) -> Option<usize> {
    let mut j = start + 1;
    let mut in_class = false;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return None,
            b'[' => {
                in_class = true;
                j += 1;
            }
            b']' => {
                in_class = false;
                j += 1;
            }
            b'/' if !in_class => {
                j += 1;
                while j < bytes.len() && bytes[j].is_ascii_alphabetic() {
                    j += 1;
                }
                return Some(j);
            }
            _ => j += 1,
        }
    }
    None
}

/// Whether `b` can appear in a JavaScript identifier (ASCII subset)
#[inline]
#[must_use]
pub fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Whether `text` is a plain identifier
#[must_use]
pub fn is_identifier(text: &str) -> bool {
    let bytes = text.as_bytes();
    !bytes.is_empty() && !bytes[0].is_ascii_digit() && bytes.iter().all(|&b| is_ident_byte(b))
}

fn closer_for(open: u8) -> Option<u8> {
    match open {
        b'(' => Some(b')'),
        b'[' => Some(b']'),
        b'{' => Some(b'}'),
        _ => None,
    }
}

/// Index of the delimiter closing the one at `open`
///
/// Returns `None` when `open` is not an opening delimiter in code, when the
/// delimiters never balance, or when a closer of the wrong type is met.
#[must_use]
pub fn find_matching_close(text: &str, open: usize) -> Option<usize> {
    let regions = RegionMap::new(text);
    matching_close(text, &regions, open)
}

/// [`find_matching_close`] against a precomputed region map
#[must_use]
pub fn matching_close(text: &str, regions: &RegionMap, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if !regions.is_code(open) {
        return None;
    }
    let mut stack = vec![closer_for(*bytes.get(open)?)?];

    for (i, &b) in bytes.iter().enumerate().skip(open + 1) {
        if !regions.is_code(i) {
            continue;
        }
        match b {
            b'(' | b'[' | b'{' => stack.push(closer_for(b)?),
            b')' | b']' | b'}' => {
                if stack.pop() != Some(b) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split `text` on `sep` at bracket depth zero, outside literals and comments
///
/// Pieces are trimmed; a trailing empty piece (trailing comma) is dropped.
#[must_use]
pub fn split_top_level(text: &str, sep: u8) -> Vec<&str> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let regions = RegionMap::new(text);
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, &b) in text.as_bytes().iter().enumerate() {
        if !regions.is_code(i) {
            continue;
        }
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            _ if b == sep && depth == 0 => {
                pieces.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = text[start..].trim();
    if !last.is_empty() {
        pieces.push(last);
    }
    pieces
}

/// Position of the first `needle` byte at depth zero in code
#[must_use]
pub fn find_top_level(text: &str, needle: u8) -> Option<usize> {
    let regions = RegionMap::new(text);
    let mut depth = 0usize;
    for (i, &b) in text.as_bytes().iter().enumerate() {
        if !regions.is_code(i) {
            continue;
        }
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            _ if b == needle && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

const CONTINUATION_ENDINGS: &[u8] = b"([{,=+-*/&|?:<>!";
const CONTINUATION_KEYWORDS: &[&str] = &["else", "catch", "finally"];

/// Split a block body into top-level statements
///
/// Statements end at `;` or at a newline, unless the next line continues the
/// expression (leading `.`, `?`, `:`, `&&`, `||`, `else`/`catch`/`finally`)
/// or the current line ends in an operator. Returned statements are trimmed
/// and carry no trailing `;`. Comment-only lines are kept as statements.
#[must_use]
pub fn split_statements(body: &str) -> Vec<String> {
    let regions = RegionMap::new(body);
    let bytes = body.as_bytes();
    let mut statements = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut last_sig: Option<usize> = None;

    let push = |statements: &mut Vec<String>, piece: &str| {
        let piece = piece.trim();
        if !piece.is_empty() {
            statements.push(piece.to_string());
        }
    };

    for (i, &b) in bytes.iter().enumerate() {
        let region = regions.region(i);
        if region != Some(Region::Code) {
            if region != Some(Region::Comment) {
                last_sig = Some(i);
            }
            continue;
        }
        match b {
            b'(' | b'[' | b'{' => {
                depth += 1;
                last_sig = Some(i);
            }
            b')' | b']' | b'}' => {
                depth = depth.saturating_sub(1);
                last_sig = Some(i);
            }
            b';' if depth == 0 => {
                push(&mut statements, &body[start..i]);
                start = i + 1;
                last_sig = None;
            }
            b'\n' if depth == 0 => {
                if body[start..i].trim().is_empty() {
                    start = i + 1;
                    continue;
                }
                let ends_in_operator = last_sig.is_some_and(|p| {
                    regions.is_code(p) && CONTINUATION_ENDINGS.contains(&bytes[p])
                });
                if !ends_in_operator && !continues_on(&body[i + 1..]) {
                    push(&mut statements, &body[start..i]);
                    start = i + 1;
                    last_sig = None;
                }
            }
            _ if !b.is_ascii_whitespace() => last_sig = Some(i),
            _ => {}
        }
    }
    push(&mut statements, &body[start..]);
    statements
}

fn continues_on(rest: &str) -> bool {
    let next = rest.trim_start();
    if next.starts_with("...") {
        return false;
    }
    if next.starts_with('.')
        || next.starts_with('?')
        || next.starts_with(':')
        || next.starts_with("&&")
        || next.starts_with("||")
    {
        return true;
    }
    CONTINUATION_KEYWORDS.iter().any(|kw| {
        next.strip_prefix(kw)
            .is_some_and(|after| !after.bytes().next().is_some_and(is_ident_byte))
    })
}

/// Replace identifier `from` with `to` in code regions
///
/// Member accesses (`x.from`) are left alone; spread (`...from`) is replaced.
#[must_use]
pub fn replace_identifier(text: &str, from: &str, to: &str) -> String {
    if from.is_empty() || from == to {
        return text.to_string();
    }
    let regions = RegionMap::new(text);
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut search = 0;

    while let Some(found) = text[search..].find(from) {
        let pos = search + found;
        let end = pos + from.len();
        search = pos + 1;

        if !regions.is_code(pos) {
            continue;
        }
        let before_ok = pos == 0 || {
            let p = bytes[pos - 1];
            let spread = pos >= 3 && &text[pos - 3..pos] == "...";
            !is_ident_byte(p) && (p != b'.' || spread)
        };
        let after_ok = end >= bytes.len() || !is_ident_byte(bytes[end]);
        if before_ok && after_ok {
            out.push_str(&text[last..pos]);
            out.push_str(to);
            last = end;
            search = end;
        }
    }
    out.push_str(&text[last..]);
    out
}

/// Content of a quoted string literal (`'x'`, `"x"`, or `` `x` `` without
/// interpolation); escapes are left as written
#[must_use]
pub fn unquote(literal: &str) -> Option<&str> {
    let literal = literal.trim();
    let bytes = literal.as_bytes();
    if bytes.len() < 2 {
        return None;
    }
    let quote = bytes[0];
    if !matches!(quote, b'\'' | b'"' | b'`') || bytes[bytes.len() - 1] != quote {
        return None;
    }
    let inner = &literal[1..literal.len() - 1];
    if quote == b'`' && inner.contains("${") {
        return None;
    }
    if skip_quoted_any(bytes) != bytes.len() {
        return None;
    }
    Some(inner)
}

fn skip_quoted_any(bytes: &[u8]) -> usize {
    let quote = bytes[0];
    let mut j = 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            c if c == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

/// Single-quoted literal for `content`, escaping bare single quotes
#[must_use]
pub fn quote(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + 2);
    out.push('\'');
    let mut escaped = false;
    for c in content.chars() {
        if c == '\'' && !escaped {
            out.push('\\');
        }
        escaped = c == '\\' && !escaped;
        out.push(c);
    }
    out.push('\'');
    out
}

/// Whether `text` is exactly one regular expression literal
#[must_use]
pub fn is_regex_literal(text: &str) -> bool {
    let text = text.trim();
    text.starts_with('/')
        && !text.starts_with("//")
        && !text.starts_with("/*")
        && skip_regex(text.as_bytes(), 0) == Some(text.len())
}

/// Entries of an object literal, in source order
///
/// Shorthand properties map to themselves; spreads use the key `"..."`.
/// Returns `None` when `text` is not a single balanced `{ … }`.
#[must_use]
pub fn object_entries(text: &str) -> Option<Vec<(String, String)>> {
    let text = text.trim();
    if !text.starts_with('{') || find_matching_close(text, 0)? != text.len() - 1 {
        return None;
    }
    let inner = &text[1..text.len() - 1];
    let mut entries = Vec::new();
    for entry in split_top_level(inner, b',') {
        if let Some(spread) = entry.strip_prefix("...") {
            entries.push(("...".to_string(), spread.trim().to_string()));
            continue;
        }
        match find_top_level(entry, b':') {
            Some(colon) => {
                let key = entry[..colon].trim();
                let key = unquote(key).unwrap_or(key);
                entries.push((key.to_string(), entry[colon + 1..].trim().to_string()));
            }
            None => entries.push((entry.to_string(), entry.to_string())),
        }
    }
    Some(entries)
}

/// Leading whitespace of the line containing `pos`
#[must_use]
pub fn line_indent(text: &str, pos: usize) -> &str {
    let line_start = text[..pos.min(text.len())].rfind('\n').map_or(0, |p| p + 1);
    let line = &text[line_start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// 1-based line number of `pos`
#[must_use]
pub fn line_number(text: &str, pos: usize) -> usize {
    text[..pos.min(text.len())].bytes().filter(|&b| b == b'\n').count() + 1
}

/// Strip blank edge lines and the common indentation of a block body
#[must_use]
pub fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return String::new();
    };
    let lines = &lines[first..=last];
    let common = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                ""
            } else {
                l.get(common..).unwrap_or_else(|| l.trim_start())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

/// Prefix every line after the first with `indent`
#[must_use]
pub fn reindent(snippet: &str, indent: &str) -> String {
    let mut out = String::with_capacity(snippet.len());
    for (i, line) in snippet.lines().enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(indent);
            }
        }
        out.push_str(line);
    }
    out
}

/// Code part of a statement whose last line may carry a `//` comment
///
/// Returns `(code, comment)`; `comment` includes the `//`.
#[must_use]
pub fn split_trailing_comment(statement: &str) -> (&str, Option<&str>) {
    let regions = RegionMap::new(statement);
    let line_start = statement.rfind('\n').map_or(0, |p| p + 1);
    let bytes = statement.as_bytes();
    for i in line_start..bytes.len() {
        if regions.region(i) == Some(Region::Comment)
            && bytes[i] == b'/'
            && bytes.get(i + 1) == Some(&b'/')
        {
            return (statement[..i].trim_end(), Some(&statement[i..]));
        }
    }
    (statement, None)
}

/// Whether a statement consists only of comments
#[must_use]
pub fn is_comment_only(statement: &str) -> bool {
    let regions = RegionMap::new(statement);
    statement
        .bytes()
        .enumerate()
        .all(|(i, b)| b.is_ascii_whitespace() || regions.region(i) == Some(Region::Comment))
}

/// Terminate a statement with `;` unless it is a block, a comment or already
/// terminated; a trailing line comment stays after the semicolon
#[must_use]
pub fn terminate(statement: &str) -> String {
    let statement = statement.trim();
    if statement.is_empty() || is_comment_only(statement) {
        return statement.to_string();
    }
    let (code, comment) = split_trailing_comment(statement);
    if code.ends_with(';') || code.ends_with('{') || (code.ends_with('}') && closes_block(code)) {
        return statement.to_string();
    }
    match comment {
        Some(comment) => format!("{code}; {comment}"),
        None => format!("{code};"),
    }
}

/// Whether the `}` ending `code` closes a statement block (`if`/`for`/
/// function/arrow body, `else`, `try`, class) rather than an object literal
fn closes_block(code: &str) -> bool {
    let regions = RegionMap::new(code);
    let bytes = code.as_bytes();
    let mut depth = 0usize;
    let mut open = None;
    for i in (0..bytes.len()).rev() {
        if !regions.is_code(i) {
            continue;
        }
        match bytes[i] {
            b'}' | b')' | b']' => depth += 1,
            b'{' | b'(' | b'[' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    open = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(open) = open else {
        return true;
    };
    let head = code[..open].trim_end();
    let ends_with_keyword = |keyword: &str| {
        head.strip_suffix(keyword)
            .is_some_and(|rest| !rest.bytes().last().is_some_and(is_ident_byte))
    };
    head.is_empty()
        || head.ends_with(')')
        || head.ends_with("=>")
        || ["else", "try", "finally", "do"].into_iter().any(ends_with_keyword)
        || head.starts_with("class ")
}

/// Whether `needle` occurs in a code region of `text`
#[must_use]
pub fn contains_in_code(text: &str, needle: &str) -> bool {
    let regions = RegionMap::new(text);
    text.match_indices(needle)
        .any(|(pos, _)| regions.is_code(pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn matching_close_skips_literals() {
        let text = "foo('a)', \"b(\", `c${d(1)}`) + 1";
        let close = find_matching_close(text, 3).unwrap();
        assert_eq!(&text[close..], ") + 1");
    }

    #[test]
    fn matching_close_skips_comments_and_regex() {
        let text = "f(/\\)/.test(x), /* ) */ y // )\n)";
        let close = find_matching_close(text, 1).unwrap();
        assert_eq!(close, text.len() - 1);
    }

    #[test]
    fn matching_close_rejects_mismatch_and_truncation() {
        assert_eq!(find_matching_close("f(a]", 1), None);
        assert_eq!(find_matching_close("f(a, {b: 1}", 1), None);
        assert_eq!(find_matching_close("abc", 0), None);
    }

    #[test]
    fn division_is_not_regex() {
        let text = "g(a / 2, b / 3)";
        assert_eq!(find_matching_close(text, 1), Some(text.len() - 1));
    }

    #[test]
    fn template_interpolation_is_code() {
        let regions = RegionMap::new("`a${b}c`");
        assert_eq!(regions.region(0), Some(Region::Literal));
        assert_eq!(regions.region(4), Some(Region::Code));
        assert_eq!(regions.region(5), Some(Region::Literal));
    }

    #[test]
    fn split_arguments() {
        let args = split_top_level("'GET', '/api/a,b', { x: [1, 2] },", b',');
        assert_eq!(args, vec!["'GET'", "'/api/a,b'", "{ x: [1, 2] }"]);
        assert!(split_top_level("   ", b',').is_empty());
    }

    #[test]
    fn statements_split_on_semicolons_and_lines() {
        let body = "const a = 1;\ncy.get('x')\n  .click()\nexpect(a)\n  .to.equal(1)\nif (a) {\n  b();\n} else {\n  c();\n}";
        let statements = split_statements(body);
        assert_eq!(
            statements,
            vec![
                "const a = 1",
                "cy.get('x')\n  .click()",
                "expect(a)\n  .to.equal(1)",
                "if (a) {\n  b();\n} else {\n  c();\n}",
            ]
        );
    }

    #[test]
    fn statements_continue_after_operator() {
        let statements = split_statements("const total = a +\n  b\nlog(total)");
        assert_eq!(statements, vec!["const total = a +\n  b", "log(total)"]);
    }

    #[test]
    fn identifier_replacement_respects_boundaries() {
        let out = replace_identifier("$el.text() + x.$el + '$el' + $elem + [...$el]", "$el", "el");
        assert_eq!(out, "el.text() + x.$el + '$el' + $elem + [...el]");
    }

    #[test]
    fn unquote_and_quote() {
        assert_eq!(unquote("'/api/users'"), Some("/api/users"));
        assert_eq!(unquote("\"a\""), Some("a"));
        assert_eq!(unquote("`a${b}`"), None);
        assert_eq!(unquote("'a' + 'b'"), None);
        assert_eq!(quote("it's"), "'it\\'s'");
    }

    #[test]
    fn regex_literal_detection() {
        assert!(is_regex_literal("/\\/api\\/users/i"));
        assert!(!is_regex_literal("'/api'"));
        assert!(!is_regex_literal("/a/ + b"));
    }

    #[test]
    fn object_entries_parse() {
        let entries = object_entries("{ statusCode: 200, 'body': { ok: true }, delay }").unwrap();
        assert_eq!(
            entries,
            vec![
                ("statusCode".to_string(), "200".to_string()),
                ("body".to_string(), "{ ok: true }".to_string()),
                ("delay".to_string(), "delay".to_string()),
            ]
        );
        assert!(object_entries("[1, 2]").is_none());
    }

    #[test]
    fn dedent_and_reindent() {
        let body = "\n    a();\n      b();\n    c();\n  ";
        assert_eq!(dedent(body), "a();\n  b();\nc();");
        assert_eq!(reindent("a\nb\n\nc", "  "), "a\n  b\n\n  c");
    }

    #[test]
    fn terminate_statements() {
        assert_eq!(terminate("a()"), "a();");
        assert_eq!(terminate("a(); "), "a();");
        assert_eq!(terminate("if (x) { y(); }"), "if (x) { y(); }");
        assert_eq!(terminate("a() // note"), "a(); // note");
        assert_eq!(terminate("// only"), "// only");
    }

    #[test]
    fn object_literals_are_terminated() {
        assert_eq!(terminate("const user = { name: 'Ada' }"), "const user = { name: 'Ada' };");
        assert_eq!(terminate("x = { a: { b: 1 } } // note"), "x = { a: { b: 1 } }; // note");
        assert_eq!(terminate("try { a(); } finally { b(); }"), "try { a(); } finally { b(); }");
        assert_eq!(terminate("if (a) { b(); } else { c(); }"), "if (a) { b(); } else { c(); }");
        assert_eq!(terminate("const f = () => { go(); }"), "const f = () => { go(); }");
        assert_eq!(terminate("{ a(); }"), "{ a(); }");
        assert_eq!(terminate("const s = `${a}`"), "const s = `${a}`;");
    }

    #[test]
    fn line_helpers() {
        let text = "a\n    b\n\tc";
        assert_eq!(line_number(text, 0), 1);
        assert_eq!(line_number(text, 6), 2);
        assert_eq!(line_indent(text, 6), "    ");
        assert_eq!(line_indent(text, text.len() - 1), "\t");
    }

    #[test]
    fn code_search_ignores_comments() {
        assert!(!contains_in_code("// cy.get('a')\n'cy.get'", "cy."));
        assert!(contains_in_code("x; cy.get('a')", "cy."));
    }
}
