//! Import injection
//!
//! Lines are inserted after the last import (or `require`) statement, or at
//! the top of the file when there is none. Named imports only add the names
//! the file does not already import from that module.

use once_cell::sync::Lazy;
use regex::Regex;

static NAMED_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s*(?:type\s+)?\{([^}]*)\}\s*from\s*['"]([^'"]+)['"]"#)
        .expect("named import regex is valid")
});

static REQUIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:const|let|var)\s+[^=]+=\s*require\(").expect("require regex is valid")
});

/// `(names, module)` of a named import line
fn named_import(line: &str) -> Option<(Vec<String>, String)> {
    let caps = NAMED_IMPORT.captures(line)?;
    let names = caps[1]
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect();
    Some((names, caps[2].to_string()))
}

/// Names `source` already imports from `module`
fn imported_names(source: &str, module: &str) -> Vec<String> {
    NAMED_IMPORT
        .captures_iter(source)
        .filter(|caps| &caps[2] == module)
        .flat_map(|caps| {
            caps[1]
                .split(',')
                .map(|n| n.split(" as ").last().unwrap_or(n).trim().to_string())
                .filter(|n| !n.is_empty())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// The part of `line` still missing from `source`, if any
fn missing_part(source: &str, line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || source.lines().any(|l| l.trim() == line) {
        return None;
    }
    let Some((names, module)) = named_import(line) else {
        return Some(line.to_string());
    };
    let present = imported_names(source, &module);
    if present.is_empty() {
        return Some(line.to_string());
    }
    let missing: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|n| !present.iter().any(|p| p == n))
        .collect();
    if missing.is_empty() {
        None
    } else {
        Some(format!("import {{ {} }} from '{module}';", missing.join(", ")))
    }
}

fn starts_import(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("import ") || line.starts_with("import{") || REQUIRE.is_match(line)
}

/// Byte offset just past the last import statement
fn after_last_import(source: &str) -> Option<usize> {
    let mut offset = 0;
    let mut end = None;
    let mut open = false;
    for line in source.split_inclusive('\n') {
        let trimmed = line.trim();
        if open {
            if trimmed.contains('}') || trimmed.contains(" from ") || trimmed.ends_with(';') {
                open = false;
                end = Some(offset + line.len());
            }
        } else if starts_import(line) {
            open = trimmed.contains('{') && !trimmed.contains('}');
            if !open {
                end = Some(offset + line.len());
            }
        }
        offset += line.len();
    }
    end
}

/// Add every missing line of `lines` to `source`
///
/// Returns the new text and the lines actually inserted.
#[must_use]
pub fn inject_imports(source: &str, lines: &[String]) -> (String, Vec<String>) {
    let mut inserted: Vec<String> = Vec::new();
    let mut scratch = source.to_string();
    for line in lines {
        if let Some(part) = missing_part(&scratch, line) {
            scratch.push('\n');
            scratch.push_str(&part);
            inserted.push(part);
        }
    }
    if inserted.is_empty() {
        return (source.to_string(), inserted);
    }

    let block = inserted.join("\n");
    let out = match after_last_import(source) {
        Some(end) => {
            let (head, tail) = source.split_at(end);
            if head.ends_with('\n') {
                format!("{head}{block}\n{tail}")
            } else {
                format!("{head}\n{block}{tail}")
            }
        }
        None if source.trim().is_empty() => format!("{block}\n"),
        None => format!("{block}\n\n{}", source.trim_start_matches('\n')),
    };
    (out, inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BASE: &str = "import { test, expect } from '@playwright/test';";

    fn inject(source: &str, lines: &[&str]) -> String {
        let lines: Vec<String> = lines.iter().map(|l| (*l).to_string()).collect();
        inject_imports(source, &lines).0
    }

    #[test]
    fn prepends_without_imports() {
        assert_eq!(
            inject("test('a', async () => {});", &[BASE]),
            format!("{BASE}\n\ntest('a', async () => {{}});")
        );
    }

    #[test]
    fn appends_after_last_import() {
        let source = "import { a } from './a';\nimport {\n  b,\n} from './b';\n\ntest('x', () => {});";
        assert_eq!(
            inject(source, &[BASE]),
            format!("import {{ a }} from './a';\nimport {{\n  b,\n}} from './b';\n{BASE}\n\ntest('x', () => {{}});")
        );
    }

    #[test]
    fn requires_count_as_imports() {
        let source = "const path = require('path');\nrun();";
        assert_eq!(inject(source, &[BASE]), format!("const path = require('path');\n{BASE}\nrun();"));
    }

    #[test]
    fn present_imports_are_skipped() {
        let source = format!("{BASE}\ntest('x', () => {{}});");
        assert_eq!(inject(&source, &[BASE]), source);
    }

    #[test]
    fn only_missing_names_are_added() {
        let source = "import { test } from '@playwright/test';\n";
        assert_eq!(
            inject(source, &[BASE]),
            "import { test } from '@playwright/test';\nimport { expect } from '@playwright/test';\n"
        );
    }

    #[test]
    fn duplicates_in_request_collapse() {
        let (out, inserted) = inject_imports("", &[BASE.to_string(), BASE.to_string()]);
        assert_eq!(inserted.len(), 1);
        assert_eq!(out, format!("{BASE}\n"));
    }
}
