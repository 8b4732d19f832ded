use std::sync::LazyLock;

use crate::error::Warnings;

static HEADER_LINE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r#"^\[([A-Za-z0-9_]+) "((?:[^"\\]|\\.)*)"\]$"#)
        .expect("valid header line regex")
});

/// Splits a game into its `[Key "Value"]` header tags and the movetext that follows.
///
/// Blank lines between tags are skipped. Header-looking lines that do not parse are
/// dropped with a warning. The first other non-blank line starts the body, which runs to
/// the end of the input.
pub fn split_headers_and_body(
    text: &str,
    warnings: &mut Warnings,
) -> (Vec<(String, String)>, String) {
    let mut headers = Vec::new();
    let mut lines = text.lines();
    let mut body: Vec<&str> = Vec::new();

    for line in lines.by_ref() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(caps) = HEADER_LINE_RE.captures(trimmed) {
            headers.push((caps[1].to_string(), unescape(&caps[2])));
            continue;
        }
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            warnings.push(&format!("Malformed header line '{trimmed}'"));
            continue;
        }
        body.push(line);
        break;
    }
    body.extend(lines);

    (headers, body.join("\n").trim().to_string())
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(next) = chars.next()
        {
            out.push(next);
            continue;
        }
        out.push(c);
    }
    out
}

pub(crate) fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
