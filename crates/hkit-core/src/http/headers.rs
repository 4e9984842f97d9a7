//! Request header maps and their curl rendering.

use std::collections::HashMap;

/// Header name → value, the shape returned by the auth flow and accepted by
/// every request helper.
pub type HeaderMap = HashMap<String, String>;

/// Renders one header as a curl `Name: value` line.
pub(crate) fn header_line(name: &str, value: &str) -> String {
    format!("{}: {}", name.trim(), value.trim())
}

/// Renders `headers` sorted by name (stable wire order), followed by `extra`
/// lines verbatim. An `extra` line naming a header already present in
/// `headers` is skipped so callers can override defaults such as Content-Type.
pub(crate) fn header_lines(headers: &HeaderMap, extra: &[&str]) -> Vec<String> {
    let mut names: Vec<&String> = headers.keys().collect();
    names.sort();
    let mut lines: Vec<String> = names
        .into_iter()
        .map(|name| header_line(name, &headers[name]))
        .collect();
    for line in extra {
        let extra_name = line.split(':').next().unwrap_or("").trim();
        let overridden = headers
            .keys()
            .any(|name| name.trim().eq_ignore_ascii_case(extra_name));
        if !overridden {
            lines.push((*line).to_string());
        }
    }
    lines
}
