//! Registrable-domain extraction from loosely formatted URLs.

/// Returns the last two dot-separated labels of the host in `url`.
///
/// Works on bare hosts as well as full URLs: the scheme (anything up to `//`),
/// path, query, fragment, userinfo and port are ignored. A host without a dot
/// is returned unchanged.
///
/// - `"http://sub.example.com/path"` → `"example.com"`
/// - `"example.com"` → `"example.com"`
/// - `"localhost"` → `"localhost"`
///
/// Multi-label public suffixes are not special-cased (`a.b.co.uk` → `co.uk`).
pub fn top_level_domain(url: &str) -> &str {
    let rest = match url.find("//") {
        Some(i) => &url[i + 2..],
        None => url,
    };
    let host_end = rest
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    let mut host = &rest[..host_end];
    if let Some(at) = host.rfind('@') {
        host = &host[at + 1..];
    }
    if let Some(colon) = host.rfind(':') {
        let port = &host[colon + 1..];
        if port.chars().all(|c| c.is_ascii_digit()) {
            host = &host[..colon];
        }
    }

    match host.rfind('.') {
        Some(last) => match host[..last].rfind('.') {
            Some(prev) => &host[prev + 1..],
            None => host,
        },
        None => host,
    }
}
