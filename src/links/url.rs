// URL helpers for stored links: scheme normalization and favicon lookup

use url::Url;

/// Prefix `https://` unless the address already carries an http(s) scheme
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Favicon service URL for the link's host, if the URL parses
pub fn favicon_url(link_url: &str) -> Option<String> {
    let parsed = Url::parse(link_url).ok()?;
    let host = parsed.host_str()?;
    Some(format!(
        "https://www.google.com/s2/favicons?domain={}&sz=32",
        host
    ))
}
