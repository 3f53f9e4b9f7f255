// Floatshell address bar input handling
// Turns whatever the user typed into something a content surface can load.

use url::form_urlencoded;

/// Query endpoint used when the input does not look like an address.
pub const SEARCH_ENDPOINT: &str = "https://duckduckgo.com/?q=";

/// Normalizes address bar input into a loadable url.
///
/// Empty input yields `None` so callers can substitute their landing page.
pub fn normalize_url(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with("about:") || trimmed.starts_with("data:") || trimmed.starts_with("file://") {
        return Some(trimmed.to_string());
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Some(trimmed.to_string());
    }
    if looks_like_host(trimmed) {
        return Some(format!("https://{}", trimmed));
    }
    let query: String = form_urlencoded::byte_serialize(trimmed.as_bytes()).collect();
    Some(format!("{}{}", SEARCH_ENDPOINT, query))
}

fn looks_like_host(input: &str) -> bool {
    if input.contains(' ') {
        return false;
    }
    let host = input.split('/').next().unwrap_or(input);
    host.contains('.') || host.starts_with("localhost")
}

/// Fallback title derived from a url, used until the page reports one.
pub fn title_from_url(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .split('/')
        .next()
        .filter(|host| !host.is_empty())
        .unwrap_or(url)
        .to_string()
}
