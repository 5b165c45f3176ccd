/// Whether `url` starts with `http://` or `https://` (ASCII case-insensitive).
pub fn has_scheme(url: &str) -> bool {
    let lower = |n: usize| url.get(..n).map(str::to_ascii_lowercase);
    lower(7).as_deref() == Some("http://") || lower(8).as_deref() == Some("https://")
}

/// Trims `url` and prefixes `http://` when it has no scheme; `None` for blank input.
pub fn normalize_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    if has_scheme(url) {
        Some(url.to_string())
    } else {
        Some(format!("http://{url}"))
    }
}
