//! Utility functions shared across the marketplace crate.

/// Normalise a navigable path for route matching.
///
/// Drops any query string or fragment, guarantees a leading `/` and strips
/// trailing slashes (except for the root itself).
pub fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim();
    let trimmed = trimmed.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Segment-aware prefix test: `/farmer` matches `/farmer` and `/farmer/x`
/// but not `/farmers`.
pub fn path_has_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
