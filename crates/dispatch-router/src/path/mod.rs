//! Request path utilities
//!
//! All functions are **pure**: given same input, always produce same output with no side effects.

use std::borrow::Cow;

/// Literal suffix that frames a request as AJAX
pub const AJAX_SUFFIX: &str = "/ajax";

/// Validates if a path is in canonical form
///
/// # Rules
///
/// - Must start with `/`
/// - Must not contain `//` or `\`
/// - Must not end with `/` (except root `/`)
/// - Must not be empty
///
/// # Examples
///
/// ```
/// use dispatch_router::path::is_valid_path;
///
/// assert!(is_valid_path("/"));
/// assert!(is_valid_path("/users/123"));
///
/// assert!(!is_valid_path(""));
/// assert!(!is_valid_path("about")); // Missing leading /
/// assert!(!is_valid_path("/about/")); // Trailing /
/// assert!(!is_valid_path("/about//page")); // Double //
/// ```
pub fn is_valid_path(path: &str) -> bool {
    if path.is_empty() || !path.starts_with('/') {
        return false;
    }

    if path.contains("//") || path.contains('\\') {
        return false;
    }

    path == "/" || !path.ends_with('/')
}

/// Normalize a path to canonical form
///
/// Returns `Cow::Borrowed` when input is already valid (zero allocations),
/// `Cow::Owned` when normalization was needed.
///
/// - Trailing slashes: `/path/` → `/path`
/// - Double slashes: `/path//to` → `/path/to`
/// - Backslashes: `\path\to` → `/path/to`
/// - Empty path: `` → `/`
///
/// # Examples
///
/// ```
/// use dispatch_router::path::normalize_path;
/// use std::borrow::Cow;
///
/// assert!(matches!(normalize_path("/about"), Cow::Borrowed("/about")));
/// assert_eq!(normalize_path("/about/"), "/about");
/// assert_eq!(normalize_path("\\users\\123"), "/users/123");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_valid_path(path) {
        return Cow::Borrowed(path);
    }

    let normalized = path
        .replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if normalized.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{}", normalized))
    }
}

/// Splits a request URL into its path and optional query string
///
/// ```
/// use dispatch_router::path::split_query;
///
/// assert_eq!(split_query("/users?page=2"), ("/users", Some("page=2")));
/// assert_eq!(split_query("/users"), ("/users", None));
/// ```
pub fn split_query(url: &str) -> (&str, Option<&str>) {
    match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    }
}

/// Strips the `/ajax` framing suffix from a path
///
/// Returns the path to match against and whether the suffix was present.
/// Stripping the whole path (`/ajax`) leaves the root path.
pub fn strip_ajax_suffix(path: &str) -> (Cow<'_, str>, bool) {
    match path.strip_suffix(AJAX_SUFFIX) {
        Some("") => (Cow::Borrowed("/"), true),
        Some(rest) => (Cow::Borrowed(rest), true),
        None => (Cow::Borrowed(path), false),
    }
}
