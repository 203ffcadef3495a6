use crate::url::same_origin;
use url::{ParseError, Url};

/// Resolves a reference against a page path and returns its canonical path
///
/// # Canonicalization Steps
///
/// 1. Resolve `base_path` against the origin, then `reference` against that
/// 2. Reject the result if it left the origin
/// 3. Remove dot segments (done by the URL parser)
/// 4. Drop the fragment
/// 5. Remove trailing slashes (except for root /)
/// 6. Keep the query string, if any
///
/// Pages are loaded and resolved at their canonical path, so a page
/// reached as `/blog/` has base `/blog` and its relative `first` resolves
/// to `/first`, not `/blog/first`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use spa_snapshot::url::canonical_path;
///
/// let origin = Url::parse("http://localhost:3000").unwrap();
/// assert_eq!(canonical_path(&origin, "/", "/foo/"), Some("/foo".to_string()));
/// assert_eq!(canonical_path(&origin, "/docs/intro", "guide"), Some("/docs/guide".to_string()));
/// assert_eq!(canonical_path(&origin, "/", "https://other.com/"), None);
/// ```
pub fn canonical_path(origin: &Url, base_path: &str, reference: &str) -> Option<String> {
    let base = origin.join(base_path).ok()?;
    let resolved = base.join(reference).ok()?;

    if !same_origin(origin, &resolved) {
        return None;
    }

    Some(path_of(&resolved))
}

/// Returns the canonical root-relative path (plus query) of a URL
pub fn path_of(url: &Url) -> String {
    let trimmed = url.path().trim_end_matches('/');
    let mut path = if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    };

    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }

    path
}

/// Returns the path part of a same-origin relative reference
///
/// References with an explicit scheme (`https:`, `mailto:`, ...) or an
/// explicit host (`//cdn.example.com/x`) are rejected, as are references
/// with no path component at all (`#top`, empty string). The fragment is
/// stripped from what remains.
pub fn relative_reference(reference: &str) -> Option<&str> {
    let reference = reference.trim();

    match Url::parse(reference) {
        Ok(_) => return None,
        Err(ParseError::RelativeUrlWithoutBase) => {}
        Err(_) => return None,
    }

    if reference.starts_with("//") || reference.starts_with("\\\\") {
        return None;
    }

    let without_fragment = reference.split('#').next().unwrap_or_default();
    if without_fragment.is_empty() {
        return None;
    }

    Some(without_fragment)
}

/// Returns the file extension of the last path segment, including the dot
///
/// The query string is ignored. A segment whose only dot is its first
/// character (e.g. `.well-known`) has no extension.
pub fn extension(path: &str) -> &str {
    let path = path.split('?').next().unwrap_or_default();
    let segment = path.rsplit('/').next().unwrap_or_default();

    match segment.rfind('.') {
        Some(0) | None => "",
        Some(index) => &segment[index..],
    }
}
