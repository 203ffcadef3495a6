//! URL handling module for spa-snapshot
//!
//! This module provides canonical path normalization, reference resolution,
//! the file extension rule, origin comparison, and compiled glob matching.

mod matcher;
mod normalize;

// Re-export main functions
pub use matcher::PatternSet;
pub use normalize::{canonical_path, extension, path_of, relative_reference};

use url::Url;

/// Returns the lowercase `host:port` authority of a URL
///
/// The port is always present, using the scheme's default when the URL
/// does not name one, so `http://example.com` and `http://example.com:80`
/// compare equal.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use spa_snapshot::url::authority;
///
/// let url = Url::parse("http://EXAMPLE.com/path").unwrap();
/// assert_eq!(authority(&url), Some("example.com:80".to_string()));
/// ```
pub fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    let port = url.port_or_known_default()?;
    Some(format!("{}:{}", host, port))
}

/// Returns true if both URLs share scheme, host and port
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme() && authority(a).is_some() && authority(a) == authority(b)
}
