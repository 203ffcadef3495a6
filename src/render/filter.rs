use crate::url::{authority, PatternSet};
use std::sync::Arc;
use url::Url;

/// Decides which sub-resources an engine may fetch while loading a page
///
/// A sub-resource is fetched only if it lives on the page's own host and
/// its path matches none of the configured skip patterns. Everything else
/// resolves to an empty response, so a render never makes uncontrolled
/// cross-origin calls and known-problematic assets (analytics beacons and
/// the like) cannot block readiness.
#[derive(Debug, Clone)]
pub struct ResourceFilter {
    authority: Option<String>,
    skip: Arc<PatternSet>,
}

impl ResourceFilter {
    /// Creates a filter for resources requested by `page`
    pub fn new(page: &Url, skip: Arc<PatternSet>) -> Self {
        Self {
            authority: authority(page),
            skip,
        }
    }

    /// Returns true if the engine should fetch `resource` normally
    pub fn should_fetch(&self, resource: &Url) -> bool {
        if self.skip.matches(resource.path()) {
            tracing::trace!("Skipping resource by pattern: {}", resource);
            return false;
        }

        let allowed = self.authority.is_some() && authority(resource) == self.authority;
        if !allowed {
            tracing::trace!("Skipping cross-origin resource: {}", resource);
        }
        allowed
    }
}
