//! Link discovery on rendered pages
//!
//! This module decides which in-page references are followable:
//! - `<a href="...">` anchors, then `<iframe src="...">` frames, in document order
//! - Same-origin relative references only (no scheme, no host)
//! - Resolved against the current page's path
//! - Empty extension or exactly the page extension
//! - Not excluded and not already processed

use crate::state::CrawlState;
use crate::url::{canonical_path, extension, relative_reference, PatternSet};
use scraper::{Html, Selector};
use url::Url;

/// Element/attribute pairs that reference other pages, in scan order
const REFERENCE_SOURCES: &[(&str, &str)] = &[("a", "href"), ("iframe", "src")];

/// Extracts new, followable paths from a rendered document
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    origin: Url,
    page_extension: String,
    exclude: PatternSet,
}

impl LinkExtractor {
    pub fn new(origin: Url, page_extension: impl Into<String>, exclude: PatternSet) -> Self {
        Self {
            origin,
            page_extension: page_extension.into(),
            exclude,
        }
    }

    /// Returns the followable canonical paths referenced by `document`
    ///
    /// Paths already claimed in `state` are dropped silently. A path
    /// referenced several times on the page is returned each time; the
    /// crawl state claims it once.
    ///
    /// # Example
    ///
    /// ```
    /// use scraper::Html;
    /// use spa_snapshot::crawler::LinkExtractor;
    /// use spa_snapshot::state::CrawlState;
    /// use spa_snapshot::url::PatternSet;
    /// use url::Url;
    ///
    /// let origin = Url::parse("http://localhost:3000").unwrap();
    /// let extractor = LinkExtractor::new(origin, ".html", PatternSet::default());
    /// let document = Html::parse_document(r#"<a href="/about">About</a><a href="/cv.pdf">CV</a>"#);
    ///
    /// let links = extractor.extract(&document, "/", &CrawlState::new(Vec::new()));
    /// assert_eq!(links, vec!["/about".to_string()]);
    /// ```
    pub fn extract(&self, document: &Html, current_path: &str, state: &CrawlState) -> Vec<String> {
        let mut links = Vec::new();

        for (tag, attribute) in REFERENCE_SOURCES {
            let selector = match Selector::parse(&format!("{}[{}]", tag, attribute)) {
                Ok(selector) => selector,
                Err(_) => continue,
            };

            for element in document.select(&selector) {
                // References that open a new browsing context are not in-page navigation
                if element.value().attr("target") == Some("_blank") {
                    continue;
                }

                let Some(reference) = element.value().attr(attribute) else {
                    continue;
                };

                if let Some(path) = self.followable(reference, current_path, state) {
                    links.push(path);
                }
            }
        }

        links
    }

    /// Resolves a single reference, returning its canonical path if it should be crawled
    fn followable(&self, reference: &str, current_path: &str, state: &CrawlState) -> Option<String> {
        let relative = relative_reference(reference)?;
        let path = canonical_path(&self.origin, current_path, relative)?;

        let ext = extension(&path);
        if !ext.is_empty() && ext != self.page_extension {
            tracing::trace!("Not following {} (extension {})", path, ext);
            return None;
        }

        if state.is_processed(&path) {
            return None;
        }

        if self.exclude.matches(&path) {
            tracing::debug!("Excluded link: {}", path);
            return None;
        }

        Some(path)
    }
}
