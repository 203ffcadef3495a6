//! Removal of build-output script bundles from serialized snapshots
//!
//! A snapshot that still references the client bundles would re-run the
//! application when served. Script elements whose `src` file name matches
//! a file in one of the configured build directories are removed from the
//! serialized output. The in-memory document is left untouched, so link
//! discovery still sees every element.

use crate::config::BundleSettings;
use crate::SnapshotError;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// Strips known bundle `<script>` elements during serialization
#[derive(Debug, Clone)]
pub struct BundleStripper {
    settings: BundleSettings,
}

impl BundleStripper {
    pub fn new(settings: BundleSettings) -> Self {
        Self { settings }
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.strip
    }

    /// Lists the bundle file names to strip
    ///
    /// Every file directly inside an include directory counts, minus those
    /// whose full path or bare file name matches an exclusion pattern.
    pub fn bundle_names(&self) -> Result<HashSet<String>, SnapshotError> {
        let mut names = HashSet::new();

        for dir in &self.settings.include {
            let entries =
                std::fs::read_dir(dir).map_err(|source| unavailable(dir, source))?;

            for entry in entries {
                let entry = entry.map_err(|source| unavailable(dir, source))?;
                let path = entry.path();
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };

                let full_path = path.to_string_lossy();
                if self.settings.exclude.matches(&full_path) || self.settings.exclude.matches(name) {
                    tracing::trace!("Keeping bundle {}", full_path);
                    continue;
                }

                names.insert(name.to_string());
            }
        }

        Ok(names)
    }

    /// Serializes `document`, leaving out script elements that load a known bundle
    ///
    /// `source` is the engine's own serialization of the same document and is
    /// returned unchanged when stripping is disabled.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The HTML to emit
    /// * `Err(SnapshotError::BundleListUnavailable)` - An include directory could not be listed
    pub fn serialize(
        &self,
        document: &Html,
        page_url: &Url,
        source: &str,
    ) -> Result<String, SnapshotError> {
        if !self.settings.strip {
            return Ok(source.to_string());
        }

        let bundles = self.bundle_names()?;
        Ok(strip_scripts(document, page_url, &bundles))
    }
}

/// Returns the serialization of `document` without scripts whose src file name is in `bundles`
pub fn strip_scripts(document: &Html, page_url: &Url, bundles: &HashSet<String>) -> String {
    let selector = match Selector::parse("script[src]") {
        Ok(selector) => selector,
        Err(_) => return document.html(),
    };

    let doomed: Vec<_> = document
        .select(&selector)
        .filter(|script| {
            script
                .value()
                .attr("src")
                .and_then(|src| script_file_name(page_url, src))
                .is_some_and(|name| bundles.contains(&name))
        })
        .map(|script| script.id())
        .collect();

    if doomed.is_empty() {
        return document.html();
    }

    tracing::debug!("Stripping {} bundle script(s) from {}", doomed.len(), page_url);

    let mut stripped = document.clone();
    for id in doomed {
        if let Some(mut node) = stripped.tree.get_mut(id) {
            node.detach();
        }
    }
    stripped.html()
}

/// Final path segment of a script src resolved against the page
fn script_file_name(page_url: &Url, src: &str) -> Option<String> {
    let resolved = page_url.join(src).ok()?;
    let name = resolved.path_segments()?.last()?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn unavailable(dir: &Path, source: std::io::Error) -> SnapshotError {
    SnapshotError::BundleListUnavailable {
        dir: dir.to_path_buf(),
        source,
    }
}
