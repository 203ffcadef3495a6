//! Compiled, immutable configuration for a single crawl run

use crate::config::types::Config;
use crate::url::{canonical_path, PatternSet};
use crate::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Everything the crawl core needs, resolved and pre-compiled once
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Origin every page is loaded from
    pub origin: Url,

    /// Canonical seed paths, in configuration order
    pub seeds: Vec<String>,

    /// Paths that are never crawled, seeds included
    pub exclude: PatternSet,

    /// Extension of rendered documents (e.g. ".html")
    pub page_extension: String,

    /// Delay between the render-complete signal and the snapshot
    pub settle_delay: Duration,

    /// Hard per-page render limit
    pub page_timeout: Option<Duration>,

    /// Sub-resource paths that are never fetched during render
    pub skip_resources: PatternSet,

    /// Script bundle stripping settings
    pub bundles: BundleSettings,
}

/// Compiled bundle stripping settings
#[derive(Debug, Clone, Default)]
pub struct BundleSettings {
    pub strip: bool,
    pub include: Vec<PathBuf>,
    pub exclude: PatternSet,
}

impl CrawlConfig {
    /// Compiles a validated [`Config`] into a [`CrawlConfig`]
    ///
    /// Seeds are canonicalized here, so a seed that cannot be resolved
    /// against the origin fails startup instead of the crawl.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let origin = Url::parse(&config.site.origin).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid origin '{}': {}", config.site.origin, e))
        })?;

        let mut seeds = Vec::with_capacity(config.site.seeds.len());
        for seed in &config.site.seeds {
            let canonical = canonical_path(&origin, "/", seed).ok_or_else(|| {
                ConfigError::InvalidUrl(format!("Seed '{}' cannot be resolved", seed))
            })?;
            seeds.push(canonical);
        }

        Ok(Self {
            origin,
            seeds,
            exclude: PatternSet::compile(&config.site.exclude)?,
            page_extension: config.site.page_extension.clone(),
            settle_delay: Duration::from_millis(config.render.settle_delay_ms),
            page_timeout: config.render.page_timeout_ms.map(Duration::from_millis),
            skip_resources: PatternSet::compile(&config.render.skip_resources)?,
            bundles: BundleSettings {
                strip: config.bundles.strip,
                include: config.bundles.include.iter().map(PathBuf::from).collect(),
                exclude: PatternSet::compile(&config.bundles.exclude)?,
            },
        })
    }

    /// Creates a configuration with defaults for the given origin and seeds
    pub fn new(origin: Url, seeds: Vec<String>) -> Self {
        Self {
            origin,
            seeds,
            exclude: PatternSet::default(),
            page_extension: ".html".to_string(),
            settle_delay: Duration::ZERO,
            page_timeout: None,
            skip_resources: PatternSet::default(),
            bundles: BundleSettings::default(),
        }
    }
}
