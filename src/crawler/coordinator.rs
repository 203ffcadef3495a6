//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates:
//! - Claiming paths from the queue (dedup and exclusion)
//! - Rendering each page through the render contract
//! - Stripping bundle scripts from the serialized snapshot
//! - Discovering new links on the rendered DOM
//! - Emitting snapshots to the handler
//! - Cancellation

use crate::config::CrawlConfig;
use crate::crawler::{BundleStripper, LinkExtractor};
use crate::output::{CrawlReport, PageResult, SnapshotHandler};
use crate::render::{RenderContract, RenderEngine, RenderedPage};
use crate::state::CrawlState;
use crate::SnapshotError;
use scraper::Html;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Main crawler coordinator structure
///
/// Owns the [`CrawlState`] for one run and drives the
/// load → transform → extract → emit cycle one path at a time, so at most
/// one rendering context is alive and traversal order is deterministic.
pub struct Coordinator {
    config: Arc<CrawlConfig>,
    contract: RenderContract,
    extractor: LinkExtractor,
    stripper: BundleStripper,
    state: CrawlState,
    cancel: CancellationToken,
    bundles_verified: bool,
}

impl Coordinator {
    /// Creates a new coordinator for a single run
    ///
    /// # Arguments
    ///
    /// * `config` - The compiled crawl configuration
    /// * `engine` - The rendering engine pages are loaded with
    pub fn new(config: CrawlConfig, engine: Arc<dyn RenderEngine>) -> Self {
        let contract = RenderContract::new(
            engine,
            config.origin.clone(),
            config.settle_delay,
            config.skip_resources.clone(),
        );
        let extractor = LinkExtractor::new(
            config.origin.clone(),
            config.page_extension.clone(),
            config.exclude.clone(),
        );
        let stripper = BundleStripper::new(config.bundles.clone());
        let state = CrawlState::new(config.seeds.clone());

        Self {
            config: Arc::new(config),
            contract,
            extractor,
            stripper,
            state,
            cancel: CancellationToken::new(),
            bundles_verified: false,
        }
    }

    /// Uses `token` to stop the run from outside
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Runs the crawl until the queue is exhausted
    ///
    /// Per-page failures are logged and recorded in the report; they never
    /// stop the run. The only errors returned are invalid phase transitions
    /// and a bundle directory that cannot be listed on the first attempt,
    /// which would fail for every page. The run ends in
    /// [`RunPhase::Completed`](crate::state::RunPhase) either way.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use spa_snapshot::config::{load_config, CrawlConfig};
    /// use spa_snapshot::crawler::Coordinator;
    /// use spa_snapshot::output::MemoryCollector;
    /// use spa_snapshot::render::HttpEngine;
    /// use std::path::Path;
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = load_config(Path::new("snapshot.toml"))?;
    /// let engine = Arc::new(HttpEngine::new(&config.render.user_agent)?);
    /// let mut coordinator = Coordinator::new(CrawlConfig::from_config(&config)?, engine);
    ///
    /// let mut pages = MemoryCollector::new();
    /// let report = coordinator.run(&mut pages).await?;
    /// println!("{} pages", report.emitted.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(
        &mut self,
        handler: &mut dyn SnapshotHandler,
    ) -> Result<CrawlReport, SnapshotError> {
        self.state.start()?;
        tracing::info!("Starting crawling {}", self.config.origin);

        let mut report = CrawlReport::start();

        loop {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let Some(path) = self.state.claim_next() else {
                break;
            };

            if self.config.exclude.matches(&path) {
                tracing::debug!("Skipping excluded path: {}", path);
                report.excluded.push(path);
                continue;
            }

            tracing::debug!("Processing {}", path);

            let rendered = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                result = self.render(&path) => Some(result),
            };

            let Some(rendered) = rendered else {
                tracing::warn!("Crawl cancelled while rendering {}", path);
                report.cancelled = true;
                break;
            };

            let page = match rendered {
                Ok(page) => page,
                Err(e) => {
                    if e.is_page_failure() {
                        tracing::warn!("{}", e);
                    } else {
                        tracing::error!("{}", e);
                    }
                    report.record_failure(&path, &e);
                    continue;
                }
            };

            let (snapshot, links) = match self.snapshot(page) {
                Ok(result) => result,
                Err(e @ SnapshotError::BundleListUnavailable { .. }) if !self.bundles_verified => {
                    tracing::error!("{}", e);
                    self.state.finish()?;
                    tracing::error!("Finished crawling: aborted on {}", path);
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    report.record_failure(&path, &e);
                    continue;
                }
            };

            let discovered = links
                .into_iter()
                .filter(|link| self.state.enqueue(link.clone()))
                .count();
            tracing::debug!("{} new link(s) queued from {}", discovered, path);

            match handler.handle(snapshot) {
                Ok(()) => report.emitted.push(path),
                Err(e) => {
                    tracing::error!("Failed to persist {}: {}", path, e);
                    report.record_failure(&path, &e);
                }
            }

            if report.attempted() % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages snapshotted, {} queued",
                    report.emitted.len(),
                    self.state.queued()
                );
            }
        }

        if report.cancelled {
            tracing::warn!("Crawl cancelled; no further paths will be claimed");
        }

        self.state.finish()?;
        report.finish();

        tracing::info!(
            "Finished crawling: {} pages snapshotted, {} failed",
            report.emitted.len(),
            report.failures.len()
        );

        Ok(report)
    }

    /// Renders one page, applying the per-page timeout if configured
    async fn render(&self, path: &str) -> Result<RenderedPage, SnapshotError> {
        match self.config.page_timeout {
            Some(after) => tokio::time::timeout(after, self.contract.render(path))
                .await
                .map_err(|_| SnapshotError::Timeout {
                    path: path.to_string(),
                    after,
                })?,
            None => self.contract.render(path).await,
        }
    }

    /// Serializes a rendered page and collects its links, then releases it
    ///
    /// Links come from the unstripped document; stripping only affects the
    /// emitted HTML.
    fn snapshot(&mut self, page: RenderedPage) -> Result<(PageResult, Vec<String>), SnapshotError> {
        let source = page.html();
        let document = Html::parse_document(&source);

        let html = self.stripper.serialize(&document, page.url(), &source)?;
        if self.stripper.is_enabled() {
            self.bundles_verified = true;
        }

        let links = self.extractor.extract(&document, page.path(), &self.state);
        let snapshot = PageResult {
            path: page.path().to_string(),
            html,
        };

        page.close();
        Ok((snapshot, links))
    }
}
