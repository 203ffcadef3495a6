//! Crawler module for discovering and snapshotting pages
//!
//! This module contains the core crawling logic, including:
//! - Link discovery on the rendered DOM
//! - Bundle script stripping for the emitted HTML
//! - Overall crawl coordination

mod bundles;
mod coordinator;
mod links;

pub use bundles::{strip_scripts, BundleStripper};
pub use coordinator::Coordinator;
pub use links::LinkExtractor;

use crate::config::CrawlConfig;
use crate::output::{CrawlReport, SnapshotHandler};
use crate::render::RenderEngine;
use crate::SnapshotError;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for a crawl. It will:
/// 1. Queue the configured seeds
/// 2. Render each queued path and wait for its render signal
/// 3. Follow same-origin links found on the rendered page
/// 4. Hand every snapshot to `handler`
///
/// # Arguments
///
/// * `config` - The compiled crawl configuration
/// * `engine` - The rendering engine
/// * `handler` - Receives one snapshot per canonical path
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The queue was exhausted
/// * `Err(SnapshotError)` - The run could not proceed at all
pub async fn crawl(
    config: CrawlConfig,
    engine: Arc<dyn RenderEngine>,
    handler: &mut dyn SnapshotHandler,
) -> Result<CrawlReport, SnapshotError> {
    Coordinator::new(config, engine).run(handler).await
}
