//! spa-snapshot: static pre-rendering for single-page applications
//!
//! This crate crawls a single-page application from a set of seed paths,
//! waits for each page to signal that client-side rendering is complete,
//! and emits a static HTML snapshot for every reachable same-origin page.

pub mod config;
pub mod crawler;
pub mod output;
pub mod render;
pub mod state;
pub mod url;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for spa-snapshot operations
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to load {path}: {source}")]
    Load {
        path: String,
        source: render::EngineError,
    },

    #[error("Render was never signaled for {path}; the page must call the render-complete hook")]
    RenderNotSignaled { path: String },

    #[error("Cannot list bundle directory {}: {source}", dir.display())]
    BundleListUnavailable {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("Timed out after {after:?} rendering {path}")]
    Timeout { path: String, after: Duration },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RunPhase,
        to: state::RunPhase,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

impl SnapshotError {
    /// Returns true if the error only affects the page being crawled
    pub fn is_page_failure(&self) -> bool {
        matches!(
            self,
            Self::Load { .. }
                | Self::RenderNotSignaled { .. }
                | Self::BundleListUnavailable { .. }
                | Self::Timeout { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid glob pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for spa-snapshot operations
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, CrawlConfig};
pub use crawler::Coordinator;
pub use output::{CrawlReport, PageResult, SnapshotHandler};
pub use render::{RenderEngine, Window};
pub use state::{CrawlState, RunPhase};
