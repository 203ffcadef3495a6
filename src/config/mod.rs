//! Configuration module for spa-snapshot
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and compiling them into the immutable [`CrawlConfig`] used by a run.
//!
//! # Example
//!
//! ```no_run
//! use spa_snapshot::config::{load_config, CrawlConfig};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("snapshot.toml")).unwrap();
//! let crawl = CrawlConfig::from_config(&config).unwrap();
//! println!("Crawling {} from {} seeds", crawl.origin, crawl.seeds.len());
//! ```

mod crawl;
mod parser;
mod types;
mod validation;

// Re-export types
pub use crawl::{BundleSettings, CrawlConfig};
pub use types::{BundleConfig, Config, OutputConfig, RenderConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
