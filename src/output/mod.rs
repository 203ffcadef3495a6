//! Output module for persisting snapshots and reporting on a run
//!
//! This module handles:
//! - The snapshot handler interface the crawler emits pages to
//! - Writing snapshots into a static site directory
//! - Collecting snapshots in memory
//! - The end-of-run report

mod filesystem;
mod memory;
pub mod stats;
mod traits;

pub use filesystem::FileSystemWriter;
pub use memory::MemoryCollector;
pub use stats::{print_report, CrawlReport, PageFailure};
pub use traits::{OutputError, OutputResult, PageResult, SnapshotHandler};
