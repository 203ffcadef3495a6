//! Snapshot handler trait and types
//!
//! This module defines the interface the crawler uses to hand finished
//! snapshots to whatever persists them.

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Cannot map path to an output file: {0}")]
    UnmappablePath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A rendered page ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    /// Canonical root-relative path the page was loaded from
    pub path: String,

    /// Serialized snapshot
    pub html: String,
}

/// Receives every successfully crawled page, once per canonical path
///
/// What the handler does with a page (write a file, keep it in memory,
/// upload it) is up to the implementation. An error is reported by the
/// crawler and does not stop the run.
pub trait SnapshotHandler {
    fn handle(&mut self, page: PageResult) -> OutputResult<()>;
}

impl<F> SnapshotHandler for F
where
    F: FnMut(PageResult) -> OutputResult<()>,
{
    fn handle(&mut self, page: PageResult) -> OutputResult<()> {
        self(page)
    }
}
