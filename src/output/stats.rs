//! Crawl report collected by the coordinator
//!
//! This module records what happened during a run and prints a summary.

use chrono::{DateTime, Utc};

/// A page that could not be snapshotted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    /// Canonical path of the page
    pub path: String,

    /// Human-readable reason
    pub message: String,
}

/// Outcome of a crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished
    pub finished_at: Option<DateTime<Utc>>,

    /// Paths emitted to the snapshot handler, in order
    pub emitted: Vec<String>,

    /// Paths skipped because they matched an exclusion pattern
    pub excluded: Vec<String>,

    /// Pages that failed to render, transform, or persist
    pub failures: Vec<PageFailure>,

    /// Whether the run was cancelled before the queue emptied
    pub cancelled: bool,
}

impl CrawlReport {
    /// Creates a report for a run starting now
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            emitted: Vec::new(),
            excluded: Vec::new(),
            failures: Vec::new(),
            cancelled: false,
        }
    }

    pub fn record_failure(&mut self, path: &str, message: impl ToString) {
        self.failures.push(PageFailure {
            path: path.to_string(),
            message: message.to_string(),
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration of the run, once finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|finished| finished - self.started_at)
    }

    /// Number of pages that were claimed and attempted
    pub fn attempted(&self) -> usize {
        self.emitted.len() + self.failures.len()
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.attempted();
        if attempted == 0 {
            return 0.0;
        }
        (self.emitted.len() as f64 / attempted as f64) * 100.0
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Snapshot Report ===\n");

    println!("Overview:");
    println!("  Pages snapshotted: {}", report.emitted.len());
    println!("  Pages failed: {}", report.failures.len());
    println!("  Paths excluded: {}", report.excluded.len());
    if let Some(duration) = report.duration() {
        println!("  Duration: {:.1}s", duration.num_milliseconds() as f64 / 1000.0);
    }
    if report.cancelled {
        println!("  Cancelled before the queue was exhausted");
    }
    println!();

    if !report.failures.is_empty() {
        println!("Failures ({}):", report.failures.len());
        for failure in &report.failures {
            println!("  - {}: {}", failure.path, failure.message);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages snapshotted)",
        report.success_rate(),
        report.emitted.len(),
        report.attempted()
    );
}
