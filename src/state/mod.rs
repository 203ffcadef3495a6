//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `RunPhase`: Lifecycle of a single crawl run (idle, running, completed)
//! - `CrawlState`: The path queue and processed set owned by the coordinator

mod crawl_state;
mod run_phase;

// Re-export main types
pub use crawl_state::CrawlState;
pub use run_phase::RunPhase;
