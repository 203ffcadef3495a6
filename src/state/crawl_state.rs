use crate::state::RunPhase;
use crate::SnapshotError;
use std::collections::{HashSet, VecDeque};

/// Traversal state of a single crawl run
///
/// Holds the FIFO queue of pending canonical paths and the set of paths
/// already claimed. A path is claimed (inserted into `processed`) when it
/// is dequeued, before its page is rendered, so it is acted on at most
/// once even if it is rediscovered or its render fails.
#[derive(Debug)]
pub struct CrawlState {
    phase: RunPhase,
    queue: VecDeque<String>,
    processed: HashSet<String>,
}

impl CrawlState {
    /// Creates an idle state seeded with canonical paths, in order
    pub fn new<I>(seeds: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            phase: RunPhase::Idle,
            queue: seeds.into_iter().collect(),
            processed: HashSet::new(),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Moves the run from `Idle` to `Running`
    pub fn start(&mut self) -> Result<(), SnapshotError> {
        self.transition(RunPhase::Running)
    }

    /// Moves the run from `Running` to `Completed`
    pub fn finish(&mut self) -> Result<(), SnapshotError> {
        self.transition(RunPhase::Completed)
    }

    fn transition(&mut self, next: RunPhase) -> Result<(), SnapshotError> {
        if !self.phase.can_transition_to(next) {
            return Err(SnapshotError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Dequeues and claims the next unprocessed path
    ///
    /// Paths already claimed are dropped from the front of the queue
    /// without side effects. Returns `None` once the queue is exhausted.
    pub fn claim_next(&mut self) -> Option<String> {
        while let Some(path) = self.queue.pop_front() {
            if self.processed.insert(path.clone()) {
                return Some(path);
            }
        }
        None
    }

    /// Appends a discovered path unless it has already been claimed
    ///
    /// Returns true if the path was queued.
    pub fn enqueue(&mut self, path: String) -> bool {
        if self.processed.contains(&path) {
            return false;
        }
        self.queue.push_back(path);
        true
    }

    pub fn is_processed(&self, path: &str) -> bool {
        self.processed.contains(path)
    }

    /// Number of paths waiting in the queue (may include duplicates)
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Number of paths claimed so far
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }
}
