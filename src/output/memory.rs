use crate::output::{OutputResult, PageResult, SnapshotHandler};
use std::collections::BTreeMap;

/// Keeps every snapshot in memory, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryCollector {
    pages: BTreeMap<String, String>,
    order: Vec<String>,
}

impl MemoryCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot HTML for a path
    pub fn get(&self, path: &str) -> Option<&str> {
        self.pages.get(path).map(String::as_str)
    }

    /// Paths in the order they were emitted
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Consumes the collector, returning the path to HTML mapping
    pub fn into_pages(self) -> BTreeMap<String, String> {
        self.pages
    }
}

impl SnapshotHandler for MemoryCollector {
    fn handle(&mut self, page: PageResult) -> OutputResult<()> {
        self.order.push(page.path.clone());
        self.pages.insert(page.path, page.html);
        Ok(())
    }
}
