//! Writes snapshots into a static site directory

use crate::output::{OutputError, OutputResult, PageResult, SnapshotHandler};
use crate::url::extension;
use std::path::{Path, PathBuf};

/// Persists each snapshot as a file under an output directory
///
/// # Path Mapping
///
/// | Path | File |
/// |------|------|
/// | `/` | `<dir>/index.html` |
/// | `/about` | `<dir>/about/index.html` |
/// | `/docs/page.html` | `<dir>/docs/page.html` |
///
/// Paths with a query string have no file equivalent and are rejected.
#[derive(Debug, Clone)]
pub struct FileSystemWriter {
    root: PathBuf,
    page_extension: String,
    written: usize,
}

impl FileSystemWriter {
    pub fn new(root: impl Into<PathBuf>, page_extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            page_extension: page_extension.into(),
            written: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of snapshots written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Returns the file a canonical path is written to
    pub fn file_for(&self, path: &str) -> OutputResult<PathBuf> {
        if path.contains('?') {
            return Err(OutputError::UnmappablePath(path.to_string()));
        }

        let relative = path.trim_start_matches('/');
        if relative.split('/').any(|segment| segment == "..") {
            return Err(OutputError::UnmappablePath(path.to_string()));
        }

        let file = if relative.is_empty() {
            self.root.join("index.html")
        } else if extension(path) == self.page_extension {
            self.root.join(relative)
        } else {
            self.root.join(relative).join("index.html")
        };

        Ok(file)
    }
}

impl SnapshotHandler for FileSystemWriter {
    fn handle(&mut self, page: PageResult) -> OutputResult<()> {
        let file = self.file_for(&page.path)?;

        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file, page.html.as_bytes())?;

        self.written += 1;
        tracing::info!("Wrote {} -> {}", page.path, file.display());
        Ok(())
    }
}
