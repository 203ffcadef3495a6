use crate::render::{PageEnvironment, RenderEngine, RenderSignal, ResourceFilter, Window};
use crate::url::PatternSet;
use crate::SnapshotError;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Loads pages and decides when they are ready to snapshot
///
/// A page is ready only after it has invoked the render-complete hook and
/// the settle delay has elapsed. If the engine finishes loading without the
/// hook ever firing, the render fails with
/// [`SnapshotError::RenderNotSignaled`].
pub struct RenderContract {
    engine: Arc<dyn RenderEngine>,
    origin: Url,
    settle_delay: Duration,
    skip: Arc<PatternSet>,
}

/// A rendered page whose window is closed when the value is dropped
pub struct RenderedPage {
    path: String,
    url: Url,
    window: Box<dyn Window>,
}

impl RenderContract {
    pub fn new(
        engine: Arc<dyn RenderEngine>,
        origin: Url,
        settle_delay: Duration,
        skip: PatternSet,
    ) -> Self {
        Self {
            engine,
            origin,
            settle_delay,
            skip: Arc::new(skip),
        }
    }

    /// Renders a canonical root-relative path
    ///
    /// # Returns
    ///
    /// * `Ok(RenderedPage)` - The page signaled completion and has settled
    /// * `Err(SnapshotError::Load)` - The engine failed to load the page
    /// * `Err(SnapshotError::RenderNotSignaled)` - Load finished without the hook firing
    pub async fn render(&self, path: &str) -> Result<RenderedPage, SnapshotError> {
        let url = self.origin.join(path)?;
        let (signal, mut waiter) = RenderSignal::new();
        let env = PageEnvironment {
            signal,
            filter: ResourceFilter::new(&url, Arc::clone(&self.skip)),
        };

        tracing::debug!("Loading {}", url);
        let window = self
            .engine
            .open(&url, env)
            .await
            .map_err(|source| SnapshotError::Load {
                path: path.to_string(),
                source,
            })?;

        let mut page = RenderedPage {
            path: path.to_string(),
            url,
            window,
        };

        let load_result = tokio::select! {
            biased;
            _ = waiter.wait() => None,
            result = page.window.load_complete() => Some(result),
        };

        match load_result {
            None => {}
            // The hook may fire during the same poll that finishes the load
            Some(_) if waiter.has_fired() => {}
            Some(Ok(())) => {
                return Err(SnapshotError::RenderNotSignaled {
                    path: path.to_string(),
                })
            }
            Some(Err(source)) => {
                return Err(SnapshotError::Load {
                    path: path.to_string(),
                    source,
                })
            }
        }

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        Ok(page)
    }
}

impl RenderedPage {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Serializes the rendered DOM
    pub fn html(&self) -> String {
        self.window.serialize()
    }

    /// Releases the rendering context
    pub fn close(self) {}
}

impl Drop for RenderedPage {
    fn drop(&mut self) {
        self.window.close();
    }
}
