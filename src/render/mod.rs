//! Render contract between the crawler and a page rendering engine
//!
//! The engine itself (HTML parsing, script execution, DOM) is a capability
//! behind the [`RenderEngine`] and [`Window`] traits. This module defines:
//! - The render-complete handshake ([`RenderSignal`])
//! - Sub-resource filtering during load ([`ResourceFilter`])
//! - The readiness rules that decide when a page may be snapshotted
//!   ([`RenderContract`])
//! - A document-only engine over HTTP ([`HttpEngine`])

mod contract;
mod filter;
mod http;
mod signal;

pub use contract::{RenderContract, RenderedPage};
pub use filter::ResourceFilter;
pub use http::{build_http_client, HttpEngine};
pub use signal::{RenderSignal, RenderWaiter};

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// Errors reported by a rendering engine while loading a page
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("script error: {0}")]
    Script(String),
}

/// What the crawler hands to the engine for a single page load
#[derive(Debug, Clone)]
pub struct PageEnvironment {
    /// Must be exposed on the page's global context as the render-complete hook
    pub signal: RenderSignal,

    /// Must be consulted for every sub-resource request
    pub filter: ResourceFilter,
}

/// A rendering engine able to load a URL, execute its scripts, and expose the DOM
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Opens `url` in a new, isolated rendering context
    ///
    /// Resolves as soon as the window exists; loading continues in the
    /// background until [`Window::load_complete`] resolves.
    async fn open(&self, url: &Url, env: PageEnvironment) -> Result<Box<dyn Window>, EngineError>;
}

/// A live rendering context
#[async_trait]
pub trait Window: Send {
    /// Resolves when the engine's load lifecycle has ended
    async fn load_complete(&mut self) -> Result<(), EngineError>;

    /// Serializes the current DOM to HTML
    fn serialize(&self) -> String;

    /// Releases engine resources held by this window; idempotent
    fn close(&mut self);
}
