//! Document-only rendering engine over HTTP
//!
//! This engine fetches the page document with the browser `Accept` header
//! and exposes it as-is. It does not execute scripts or fetch
//! sub-resources, so it suits applications that are already rendered on
//! the server, and smoke-testing a crawl configuration. A received
//! document counts as rendered: the engine fires the render-complete hook
//! itself once the body has arrived.

use crate::render::{EngineError, PageEnvironment, RenderEngine, Window};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const DOCUMENT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use spa_snapshot::render::build_http_client;
///
/// let client = build_http_client("spa-snapshot/1.0").unwrap();
/// ```
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rendering engine that loads documents with `reqwest`
#[derive(Debug, Clone)]
pub struct HttpEngine {
    client: Client,
}

impl HttpEngine {
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RenderEngine for HttpEngine {
    async fn open(&self, url: &Url, env: PageEnvironment) -> Result<Box<dyn Window>, EngineError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, DOCUMENT_ACCEPT)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(classify_error)?;

        // No scripts run here, so the received document is the rendered one
        env.signal.fire();

        Ok(Box::new(HttpWindow {
            document: Some(body),
        }))
    }
}

/// A fetched document
struct HttpWindow {
    document: Option<String>,
}

#[async_trait]
impl Window for HttpWindow {
    async fn load_complete(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn serialize(&self) -> String {
        self.document.clone().unwrap_or_default()
    }

    fn close(&mut self) {
        self.document = None;
    }
}

fn classify_error(error: reqwest::Error) -> EngineError {
    if error.is_timeout() {
        EngineError::Network("Request timeout".to_string())
    } else if error.is_connect() {
        EngineError::Network("Connection refused".to_string())
    } else if error.is_decode() || error.is_body() {
        EngineError::Parse(error.to_string())
    } else {
        EngineError::Network(error.to_string())
    }
}
