use serde::Deserialize;

/// Main configuration structure for spa-snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub bundles: BundleConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// The application being crawled
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base origin of the application (scheme + host, e.g. "http://localhost:3000")
    pub origin: String,

    /// Root-relative paths to start crawling from
    #[serde(default = "default_seeds")]
    pub seeds: Vec<String>,

    /// Glob patterns for paths that must never be crawled
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Extension of rendered documents; links with any other non-empty extension are not followed
    #[serde(rename = "page-extension", default = "default_page_extension")]
    pub page_extension: String,
}

/// Page rendering behavior
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// Time to wait after the render-complete signal before snapshotting (milliseconds)
    #[serde(rename = "settle-delay-ms", default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Hard limit for rendering a single page (milliseconds)
    #[serde(rename = "page-timeout-ms", default)]
    pub page_timeout_ms: Option<u64>,

    /// Glob patterns for sub-resource paths that are never fetched during render
    #[serde(rename = "skip-resources", default)]
    pub skip_resources: Vec<String>,

    /// User agent sent with page requests
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            page_timeout_ms: None,
            skip_resources: Vec::new(),
            user_agent: default_user_agent(),
        }
    }
}

/// Script bundle stripping
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BundleConfig {
    /// Whether to remove script tags that reference known bundles
    #[serde(default)]
    pub strip: bool,

    /// Directories holding build-output bundle files
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns for bundle files that must be kept
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory where snapshots are written
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

fn default_seeds() -> Vec<String> {
    vec!["/".to_string()]
}

fn default_page_extension() -> String {
    ".html".to_string()
}

fn default_settle_delay_ms() -> u64 {
    50
}

fn default_user_agent() -> String {
    format!("spa-snapshot/{}", env!("CARGO_PKG_VERSION"))
}

fn default_output_directory() -> String {
    "build".to_string()
}
