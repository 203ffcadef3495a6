//! Integration tests for the crawler
//!
//! Most tests drive the coordinator with an in-memory fixture engine that
//! serves a small site graph. The last tests use wiremock to run the HTTP
//! engine end-to-end against a mock server.

use async_trait::async_trait;
use spa_snapshot::config::{parse_config, CrawlConfig};
use spa_snapshot::crawler::Coordinator;
use spa_snapshot::output::{FileSystemWriter, MemoryCollector, OutputError, OutputResult, PageResult};
use spa_snapshot::render::{EngineError, HttpEngine, PageEnvironment, RenderEngine, Window};
use spa_snapshot::state::RunPhase;
use spa_snapshot::url::PatternSet;
use spa_snapshot::SnapshotError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORIGIN: &str = "http://localhost:3000";

/// How a fixture page behaves when loaded
#[derive(Clone)]
enum Fixture {
    /// Renders the HTML and fires the render-complete hook
    Page(String),
    /// Load fails with a network error
    FailLoad,
    /// Load finishes but the hook never fires
    NoSignal,
    /// Load never finishes
    Hang,
}

/// In-memory site served by path
#[derive(Clone, Default)]
struct FixtureEngine {
    pages: Arc<HashMap<String, Fixture>>,
    opened: Arc<Mutex<Vec<String>>>,
    live_windows: Arc<AtomicUsize>,
    on_open: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

impl FixtureEngine {
    fn new(pages: &[(&str, Fixture)]) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .iter()
                    .map(|(path, fixture)| (path.to_string(), fixture.clone()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Runs `hook` with the path of every page before it is opened
    fn on_open(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_open = Some(Arc::new(hook));
        self
    }

    fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    fn open_count(&self, path: &str) -> usize {
        self.opened().iter().filter(|p| p.as_str() == path).count()
    }

    fn live_windows(&self) -> usize {
        self.live_windows.load(Ordering::SeqCst)
    }
}

struct FixtureWindow {
    fixture: Fixture,
    env: PageEnvironment,
    live_windows: Arc<AtomicUsize>,
    closed: bool,
}

#[async_trait]
impl RenderEngine for FixtureEngine {
    async fn open(&self, url: &Url, env: PageEnvironment) -> Result<Box<dyn Window>, EngineError> {
        let path = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        self.opened.lock().unwrap().push(path.clone());
        if let Some(hook) = &self.on_open {
            hook(&path);
        }

        let fixture = self.pages.get(&path).cloned().ok_or(EngineError::Status(404))?;
        self.live_windows.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(FixtureWindow {
            fixture,
            env,
            live_windows: Arc::clone(&self.live_windows),
            closed: false,
        }))
    }
}

#[async_trait]
impl Window for FixtureWindow {
    async fn load_complete(&mut self) -> Result<(), EngineError> {
        match &self.fixture {
            Fixture::Page(_) => {
                self.env.signal.fire();
                Ok(())
            }
            Fixture::FailLoad => Err(EngineError::Network("connection reset".to_string())),
            Fixture::NoSignal => Ok(()),
            Fixture::Hang => std::future::pending().await,
        }
    }

    fn serialize(&self) -> String {
        match &self.fixture {
            Fixture::Page(html) => html.clone(),
            _ => String::new(),
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.live_windows.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

fn page(body: &str) -> Fixture {
    Fixture::Page(format!("<html><head></head><body>{}</body></html>", body))
}

fn config(seeds: &[&str]) -> CrawlConfig {
    CrawlConfig::new(
        Url::parse(ORIGIN).unwrap(),
        seeds.iter().map(|s| s.to_string()).collect(),
    )
}

async fn crawl(config: CrawlConfig, engine: &FixtureEngine) -> (MemoryCollector, spa_snapshot::CrawlReport) {
    let mut pages = MemoryCollector::new();
    let mut coordinator = Coordinator::new(config, Arc::new(engine.clone()));
    let report = coordinator.run(&mut pages).await.unwrap();
    assert_eq!(coordinator.state().phase(), RunPhase::Completed);
    (pages, report)
}

#[tokio::test]
async fn test_cycle_emits_each_page_once() {
    let engine = FixtureEngine::new(&[
        ("/a", page(r#"<a href="/b">B</a>"#)),
        ("/b", page(r#"<a href="/a">A</a>"#)),
    ]);

    let (pages, report) = crawl(config(&["/a"]), &engine).await;

    assert_eq!(pages.order(), ["/a", "/b"]);
    assert_eq!(report.emitted, vec!["/a", "/b"]);
    assert!(report.failures.is_empty());
    assert_eq!(engine.opened(), vec!["/a", "/b"]);
}

#[tokio::test]
async fn test_shared_target_is_emitted_once_in_breadth_first_order() {
    let engine = FixtureEngine::new(&[
        ("/", page(r#"<a href="/x">X</a><a href="/y">Y</a>"#)),
        ("/x", page(r#"<a href="/z">Z</a><a href="/x-child">child</a>"#)),
        ("/y", page(r#"<a href="/z">Z again</a>"#)),
        ("/z", page("leaf")),
        ("/x-child", page("leaf")),
    ]);

    let (pages, _) = crawl(config(&["/"]), &engine).await;

    assert_eq!(pages.order(), ["/", "/x", "/y", "/z", "/x-child"]);
    assert_eq!(engine.open_count("/z"), 1);
}

#[tokio::test]
async fn test_trailing_slash_maps_to_one_path() {
    let engine = FixtureEngine::new(&[
        ("/", page(r#"<a href="/foo/">slash</a><a href="/foo">bare</a>"#)),
        ("/foo", page(r#"<a href="./">self</a>"#)),
    ]);

    let (pages, _) = crawl(config(&["/"]), &engine).await;

    assert_eq!(pages.order(), ["/", "/foo"]);
    assert_eq!(engine.open_count("/foo"), 1);
}

#[tokio::test]
async fn test_only_followable_links_are_enqueued() {
    let engine = FixtureEngine::new(&[
        (
            "/",
            page(
                r##"
                <a href="http://other.example.com/page">external</a>
                <a href="//cdn.example.com/lib">protocol relative</a>
                <a href="mailto:someone@example.com">mail</a>
                <a href="/files/report.pdf">pdf</a>
                <a href="/legacy.htm">htm</a>
                <a href="/docs/guide.html">html</a>
                <a href="/pricing">plain</a>
                <a href="#top">fragment only</a>
                "##,
            ),
        ),
        ("/docs/guide.html", page("guide")),
        ("/pricing", page("pricing")),
    ]);

    let (pages, report) = crawl(config(&["/"]), &engine).await;

    assert_eq!(pages.order(), ["/", "/docs/guide.html", "/pricing"]);
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn test_links_resolve_against_current_page() {
    let engine = FixtureEngine::new(&[
        ("/", page(r#"<a href="/blog/">blog</a>"#)),
        ("/blog", page(r#"<a href="blog/first">first</a><a href="../about">about</a>"#)),
        ("/blog/first", page("first post")),
        ("/about", page("about")),
    ]);

    let (pages, report) = crawl(config(&["/"]), &engine).await;

    assert!(report.failures.is_empty());
    assert_eq!(pages.order(), ["/", "/blog", "/blog/first", "/about"]);
}

#[tokio::test]
async fn test_new_context_links_are_never_followed() {
    let engine = FixtureEngine::new(&[
        (
            "/",
            page(r#"<a href="/popup" target="_blank">popup</a><a href="/inline">inline</a>"#),
        ),
        ("/popup", page("popup")),
        ("/inline", page(r#"<a href="/popup" target="_blank">again</a>"#)),
    ]);

    let (pages, _) = crawl(config(&["/"]), &engine).await;

    assert_eq!(pages.order(), ["/", "/inline"]);
    assert_eq!(engine.open_count("/popup"), 0);
}

#[tokio::test]
async fn test_frames_follow_anchors() {
    let engine = FixtureEngine::new(&[
        (
            "/",
            page(r#"<iframe src="/embed"></iframe><a href="/anchor">anchor</a>"#),
        ),
        ("/embed", page("embed")),
        ("/anchor", page("anchor")),
    ]);

    let (pages, _) = crawl(config(&["/"]), &engine).await;

    assert_eq!(pages.order(), ["/", "/anchor", "/embed"]);
}

#[tokio::test]
async fn test_excluded_paths_are_never_visited_even_as_seeds() {
    let engine = FixtureEngine::new(&[
        ("/", page(r#"<a href="/admin/users">admin</a><a href="/public">public</a>"#)),
        ("/private", page("private")),
        ("/admin/users", page("admin")),
        ("/public", page("public")),
    ]);

    let mut config = config(&["/", "/private"]);
    config.exclude = PatternSet::compile(&["/admin/*", "/private"]).unwrap();

    let (pages, report) = crawl(config, &engine).await;

    assert_eq!(pages.order(), ["/", "/public"]);
    assert_eq!(report.excluded, vec!["/private"]);
    assert_eq!(engine.open_count("/private"), 0);
    assert_eq!(engine.open_count("/admin/users"), 0);
}

#[tokio::test]
async fn test_bundle_scripts_stripped_but_links_discovered() {
    let bundles = TempDir::new().unwrap();
    std::fs::write(bundles.path().join("main.abc123.js"), "app()").unwrap();
    std::fs::write(bundles.path().join("polyfills.js"), "shim()").unwrap();

    let engine = FixtureEngine::new(&[
        (
            "/",
            page(
                r#"<script src="/static/js/main.abc123.js"></script>
                <script src="/static/js/polyfills.js"></script>
                <script src="/static/js/analytics.js"></script>
                <a href="/next">next</a>"#,
            ),
        ),
        ("/next", page(r#"<script src="https://cdn.example.com/x/main.abc123.js"></script>"#)),
    ]);

    let mut config = config(&["/"]);
    config.bundles.strip = true;
    config.bundles.include = vec![bundles.path().to_path_buf()];
    config.bundles.exclude = PatternSet::compile(&["polyfills.*"]).unwrap();

    let (pages, report) = crawl(config, &engine).await;

    assert!(report.failures.is_empty());
    assert_eq!(pages.order(), ["/", "/next"]);

    let home = pages.get("/").unwrap();
    assert!(!home.contains("main.abc123.js"));
    assert!(home.contains("polyfills.js"));
    assert!(home.contains("analytics.js"));
    assert!(home.contains(r#"href="/next""#));

    // Only the final path segment of the src is compared
    assert!(!pages.get("/next").unwrap().contains("main.abc123.js"));
}

#[tokio::test]
async fn test_unlistable_bundle_dir_fails_the_run() {
    let missing = TempDir::new().unwrap().path().join("does-not-exist");
    let engine = FixtureEngine::new(&[("/", page("home"))]);

    let mut config = config(&["/"]);
    config.bundles.strip = true;
    config.bundles.include = vec![missing];

    let mut pages = MemoryCollector::new();
    let mut coordinator = Coordinator::new(config, Arc::new(engine.clone()));
    let result = coordinator.run(&mut pages).await;

    assert!(matches!(
        result,
        Err(SnapshotError::BundleListUnavailable { .. })
    ));
    assert!(pages.is_empty());
    assert_eq!(engine.live_windows(), 0);
    assert_eq!(coordinator.state().phase(), RunPhase::Completed);
}

#[tokio::test]
async fn test_bundle_dir_lost_mid_run_fails_only_that_page() {
    let bundles = TempDir::new().unwrap();
    let bundle_dir = bundles.path().join("js");
    std::fs::create_dir(&bundle_dir).unwrap();
    std::fs::write(bundle_dir.join("main.abc123.js"), "app()").unwrap();

    let restore_dir = bundle_dir.clone();
    let engine = FixtureEngine::new(&[
        ("/", page(r#"<a href="/b">b</a><a href="/c">c</a>"#)),
        ("/b", page(r#"<script src="/js/main.abc123.js"></script>"#)),
        ("/c", page(r#"<script src="/js/main.abc123.js"></script>"#)),
    ])
    .on_open(move |path| {
        if path == "/c" {
            std::fs::create_dir_all(&restore_dir).unwrap();
            std::fs::write(restore_dir.join("main.abc123.js"), "app()").unwrap();
        }
    });

    let mut config = config(&["/"]);
    config.bundles.strip = true;
    config.bundles.include = vec![bundle_dir.clone()];

    let mut emitted = Vec::new();
    let mut handler = |page: PageResult| -> OutputResult<()> {
        if page.path == "/" {
            std::fs::remove_dir_all(&bundle_dir)?;
        }
        emitted.push(page);
        Ok(())
    };

    let mut coordinator = Coordinator::new(config, Arc::new(engine.clone()));
    let report = coordinator.run(&mut handler).await.unwrap();

    assert_eq!(coordinator.state().phase(), RunPhase::Completed);
    assert_eq!(report.emitted, vec!["/", "/c"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, "/b");
    assert!(report.failures[0].message.contains("Cannot list bundle directory"));

    let last = emitted.last().unwrap();
    assert_eq!(last.path, "/c");
    assert!(!last.html.contains("main.abc123.js"));
    assert_eq!(engine.live_windows(), 0);
}

#[tokio::test]
async fn test_page_failures_do_not_halt_the_crawl() {
    let engine = FixtureEngine::new(&[
        (
            "/",
            page(
                r#"<a href="/broken">broken</a>
                <a href="/silent">silent</a>
                <a href="/missing">missing</a>
                <a href="/ok">ok</a>"#,
            ),
        ),
        ("/broken", Fixture::FailLoad),
        ("/silent", Fixture::NoSignal),
        ("/ok", page("fine")),
    ]);

    let (pages, report) = crawl(config(&["/"]), &engine).await;

    assert_eq!(pages.order(), ["/", "/ok"]);
    let failed: Vec<_> = report.failures.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(failed, vec!["/broken", "/silent", "/missing"]);
    assert!(report.failures[1].message.contains("never signaled"));
    assert_eq!(engine.live_windows(), 0);
}

#[tokio::test]
async fn test_failed_paths_are_not_retried() {
    let engine = FixtureEngine::new(&[
        ("/", page(r#"<a href="/broken">one</a><a href="/other">other</a>"#)),
        ("/other", page(r#"<a href="/broken">two</a>"#)),
        ("/broken", Fixture::FailLoad),
    ]);

    let (_, report) = crawl(config(&["/"]), &engine).await;

    assert_eq!(engine.open_count("/broken"), 1);
    assert_eq!(report.failures.len(), 1);
}

#[tokio::test]
async fn test_page_timeout_abandons_hung_page() {
    let engine = FixtureEngine::new(&[
        ("/", page(r#"<a href="/slow">slow</a><a href="/fast">fast</a>"#)),
        ("/slow", Fixture::Hang),
        ("/fast", page("fast")),
    ]);

    let mut config = config(&["/"]);
    config.page_timeout = Some(Duration::from_millis(50));

    let (pages, report) = crawl(config, &engine).await;

    assert_eq!(pages.order(), ["/", "/fast"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, "/slow");
    assert!(report.failures[0].message.contains("Timed out"));
    assert_eq!(engine.live_windows(), 0);
}

#[tokio::test]
async fn test_cancellation_abandons_in_flight_page() {
    let engine = FixtureEngine::new(&[
        ("/", page(r#"<a href="/slow">slow</a><a href="/after">after</a>"#)),
        ("/slow", Fixture::Hang),
        ("/after", page("after")),
    ]);

    let token = CancellationToken::new();
    let mut pages = MemoryCollector::new();
    let mut coordinator =
        Coordinator::new(config(&["/"]), Arc::new(engine.clone())).with_cancellation(token.clone());

    let cancel_later = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    };
    let (report, ()) = tokio::join!(coordinator.run(&mut pages), cancel_later);
    let report = report.unwrap();

    assert!(report.cancelled);
    assert_eq!(pages.order(), ["/"]);
    assert_eq!(engine.open_count("/after"), 0);
    assert_eq!(engine.live_windows(), 0);
    assert_eq!(coordinator.state().phase(), RunPhase::Completed);
}

#[tokio::test]
async fn test_handler_errors_are_reported_and_skipped() {
    let engine = FixtureEngine::new(&[
        ("/", page(r#"<a href="/a">a</a><a href="/b">b</a>"#)),
        ("/a", page("a")),
        ("/b", page("b")),
    ]);

    let mut stored = Vec::new();
    let mut handler = |page: PageResult| -> OutputResult<()> {
        if page.path == "/a" {
            return Err(OutputError::Write("disk full".to_string()));
        }
        stored.push(page.path);
        Ok(())
    };

    let mut coordinator = Coordinator::new(config(&["/"]), Arc::new(engine.clone()));
    let report = coordinator.run(&mut handler).await.unwrap();

    assert_eq!(report.emitted, vec!["/", "/b"]);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].message.contains("disk full"));
    assert_eq!(stored, vec!["/", "/b"]);
}

#[tokio::test]
async fn test_config_file_drives_crawl() {
    let config = parse_config(
        r#"
        [site]
        origin = "http://localhost:3000"
        seeds = ["/docs/", "/docs"]
        exclude = ["/docs/draft-*"]

        [render]
        settle-delay-ms = 0
        "#,
    )
    .unwrap();
    let crawl_config = CrawlConfig::from_config(&config).unwrap();
    assert_eq!(crawl_config.seeds, vec!["/docs", "/docs"]);

    let engine = FixtureEngine::new(&[
        ("/docs", page(r#"<a href="docs/draft-1">draft</a><a href="docs/intro">intro</a>"#)),
        ("/docs/intro", page("intro")),
    ]);

    let (pages, _) = crawl(crawl_config, &engine).await;

    assert_eq!(pages.order(), ["/docs", "/docs/intro"]);
    assert_eq!(engine.open_count("/docs"), 1);
}

#[tokio::test]
async fn test_http_engine_full_crawl_to_filesystem() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"<html><body>
                    <a href="/about">About</a>
                    <a href="/logo.png">Logo</a>
                    <a href="https://elsewhere.example.com/">Elsewhere</a>
                    </body></html>"#,
                )
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<html><body><a href="/">Home</a><a href="/gone">Gone</a></body></html>"#)
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let output = TempDir::new().unwrap();
    let origin = Url::parse(&mock_server.uri()).unwrap();
    let engine = HttpEngine::new("spa-snapshot-test").unwrap();
    let mut writer = FileSystemWriter::new(output.path(), ".html");

    let mut coordinator = Coordinator::new(CrawlConfig::new(origin, vec!["/".to_string()]), Arc::new(engine));
    let report = coordinator.run(&mut writer).await.unwrap();

    assert_eq!(report.emitted, vec!["/", "/about"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, "/gone");
    assert_eq!(writer.written(), 2);

    let home = std::fs::read_to_string(output.path().join("index.html")).unwrap();
    let about = std::fs::read_to_string(output.path().join("about/index.html")).unwrap();
    assert!(home.contains("About"));
    assert!(about.contains("Home"));
}
