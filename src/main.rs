//! spa-snapshot main entry point
//!
//! This is the command-line interface for the spa-snapshot pre-renderer.

use anyhow::Context;
use clap::Parser;
use spa_snapshot::config::{load_config_with_hash, Config, CrawlConfig};
use spa_snapshot::crawler::Coordinator;
use spa_snapshot::output::{print_report, FileSystemWriter};
use spa_snapshot::render::HttpEngine;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// spa-snapshot: static pre-rendering for single-page applications
///
/// spa-snapshot crawls an application from its seed paths, waits for each
/// page to signal that rendering is complete, and writes a static HTML
/// snapshot for every same-origin page it can reach.
#[derive(Parser, Debug)]
#[command(name = "spa-snapshot")]
#[command(version)]
#[command(about = "Static pre-rendering for single-page applications", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Write snapshots here instead of the configured output directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let crawl_config = CrawlConfig::from_config(&config)?;
    let output_dir = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));

    if cli.dry_run {
        handle_dry_run(&config, &crawl_config, &output_dir);
        return Ok(());
    }

    handle_crawl(&config, crawl_config, output_dir).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("spa_snapshot=info,warn"),
            1 => EnvFilter::new("spa_snapshot=debug,info"),
            2 => EnvFilter::new("spa_snapshot=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config, crawl: &CrawlConfig, output_dir: &std::path::Path) {
    println!("=== spa-snapshot Dry Run ===\n");

    println!("Site:");
    println!("  Origin: {}", crawl.origin);
    println!("  Page extension: {}", crawl.page_extension);

    println!("\nSeeds ({}):", crawl.seeds.len());
    for seed in &crawl.seeds {
        println!("  - {}", seed);
    }

    println!("\nExcluded paths ({}):", crawl.exclude.len());
    for pattern in crawl.exclude.globs() {
        println!("  - {}", pattern);
    }

    println!("\nRender:");
    println!("  Settle delay: {}ms", crawl.settle_delay.as_millis());
    match crawl.page_timeout {
        Some(timeout) => println!("  Page timeout: {}ms", timeout.as_millis()),
        None => println!("  Page timeout: none"),
    }
    println!("  User agent: {}", config.render.user_agent);
    println!("  Skipped resources: {}", crawl.skip_resources.len());

    println!("\nBundles:");
    if crawl.bundles.strip {
        for dir in &crawl.bundles.include {
            println!("  Strip from: {}", dir.display());
        }
        println!("  Kept patterns: {}", crawl.bundles.exclude.len());
    } else {
        println!("  Stripping disabled");
    }

    println!("\nOutput:");
    println!("  Directory: {}", output_dir.display());

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    crawl: CrawlConfig,
    output_dir: PathBuf,
) -> anyhow::Result<()> {
    tracing::info!(
        "Origin: {}, seeds: {}, output: {}",
        crawl.origin,
        crawl.seeds.len(),
        output_dir.display()
    );

    let engine = HttpEngine::new(&config.render.user_agent)
        .context("failed to build HTTP client")?;
    let mut writer = FileSystemWriter::new(output_dir, crawl.page_extension.clone());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            on_interrupt.cancel();
        }
    });

    let mut coordinator = Coordinator::new(crawl, Arc::new(engine)).with_cancellation(cancel);
    let report = match coordinator.run(&mut writer).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    print_report(&report);
    tracing::info!("{} file(s) written to {}", writer.written(), writer.root().display());

    Ok(())
}
