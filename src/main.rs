//! Sitescope main entry point
//!
//! This is the command-line interface for the Sitescope organization crawler.

use anyhow::Context;
use clap::Parser;
use sitescope::config::{load_config, Config};
use sitescope::crawler::{CrawlSession, Strategy};
use sitescope::output::{load_statistics, print_path, print_search_results, print_statistics};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitescope: a scoped organization crawler with keyword search
///
/// Sitescope crawls every page reachable inside one organization's domain,
/// including its subdomains, then answers keyword searches over the crawled
/// pages together with the link path that led to each of them.
#[derive(Parser, Debug)]
#[command(name = "sitescope")]
#[command(version)]
#[command(about = "A scoped organization crawler with keyword search", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Traversal strategy: bfs or dfs (overrides the config file)
    #[arg(long, value_parser = parse_strategy)]
    strategy: Option<Strategy>,

    /// Ignore the cache and crawl from scratch
    #[arg(long)]
    fresh: bool,

    /// Keyword query to run after crawling (repeatable)
    #[arg(long = "search", value_name = "KEYWORD")]
    searches: Vec<String>,

    /// URL whose discovery path should be shown (repeatable)
    #[arg(long = "path", value_name = "URL")]
    paths: Vec<String>,

    /// Maximum results per query (defaults to search.result-limit)
    #[arg(long)]
    limit: Option<usize>,

    /// Print crawl statistics
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn parse_strategy(label: &str) -> Result<Strategy, String> {
    label.parse().map_err(|e: sitescope::ConfigError| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;

    let strategy = match cli.strategy {
        Some(strategy) => strategy,
        None => config.strategy()?,
    };
    let limit = cli.limit.unwrap_or(config.search.result_limit);

    let mut session = build_session(config, cli.fresh)?;
    let report = session.crawl(strategy).await;
    tracing::info!(
        "Run complete: {} fetched, {} re-expanded{}",
        report.pages_fetched,
        report.pages_reexpanded,
        if report.page_bound_hit {
            ", stopped at page bound"
        } else {
            ""
        }
    );

    if cli.stats {
        print_statistics(&load_statistics(&session));
    }

    for query in &cli.searches {
        print_search_results(query, &session.search(query, limit));
    }

    for url in &cli.paths {
        print_path(url, &session.path_of(url));
    }

    Ok(())
}

/// Creates the session and restores its cache unless `fresh` is set
fn build_session(config: Config, fresh: bool) -> anyhow::Result<CrawlSession> {
    let mut session = CrawlSession::new(config).context("Failed to create crawl session")?;

    if fresh {
        tracing::info!("Starting fresh crawl (ignoring cache)");
    } else if session.load_cache() {
        tracing::info!(
            "Resuming from cache with {} pages (max depth seen {})",
            session.pages().len(),
            session.max_depth_seen()
        );
    }

    Ok(session)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitescope=info,warn"),
            1 => EnvFilter::new("sitescope=debug,info"),
            2 => EnvFilter::new("sitescope=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}
