//! wiki-math-crawler main entry point
//!
//! This is the command-line interface for the math-aware encyclopedia crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wiki_math_crawler::config::{load_config_with_hash, validate, Config, CrawlMode};
use wiki_math_crawler::crawler::{listen_for_signals, Coordinator, CrawlControl};
use wiki_math_crawler::output::print_statistics;
use wiki_math_crawler::storage::{CheckpointStore, UrlLog};

/// wiki-math-crawler: breadth-first article crawler that keeps math as `$...$`
///
/// Crawls from a seed article, writes one JSON record per article, and
/// checkpoints visited URLs so an interrupted session can be resumed by
/// running the same command again. Press Ctrl+C to pause, ENTER to resume,
/// and Ctrl+C twice to stop.
#[derive(Parser, Debug)]
#[command(name = "wiki-math-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A resumable, math-aware encyclopedia crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed article URL, overriding the configuration
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Number of concurrent workers
    #[arg(long, value_name = "N", conflicts_with = "sequential")]
    workers: Option<usize>,

    /// Fetch one page at a time
    #[arg(long)]
    sequential: bool,

    /// Stop after dispatching this many pages
    #[arg(long, value_name = "N")]
    articles: Option<u64>,

    /// Output directory for records, checkpoint and dead letters
    #[arg(long, value_name = "DIR")]
    output: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wiki_math_crawler=info,warn"),
            1 => EnvFilter::new("wiki_math_crawler=debug,info"),
            2 => EnvFilter::new("wiki_math_crawler=trace,debug"),
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

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(seed) = &cli.seed {
        config.crawler.seed_url = seed.clone();
    }
    if let Some(workers) = cli.workers {
        config.crawler.worker_count = workers;
    }
    if cli.sequential {
        config.crawler.mode = CrawlMode::Sequential;
    }
    if let Some(articles) = cli.articles {
        config.crawler.article_limit = Some(articles);
    }
    if let Some(output) = &cli.output {
        config.output.directory = output.clone();
    }
}

/// Handles the --dry-run mode: prints the effective configuration and resume state
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== wiki-math-crawler Dry Run ===\n");

    println!("{}", toml::to_string_pretty(config)?);

    let checkpoint = UrlLog::new(config.output.checkpoint_path());
    let visited = checkpoint.load()?;

    println!("Resume state:");
    println!("  Checkpoint: {}", checkpoint.path().display());
    println!("  Visited URLs: {}", visited.len());
    println!(
        "  Workers: {}, sub-batch size: {}",
        config.crawler.effective_workers(),
        config.crawler.sub_batch_size()
    );

    println!("\nConfiguration is valid. Use without --dry-run to start crawling.");
    Ok(())
}

async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let (control, rx) = CrawlControl::new();
    listen_for_signals(Arc::new(control));

    println!("\t(Press CTRL+C to pause)\n");

    let mut coordinator = Coordinator::new(config)?.with_control(rx);
    let stats = coordinator.run().await?;

    println!();
    print_statistics(&stats);
    Ok(())
}
