//! Feed-Courier main entry point
//!
//! This is the command-line interface for the Feed-Courier ingestion engine.

use anyhow::Context;
use clap::Parser;
use feed_courier::config::{load_config_with_hash, Config};
use feed_courier::ingest::{HttpFeedSource, SchedulerSettings};
use feed_courier::storage::{init_snapshot, load_statistics, open_snapshot, print_statistics};
use feed_courier::{DropDirSink, Scheduler};
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Feed-Courier: a scheduled feed-ingestion engine
///
/// Feed-Courier polls RSS/Atom feeds, stages one message per new item in a
/// drop directory, and remembers what it delivered across restarts.
#[derive(Parser, Debug)]
#[command(name = "feed-courier")]
#[command(version = "1.0.0")]
#[command(about = "A scheduled feed-ingestion engine", long_about = None)]
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

    /// Create an empty snapshot and exit
    #[arg(long, conflicts_with_all = ["once", "dry_run", "stats"])]
    init: bool,

    /// Run a single round and exit
    #[arg(long, conflicts_with_all = ["init", "dry_run", "stats"])]
    once: bool,

    /// Validate config and show the subscriptions without fetching anything
    #[arg(long, conflicts_with_all = ["init", "once", "stats"])]
    dry_run: bool,

    /// Show statistics from the snapshot and exit
    #[arg(long, conflicts_with_all = ["init", "once", "dry_run"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.init {
        handle_init(&config)
    } else if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_ingest(config, cli.once).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("feed_courier=info,warn"),
            1 => EnvFilter::new("feed_courier=debug,info"),
            2 => EnvFilter::new("feed_courier=trace,debug"),
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

fn snapshot_path(config: &Config) -> &Path {
    Path::new(&config.storage.snapshot_path)
}

/// Handles the --init mode: creates an empty snapshot
fn handle_init(config: &Config) -> anyhow::Result<()> {
    let path = snapshot_path(config);
    init_snapshot(path)
        .with_context(|| format!("Failed to create snapshot {}", path.display()))?;

    println!("✓ Created empty snapshot at {}", path.display());
    Ok(())
}

/// Handles the --dry-run mode: shows what would be polled
fn handle_dry_run(config: &Config) {
    println!("=== Feed-Courier Dry Run ===\n");

    println!("Ingest:");
    println!("  Round delay: {:?}", config.ingest.round_delay());
    println!("  Pacing delay: {:?}", config.ingest.pacing_delay());
    println!("  Fetch timeout: {:?}", config.ingest.fetch_timeout());
    println!(
        "  Retries: {} (backoff step {:?})",
        config.ingest.max_retries,
        config.ingest.backoff_step()
    );

    println!("\nDelivery:");
    println!("  Drop directory: {}", config.delivery.drop_dir);
    println!("  File prefix: {}", config.delivery.file_prefix);
    println!("  Error chat: {}", config.delivery.error_chat);

    println!("\nStorage:");
    println!("  Snapshot: {}", config.storage.snapshot_path);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    let subscriptions = config.subscriptions();
    println!("\nSubscriptions ({}):", subscriptions.len());
    for subscription in &subscriptions {
        println!("  - {} -> chat {}", subscription.url, subscription.destination);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the snapshot
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let path = snapshot_path(config);
    println!("Snapshot: {}\n", path.display());

    let store = open_snapshot(path)
        .with_context(|| format!("Failed to open snapshot {}", path.display()))?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the ingestion loop, or a single round with `once`
async fn handle_ingest(config: Config, once: bool) -> anyhow::Result<()> {
    let path = snapshot_path(&config);
    let store = open_snapshot(path).with_context(|| {
        format!(
            "Cannot start without a readable snapshot at {} (create one with --init)",
            path.display()
        )
    })?;

    let source = HttpFeedSource::new(&config.user_agent).context("Failed to build HTTP client")?;
    let sink = DropDirSink::from_config(&config.delivery);
    let subscriptions = config.subscriptions();
    tracing::info!(
        "Polling {} feeds into {}",
        subscriptions.len(),
        sink.dir().display()
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, finishing the current feed");
            let _ = shutdown_tx.send(true);
        }
    });

    let mut scheduler = Scheduler::new(
        SchedulerSettings::from_config(&config),
        subscriptions,
        Box::new(source),
        Box::new(sink),
        Box::new(store),
    )
    .with_shutdown(shutdown_rx);

    let state = scheduler.load_state()?;
    tracing::info!(
        "Loaded history for {} feeds ({} identifiers)",
        state.len(),
        state.total_entries()
    );

    if once {
        let (_, report) = scheduler.run_round(state).await?;
        tracing::info!(
            "Round complete: {} delivered, {} failed feeds",
            report.items_delivered,
            report.feeds_failed
        );
    } else {
        scheduler.run(state).await?;
        tracing::info!("Shut down cleanly");
    }

    Ok(())
}
