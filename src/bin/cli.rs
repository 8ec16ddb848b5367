// src/bin/cli.rs

//! feedring CLI
//!
//! Local execution entry point for the feed watcher.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use feedring::{
    error::Result,
    ledger::{DedupLedger, SqliteLedger},
    models::Config,
    pipeline::{run_poller, LastSeen, Watcher},
};

/// feedring - Feed Watcher and Webhook Notifier
#[derive(Parser, Debug)]
#[command(
    name = "feedring",
    version,
    about = "Watches external feeds and delivers deduplicated webhook notifications"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the poll loop until interrupted
    Run,

    /// Run a single cycle and exit (for cron-style deployments)
    Once,

    /// Validate the configuration file
    Validate,

    /// Show ledger and configuration summary
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Run => {
            config.validate()?;
            let period = Duration::from_secs(config.poll_interval_secs);
            let ledger: Arc<dyn DedupLedger> = Arc::new(SqliteLedger::open(&config.ledger_path)?);
            let watcher = Watcher::new(Arc::new(config), ledger)?;

            log::info!("feedring starting...");
            run_poller(&watcher, period, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await;
        }

        Command::Once => {
            config.validate()?;
            let ledger: Arc<dyn DedupLedger> = Arc::new(SqliteLedger::open(&config.ledger_path)?);
            let watcher = Watcher::new(Arc::new(config), ledger)?;

            // A fresh last-seen map every invocation: the ledger alone
            // carries dedup state between runs.
            let mut last_seen = LastSeen::new();
            let outcome = watcher.run_cycle(&mut last_seen).await;

            log::info!(
                "single cycle complete: {} examined, {} sent",
                outcome.examined(),
                outcome.sent
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({} tracked entities)", config.entities.len());

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Config file: {}", cli.config.display());
            log::info!("Webhook endpoint: {}", redact(&config.webhook_url));
            log::info!("Poll interval: {}s", config.poll_interval_secs);
            log::info!(
                "Redirect feed: {}",
                config
                    .redirect_feed
                    .as_ref()
                    .map(|f| f.url.as_str())
                    .unwrap_or("not configured")
            );
            log::info!(
                "Status feed: {} ({} tracked entities)",
                config
                    .status_feed
                    .as_ref()
                    .map(|f| f.url.as_str())
                    .unwrap_or("not configured"),
                config.entities.len()
            );

            let ledger = SqliteLedger::open(&config.ledger_path)?;
            log::info!(
                "Ledger: {} ({} delivered keys)",
                config.ledger_path,
                ledger.len().await?
            );
        }
    }

    Ok(())
}

/// Hide the secret-bearing tail of a webhook URL in log output.
fn redact(url: &str) -> String {
    if url.is_empty() {
        return "not configured".to_string();
    }
    match url.split_once("//").and_then(|(_, rest)| rest.split_once('/')) {
        Some((host, _)) => format!("{}://{}/…", url.split("://").next().unwrap_or("https"), host),
        None => url.to_string(),
    }
}
