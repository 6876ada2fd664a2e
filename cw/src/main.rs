use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cronsweep::cli::Cli;
use cronsweep::config::Config;
use cronsweep::github::GitHubClient;
use cronsweep::pipeline::{Pipeline, Scope};
use cronsweep::ratelimit::RateLimiter;
use docstore::DocStore;

fn setup_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Fail fast on the fatal preconditions: token and data directory
    let token = config.resolve_token()?;
    let store = DocStore::open(&config.data_dir).context("Failed to open data directory")?;

    let limiter = RateLimiter::new(config.grace_secs);
    let client = GitHubClient::new(token, limiter, config.skip_lfs)?;

    let scope = match cli.account {
        Some(account) => Scope::Account(account),
        None => Scope::Full,
    };
    info!(?scope, data_dir = %config.data_dir.display(), "cronsweep starting");

    let mut pipeline = Pipeline::new(client, store, config);
    let summary = pipeline.run(&scope).await?;

    println!(
        "{} Scan complete: {} of {} candidates processed, {} skipped",
        "✓".green(),
        summary.processed,
        summary.discovered,
        summary.skipped
    );
    println!(
        "  Corpus: {} repositories, {} files, {} schedules",
        summary.repositories, summary.files, summary.schedules
    );

    Ok(())
}
