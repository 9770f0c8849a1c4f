//! Differential difficulty test runner
//!
//! Searches every position of an EPD suite twice with one engine process and
//! writes the hard ones to a line-aligned result file.

use clap::Parser;
use tracing::info;

use dbt_harness::{driver, Cli, HarnessConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap reads DBT_* variables
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = HarnessConfig::from_cli(Cli::parse());
    info!(
        engine = %config.engine_path.display(),
        hash_mb = config.engine.hash_mb,
        threads = config.engine.threads,
        resume = config.resume,
        "Harness config loaded"
    );

    let summary = driver::run(&config).await?;
    info!(
        written = summary.written(),
        skipped = summary.skipped,
        flagged = summary.flagged(),
        hard = summary.hard,
        parse_failures = summary.parse_failures,
        solved = summary.solved,
        mate_scores = summary.mate_scores,
        not_hard = summary.not_hard,
        searches = summary.searches,
        "DBT run complete"
    );
    Ok(())
}
