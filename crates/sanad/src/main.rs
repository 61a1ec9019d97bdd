//! Sanad CLI binary.

use anyhow::Result;
use sanad::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the sanad CLI.
///
/// Uses tokio's current_thread runtime; every command is a short sequence of
/// file and store operations.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=sanad=debug,sanad_jsonl=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sanad=info,sanad_jsonl=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting sanad CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Sanad CLI completed successfully");
    Ok(())
}
