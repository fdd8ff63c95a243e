//! Vigil Server - Main entry point.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vigil_api::{router, AppState};
use vigil_policy::{PasswordPolicy, DEFAULT_MIN_LENGTH, DEFAULT_SYMBOLS};

#[derive(Parser)]
#[command(name = "vigil-server")]
#[command(about = "Vigil - password policy validation service")]
#[command(version)]
struct Cli {
    /// Server bind address
    #[arg(long, default_value = "127.0.0.1:5000", env = "VIGIL_BIND_ADDRESS")]
    bind: String,

    /// Minimum password length
    #[arg(long, default_value_t = DEFAULT_MIN_LENGTH, env = "VIGIL_MIN_LENGTH")]
    min_length: usize,

    /// Symbols that satisfy the symbol rule
    #[arg(long, default_value = DEFAULT_SYMBOLS, env = "VIGIL_SYMBOLS")]
    symbols: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10, env = "VIGIL_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting Vigil server...");

    let policy = PasswordPolicy::new(cli.min_length, &cli.symbols)
        .context("Invalid password policy")?;
    tracing::info!(
        min_length = policy.min_length(),
        symbols = %policy.symbols(),
        "Password policy loaded"
    );

    let app = router(
        AppState::new(policy),
        Duration::from_secs(cli.request_timeout_secs),
    );

    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cli.bind))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
