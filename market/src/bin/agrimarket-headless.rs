//! Headless session driver for E2E testing.
//!
//! Runs the session controller against in-memory backends with JSON-over-stdio
//! IPC. Logging goes to stderr; stdout is reserved for the IPC protocol.
//!
//! Usage:
//!   agrimarket-headless [--path /farmer/dashboard]
//!
//! On startup, emits a `Ready` JSON line to stdout.
//! Then reads `TestCommand` JSON lines from stdin and writes `TestResponse` lines.

use std::io::Write;

use agrimarket::config::MarketConfig;
use agrimarket::headless::Driver;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_initial_path() -> String {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|a| a == "--path")
        .and_then(|i| args.get(i + 1).cloned())
        .unwrap_or_else(|| "/".to_string())
}

fn init_logging_stderr() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();
}

fn emit_json(value: &impl Serialize) -> anyhow::Result<()> {
    let line = serde_json::to_string(value)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}")?;
    stdout.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging_stderr();
    let initial_path = parse_initial_path();
    info!("agrimarket-headless starting (path={})", initial_path);

    let config = match MarketConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let mut driver = Driver::new(config);
    emit_json(&driver.start(&initial_path))?;

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        });
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            info!("stdin closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        emit_json(&driver.handle_line(&line).await)?;
        if driver.is_shut_down() {
            break;
        }
    }

    driver.app.controller.shutdown();
    info!("agrimarket-headless stopped");
    Ok(())
}
