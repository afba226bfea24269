//! Main entry point for the tree-uploader CLI

use std::io::IsTerminal;
use std::net::SocketAddr;

use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use tree_uploader::cli::Cli;
use tree_uploader::metrics::{self, METRICS_ADDR_ENV_VAR};

/// Initialize tracing on stderr, JSON when `LOG_FORMAT=json`
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tree_uploader=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(std::io::stderr().is_terminal())
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Start the Prometheus exporter when `METRICS_ADDR` is set
async fn init_metrics_from_env() {
    let Ok(raw) = std::env::var(METRICS_ADDR_ENV_VAR) else {
        return;
    };

    match raw.parse::<SocketAddr>() {
        Ok(addr) => {
            if let Err(e) = metrics::init_metrics(addr).await {
                warn!("Metrics disabled: {}", e);
            }
        }
        Err(e) => warn!("Ignoring invalid {}={}: {}", METRICS_ADDR_ENV_VAR, raw, e),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    init_metrics_from_env().await;

    if let Err(e) = cli.execute().await {
        error!("{}", e);
        std::process::exit(1);
    }
}
