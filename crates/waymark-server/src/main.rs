//! # Waymark Server
//!
//! HTTP dispatcher driven by a pattern route table.
//!
//! ## Usage
//!
//! ```bash
//! # Run with the first config file found in the default locations
//! waymark
//!
//! # Run with a specific config file
//! waymark /path/to/waymark.toml
//!
//! # Override settings with environment variables
//! WAYMARK_PORT=8080 WAYMARK_HOST=0.0.0.0 waymark
//! ```

mod config;
mod handlers;
mod metrics;

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waymark=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = config::Config::load(path.as_deref()).context("Failed to load configuration")?;

    tracing::info!(
        routes = config.routes.len(),
        "Starting Waymark on {}:{}",
        config.host,
        config.port
    );

    metrics::init_metrics();

    handlers::run_server(config).await?;

    Ok(())
}
