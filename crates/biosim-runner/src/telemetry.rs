//! Tracing subscriber setup for the runner.

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,biosim_world=debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

pub fn init_telemetry(format: LogFormat) -> Result<()> {
    // RUST_LOG takes precedence over the built-in filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init(),
    };
    result.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    info!(?format, "Telemetry initialized");
    Ok(())
}
