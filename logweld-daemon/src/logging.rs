//! Logging initialization for logweld-daemon.
//!
//! The `[general]` section drives both knobs: `log_level` seeds the
//! default filter (overridden by `RUST_LOG` when set), and `log_format`
//! picks the output layer. The daemon logs JSON lines in production;
//! the pretty format exists for running against a local broker.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use logweld_core::config::GeneralConfig;

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
/// Config validation already whitelists `log_format`, but an unknown
/// value is still rejected here so embedders that skip validation get
/// an error instead of a silent default.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format.as_str() {
        "json" => registry.with(fmt::layer().json()).try_init(),
        "pretty" => registry.with(fmt::layer().pretty()).try_init(),
        other => anyhow::bail!("unknown log format '{other}', expected 'json' or 'pretty'"),
    }
    .context("failed to initialize tracing subscriber")
}
