//! Log output setup for the binary.
//!
//! Library code logs through the `log` facade. The subscriber installed here
//! also captures those records through its `tracing-log` bridge.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LogMode;

fn default_directive(mode: LogMode) -> &'static str {
    match mode {
        LogMode::Development => "debug",
        LogMode::Production => "info",
    }
}

/// Install the global subscriber. `RUST_LOG`, when set, overrides the level.
pub fn init(mode: LogMode) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(mode)));

    let registry = tracing_subscriber::registry().with(filter);

    match mode {
        LogMode::Development => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()?,
        LogMode::Production => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?,
    }

    Ok(())
}
