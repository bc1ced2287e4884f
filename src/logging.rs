//! `tracing` subscriber bootstrap.

use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use crate::options::BridgeOptions;
use crate::types::{BridgeError, Result};

/// Installs a global `fmt` subscriber filtered by `filter`
/// (e.g. `"sombra_bridge=debug"`).
///
/// Fails when the directive does not parse or another subscriber already owns
/// the process.
pub fn init_logging(filter: &str) -> Result<()> {
    let env_filter = EnvFilter::try_new(filter).map_err(|e| {
        BridgeError::InvalidArgument(format!("bridge log filter '{filter}' is malformed: {e}"))
    })?;
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|_| {
            BridgeError::InvalidArgument(
                "a global tracing subscriber is already installed".into(),
            )
        })?;
    debug!(filter, "logging.installed");
    Ok(())
}

/// Installs the subscriber using [`BridgeOptions::log_filter`].
pub fn init_from_options(options: &BridgeOptions) -> Result<()> {
    init_logging(&options.log_filter)
}
