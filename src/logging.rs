//! Logging setup.
//!
//! Diagnostics go through `tracing` to stderr. `RUST_LOG` overrides the
//! configured level, e.g. `RUST_LOG=chatsort=debug`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, SortError};

/// Initializes the global subscriber.
///
/// `verbose` forces `debug` regardless of `level`; `RUST_LOG` still wins.
pub fn init(level: &str, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| SortError::config(None, format!("invalid log level '{level}': {e}")))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|e| SortError::config(None, e.to_string()))
}

/// Initialize logging for tests (captured by the test harness)
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
