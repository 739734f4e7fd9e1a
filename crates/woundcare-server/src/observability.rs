//! Tracing setup.
//!
//! The subscriber is installed before configuration is read, so its filter
//! sits behind a reload layer and `logging.level` is swapped in once the
//! config has loaded. An explicit `RUST_LOG` always takes precedence.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

/// Level used until configuration is available.
pub const STARTUP_LEVEL: &str = "info";

type FilterHandle = reload::Handle<EnvFilter, Registry>;

static FILTER_HANDLE: OnceLock<FilterHandle> = OnceLock::new();

fn rust_log_filter() -> Option<EnvFilter> {
    std::env::var_os("RUST_LOG")?;
    EnvFilter::try_from_default_env().ok()
}

pub fn init_tracing() {
    init_tracing_with_level(STARTUP_LEVEL);
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_tracing_with_level(level: &str) {
    let filter = rust_log_filter().unwrap_or_else(|| EnvFilter::new(level));
    let (filter_layer, handle) = reload::Layer::new(filter);

    if tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(false))
        .try_init()
        .is_ok()
    {
        let _ = FILTER_HANDLE.set(handle);
    }
}

/// Replaces the active filter with `level`.
///
/// Returns `false` when `RUST_LOG` is set or no subscriber was installed.
pub fn apply_logging_level(level: &str) -> bool {
    if rust_log_filter().is_some() {
        return false;
    }
    let Some(handle) = FILTER_HANDLE.get() else {
        return false;
    };
    match handle.reload(EnvFilter::new(level)) {
        Ok(()) => {
            tracing::debug!(level, "Log level applied");
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, level, "Failed to apply log level");
            false
        }
    }
}
