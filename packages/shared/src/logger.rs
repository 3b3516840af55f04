//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `{crate_name}={default_level}` and
/// `tower_http={default_level}` are enabled.
///
/// # Arguments
///
/// * `bin_name` - Binary name (dashes are converted to the crate target form)
/// * `default_level` - Level used when `RUST_LOG` is not set (e.g. "info")
pub fn setup_logger(bin_name: &str, default_level: &str) {
    let target = bin_name.replace('-', "_");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("{target}={default_level},tower_http={default_level}").into()
    });

    // try_init so tests that call this more than once do not panic
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}
