//! Logging initialization.
//!
//! Diagnostics go through `tracing` to stderr; stdout is reserved for the
//! build progress printed by [`crate::output`].

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the logging subsystem.
///
/// `verbose` enables DEBUG level logging (per-tag details); otherwise INFO
/// (per-image skips and failures). The `RUST_LOG` environment variable
/// overrides either.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
