// src/logging.rs
//! Logging infrastructure
//!
//! The recorder never prints on its own; hosts that want its diagnostics call
//! `init` once at startup. Log level comes from `RUST_LOG` when set,
//! otherwise from the `debug` flag of the recorder configuration.

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Initialize the logging system for a host application
///
/// `debug` widens the default filter to `sessionscope=debug`. `RUST_LOG`
/// always wins when present. Calling this twice is harmless; the second call
/// is a no-op.
pub fn init(debug: bool) {
    let default_filter = if debug {
        "warn,sessionscope=debug"
    } else {
        "warn,sessionscope=info"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Initialize logging for tests (logs to the test writer)
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}
