//! Tracing setup: level from repeated `-v`, pretty format on a TTY stderr,
//! JSON otherwise. No OpenTelemetry export — this is a single-shot CLI, not
//! a long-running service.

use std::io::IsTerminal;

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Map a `-v` repeat count to a tracing level. `0` defers to `RUST_LOG`
/// (defaulting to `info` if unset).
pub fn init(verbosity: u8) {
    let filter_layer = match verbosity {
        0 => EnvFilter::builder().with_default_directive(Level::INFO.into()).from_env_lossy(),
        1 => EnvFilter::new(Level::DEBUG.as_str()),
        _ => EnvFilter::new(Level::TRACE.as_str()),
    };

    let is_terminal = std::io::stderr().is_terminal();
    let fmt_layer = if is_terminal {
        tracing_subscriber::fmt::layer().with_writer(std::io::stderr).pretty().boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stderr).json().boxed()
    };

    tracing_subscriber::registry().with(filter_layer).with(fmt_layer).init();
}
