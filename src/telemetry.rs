//! Telemetry utilities: subscriber setup, dispatch timing and spans.

use crate::config::TelemetryConfig;
use anyhow::Context;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.filter`. Returns `Ok(false)` if a
/// subscriber was already installed, which is expected in tests and when the
/// library is embedded in an application that sets up its own.
pub fn init(config: &TelemetryConfig) -> anyhow::Result<bool> {
    let filter = resolve_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok(), &config.filter)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };
    Ok(installed)
}

/// Pick the filter directive: a non-empty env value wins over the config.
/// An env value that does not parse is an error.
fn resolve_filter(env: Option<String>, configured: &str) -> anyhow::Result<EnvFilter> {
    match env.filter(|value| !value.trim().is_empty()) {
        Some(value) => EnvFilter::try_new(&value)
            .with_context(|| format!("invalid {} directive `{value}`", EnvFilter::DEFAULT_ENV)),
        None => EnvFilter::try_new(configured)
            .with_context(|| format!("invalid telemetry filter `{configured}`")),
    }
}

/// Guard for timing a dispatch and recording metrics.
///
/// Records dispatch latency when dropped.
pub struct DispatchTimer {
    command: &'static str,
    start: Instant,
}

impl DispatchTimer {
    /// Start timing a dispatch.
    pub fn new(command: &'static str) -> Self {
        Self {
            command,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for DispatchTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_dispatch(self.command, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use crate::handlers::ShapeKey;
    use tracing::{Level, Span, span};

    /// Span wrapping a single handler invocation.
    pub fn dispatch(shape: &ShapeKey) -> Span {
        span!(
            Level::DEBUG,
            "bus.dispatch",
            command = shape.command().short_name(),
            result = shape.result().map(|r| r.short_name()),
            shape = shape.kind(),
        )
    }
}
