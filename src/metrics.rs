//! Prometheus metrics collection for command dispatch.
//!
//! - `bus_dispatch_total{command}` - Dispatches that reached a handler
//! - `bus_dispatch_duration_seconds{command}` - Handler latency histogram
//! - `bus_dispatch_errors_total{command,error}` - Failed dispatches by error code
//! - `bus_registrations_total{shape}` - Handler registrations by shape kind
//!
//! Recording helpers are no-ops until [`init`] has run.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Dispatches that reached a handler, by command type.
pub static DISPATCH_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Handler latency by command type.
pub static DISPATCH_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Dispatch failures by command type and error code.
pub static DISPATCH_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Handler registrations by shape kind ("void" or "result").
pub static REGISTRATIONS: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Safe to call more than once; later calls leave the existing collectors in place.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            if $metric.get().is_none() {
                match $init {
                    Ok(m) => {
                        if let Err(e) = r.register(Box::new(m.clone())) {
                            tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                        }
                        let _ = $metric.set(m);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                    }
                }
            }
        };
    }

    register!(DISPATCH_COUNTER, IntCounterVec::new(Opts::new("bus_dispatch_total", "Commands dispatched to a handler by type"), &["command"]));
    register!(DISPATCH_LATENCY, HistogramVec::new(
        HistogramOpts::new("bus_dispatch_duration_seconds", "Handler latency by command type")
            .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["command"]));
    register!(DISPATCH_ERRORS, IntCounterVec::new(Opts::new("bus_dispatch_errors_total", "Failed dispatches by command type and error"), &["command", "error"]));
    register!(REGISTRATIONS, IntCounterVec::new(Opts::new("bus_registrations_total", "Handler registrations by shape kind"), &["shape"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

/// Record a dispatch that reached a handler, with latency.
#[inline]
pub fn record_dispatch(command: &str, duration_secs: f64) {
    if let Some(c) = DISPATCH_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = DISPATCH_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record a failed dispatch.
#[inline]
pub fn record_dispatch_error(command: &str, error: &str) {
    if let Some(c) = DISPATCH_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

/// Record a handler registration.
#[inline]
pub fn record_registration(shape: &str) {
    if let Some(c) = REGISTRATIONS.get() {
        c.with_label_values(&[shape]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent_and_records() {
        init();
        init();

        record_dispatch("MetricsProbe", 0.002);
        record_dispatch_error("MetricsProbe", "no_handler");
        record_registration("void");

        let text = gather_metrics();
        assert!(text.contains("bus_dispatch_total"));
        assert!(text.contains("command=\"MetricsProbe\""));
        assert!(text.contains("error=\"no_handler\""));
        assert!(text.contains("bus_registrations_total"));
    }
}
