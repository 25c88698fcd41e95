//! Core configuration types.

use serde::Deserialize;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Handler registry behaviour.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Logging and metrics.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// What happens when a handler is registered for a shape that already has one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// The new handler replaces the old one (last write wins).
    #[default]
    Replace,
    /// Registration fails and the existing handler stays.
    Reject,
}

/// Handler registry configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfig {
    /// Duplicate registration policy (default: replace).
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
    /// Dispatches slower than this are logged at WARN (default: disabled).
    #[serde(default)]
    pub slow_dispatch_ms: Option<u64>,
}

impl RegistryConfig {
    pub fn slow_dispatch_threshold(&self) -> Option<Duration> {
        self.slow_dispatch_ms.map(Duration::from_millis)
    }
}

/// Logging and metrics configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON log lines instead of human-readable text (default: false).
    #[serde(default)]
    pub json: bool,
    /// Register Prometheus collectors at startup (default: true).
    #[serde(default = "default_true")]
    pub metrics: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
            metrics: true,
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
