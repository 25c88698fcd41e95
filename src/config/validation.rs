//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("telemetry.filter is not a valid filter directive '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },
    #[error("registry.slow_dispatch_ms must be greater than zero")]
    ZeroSlowDispatch,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = EnvFilter::try_new(&config.telemetry.filter) {
        errors.push(ValidationError::InvalidFilter {
            filter: config.telemetry.filter.clone(),
            reason: e.to_string(),
        });
    }

    if config.registry.slow_dispatch_ms == Some(0) {
        errors.push(ValidationError::ZeroSlowDispatch);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn zero_threshold_fails() {
        let config: Config = toml::from_str(
            r#"
[registry]
slow_dispatch_ms = 0
"#,
        )
        .unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::ZeroSlowDispatch)));
    }

    #[test]
    fn bad_filter_fails() {
        let config: Config = toml::from_str(
            r#"
[telemetry]
filter = "command_bus=notalevel"
"#,
        )
        .unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::InvalidFilter { .. }))
        );
    }

    #[test]
    fn reports_every_error() {
        let config: Config = toml::from_str(
            r#"
[registry]
slow_dispatch_ms = 0

[telemetry]
filter = "command_bus=notalevel"
"#,
        )
        .unwrap();
        assert_eq!(validate(&config).unwrap_err().len(), 2);
    }
}
