//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check subscriber filter directives parse
//! - Check base field keys and bridge module are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: LoggingConfig → Result<(), Vec<ValidationError>>

use tracing_subscriber::EnvFilter;

use crate::config::schema::LoggingConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid subscriber filter {filter:?}: {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("logger field keys must not be empty")]
    EmptyFieldKey,

    #[error("bridge module must not be empty when the bridge is enabled")]
    EmptyBridgeModule,
}

/// Validate `config`, collecting every error.
pub fn validate_config(config: &LoggingConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = EnvFilter::try_new(&config.subscriber.filter) {
        errors.push(ValidationError::InvalidFilter {
            filter: config.subscriber.filter.clone(),
            reason: e.to_string(),
        });
    }

    if config.logger.fields.keys().any(|k| k.trim().is_empty()) {
        errors.push(ValidationError::EmptyFieldKey);
    }

    if config.bridge.enabled && config.bridge.module.trim().is_empty() {
        errors.push(ValidationError::EmptyBridgeModule);
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
    fn test_default_is_valid() {
        assert_eq!(validate_config(&LoggingConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = LoggingConfig::default();
        config.subscriber.filter = "rpc_fieldlog=loudest".to_string();
        config.logger.fields.insert(" ".to_string(), "x".to_string());
        config.bridge.module = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ValidationError::InvalidFilter { .. }));
        assert_eq!(errors[1], ValidationError::EmptyFieldKey);
        assert_eq!(errors[2], ValidationError::EmptyBridgeModule);
    }

    #[test]
    fn test_disabled_bridge_ignores_module() {
        let mut config = LoggingConfig::default();
        config.bridge.enabled = false;
        config.bridge.module = String::new();
        assert!(validate_config(&config).is_ok());
    }
}
