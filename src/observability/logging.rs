//! Logging bootstrap.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber
//! - Build the base logger from configuration
//! - Install the framework diagnostics bridge
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured filter
//! - JSON format for production, text format for development
//! - The `log` facade is owned by the bridge, so the subscriber does not
//!   install a `log` → `tracing` adapter

use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend::{TracingLogger, WriterLogger};
use crate::bridge::replace_framework_logger;
use crate::config::{BackendKind, LogFormat, LoggerConfig, LoggingConfig, SubscriberConfig};
use crate::logger::{Field, Logger};

/// Error raised while wiring up logging at startup.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("invalid subscriber filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),

    #[error("failed to install framework logger: {0}")]
    Bridge(#[from] log::SetLoggerError),
}

/// Install the global `tracing` subscriber.
pub fn init_subscriber(config: &SubscriberConfig) -> Result<(), InitError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)?,
    };
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Text => registry.with(fmt::layer()).try_init()?,
        LogFormat::Json => registry.with(fmt::layer().json()).try_init()?,
    }
    Ok(())
}

/// Build the base logger described by `config`, with its startup fields set.
pub fn build_logger(config: &LoggerConfig) -> Arc<dyn Logger> {
    let logger: Arc<dyn Logger> = match config.backend {
        BackendKind::Writer => {
            Arc::new(WriterLogger::stderr(config.level).with_timestamps(config.timestamps))
        }
        BackendKind::Tracing => Arc::new(TracingLogger::new().with_max_level(config.level)),
    };

    let fields: Vec<Field> = config
        .fields
        .iter()
        .map(|(key, value)| Field::new(key.clone(), value.clone()))
        .collect();
    logger.set(&fields);
    logger
}

/// Full startup sequence: subscriber, base logger, then the bridge.
pub fn init(config: &LoggingConfig) -> Result<Arc<dyn Logger>, InitError> {
    init_subscriber(&config.subscriber)?;
    let logger = build_logger(&config.logger);

    if config.bridge.enabled {
        replace_framework_logger(logger.as_ref(), &config.bridge.module)?;
    }

    tracing::info!(
        backend = ?config.logger.backend,
        level = %config.logger.level,
        bridge = config.bridge.enabled,
        "Logging initialized"
    );
    Ok(logger)
}
