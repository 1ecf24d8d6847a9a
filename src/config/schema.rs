//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! every field has a default, so an empty file is a valid configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::logger::Level;

/// Root logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base logger handed to the interceptors.
    pub logger: LoggerConfig,

    /// `tracing` subscriber used by the tracing backend and the binary.
    pub subscriber: SubscriberConfig,

    /// Framework diagnostics bridge.
    pub bridge: BridgeConfig,
}

/// Which backend implements the base logger.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Plain lines on stderr.
    #[default]
    Writer,
    /// Events for the `tracing` subscriber.
    Tracing,
}

/// Base logger configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggerConfig {
    pub backend: BackendKind,

    /// Least severe level that is still emitted.
    pub level: Level,

    /// Prefix writer lines with the local time.
    pub timestamps: bool,

    /// Fields set on the base logger at startup.
    pub fields: BTreeMap<String, String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Writer,
            level: Level::Info,
            timestamps: true,
            fields: BTreeMap::new(),
        }
    }
}

/// Output format of the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// `tracing` subscriber configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SubscriberConfig {
    /// `EnvFilter` directives, overridden by `RUST_LOG` when set.
    pub filter: String,

    pub format: LogFormat,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            filter: "rpc_fieldlog=info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Framework diagnostics bridge configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    /// Install the bridge as the process-wide `log` logger.
    pub enabled: bool,

    /// Value of the `module` field on bridged records.
    pub module: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            module: crate::bridge::SYSTEM_MODULE.to_string(),
        }
    }
}
