//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! LoggingConfig
//!     → logging.rs: init_subscriber (tracing registry + EnvFilter + fmt)
//!     → logging.rs: build_logger (writer or tracing backend + base fields)
//!     → logging.rs: replace_framework_logger (bridge for framework diagnostics)
//!     → Arc<dyn Logger> handed to the interceptor layers
//! ```
//!
//! # Design Decisions
//! - Structured logging through `tracing` for the crate's own diagnostics
//! - One base logger per process, branched per call
//! - Startup failures are typed errors, never panics

pub mod logging;

pub use logging::{build_logger, init, init_subscriber, InitError};
