//! Structured logging for RPC servers.
//!
//! A small [`Logger`] capability with immutable branching, interchangeable
//! backends, and interceptors that give every call its own logger, time the
//! call and emit one summary record whose level follows the status code.
//!
//! ```no_run
//! use std::sync::Arc;
//! use rpc_fieldlog::backend::WriterLogger;
//! use rpc_fieldlog::interceptor::{intercept_unary, UnaryServerInfo};
//! use rpc_fieldlog::{resolve_logger, Context, Level, Logger};
//!
//! # async fn run() {
//! let base: Arc<dyn Logger> = Arc::new(WriterLogger::stderr(Level::Info));
//! let info = UnaryServerInfo::new("/pkg.Service/Method");
//!
//! let reply = intercept_unary(base.as_ref(), Context::background(), &info, "ping", |ctx, req| async move {
//!     resolve_logger(&ctx).debug("handling");
//!     Ok::<_, tonic::Status>(req.len())
//! })
//! .await;
//! # let _ = reply;
//! # }
//! ```

pub mod backend;
pub mod bridge;
pub mod config;
pub mod context;
pub mod interceptor;
pub mod logger;
pub mod observability;

pub use bridge::{replace_framework_logger, DiagnosticLogger, FrameworkLogger};
pub use config::LoggingConfig;
pub use context::{bind_logger, resolve_logger, Context};
pub use interceptor::{StreamLoggingLayer, UnaryLoggingLayer};
pub use logger::{nop, Field, Level, Logger, NopLogger};
