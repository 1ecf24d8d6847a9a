//! Logger backends.
//!
//! # Backends
//! - `writer.rs`: plain lines to any `io::Write`, own level threshold
//! - `tracing.rs`: events for the installed `tracing` subscriber
//! - `capture.rs`: records kept in memory
//!
//! # Design Decisions
//! - Each backend is a thin pass-through; the shared contract lives in `logger`
//! - Field state sits behind a `parking_lot` lock so `set` works through `&self`
//!   and a panicking writer cannot poison later calls
//! - Rendered prefixes are recomputed on every merge

pub mod capture;
pub mod tracing;
pub mod writer;

pub use capture::{CaptureLogger, Record};
pub use self::tracing::TracingLogger;
pub use writer::WriterLogger;
