//! The logging capability shared by every backend.
//!
//! # Data Flow
//! ```text
//! base logger (configured once)
//!     → with()  : independent branch per call
//!     → set()   : merge fields into that branch
//!     → info()/error()/... : emit fields + message if the level passes
//! ```
//!
//! # Design Decisions
//! - `set` takes `&self`: a branch handed out as `Arc<dyn Logger>` is mutated
//!   by the interceptor after the handler has already cloned it
//! - `with` returns a fresh `Arc` that shares no field state with its parent
//! - Merges apply call by call, left to right; the last write for a key wins
//! - Emission never returns an error

use std::fmt;
use std::sync::Arc;

pub mod field;
pub mod level;
pub mod nop;

pub use field::{Field, FieldMap};
pub use level::{Level, ParseLevelError};
pub use nop::{nop, NopLogger};

/// Structured logger with immutable branching.
pub trait Logger: Send + Sync + 'static {
    /// Merge `fields` into this instance.
    fn set(&self, fields: &[Field]);

    /// Return an independent copy of this logger with `fields` merged in.
    /// The receiver is left untouched.
    fn with(&self, fields: &[Field]) -> Arc<dyn Logger>;

    /// Emit a record at `level`. Dropped if below the backend threshold.
    fn log(&self, level: Level, args: fmt::Arguments<'_>);

    fn log_str(&self, level: Level, message: &str) {
        self.log(level, format_args!("{}", message));
    }

    fn trace(&self, message: &str) {
        self.log_str(Level::Trace, message);
    }

    fn trace_fmt(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Trace, args);
    }

    fn debug(&self, message: &str) {
        self.log_str(Level::Debug, message);
    }

    fn debug_fmt(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    fn info(&self, message: &str) {
        self.log_str(Level::Info, message);
    }

    fn info_fmt(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    fn warning(&self, message: &str) {
        self.log_str(Level::Warning, message);
    }

    fn warning_fmt(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warning, args);
    }

    fn error(&self, message: &str) {
        self.log_str(Level::Error, message);
    }

    fn error_fmt(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }
}

impl fmt::Debug for dyn Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}
