//! Fallback logger that discards everything.

use std::fmt;
use std::sync::{Arc, LazyLock};

use super::{Field, Level, Logger};

static NOP: LazyLock<Arc<dyn Logger>> = LazyLock::new(|| Arc::new(NopLogger));

/// Stateless logger whose operations are all no-ops.
///
/// `with` hands back another no-op logger so call chains never need a
/// presence check.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopLogger;

impl Logger for NopLogger {
    fn set(&self, _fields: &[Field]) {}

    fn with(&self, _fields: &[Field]) -> Arc<dyn Logger> {
        nop()
    }

    fn log(&self, _level: Level, _args: fmt::Arguments<'_>) {}
}

/// Shared no-op logger instance.
pub fn nop() -> Arc<dyn Logger> {
    NOP.clone()
}
