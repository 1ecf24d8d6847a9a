//! In-memory backend that keeps every emitted record.
//!
//! Used for assertions in tests.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::logger::field::{merge_fields, render_fields};
use crate::logger::{Field, FieldMap, Level, Logger};

/// One emitted record with a snapshot of the fields at emit time.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub level: Level,
    pub message: String,
    pub fields: FieldMap,
}

impl Record {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Field value as a string slice, if it is a JSON string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {{{}}} {}",
            self.level.tag(),
            render_fields(&self.fields, '='),
            self.message
        )
    }
}

/// Logger collecting records in memory. Branches share the record list.
pub struct CaptureLogger {
    level: Level,
    records: Arc<Mutex<Vec<Record>>>,
    fields: RwLock<FieldMap>,
}

impl CaptureLogger {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            records: Arc::new(Mutex::new(Vec::new())),
            fields: RwLock::new(FieldMap::new()),
        }
    }

    /// Snapshot of everything emitted so far, across all branches.
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    /// Remove and return the collected records.
    pub fn take(&self) -> Vec<Record> {
        std::mem::take(&mut *self.records.lock())
    }

    /// Current fields of this instance.
    pub fn fields(&self) -> FieldMap {
        self.fields.read().clone()
    }
}

impl Default for CaptureLogger {
    fn default() -> Self {
        Self::new(Level::Trace)
    }
}

impl Logger for CaptureLogger {
    fn set(&self, fields: &[Field]) {
        merge_fields(&mut self.fields.write(), fields);
    }

    fn with(&self, fields: &[Field]) -> Arc<dyn Logger> {
        let mut copy = self.fields.read().clone();
        merge_fields(&mut copy, fields);

        Arc::new(Self {
            level: self.level,
            records: self.records.clone(),
            fields: RwLock::new(copy),
        })
    }

    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if !level.passes(self.level) {
            return;
        }

        let record = Record {
            level,
            message: args.to_string(),
            fields: self.fields.read().clone(),
        };
        self.records.lock().push(record);
    }
}

impl fmt::Debug for CaptureLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureLogger")
            .field("level", &self.level)
            .field("records", &self.records.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_with_last_write_wins() {
        let root = CaptureLogger::default();
        root.set(&[Field::new("k", "first"), Field::new("only_root", 1)]);

        let child = root.with(&[Field::new("k", "second")]);
        child.set(&[Field::new("k", "third"), Field::new("k", "fourth")]);
        child.info("child");
        root.info("root");

        let records = root.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].str_field("k"), Some("fourth"));
        assert_eq!(records[0].field("only_root"), Some(&Value::from(1)));
        assert_eq!(records[1].str_field("k"), Some("first"));
        assert_eq!(root.fields().len(), 2);
    }

    #[test]
    fn test_threshold_and_formatting() {
        let logger = CaptureLogger::new(Level::Warning);
        logger.info("dropped");
        logger.debug_fmt(format_args!("dropped {}", 1));
        logger.warning_fmt(format_args!("{},{}", "1", "2"));
        logger.error("kept");

        let records = logger.take();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, Level::Warning);
        assert_eq!(records[0].message, "1,2");
        assert_eq!(records[1].to_string(), "[ERRO] {} kept");
        assert!(logger.records().is_empty());
    }
}
