//! Backend forwarding records to the `tracing` ecosystem.
//!
//! Records are emitted as events under the `rpc_fieldlog` target with the
//! accumulated fields attached as a single JSON object in `fields`. Filtering
//! and formatting belong to the installed subscriber; `max_level` is an extra
//! per-instance ceiling.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::logger::field::merge_fields;
use crate::logger::{Field, FieldMap, Level, Logger};

pub const TARGET: &str = "rpc_fieldlog";

struct State {
    fields: FieldMap,
    rendered: String,
}

impl State {
    fn new(fields: FieldMap) -> Self {
        let rendered = render(&fields);
        Self { fields, rendered }
    }

    fn merge(&mut self, fields: &[Field]) {
        merge_fields(&mut self.fields, fields);
        self.rendered = render(&self.fields);
    }
}

fn render(fields: &FieldMap) -> String {
    serde_json::to_string(fields).unwrap_or_default()
}

/// Logger emitting `tracing` events.
pub struct TracingLogger {
    max_level: Level,
    state: RwLock<State>,
}

impl TracingLogger {
    pub fn new() -> Self {
        Self {
            max_level: Level::Trace,
            state: RwLock::new(State::new(FieldMap::new())),
        }
    }

    /// Drop records less severe than `level` before they reach the subscriber.
    pub fn with_max_level(mut self, level: Level) -> Self {
        self.max_level = level;
        self
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for TracingLogger {
    fn set(&self, fields: &[Field]) {
        self.state.write().merge(fields);
    }

    fn with(&self, fields: &[Field]) -> Arc<dyn Logger> {
        let mut copy = State::new(self.state.read().fields.clone());
        copy.merge(fields);

        Arc::new(Self {
            max_level: self.max_level,
            state: RwLock::new(copy),
        })
    }

    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if !level.passes(self.max_level) {
            return;
        }

        let state = self.state.read();
        let fields = state.rendered.as_str();
        match level {
            Level::Error => tracing::error!(target: TARGET, fields = %fields, "{}", args),
            Level::Warning => tracing::warn!(target: TARGET, fields = %fields, "{}", args),
            Level::Info => tracing::info!(target: TARGET, fields = %fields, "{}", args),
            Level::Debug => tracing::debug!(target: TARGET, fields = %fields, "{}", args),
            Level::Trace => tracing::trace!(target: TARGET, fields = %fields, "{}", args),
        }
    }
}

impl fmt::Debug for TracingLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingLogger")
            .field("max_level", &self.max_level)
            .field("fields", &self.state.read().fields)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::Value;
    use std::io;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Lines printed by a plain-text subscriber while `f` runs.
    pub(crate) fn captured_lines(f: impl FnOnce()) -> Vec<String> {
        let buf = Buffer::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let bytes = buf.0.lock().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn fields_of(logger: &TracingLogger) -> Value {
        serde_json::from_str(&logger.state.read().rendered).unwrap()
    }

    #[test]
    fn test_rendered_fields_follow_merges() {
        let logger = TracingLogger::new();
        logger.set(&[Field::new("a", 1), Field::new("b", "x")]);
        logger.set(&[Field::new("a", 2)]);

        assert_eq!(fields_of(&logger), serde_json::json!({"a": 2, "b": "x"}));
    }

    #[test]
    fn test_with_leaves_parent_untouched() {
        let parent = TracingLogger::new();
        parent.set(&[Field::new("KEY", "VALUE")]);

        let child = parent.with(&[Field::new("KEY1", "VALUE1")]);
        child.set(&[Field::new("KEY", "CHILD")]);

        assert_eq!(fields_of(&parent), serde_json::json!({"KEY": "VALUE"}));
    }

    #[test]
    fn test_threshold_drops_records_and_fields_reach_event() {
        let lines = captured_lines(|| {
            let logger = TracingLogger::new().with_max_level(Level::Info);
            logger.set(&[Field::new("k", "v")]);
            logger.warning("warned");
            logger.debug("hidden");
            logger.trace_fmt(format_args!("{}", "hidden"));
        });

        assert_eq!(lines.len(), 1, "{:?}", lines);
        assert!(lines[0].contains(" WARN rpc_fieldlog: warned"), "{}", lines[0]);
        assert!(lines[0].ends_with(r#"fields={"k":"v"}"#), "{}", lines[0]);
    }

    #[test]
    fn test_levels_map_to_tracing_levels() {
        let lines = captured_lines(|| {
            let logger = TracingLogger::new();
            for level in Level::ALL {
                logger.log_str(level, level.as_str());
            }
        });

        let expected = [
            ("ERROR", "error"),
            ("WARN", "warning"),
            ("INFO", "info"),
            ("DEBUG", "debug"),
            ("TRACE", "trace"),
        ];
        assert_eq!(lines.len(), expected.len(), "{:?}", lines);
        for (line, (tag, message)) in lines.iter().zip(expected) {
            assert!(
                line.contains(&format!(" {} rpc_fieldlog: {} fields={{}}", tag, message)),
                "{}",
                line
            );
        }
    }
}
