//! Minimal backend writing plain lines to any `io::Write`.
//!
//! Line shape: `[INFO] {key:value key:value} message`, optionally preceded by
//! a local `YYYY/MM/DD HH:MM:SS` timestamp.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::logger::field::{merge_fields, render_fields};
use crate::logger::{Field, FieldMap, Level, Logger};

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

struct State {
    level: Level,
    fields: FieldMap,
    prefix: String,
}

impl State {
    fn new(level: Level, fields: FieldMap) -> Self {
        let mut state = Self {
            level,
            fields,
            prefix: String::new(),
        };
        state.render();
        state
    }

    fn merge(&mut self, fields: &[Field]) {
        merge_fields(&mut self.fields, fields);
        self.render();
    }

    // The prefix is rebuilt on every merge so the next emit sees it.
    fn render(&mut self) {
        self.prefix = if self.fields.is_empty() {
            " ".to_string()
        } else {
            format!(" {{{}}} ", render_fields(&self.fields, ':'))
        };
    }
}

/// Writer-backed logger with its own level threshold.
pub struct WriterLogger {
    sink: Sink,
    timestamps: bool,
    state: RwLock<State>,
}

impl WriterLogger {
    /// Create a logger writing to `writer`, emitting records up to `level`.
    pub fn new(writer: impl Write + Send + 'static, level: Level) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
            timestamps: false,
            state: RwLock::new(State::new(level, FieldMap::new())),
        }
    }

    /// Logger writing timestamped lines to stderr.
    pub fn stderr(level: Level) -> Self {
        Self::new(io::stderr(), level).with_timestamps(true)
    }

    /// Prefix each line with the local wall-clock time.
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    /// Change the threshold of this instance. Existing branches keep theirs.
    pub fn set_level(&self, level: Level) -> &Self {
        self.state.write().level = level;
        self
    }

    pub fn level(&self) -> Level {
        self.state.read().level
    }
}

impl Logger for WriterLogger {
    fn set(&self, fields: &[Field]) {
        self.state.write().merge(fields);
    }

    fn with(&self, fields: &[Field]) -> Arc<dyn Logger> {
        let state = self.state.read();
        let mut copy = State::new(state.level, state.fields.clone());
        copy.merge(fields);

        Arc::new(Self {
            sink: self.sink.clone(),
            timestamps: self.timestamps,
            state: RwLock::new(copy),
        })
    }

    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let line = {
            let state = self.state.read();
            if !level.passes(state.level) {
                return;
            }
            if self.timestamps {
                format!(
                    "{} [{}]{}{}",
                    chrono::Local::now().format("%Y/%m/%d %H:%M:%S"),
                    level.tag(),
                    state.prefix,
                    args
                )
            } else {
                format!("[{}]{}{}", level.tag(), state.prefix, args)
            }
        };

        // Sink errors are dropped; emitting never fails.
        let mut sink = self.sink.lock();
        let _ = writeln!(sink, "{}", line);
    }
}

impl fmt::Debug for WriterLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("WriterLogger")
            .field("level", &state.level)
            .field("fields", &state.fields)
            .field("timestamps", &self.timestamps)
            .finish()
    }
}
