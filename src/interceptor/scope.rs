//! Per-call logging lifecycle shared by the unary and streaming interceptors.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use chrono::{DateTime, SecondsFormat, Utc};
use tonic::{Code, Status};

use super::severity::{code_name, level_for_code};
use crate::context::{bind_logger, Context};
use crate::logger::{Field, Logger};

/// Kind of call, used in the summary message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Unary,
    Streaming,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallKind::Unary => f.write_str("unary"),
            CallKind::Streaming => f.write_str("streaming"),
        }
    }
}

/// Logging state of one in-flight call.
///
/// `begin` branches the base logger and binds it into a derived context;
/// `finish` records the outcome and emits the summary line.
pub struct CallScope {
    logger: Arc<dyn Logger>,
    started: Instant,
    kind: CallKind,
}

impl CallScope {
    /// Start a call on `full_method` (`/package.Service/Method`).
    ///
    /// Returns the scope and the context the handler must run with.
    pub fn begin(
        base: &dyn Logger,
        ctx: &Context,
        full_method: &str,
        kind: CallKind,
    ) -> (Self, Context) {
        let logger = base.with(&[]);
        let call_ctx = bind_logger(ctx, logger.clone());
        let started = Instant::now();

        add_std_fields(ctx, logger.as_ref(), full_method, SystemTime::now());

        (
            Self {
                logger,
                started,
                kind,
            },
            call_ctx,
        )
    }

    /// The per-call logger.
    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// Record the outcome and emit the summary record. Returns the outcome code.
    pub fn finish(self, error: Option<&Status>) -> Code {
        let code = error.map_or(Code::Ok, Status::code);
        let name = code_name(code);

        self.logger.set(&[
            Field::new("grpc.code", name),
            Field::new("grpc.time_ms", elapsed_ms(self.started.elapsed())),
        ]);
        if let Some(status) = error {
            self.logger.set(&[Field::new("error", status.to_string())]);
        }

        self.logger.log(
            level_for_code(code),
            format_args!("finished {} call with code {}", self.kind, name),
        );
        code
    }
}

impl fmt::Debug for CallScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallScope")
            .field("kind", &self.kind)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

fn add_std_fields(ctx: &Context, logger: &dyn Logger, full_method: &str, start: SystemTime) {
    let (service, method) = split_method(full_method);

    logger.set(&[
        Field::new("system", "grpc"),
        Field::new("span.kind", "server"),
        Field::new("grpc.service", service.to_string()),
        Field::new("grpc.method", method.to_string()),
        Field::new("grpc.start_time", format_time(start, SecondsFormat::Nanos)),
    ]);

    if let Some(deadline) = ctx.deadline() {
        logger.set(&[Field::new(
            "grpc.request.deadline",
            format_time(deadline, SecondsFormat::Secs),
        )]);
    }
}

/// Split `/package.Service/Method` into `("package.Service", "Method")`.
pub fn split_method(full_method: &str) -> (&str, &str) {
    match full_method.rsplit_once('/') {
        Some((service, method)) => (service.strip_prefix('/').unwrap_or(service), method),
        None => ("", full_method),
    }
}

/// Milliseconds with microsecond resolution; sub-microsecond time is truncated.
pub fn elapsed_ms(elapsed: Duration) -> f64 {
    (elapsed.as_nanos() / 1000) as f64 / 1000.0
}

fn format_time(time: SystemTime, precision: SecondsFormat) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(precision, true)
}
