//! Bridge from framework diagnostics to a [`Logger`].
//!
//! The RPC stack logs connection-level events that belong to no single call.
//! [`FrameworkLogger`] accepts them through the [`DiagnosticLogger`] hook and
//! through the `log` facade, and forwards them to a wrapped logger.
//!
//! Fatal records are emitted at Error and then terminate the process with
//! status 1, whether or not the emission itself succeeded.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::logger::{Field, Level, Logger};

/// Value of the `module` field attached by [`replace_framework_logger`].
pub const SYSTEM_MODULE: &str = "system";

/// Logging hook expected by the RPC framework.
///
/// The `ln` variants behave exactly like their plain counterparts.
pub trait DiagnosticLogger: Send + Sync {
    fn info(&self, message: &str);
    fn info_fmt(&self, args: fmt::Arguments<'_>);
    fn infoln(&self, message: &str) {
        self.info(message);
    }

    fn warning(&self, message: &str);
    fn warning_fmt(&self, args: fmt::Arguments<'_>);
    fn warningln(&self, message: &str) {
        self.warning(message);
    }

    fn error(&self, message: &str);
    fn error_fmt(&self, args: fmt::Arguments<'_>);
    fn errorln(&self, message: &str) {
        self.error(message);
    }

    /// Log at Error and exit with a non-zero status.
    fn fatal(&self, message: &str) -> !;
    fn fatal_fmt(&self, args: fmt::Arguments<'_>) -> !;
    fn fatalln(&self, message: &str) -> ! {
        self.fatal(message)
    }

    /// Whether verbosity `level` is enabled.
    fn v(&self, level: i32) -> bool;
}

/// [`DiagnosticLogger`] backed by a [`Logger`].
pub struct FrameworkLogger {
    logger: Arc<dyn Logger>,
    exit: fn(i32) -> !,
}

impl FrameworkLogger {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            logger,
            exit: std::process::exit,
        }
    }

    /// Replace the process exit used by the fatal path.
    pub fn with_exit(mut self, exit: fn(i32) -> !) -> Self {
        self.exit = exit;
        self
    }

    // Emission runs inside catch_unwind so a panicking backend cannot skip
    // the exit call.
    fn fatal_with(&self, emit: impl FnOnce(&dyn Logger)) -> ! {
        let logger = self.logger.as_ref();
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| emit(logger))) {
            let reason = panic_message(payload.as_ref());
            let _ = panic::catch_unwind(AssertUnwindSafe(|| logger.error(&reason)));
        }
        (self.exit)(1)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "fatal log emission panicked".to_string()
    }
}

impl DiagnosticLogger for FrameworkLogger {
    fn info(&self, message: &str) {
        self.logger.info(message);
    }

    fn info_fmt(&self, args: fmt::Arguments<'_>) {
        self.logger.info_fmt(args);
    }

    fn warning(&self, message: &str) {
        self.logger.warning(message);
    }

    fn warning_fmt(&self, args: fmt::Arguments<'_>) {
        self.logger.warning_fmt(args);
    }

    fn error(&self, message: &str) {
        self.logger.error(message);
    }

    fn error_fmt(&self, args: fmt::Arguments<'_>) {
        self.logger.error_fmt(args);
    }

    fn fatal(&self, message: &str) -> ! {
        self.fatal_with(|logger| logger.error(message))
    }

    fn fatal_fmt(&self, args: fmt::Arguments<'_>) -> ! {
        self.fatal_with(|logger| logger.error_fmt(args))
    }

    fn v(&self, _level: i32) -> bool {
        true
    }
}

impl log::Log for FrameworkLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let logger = self
            .logger
            .with(&[Field::new("target", record.target().to_string())]);
        let level = match record.level() {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warning,
            log::Level::Info | log::Level::Debug | log::Level::Trace => Level::Info,
        };
        logger.log(level, format_args!("{}", record.args()));
    }

    fn flush(&self) {}
}

impl fmt::Debug for FrameworkLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameworkLogger").finish_non_exhaustive()
    }
}

/// Install a bridge over `logger` as the process-wide `log` logger.
///
/// The bridge logs through a branch of `logger` tagged with `module`. Call
/// this once, before the RPC stack starts logging.
pub fn replace_framework_logger(
    logger: &dyn Logger,
    module: &str,
) -> Result<(), log::SetLoggerError> {
    let bridge = FrameworkLogger::new(logger.with(&[Field::new("module", module.to_string())]));
    log::set_boxed_logger(Box::new(bridge))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CaptureLogger;
    use log::Log;

    #[test]
    fn test_forwards_levels() {
        let capture = Arc::new(CaptureLogger::default());
        let bridge = FrameworkLogger::new(capture.clone());

        bridge.info("i");
        bridge.infoln("iln");
        bridge.warning_fmt(format_args!("w{}", 1));
        bridge.warningln("wln");
        bridge.error("e");
        bridge.errorln("eln");

        let levels: Vec<_> = capture.records().iter().map(|r| (r.level, r.message.clone())).collect();
        assert_eq!(
            levels,
            vec![
                (Level::Info, "i".to_string()),
                (Level::Info, "iln".to_string()),
                (Level::Warning, "w1".to_string()),
                (Level::Warning, "wln".to_string()),
                (Level::Error, "e".to_string()),
                (Level::Error, "eln".to_string()),
            ]
        );
    }

    #[test]
    fn test_verbosity_always_enabled() {
        let bridge = FrameworkLogger::new(crate::logger::nop());
        assert!(bridge.v(0));
        assert!(bridge.v(99));
        assert!(bridge.enabled(&log::Metadata::builder().level(log::Level::Trace).build()));
    }

    #[test]
    fn test_log_facade_records() {
        let capture = Arc::new(CaptureLogger::default());
        let bridge = FrameworkLogger::new(capture.clone());

        bridge.log(
            &log::Record::builder()
                .level(log::Level::Debug)
                .target("h2::codec")
                .args(format_args!("frame {}", 3))
                .build(),
        );

        let records = capture.records();
        assert_eq!(records[0].level, Level::Info);
        assert_eq!(records[0].message, "frame 3");
        assert_eq!(records[0].str_field("target"), Some("h2::codec"));
        assert!(capture.fields().is_empty());
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&"boom".to_string()), "boom");
        assert_eq!(panic_message(&5u8), "fatal log emission panicked");
    }
}
