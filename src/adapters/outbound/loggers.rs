use crate::domains::logger::{DomainLogger, DynLogger, FileLogger, DOMAIN_LOG_TARGET};
use std::sync::Arc;

/// Forwards domain messages to `tracing`, so they share the subscriber the
/// binary installed.
struct TracingBridge;

impl DomainLogger for TracingBridge {
    fn info(&self, msg: &str) {
        tracing::info!(target: DOMAIN_LOG_TARGET, "{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: DOMAIN_LOG_TARGET, "{}", msg);
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: DOMAIN_LOG_TARGET, "{}", msg);
    }
}

pub fn init_console_logger() -> DynLogger {
    Arc::new(TracingBridge)
}

/// Installs `fast_log` and returns a domain logger writing through it.
pub fn init_file_logger(path: &str, level: log::LevelFilter) -> Result<DynLogger, String> {
    FileLogger::init(path, level).map_err(|e| e.to_string())?;
    Ok(Arc::new(FileLogger))
}

struct NoOp;

impl DomainLogger for NoOp {
    fn info(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
}

/// Silent logger, the default for library callers and unit tests.
pub fn init_noop_logger() -> DynLogger {
    Arc::new(NoOp)
}

/// Fans every message out to all wrapped loggers in order.
pub struct MultiLogger {
    sinks: Vec<DynLogger>,
}

impl MultiLogger {
    pub fn new(sinks: Vec<DynLogger>) -> Self {
        Self { sinks }
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.info(msg));
    }

    fn warn(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.warn(msg));
    }

    fn error(&self, msg: &str) {
        self.sinks.iter().for_each(|s| s.error(msg));
    }
}

/// File logger plus console when the file can be opened, console alone otherwise.
pub fn init_combined_logger(path: Option<&str>, level: log::LevelFilter) -> DynLogger {
    let console = init_console_logger();
    let Some(path) = path else {
        return console;
    };
    match init_file_logger(path, level) {
        Ok(file) => Arc::new(MultiLogger::new(vec![file, console])),
        Err(e) => {
            console.warn(&e);
            console
        }
    }
}
