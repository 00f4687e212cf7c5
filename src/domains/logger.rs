use crate::common::{NavError, NavResult};
use chrono::Utc;
use std::sync::Arc;

/// Where bake summaries, rejection diagnostics and context swaps are reported.
/// Calls never fail; a sink that cannot write drops the message.
pub trait DomainLogger: Send + Sync + 'static {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

pub type DynLogger = Arc<dyn DomainLogger>;

/// Target shared by every domain report, so bake output can be filtered apart
/// from internal tracing.
pub const DOMAIN_LOG_TARGET: &str = "nav_routing::domain";

/// Appends timestamped domain reports to a bake log through `fast_log`.
pub struct FileLogger;

impl FileLogger {
    /// Claims the global `log` facade. Fails if another backend already did.
    pub fn init(path: &str, level: log::LevelFilter) -> NavResult<()> {
        fast_log::init(fast_log::config::Config::new().file(path).level(level))
            .map_err(|e| NavError::Infrastructure(format!("bake log {}: {}", path, e)))?;
        Ok(())
    }

    fn record(level: log::Level, msg: &str) {
        log::log!(target: DOMAIN_LOG_TARGET, level, "{} - {}", Utc::now().to_rfc3339(), msg);
    }
}

impl DomainLogger for FileLogger {
    fn info(&self, msg: &str) {
        Self::record(log::Level::Info, msg);
    }

    fn warn(&self, msg: &str) {
        Self::record(log::Level::Warn, msg);
    }

    fn error(&self, msg: &str) {
        Self::record(log::Level::Error, msg);
    }
}
