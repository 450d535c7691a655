use log::{LevelFilter, Metadata, Record, SetLoggerError};

use crate::severity::LogSeverity;
use crate::time::now;

pub fn format_line(msg: &str, log_severity: LogSeverity) -> String {
    format!("[{}] {} {}", log_severity, now(), msg)
}

pub fn log(msg: String, log_severity: LogSeverity) {
    println!("{}", format_line(&msg, log_severity));
}

/// Routes records from the `log` facade to [`log`].
pub struct Logger {
    level: LevelFilter,
}

impl Logger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            log(record.args().to_string(), record.level().into());
        }
    }

    fn flush(&self) {}
}

/// Installs a [`Logger`] as the global logger. Fails if one is already set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(Box::leak(Box::new(Logger::new(level))))?;
    log::set_max_level(level);
    Ok(())
}
