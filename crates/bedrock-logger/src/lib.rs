pub mod log;
pub mod severity;
pub mod time;

pub use self::log::{init, log, Logger};
pub use severity::LogSeverity;
