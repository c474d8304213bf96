//! # backup-display
//! Display helpers for listing backups: best effort date rendering and
//! file name based completeness.
//!

mod completeness;
mod date;
mod logger;

pub use completeness::{BackupStatus, is_complete_backup};
pub use date::{
    DEFAULT_PATTERN, DateFormat, DisplayTimezone, FILE_STAMP_FORMAT, FormatDateError,
    format_backup_date, parse_backup_date,
};
pub use logger::{LogLevel, LoggerError, LoggingConfig, init_logger};
