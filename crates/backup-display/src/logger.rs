use std::{fs::create_dir_all, io, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{
    Level,
    subscriber::{SetGlobalDefaultError, set_global_default},
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{layer::SubscriberExt, registry};

/// The most verbose level that is logged.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

/// The logger config.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// The most verbose level that is logged.
    pub level: LogLevel,

    /// The directory for daily log files. Logs only go to stderr if unset.
    pub directory: Option<PathBuf>,
}

/// Create and set the global loggers.
///
/// Logs are written to stderr so they stay out of any output on stdout.
pub fn init_logger(config: &LoggingConfig) -> Result<Vec<WorkerGuard>, LoggerError> {
    let filter =
        tracing_subscriber::filter::Targets::new().with_default(Level::from(config.level));

    let mut guards = Vec::with_capacity(2);

    // File layer
    let file_layer = match &config.directory {
        Some(directory) => {
            create_dir_all(directory).map_err(LoggerError::CreateDirectory)?;

            let appender = RollingFileAppender::builder()
                .filename_prefix("backup-display")
                .filename_suffix("log")
                .rotation(Rotation::DAILY)
                .max_log_files(90)
                .build(directory)?;

            let (writer, guard) = tracing_appender::non_blocking(appender);
            guards.push(guard);

            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);

            Some(layer)
        }
        None => None,
    };

    // Std layer
    let std_layer = {
        let (writer, guard) = tracing_appender::non_blocking(io::stderr());
        guards.push(guard);

        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(true)
            .with_target(false)
    };

    // Create registry
    let registry = registry().with(file_layer).with(std_layer).with(filter);

    // Set global subscriber
    set_global_default(registry)?;

    Ok(guards)
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Failed to create rolling appender:\n{0}")]
    CreateRollingAppender(#[from] tracing_appender::rolling::InitError),

    #[error("Failed to create log directory:\n{0}")]
    CreateDirectory(#[source] io::Error),

    #[error("Failed to set the global logger:\n{0}")]
    SetGlobalDefault(#[from] SetGlobalDefaultError),
}
