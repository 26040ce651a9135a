use std::path::PathBuf;
use std::sync::OnceLock;

use thiserror::Error;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Where and how verbosely to log. `RUST_LOG` overrides `level` when set.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    /// Directory for daily-rolling log files. Console only when `None`.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
    pub max_log_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "heliocube".to_string(),
            max_log_files: 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum LogSetupError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("Failed to create log directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create log file appender: {0}")]
    Appender(String),

    #[error("Logger initialization failed: {0}")]
    Init(String),
}

pub fn setup_logging(config: &LogConfig) -> Result<(), LogSetupError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| LogSetupError::InvalidFilter {
            filter: config.level.clone(),
            reason: e.to_string(),
        })?,
    };

    let file_layer = match &config.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LogSetupError::CreateDir {
                path: dir.clone(),
                source,
            })?;

            let file_appender = tracing_appender::rolling::Builder::new()
                .rotation(tracing_appender::rolling::Rotation::DAILY)
                .filename_prefix(config.file_prefix.as_str())
                .filename_suffix("log")
                .max_log_files(config.max_log_files)
                .build(dir)
                .map_err(|e| LogSetupError::Appender(e.to_string()))?;

            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            if LOG_GUARD.set(guard).is_err() {
                return Err(LogSetupError::Init("logging already initialized".to_string()));
            }

            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_ansi(false)
                    .with_writer(file_writer),
            )
        }
        None => None,
    };

    let console_writer = std::io::stdout.and(std::io::stderr.with_min_level(Level::WARN));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_ansi(true)
        .with_writer(console_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LogSetupError::Init(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_console_only() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.directory.is_none());
    }

    #[test]
    fn test_invalid_filter_error_message() {
        let err = LogSetupError::InvalidFilter {
            filter: "=[".to_string(),
            reason: "bad directive".to_string(),
        };
        assert!(err.to_string().contains("=["));
        assert!(err.to_string().contains("bad directive"));
    }
}
