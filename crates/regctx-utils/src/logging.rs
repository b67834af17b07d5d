//! # Logging Utilities
//!
//! Logging infrastructure for regctx using `tracing`.
//!
//! This module provides structured logging with support for:
//! - Pretty (development) and JSON (machine-readable) output
//! - Environment variable configuration
//! - Optional non-blocking file output
//!
//! Console output goes to stderr so that command output on stdout stays clean.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use regctx_utils::init_logging;
//!
//! // Keep the guard alive for as long as logs should be written
//! let _guard = init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Log level filter (e.g., `RUST_LOG=debug`, `RUST_LOG=regctx_core=trace`)
//! - `REGCTX_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
//! - `REGCTX_LOG_FILE`: Optional log file path. If it names a directory, a dated
//!   `YYYY-MM-DD-regctx.log` file is created inside it

use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Utc;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "REGCTX_LOG_FORMAT";
/// Environment variable naming the log file or directory.
pub const LOG_FILE_ENV: &str = "REGCTX_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    #[default]
    Pretty,
    /// JSON, one object per line
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(format!("{s}. Use 'pretty' or 'json'"))),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    Error,
    Warn,
    /// Info level (default)
    Info,
    Debug,
    /// Trace level (most verbose, includes per-register detail)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(format!(
                "{s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            ))),
        }
    }
}

/// Logging setup
///
/// ## Example
///
/// ```rust,no_run
/// use regctx_utils::{init_logging_with, LogFormat, LogLevel, LoggingConfig};
///
/// let config = LoggingConfig::default().with_level(LogLevel::Debug).with_format(LogFormat::Json);
/// let _guard = init_logging_with(&config).expect("Failed to initialize logging");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoggingConfig
{
    /// Level to log at. `None` defers to `RUST_LOG`, then `info`
    pub level: Option<LogLevel>,
    pub format: LogFormat,
    /// File (or directory for a dated file) to log to in addition to stderr
    pub file: Option<PathBuf>,
}

impl LoggingConfig
{
    /// Read `REGCTX_LOG_FORMAT` and `REGCTX_LOG_FILE`
    ///
    /// ## Errors
    ///
    /// - `InvalidFormat`: `REGCTX_LOG_FORMAT` is set to an unknown format
    pub fn from_env() -> Result<Self, LoggingError>
    {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    ///
    /// ## Errors
    ///
    /// - `InvalidFormat`: the format variable is set to an unknown format
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LoggingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = match lookup(LOG_FORMAT_ENV) {
            Some(value) if !value.is_empty() => value.parse()?,
            _ => LogFormat::default(),
        };
        let file = lookup(LOG_FILE_ENV).filter(|value| !value.is_empty()).map(PathBuf::from);

        Ok(Self {
            level: None,
            format,
            file,
        })
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self
    {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self
    {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self
    {
        self.file = Some(file.into());
        self
    }

    /// Filter directive in effect: the explicit level, else `RUST_LOG`, else `info`.
    #[must_use]
    pub fn filter_directive(&self) -> String
    {
        match self.level {
            Some(level) => Level::from(level).to_string(),
            None => std::env::var("RUST_LOG")
                .ok()
                .filter(|value| EnvFilter::try_new(value).is_ok())
                .unwrap_or_else(|| Level::INFO.to_string()),
        }
    }
}

/// Keeps buffered file output flowing; logs written after it drops may be lost.
#[derive(Debug)]
pub struct LoggingGuard
{
    log_file: Option<PathBuf>,
    _worker: Option<WorkerGuard>,
}

impl LoggingGuard
{
    /// File receiving logs, when file output is enabled.
    #[must_use]
    pub fn log_file(&self) -> Option<&Path>
    {
        self.log_file.as_deref()
    }
}

/// Initialize logging from the environment
///
/// ## Errors
///
/// Returns an error if:
/// - Logging is already initialized
/// - `REGCTX_LOG_FORMAT` holds an unknown format
/// - The log file directory cannot be created
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    init_logging_with(&LoggingConfig::from_env()?)
}

/// Initialize logging with an explicit configuration
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the log file
/// directory cannot be created.
pub fn init_logging_with(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError>
{
    let directive = config.filter_directive();
    let mut layers: Vec<BoxedLayer> = vec![console_layer(config.format, EnvFilter::new(&directive))];

    let mut log_file = None;
    let mut worker = None;
    if let Some(path) = &config.file {
        let path = resolve_log_file(path, &Utc::now().format("%Y-%m-%d").to_string());
        let directory = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
        std::fs::create_dir_all(directory)?;

        let file_name = path
            .file_name()
            .ok_or_else(|| LoggingError::InitializationFailed(format!("{} has no file name", path.display())))?;
        let appender = tracing_appender::rolling::never(directory, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        layers.push(file_layer(config.format, non_blocking, EnvFilter::new(&directive)));
        log_file = Some(path);
        worker = Some(guard);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

    Ok(LoggingGuard {
        log_file,
        _worker: worker,
    })
}

/// The file to write: `path` itself, or a dated file inside it when it is a directory.
fn resolve_log_file(path: &Path, date: &str) -> PathBuf
{
    if path.is_dir() {
        path.join(format!("{date}-regctx.log"))
    } else {
        path.to_path_buf()
    }
}

fn console_layer(format: LogFormat, filter: EnvFilter) -> BoxedLayer
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(true)
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(io::stderr)
            .with_filter(filter)
            .boxed(),
    }
}

fn file_layer(format: LogFormat, writer: tracing_appender::non_blocking::NonBlocking, filter: EnvFilter) -> BoxedLayer
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false) // No ANSI in files
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
    }
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("dev").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("prod").unwrap(), LogFormat::Json);
        assert!(matches!(LogFormat::from_str("xml"), Err(LoggingError::InvalidFormat(_))));
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("dbg").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(matches!(LogLevel::from_str("loud"), Err(LoggingError::InvalidLevel(_))));
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_config_from_lookup()
    {
        let config = LoggingConfig::from_lookup(|key| match key {
            LOG_FORMAT_ENV => Some("json".to_string()),
            LOG_FILE_ENV => Some("/var/log/regctx.log".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/var/log/regctx.log")));
        assert_eq!(config.level, None);
    }

    #[test]
    fn test_config_defaults()
    {
        let config = LoggingConfig::from_lookup(|_| Some(String::new())).unwrap();
        assert_eq!(config, LoggingConfig::default());
    }

    #[test]
    fn test_config_rejects_unknown_format()
    {
        assert!(LoggingConfig::from_lookup(|_| Some("yaml".to_string())).is_err());
    }

    #[test]
    fn test_explicit_level_wins()
    {
        let config = LoggingConfig::default().with_level(LogLevel::Trace);
        assert_eq!(config.filter_directive(), "TRACE");
    }

    #[test]
    fn test_resolve_log_file()
    {
        let dir = std::env::temp_dir();
        assert_eq!(resolve_log_file(&dir, "2025-01-02"), dir.join("2025-01-02-regctx.log"));

        let file = dir.join("regctx-does-not-exist").join("out.log");
        assert_eq!(resolve_log_file(&file, "2025-01-02"), file);
    }
}
