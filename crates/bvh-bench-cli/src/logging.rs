use anyhow::{Context, Result};
use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt as fmt_layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Log levels for the console output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Only critical errors
    Error = 0,
    /// Important warnings
    Warn = 1,
    /// Normal informational messages
    Info = 2,
    /// Debug information
    Debug = 3,
    /// Verbose tracing information
    Trace = 4,
}

impl LogLevel {
    /// `-v` steps up from info to debug and trace
    pub fn from_verbosity(verbose: u8) -> Self {
        match verbose {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

/// Install the global subscriber: stderr at `console_level` (RUST_LOG wins
/// when set) and, if requested, a debug-level log file.
///
/// The returned guard must be held until exit so buffered file lines are flushed.
pub fn setup_logging(
    console_level: LogLevel,
    log_file: Option<&Path>,
) -> Result<Option<WorkerGuard>> {
    let console_filter = EnvFilter::builder()
        .with_default_directive(console_level.level_filter().into())
        .from_env_lossy();
    let console_layer = fmt_layer::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt_layer::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_filter(LevelFilter::DEBUG);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    tracing::debug!("Logging initialized at level {} (console)", console_level);
    Ok(guard)
}
