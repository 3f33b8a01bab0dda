use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the sweep harness
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to archive {path}: {source}")]
    ArchiveError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write summary {path}: {source}")]
    SummaryError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("Failed to serialize JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type for sweep operations
pub type BenchResult<T> = Result<T, BenchError>;

/// Utility functions for working with BenchError
pub mod util {
    use super::*;
    use std::path::Path;

    /// Check that a path names an existing regular file
    pub fn ensure_file_exists<P: AsRef<Path>>(path: P) -> BenchResult<()> {
        let path_ref = path.as_ref();
        if !path_ref.is_file() {
            return Err(BenchError::FileNotFound(path_ref.to_path_buf()));
        }
        Ok(())
    }

    /// Attach the failing path to an archive I/O error
    pub fn archive_error<P: AsRef<Path>>(path: P) -> impl FnOnce(io::Error) -> BenchError {
        let path = path.as_ref().to_path_buf();
        move |source| BenchError::ArchiveError { path, source }
    }

    /// Attach the failing path to a summary I/O error
    pub fn summary_error<P: AsRef<Path>>(path: P) -> impl FnOnce(io::Error) -> BenchError {
        let path = path.as_ref().to_path_buf();
        move |source| BenchError::SummaryError { path, source }
    }
}
