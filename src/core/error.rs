//! Defines the custom error type for the `core` module.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for the `core` module.
///
/// Recoverable conditions inside a scan or an aggregation never show up here: they
/// are carried as data (placeholders, directory error records, inline error blocks).
/// This enum covers the failures a caller has to react to.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Represents an I/O error, typically from file system operations.
    #[error("I/O error for path {1}: {0}")]
    Io(#[source] std::io::Error, PathBuf),

    /// Represents a root that is missing or is not a directory.
    #[error("Path is not a valid directory: {0}")]
    NotADirectory(PathBuf),

    /// Represents an error that occurred when the background worker was joined.
    /// This is often due to the worker panicking.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// An aggregation was requested while another one is still running.
    #[error("An aggregation is already running")]
    AggregationInProgress,

    /// An operation that needs a root was requested before one was chosen.
    #[error("No directory selected")]
    NoDirectorySelected,
}
