//! Error types and handling infrastructure for arrayfile.
//!
//! This module provides a centralized error type built with `thiserror`. The
//! library returns [`ArrayFileError`] everywhere; the binary wraps it with
//! `anyhow` for context.
//!
//! ## Design Principles
//!
//! - **Synchronous surfacing**: every error is returned at the offending call
//! - **Context preservation**: paths, indices and byte offsets travel with the error
//! - **Consistency**: one `Result` alias across all modules

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for arrayfile operations.
#[derive(Error, Debug)]
pub enum ArrayFileError {
    /// File system related errors (permission denied, read failures, etc.)
    #[error("File operation failed: {message}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// File not found at construction or restore time
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Path exists but is not a regular file
    #[error("Path is not a regular file: {path}")]
    NotAFile { path: PathBuf },

    /// Memory mapping related errors
    #[error("Memory mapping failed: {message}")]
    MemoryMappingError { message: String },

    /// Normalized index outside `[0, length)`
    #[error("Index {index} out of range for {length} lines")]
    IndexOutOfRange { index: isize, length: usize },

    /// Ranged iteration with `start > end`
    #[error("Invalid range: start {start} is greater than end {end}")]
    InvalidRange { start: usize, end: usize },

    /// Bad caller-supplied argument (zero slice step, empty delimiter, ...)
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Bytes could not be decoded under the configured encoding
    #[error("Cannot decode {encoding} text at byte {offset}: {message}")]
    DecodeError {
        encoding: &'static str,
        offset: u64,
        message: String,
    },

    /// Malformed quoting or structure in a delimited record
    #[error("Malformed record at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// A snapshot no longer matches the file it was taken from
    #[error("Snapshot of {path} is stale: {message}")]
    StaleSnapshot { path: PathBuf, message: String },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

/// Standard Result type for arrayfile operations.
pub type Result<T> = std::result::Result<T, ArrayFileError>;

impl ArrayFileError {
    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    /// Create a MemoryMappingError with a descriptive message
    pub fn memory_mapping(message: impl Into<String>) -> Self {
        Self::MemoryMappingError {
            message: message.into(),
        }
    }

    /// Create an InvalidArgument error with a descriptive message
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a ParseError for the given logical line
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create a ConfigError with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Map an error from the CSV reader; `line` is the logical record number
    ///
    /// I/O failures stay `FileError`, everything else is a `ParseError`.
    pub fn from_csv(err: csv::Error, line: usize) -> Self {
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => Self::file_error("Failed to read record", source),
            _ => Self::ParseError { line, message },
        }
    }

    /// Map an io::Error raised while opening `path`, keeping NotFound distinct
    pub fn from_open(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound { path },
            _ => Self::FileError {
                message: format!("Failed to open file: {}", path.display()),
                source: err,
            },
        }
    }
}

impl From<std::io::Error> for ArrayFileError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::FileError {
                message: "Permission denied".to_string(),
                source: err,
            },
            std::io::ErrorKind::InvalidData => Self::FileError {
                message: "Invalid data".to_string(),
                source: err,
            },
            _ => Self::FileError {
                message: "IO operation failed".to_string(),
                source: err,
            },
        }
    }
}
