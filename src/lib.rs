//! # arrayfile - Array-like Access to Large Text Files
//!
//! Random access into line-oriented text and delimited-record files without
//! loading them into memory. A view maps the file read-only, builds a table of
//! line offsets on first use, and decodes individual lines straight from the
//! mapping.
//!
//! ## Features
//!
//! - **Lazy indexing**: nothing is mapped or scanned until the first access
//! - **Python-style indexing**: negative indices and `start:stop:step` slices
//! - **Custom delimiters**: records separated by any byte sequence
//! - **Delimited records**: RFC 4180 quoting, optional header row
//! - **Snapshots**: serializable state that re-maps the file on restore
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`encoding`] - Line decoding (UTF-8, Latin-1, ASCII)
//! - [`scope`] - Scoped file handles and read-only memory mapping
//! - [`index`] - Offset tables and the lazily built line index
//! - [`view`] - Text, custom-delimiter and record views
//! - [`config`] - TOML-loadable view options
//! - [`loaders`] - Convenience constructors and eager readers

pub mod config;
pub mod encoding;
pub mod error;
pub mod index;
pub mod loaders;
pub mod scope;
pub mod view;

// Re-export commonly used types for convenience
pub use config::{CsvOptions, ViewOptions};
pub use encoding::Encoding;
pub use error::{ArrayFileError, Result};
pub use view::{
    CsvFile, CsvSnapshot, CustomDelimitedFile, LineAccess, NamedRecord, Record, Slice,
    TextFile, TextSnapshot,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
