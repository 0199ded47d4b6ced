//! Serializable view state
//!
//! A snapshot carries everything a view knows except the live mapping, which
//! cannot cross a process boundary. Restoring re-maps the same path.

use crate::encoding::Encoding;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// State of a line view with its index already built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSnapshot {
    pub path: PathBuf,
    pub encoding: Encoding,
    /// Raw terminator bytes; `[10]` for the default newline
    pub terminator: Vec<u8>,
    /// Lines dropped from the front of the scan (header rows)
    pub skip_leading: usize,
    pub offsets: Vec<u64>,
}

/// State of a delimited-record view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvSnapshot {
    pub delimiter: char,
    pub quote: char,
    pub header: bool,
    #[serde(default)]
    pub field_names: Option<Vec<String>>,
    pub text: TextSnapshot,
}
