//! View configuration, loadable from TOML.
//!
//! ```toml
//! encoding = "latin-1"
//! line_delimiter = "\n\n"
//! sequential_advice = true
//!
//! [csv]
//! delimiter = "\t"
//! header = true
//! ```

use crate::encoding::Encoding;
use crate::error::{ArrayFileError, Result};
use crate::index::LineTerminator;
use crate::view::record::RecordFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options shared by every view
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewOptions {
    pub encoding: Encoding,

    /// Record separator; `None` means `\n`
    pub line_delimiter: Option<String>,

    /// Advise the kernel that the mapping will be read front to back
    pub sequential_advice: bool,

    /// Present when the file should be read as delimited records
    pub csv: Option<CsvOptions>,
}

impl ViewOptions {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let options: ViewOptions =
            toml::from_str(source).map_err(|e| ArrayFileError::config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            ArrayFileError::file_error(format!("Failed to read config: {}", path.display()), e)
        })?;
        Self::from_toml_str(&source)
    }

    /// # Errors
    /// * `ConfigError` for an empty line delimiter, an unusable CSV format,
    ///   or CSV combined with a custom line delimiter
    pub fn validate(&self) -> Result<()> {
        self.terminator()
            .map_err(|e| ArrayFileError::config(e.to_string()))?;
        if let Some(csv) = &self.csv {
            csv.format()
                .map_err(|e| ArrayFileError::config(e.to_string()))?;
            if !self.terminator()?.is_newline() {
                return Err(ArrayFileError::config(
                    "delimited records are always newline separated",
                ));
            }
        }
        Ok(())
    }

    pub fn terminator(&self) -> Result<LineTerminator> {
        match &self.line_delimiter {
            Some(delimiter) => LineTerminator::from_bytes(delimiter.as_bytes()),
            None => Ok(LineTerminator::Newline),
        }
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_line_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.line_delimiter = Some(delimiter.into());
        self
    }

    pub fn with_csv(mut self, csv: CsvOptions) -> Self {
        self.csv = Some(csv);
        self
    }
}

/// Options of the delimited-record view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvOptions {
    pub delimiter: char,
    pub quote: char,

    /// First line holds field names
    pub header: bool,

    /// Field names to use instead of (or without) a header row
    pub field_names: Option<Vec<String>>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            header: false,
            field_names: None,
        }
    }
}

impl CsvOptions {
    pub fn format(&self) -> Result<RecordFormat> {
        RecordFormat::new(self.delimiter, self.quote)
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_field_names(mut self, names: Vec<String>) -> Self {
        self.field_names = Some(names);
        self
    }
}
