//! Delimiter-separated record parsing
//!
//! Parsing is delegated to the `csv` reader: a field wrapped in the quote
//! character may contain delimiters, newlines and doubled quotes (`""` for a
//! literal `"`). The reader is lenient. A quote inside an unquoted field is
//! kept literally, text after a closing quote is appended to the field, and a
//! quote left open runs to the end of the input.

use crate::encoding::Encoding;
use crate::error::{ArrayFileError, Result};
use csv::{ByteRecord, ReaderBuilder, StringRecord};
use std::borrow::Cow;

/// Field delimiter and quote character of a record format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFormat {
    pub delimiter: u8,
    pub quote: u8,
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl RecordFormat {
    /// # Errors
    /// * `InvalidArgument` unless both are distinct ASCII characters other
    ///   than `\r` and `\n`
    pub fn new(delimiter: char, quote: char) -> Result<Self> {
        for (what, c) in [("delimiter", delimiter), ("quote", quote)] {
            if !c.is_ascii() || c == '\n' || c == '\r' {
                return Err(ArrayFileError::invalid_argument(format!(
                    "{what} must be a single ASCII character other than a line break, got {c:?}"
                )));
            }
        }
        if delimiter == quote {
            return Err(ArrayFileError::invalid_argument(
                "delimiter and quote must differ",
            ));
        }
        Ok(Self {
            delimiter: delimiter as u8,
            quote: quote as u8,
        })
    }

    pub fn delimiter_char(&self) -> char {
        char::from(self.delimiter)
    }

    pub fn quote_char(&self) -> char {
        char::from(self.quote)
    }

    /// Reader configured for this format; rows may differ in length
    pub fn reader_builder(&self, has_headers: bool) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.quote)
            .has_headers(has_headers)
            .flexible(true);
        builder
    }

    /// Split one record into fields. `line` is the logical line number used
    /// in errors. An empty record has no fields.
    pub fn parse(&self, text: &str, line: usize) -> Result<Vec<String>> {
        let mut reader = self.reader_builder(false).from_reader(text.as_bytes());
        let mut record = StringRecord::new();
        let found = reader
            .read_record(&mut record)
            .map_err(|e| ArrayFileError::from_csv(e, line))?;
        if !found {
            return Ok(Vec::new());
        }
        Ok(record.iter().map(String::from).collect())
    }
}

/// Decode every field of a raw record
///
/// Decode errors report the byte offset of the record start plus the
/// position inside the failing field.
pub fn decode_fields(record: &ByteRecord, encoding: Encoding) -> Result<Vec<String>> {
    let start = record.position().map_or(0, |pos| pos.byte());
    record
        .iter()
        .map(|field| encoding.decode(field, start).map(Cow::into_owned))
        .collect()
}

/// One parsed line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Fields in file order, when no field names are configured
    Fields(Vec<String>),
    /// Fields keyed by header name
    Named(NamedRecord),
}

impl Record {
    /// Field values in file order
    pub fn values(&self) -> Vec<&str> {
        match self {
            Record::Fields(fields) => fields.iter().map(String::as_str).collect(),
            Record::Named(named) => named
                .iter()
                .map(|(_, value)| value)
                .chain(named.rest().iter().map(String::as_str))
                .collect(),
        }
    }

    pub fn as_fields(&self) -> Option<&[String]> {
        match self {
            Record::Fields(fields) => Some(fields),
            Record::Named(_) => None,
        }
    }

    pub fn as_named(&self) -> Option<&NamedRecord> {
        match self {
            Record::Named(named) => Some(named),
            Record::Fields(_) => None,
        }
    }

    /// Value of a named field; always `None` for unnamed records
    pub fn field(&self, name: &str) -> Option<&str> {
        self.as_named().and_then(|named| named.get(name))
    }
}

/// Header-keyed record
///
/// - keys keep header order
/// - a duplicated header name keeps its first position and the last value
/// - a short line leaves its trailing names absent (not empty strings)
/// - values beyond the header are kept in [`NamedRecord::rest`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NamedRecord {
    entries: Vec<(String, String)>,
    rest: Vec<String>,
}

impl NamedRecord {
    pub fn from_fields(names: &[String], values: Vec<String>) -> Self {
        let mut record = NamedRecord::default();
        let mut values = values.into_iter();

        for name in names {
            let Some(value) = values.next() else {
                break;
            };
            match record.entries.iter_mut().find(|(key, _)| key == name) {
                Some(entry) => entry.1 = value,
                None => record.entries.push((name.clone(), value)),
            }
        }
        record.rest = values.collect();
        record
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Values past the end of the header
    pub fn rest(&self) -> &[String] {
        &self.rest
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
