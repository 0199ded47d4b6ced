//! Convenience constructors and eager readers.

use crate::config::{CsvOptions, ViewOptions};
use crate::encoding::Encoding;
use crate::error::{ArrayFileError, Result};
use crate::index::LineTerminator;
use crate::view::{
    CsvFile, CustomDelimitedFile, LineAccess, LineIter, Record, Slice, TextFile,
};
use std::path::Path;

/// A line view whose splitting rule was chosen at runtime
#[derive(Debug)]
pub enum AnyTextView {
    Text(TextFile),
    Custom(CustomDelimitedFile),
}

impl AnyTextView {
    pub fn path(&self) -> &Path {
        match self {
            AnyTextView::Text(view) => view.path(),
            AnyTextView::Custom(view) => view.path(),
        }
    }
}

impl LineAccess for AnyTextView {
    type Item = String;

    fn len(&self) -> Result<usize> {
        match self {
            AnyTextView::Text(view) => view.len(),
            AnyTextView::Custom(view) => view.len(),
        }
    }

    fn get(&self, index: isize) -> Result<String> {
        match self {
            AnyTextView::Text(view) => view.get(index),
            AnyTextView::Custom(view) => view.get(index),
        }
    }

    fn get_slice<S: Into<Slice>>(&self, slice: S) -> Result<Vec<String>> {
        match self {
            AnyTextView::Text(view) => view.get_slice(slice),
            AnyTextView::Custom(view) => view.get_slice(slice),
        }
    }

    fn iter(&self) -> Result<LineIter<'_, String>> {
        match self {
            AnyTextView::Text(view) => view.iter(),
            AnyTextView::Custom(view) => view.iter(),
        }
    }

    fn iter_range(&self, start: usize, end: usize) -> Result<LineIter<'_, String>> {
        match self {
            AnyTextView::Text(view) => view.iter_range(start, end),
            AnyTextView::Custom(view) => view.iter_range(start, end),
        }
    }
}

pub fn open_text(path: impl AsRef<Path>) -> Result<TextFile> {
    TextFile::open(path)
}

pub fn open_custom(path: impl AsRef<Path>, delimiter: impl AsRef<[u8]>) -> Result<CustomDelimitedFile> {
    CustomDelimitedFile::open(path, delimiter)
}

pub fn open_csv(path: impl AsRef<Path>, options: &CsvOptions) -> Result<CsvFile> {
    CsvFile::with_options(path, options, Encoding::Utf8)
}

/// Open a line view as configured; `options.csv` is ignored here
pub fn open_with(path: impl AsRef<Path>, options: &ViewOptions) -> Result<AnyTextView> {
    options.validate()?;
    let path = path.as_ref();
    let view = match options.terminator()? {
        LineTerminator::Newline => {
            let mut view = TextFile::with_encoding(path, options.encoding)?;
            view.set_sequential_advice(options.sequential_advice);
            AnyTextView::Text(view)
        }
        LineTerminator::Custom(delimiter) => {
            AnyTextView::Custom(CustomDelimitedFile::with_encoding(
                path,
                delimiter,
                options.encoding,
            )?)
        }
    };
    Ok(view)
}

/// Open a record view as configured
///
/// # Errors
/// * `ConfigError` if `options.csv` is absent
pub fn open_csv_with(path: impl AsRef<Path>, options: &ViewOptions) -> Result<CsvFile> {
    options.validate()?;
    let csv = options
        .csv
        .as_ref()
        .ok_or_else(|| ArrayFileError::config("no [csv] section configured"))?;
    CsvFile::with_options(path, csv, options.encoding)
}

/// Every line of a UTF-8 file, read eagerly
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    TextFile::open(path)?.to_vec()
}

/// Every record of a delimited file, read eagerly
pub fn read_records(path: impl AsRef<Path>, options: &CsvOptions) -> Result<Vec<Record>> {
    open_csv(path, options)?.to_vec()
}
