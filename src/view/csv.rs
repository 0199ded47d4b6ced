//! Delimited-record view layered on a [`TextFile`]

use crate::config::CsvOptions;
use crate::encoding::Encoding;
use crate::error::{ArrayFileError, Result};
use crate::scope::{OpenFlags, ScopedFile};
use crate::view::record::{decode_fields, NamedRecord, Record, RecordFormat};
use crate::view::slice::Slice;
use crate::view::snapshot::CsvSnapshot;
use crate::view::text::TextFile;
use crate::view::{LineAccess, LineIter};
use std::path::Path;

/// Random access into the records of a CSV-like file
///
/// Each logical line of the underlying [`TextFile`] is one record. With a
/// header row, line 0 is hidden from the index and its fields become the
/// field names of every [`Record::Named`] returned.
///
/// Indexed access parses a single physical line, so a quoted field spanning
/// lines is cut at the line end there; [`LineAccess::iter`] streams the file
/// through the CSV reader, which joins such lines and skips blank ones.
#[derive(Debug)]
pub struct CsvFile {
    text: TextFile,
    format: RecordFormat,
    header: bool,
    field_names: Option<Vec<String>>,
}

impl CsvFile {
    /// Comma-separated UTF-8 records without a header
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(path, &CsvOptions::default(), Encoding::Utf8)
    }

    /// Open with explicit record options and text encoding
    ///
    /// When `options.header` is set and no explicit field names are given,
    /// the header record is read immediately through the CSV reader, without
    /// mapping the file.
    ///
    /// # Errors
    /// * `FileNotFound` if `path` does not exist
    /// * `InvalidArgument` for an unusable delimiter or quote
    /// * `DecodeError` / `ParseError` from the header record
    pub fn with_options(
        path: impl AsRef<Path>,
        options: &CsvOptions,
        encoding: Encoding,
    ) -> Result<Self> {
        let path = path.as_ref();
        let format = options.format()?;
        let skip = usize::from(options.header);
        let text = TextFile::with_skip(path, encoding, skip)?;

        let field_names = match (&options.field_names, options.header) {
            (Some(names), _) => Some(names.clone()),
            (None, true) => Some(read_header(path, encoding, format)?),
            (None, false) => None,
        };

        Ok(Self {
            text,
            format,
            header: options.header,
            field_names,
        })
    }

    /// Rebuild a view from a snapshot, re-mapping its path
    pub fn restore(snapshot: CsvSnapshot) -> Result<Self> {
        let CsvSnapshot {
            delimiter,
            quote,
            header,
            field_names,
            text,
        } = snapshot;

        if text.skip_leading != usize::from(header) {
            return Err(ArrayFileError::StaleSnapshot {
                path: text.path.clone(),
                message: "header flag does not match the stored index".to_string(),
            });
        }

        Ok(Self {
            format: RecordFormat::new(delimiter, quote)?,
            text: TextFile::restore(text)?,
            header,
            field_names,
        })
    }

    pub fn snapshot(&self) -> Result<CsvSnapshot> {
        Ok(CsvSnapshot {
            delimiter: self.format.delimiter_char(),
            quote: self.format.quote_char(),
            header: self.header,
            field_names: self.field_names.clone(),
            text: self.text.snapshot()?,
        })
    }

    pub fn field_names(&self) -> Option<&[String]> {
        self.field_names.as_deref()
    }

    pub fn has_header(&self) -> bool {
        self.header
    }

    pub fn format(&self) -> RecordFormat {
        self.format
    }

    /// The underlying line view (header already hidden)
    pub fn text(&self) -> &TextFile {
        &self.text
    }

    pub fn path(&self) -> &Path {
        self.text.path()
    }

    pub fn close(&self) {
        self.text.close();
    }

    fn to_record(&self, fields: Vec<String>) -> Record {
        match &self.field_names {
            Some(names) => Record::Named(NamedRecord::from_fields(names, fields)),
            None => Record::Fields(fields),
        }
    }

    fn parse_line(&self, text: &str, line: usize) -> Result<Record> {
        let fields = self.format.parse(text, line)?;
        Ok(self.to_record(fields))
    }
}

/// Parse the first record of `path` as a header row
fn read_header(path: &Path, encoding: Encoding, format: RecordFormat) -> Result<Vec<String>> {
    let handle = ScopedFile::acquire(path, OpenFlags::READ)?;
    let mut reader = format.reader_builder(true).from_reader(handle);
    let header = reader
        .byte_headers()
        .map_err(|e| ArrayFileError::from_csv(e, 0))?;
    decode_fields(header, encoding)
}

impl LineAccess for CsvFile {
    type Item = Record;

    fn len(&self) -> Result<usize> {
        self.text.len()
    }

    fn get(&self, index: isize) -> Result<Record> {
        let lines = self.text.lines();
        let line = lines.resolve(index)?;
        self.parse_line(&lines.line_at(line)?, line)
    }

    fn get_slice<S: Into<Slice>>(&self, slice: S) -> Result<Vec<Record>> {
        let lines = self.text.lines();
        lines
            .positions(slice.into())?
            .map(|line| self.parse_line(&lines.line_at(line)?, line))
            .collect()
    }

    /// Re-reads the file through the CSV reader, skipping the header
    ///
    /// Quoted newlines are joined and blank lines skipped, so the count can
    /// differ from [`LineAccess::len`].
    fn iter(&self) -> Result<LineIter<'_, Record>> {
        let handle = ScopedFile::acquire(self.text.path(), OpenFlags::READ)?;
        let reader = self.format.reader_builder(self.header).from_reader(handle);
        let encoding = self.text.encoding();

        Ok(Box::new(reader.into_byte_records().enumerate().map(
            move |(n, record)| -> Result<Record> {
                let record = record.map_err(|e| ArrayFileError::from_csv(e, n))?;
                Ok(self.to_record(decode_fields(&record, encoding)?))
            },
        )))
    }

    fn iter_range(&self, start: usize, end: usize) -> Result<LineIter<'_, Record>> {
        let lines = self.text.lines().range(start, end)?;
        let first = lines.position();
        Ok(Box::new(lines.enumerate().map(move |(n, line)| {
            line.and_then(|text| self.parse_line(&text, first + n))
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LINES: [&str; 3] = [
        "en,ja",
        "this is English .,this is Japanese .",
        "this is also English .,this is also Japanese .",
    ];

    fn create_test_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content).expect("Failed to write test data");
        file.flush().expect("Failed to flush test data");
        file
    }

    fn bilingual_file() -> NamedTempFile {
        let content: String = LINES.iter().map(|line| format!("{line}\n")).collect();
        create_test_file(content.as_bytes())
    }

    fn with_header() -> CsvOptions {
        CsvOptions {
            header: true,
            ..CsvOptions::default()
        }
    }

    fn named(pairs: &[(&str, &str)]) -> Record {
        let names: Vec<String> = pairs.iter().map(|(k, _)| k.to_string()).collect();
        let values: Vec<String> = pairs.iter().map(|(_, v)| v.to_string()).collect();
        Record::Named(NamedRecord::from_fields(&names, values))
    }

    #[test]
    fn test_open_defaults() {
        let file = bilingual_file();
        let data = CsvFile::open(file.path()).unwrap();
        assert_eq!(data.format(), RecordFormat::default());
        assert!(!data.has_header());
        assert!(data.field_names().is_none());
        assert!(!data.text().is_mapped());
    }

    #[test]
    fn test_without_header() {
        let file = bilingual_file();
        let data = CsvFile::open(file.path()).unwrap();

        assert_eq!(data.len().unwrap(), 3);
        assert_eq!(
            data.get(0).unwrap(),
            Record::Fields(vec!["en".into(), "ja".into()])
        );

        let expected: Vec<Record> = LINES
            .iter()
            .map(|line| Record::Fields(line.split(',').map(String::from).collect()))
            .collect();
        assert_eq!(data.to_vec().unwrap(), expected);
        assert_eq!(data.get_slice(..).unwrap(), expected);
    }

    #[test]
    fn test_with_header() {
        let file = bilingual_file();
        let data = CsvFile::with_options(file.path(), &with_header(), Encoding::Utf8).unwrap();

        // Parsed eagerly, before any mapping
        assert_eq!(data.field_names().unwrap(), &["en", "ja"]);
        assert!(!data.text().is_mapped());

        assert_eq!(data.len().unwrap(), 2);
        assert_eq!(
            data.get(0).unwrap(),
            named(&[("en", "this is English ."), ("ja", "this is Japanese .")])
        );
        assert_eq!(
            data.get(-1).unwrap().field("ja"),
            Some("this is also Japanese .")
        );

        let iterated = data.to_vec().unwrap();
        assert_eq!(iterated, data.get_slice(..).unwrap());
        assert_eq!(iterated.len(), 2);
    }

    #[test]
    fn test_explicit_field_names_without_header() {
        let file = bilingual_file();
        let options = CsvOptions {
            field_names: Some(vec!["left".into(), "right".into()]),
            ..CsvOptions::default()
        };
        let data = CsvFile::with_options(file.path(), &options, Encoding::Utf8).unwrap();
        assert_eq!(data.len().unwrap(), 3);
        assert_eq!(data.get(0).unwrap(), named(&[("left", "en"), ("right", "ja")]));
    }

    #[test]
    fn test_explicit_field_names_override_header() {
        let file = bilingual_file();
        let options = CsvOptions {
            header: true,
            field_names: Some(vec!["source".into(), "target".into()]),
            ..CsvOptions::default()
        };
        let data = CsvFile::with_options(file.path(), &options, Encoding::Utf8).unwrap();
        assert_eq!(data.len().unwrap(), 2);
        assert_eq!(data.get(0).unwrap().field("source"), Some("this is English ."));
    }

    #[test]
    fn test_short_and_long_rows() {
        let file = create_test_file(b"a,b,c\n1\n1,2,3,4\n");
        let data = CsvFile::with_options(file.path(), &with_header(), Encoding::Utf8).unwrap();

        let short = data.get(0).unwrap();
        let short = short.as_named().unwrap();
        assert_eq!(short.get("a"), Some("1"));
        assert!(!short.contains_key("b"));
        assert!(!short.contains_key("c"));

        let long = data.get(1).unwrap();
        assert_eq!(long.as_named().unwrap().rest(), &["4".to_string()]);
    }

    #[test]
    fn test_tab_delimited() {
        let file = create_test_file(b"x\ty\n1\t2\n");
        let options = CsvOptions {
            delimiter: '\t',
            header: true,
            ..CsvOptions::default()
        };
        let data = CsvFile::with_options(file.path(), &options, Encoding::Utf8).unwrap();
        assert_eq!(data.get(0).unwrap(), named(&[("x", "1"), ("y", "2")]));
    }

    #[test]
    fn test_quoted_newline_in_iteration() {
        let file = create_test_file(b"id,text\n1,\"two\nlines\"\n2,plain\n");
        let data = CsvFile::with_options(file.path(), &with_header(), Encoding::Utf8).unwrap();

        let records = data.to_vec().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].field("text"), Some("two\nlines"));
        assert_eq!(records[1].field("id"), Some("2"));

        // The index sees three physical lines after the header; the open
        // quote runs to the end of its line
        assert_eq!(data.len().unwrap(), 3);
        assert_eq!(data.get(0).unwrap().field("text"), Some("two"));
        assert_eq!(data.get(1).unwrap().field("id"), Some("lines\""));
    }

    #[test]
    fn test_iteration_skips_blank_lines() {
        let file = create_test_file(b"a,b\n\n1,2\n");
        let data = CsvFile::open(file.path()).unwrap();
        assert_eq!(data.len().unwrap(), 3);
        assert_eq!(data.get(1).unwrap(), Record::Fields(Vec::new()));
        assert_eq!(data.iter().unwrap().count(), 2);
    }

    #[test]
    fn test_text_after_closing_quote_is_kept() {
        let file = create_test_file(b"ok\n\"a\" ,b\nok\n");
        let data = CsvFile::open(file.path()).unwrap();
        let expected = Record::Fields(vec!["a ".into(), "b".into()]);
        assert_eq!(data.get(-2).unwrap(), expected);
        assert_eq!(data.to_vec().unwrap()[1], expected);
    }

    #[test]
    fn test_decode_errors_surface() {
        let file = create_test_file(b"ok\ncaf\xe9,x\n");
        let options = CsvOptions::default();
        let data = CsvFile::with_options(file.path(), &options, Encoding::Ascii).unwrap();
        assert!(matches!(
            data.get(1),
            Err(ArrayFileError::DecodeError { offset: 6, .. })
        ));
        let results: Vec<_> = data.iter().unwrap().collect();
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(ArrayFileError::DecodeError { .. })
        ));
    }

    #[test]
    fn test_iter_range() {
        let content: String = (0..30).map(|i| format!("{i},value {i}\n")).collect();
        let file = create_test_file(content.as_bytes());
        let data = CsvFile::open(file.path()).unwrap();

        let records: Vec<Record> = data
            .iter_range(10, 20)
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(records.len(), 10);
        assert_eq!(records[0].values(), vec!["10", "value 10"]);
        assert!(matches!(
            data.iter_range(20, 10),
            Err(ArrayFileError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_header_only_file() {
        let file = create_test_file(b"a,b\n");
        let data = CsvFile::with_options(file.path(), &with_header(), Encoding::Utf8).unwrap();
        assert_eq!(data.len().unwrap(), 0);
        assert_eq!(data.iter().unwrap().count(), 0);
        assert!(data.get(0).is_err());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let file = bilingual_file();
        let data = CsvFile::with_options(file.path(), &with_header(), Encoding::Utf8).unwrap();
        let snapshot = data.snapshot().unwrap();
        assert!(snapshot.header);
        assert_eq!(snapshot.text.skip_leading, 1);

        let restored = CsvFile::restore(snapshot).unwrap();
        assert_eq!(restored.field_names(), data.field_names());
        assert_eq!(restored.get(1).unwrap(), data.get(1).unwrap());
        assert_eq!(restored.len().unwrap(), 2);
    }

    #[test]
    fn test_restore_rejects_inconsistent_header() {
        let file = bilingual_file();
        let mut snapshot = CsvFile::open(file.path()).unwrap().snapshot().unwrap();
        snapshot.header = true;
        assert!(matches!(
            CsvFile::restore(snapshot),
            Err(ArrayFileError::StaleSnapshot { .. })
        ));
    }
}
