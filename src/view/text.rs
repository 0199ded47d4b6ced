//! Newline-delimited text view

use crate::encoding::Encoding;
use crate::error::{ArrayFileError, Result};
use crate::index::{LineIndex, LineTerminator};
use crate::scope::{OpenFlags, ScopedFile};
use crate::view::mapped::MappedLines;
use crate::view::slice::Slice;
use crate::view::snapshot::TextSnapshot;
use crate::view::{LineAccess, LineIter};
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Random access into the `\n`-separated lines of a file
///
/// ```no_run
/// use arrayfile::{LineAccess, TextFile};
///
/// let text = TextFile::open("corpus.txt")?;
/// let first = text.get(0)?;
/// let last = text.get(-1)?;
/// let middle = text.get_slice(10..20)?;
/// # Ok::<(), arrayfile::ArrayFileError>(())
/// ```
#[derive(Debug)]
pub struct TextFile {
    lines: MappedLines,
}

impl TextFile {
    /// View `path` as UTF-8 text
    ///
    /// Nothing is mapped or scanned until the first access.
    ///
    /// # Errors
    /// * `FileNotFound` if `path` does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_encoding(path, Encoding::Utf8)
    }

    /// View `path` decoding lines with `encoding`
    pub fn with_encoding(path: impl AsRef<Path>, encoding: Encoding) -> Result<Self> {
        Self::with_skip(path.as_ref(), encoding, 0)
    }

    /// View that hides the first `skip` lines from every access
    pub(crate) fn with_skip(path: &Path, encoding: Encoding, skip: usize) -> Result<Self> {
        let index = LineIndex::new(LineTerminator::Newline).with_skip(skip);
        Ok(Self {
            lines: MappedLines::open(path, encoding, index)?,
        })
    }

    /// Rebuild a view from a snapshot, re-mapping its path
    ///
    /// # Errors
    /// * `InvalidArgument` if the snapshot came from a custom-delimited view
    /// * see [`MappedLines::restore`]
    pub fn restore(snapshot: TextSnapshot) -> Result<Self> {
        let lines = MappedLines::restore(snapshot)?;
        if !lines.terminator().is_newline() {
            return Err(ArrayFileError::invalid_argument(
                "snapshot uses a custom delimiter; restore it as CustomDelimitedFile",
            ));
        }
        Ok(Self { lines })
    }

    pub fn snapshot(&self) -> Result<TextSnapshot> {
        self.lines.snapshot()
    }

    pub fn set_sequential_advice(&mut self, enabled: bool) {
        self.lines.set_sequential_advice(enabled);
    }

    pub fn path(&self) -> &Path {
        self.lines.path()
    }

    pub fn encoding(&self) -> Encoding {
        self.lines.encoding()
    }

    pub fn byte_len(&self) -> Result<u64> {
        self.lines.byte_len()
    }

    pub fn is_indexed(&self) -> bool {
        self.lines.is_indexed()
    }

    pub fn is_mapped(&self) -> bool {
        self.lines.is_mapped()
    }

    /// Undecoded bytes of a line, terminator included
    pub fn raw_line(&self, index: isize) -> Result<Vec<u8>> {
        self.lines.raw_line(index)
    }

    /// Rescan the file; returns the new line count
    pub fn rebuild_index(&self) -> Result<usize> {
        self.lines.rebuild_index()
    }

    /// Release the mapping
    pub fn close(&self) {
        self.lines.close();
    }

    pub(crate) fn lines(&self) -> &MappedLines {
        &self.lines
    }
}

impl LineAccess for TextFile {
    type Item = String;

    fn len(&self) -> Result<usize> {
        self.lines.len()
    }

    fn get(&self, index: isize) -> Result<String> {
        self.lines.line(index)
    }

    fn get_slice<S: Into<Slice>>(&self, slice: S) -> Result<Vec<String>> {
        self.lines.slice(slice.into())
    }

    /// Reads the file through a fresh handle; the index is not built
    fn iter(&self) -> Result<LineIter<'_, String>> {
        let lines = FileLines::open(
            self.lines.path(),
            self.lines.encoding(),
            self.lines.skip_leading(),
        )?;
        Ok(Box::new(lines))
    }

    fn iter_range(&self, start: usize, end: usize) -> Result<LineIter<'_, String>> {
        Ok(Box::new(self.lines.range(start, end)?))
    }
}

/// Lines read sequentially through a buffered handle, independent of any mapping
#[derive(Debug)]
pub struct FileLines {
    reader: BufReader<ScopedFile>,
    encoding: Encoding,
    offset: u64,
    buf: Vec<u8>,
    done: bool,
}

impl FileLines {
    /// Open `path` and skip its first `skip` lines
    pub fn open(path: &Path, encoding: Encoding, skip: usize) -> Result<Self> {
        let handle = ScopedFile::acquire(path, OpenFlags::READ)?;
        let mut lines = Self {
            reader: BufReader::new(handle),
            encoding,
            offset: 0,
            buf: Vec::new(),
            done: false,
        };
        for _ in 0..skip {
            if lines.read_raw()? == 0 {
                break;
            }
        }
        Ok(lines)
    }

    /// Read the next physical line into `buf`; returns its byte length
    fn read_raw(&mut self) -> Result<usize> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|e| ArrayFileError::file_error("Failed to read line", e))?;
        self.offset += read as u64;
        Ok(read)
    }
}

impl Iterator for FileLines {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let start = self.offset;
        match self.read_raw() {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                let bytes = LineTerminator::Newline.strip(&self.buf);
                Some(
                    self.encoding
                        .decode(bytes, start)
                        .map(|text| text.into_owned()),
                )
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
