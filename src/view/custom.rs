//! Text view split on an arbitrary multi-byte delimiter

use crate::encoding::Encoding;
use crate::error::{ArrayFileError, Result};
use crate::index::{LineIndex, LineTerminator};
use crate::view::mapped::MappedLines;
use crate::view::slice::Slice;
use crate::view::snapshot::TextSnapshot;
use crate::view::{LineAccess, LineIter};
use std::path::Path;

/// Random access into a file whose records end with a custom byte sequence
///
/// Unlike [`TextFile`](crate::view::TextFile), whole-file iteration walks the
/// offset table over the mapping, so the delimiter is honoured even when it is
/// not a newline. Content after the last delimiter is its own record.
#[derive(Debug)]
pub struct CustomDelimitedFile {
    lines: MappedLines,
}

impl CustomDelimitedFile {
    /// View `path` as UTF-8 records separated by `delimiter`
    ///
    /// # Errors
    /// * `InvalidArgument` if `delimiter` is empty
    /// * `FileNotFound` if `path` does not exist
    pub fn open(path: impl AsRef<Path>, delimiter: impl AsRef<[u8]>) -> Result<Self> {
        Self::with_encoding(path, delimiter, Encoding::Utf8)
    }

    pub fn with_encoding(
        path: impl AsRef<Path>,
        delimiter: impl AsRef<[u8]>,
        encoding: Encoding,
    ) -> Result<Self> {
        let terminator = Self::terminator_for(delimiter.as_ref())?;
        Ok(Self {
            lines: MappedLines::open(path.as_ref(), encoding, LineIndex::new(terminator))?,
        })
    }

    fn terminator_for(delimiter: &[u8]) -> Result<LineTerminator> {
        if delimiter.is_empty() {
            return Err(ArrayFileError::invalid_argument(
                "line delimiter must not be empty",
            ));
        }
        // Always a Custom terminator, even for "\n", so iteration stays on the mapping
        Ok(LineTerminator::Custom(delimiter.to_vec()))
    }

    /// Rebuild a view from a snapshot, keeping its stored index
    ///
    /// A snapshot of a newline view restores as a custom `\n` split.
    pub fn restore(snapshot: TextSnapshot) -> Result<Self> {
        let lines = MappedLines::restore_with(snapshot, |bytes| Self::terminator_for(&bytes))?;
        Ok(Self { lines })
    }

    pub fn snapshot(&self) -> Result<TextSnapshot> {
        self.lines.snapshot()
    }

    pub fn delimiter(&self) -> &[u8] {
        self.lines.terminator().as_bytes()
    }

    /// Switch to a different delimiter; the index is rebuilt on next access
    pub fn set_delimiter(&mut self, delimiter: impl AsRef<[u8]>) -> Result<()> {
        let terminator = Self::terminator_for(delimiter.as_ref())?;
        self.lines.set_terminator(terminator);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.lines.path()
    }

    pub fn encoding(&self) -> Encoding {
        self.lines.encoding()
    }

    pub fn is_indexed(&self) -> bool {
        self.lines.is_indexed()
    }

    pub fn raw_line(&self, index: isize) -> Result<Vec<u8>> {
        self.lines.raw_line(index)
    }

    pub fn rebuild_index(&self) -> Result<usize> {
        self.lines.rebuild_index()
    }

    pub fn close(&self) {
        self.lines.close();
    }
}

impl LineAccess for CustomDelimitedFile {
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

    /// Decodes adjacent offset pairs from the mapping; builds the index
    fn iter(&self) -> Result<LineIter<'_, String>> {
        let len = self.lines.len()?;
        Ok(Box::new(self.lines.range(0, len)?))
    }

    fn iter_range(&self, start: usize, end: usize) -> Result<LineIter<'_, String>> {
        Ok(Box::new(self.lines.range(start, end)?))
    }
}
