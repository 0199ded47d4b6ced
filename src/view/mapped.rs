//! Shared core of the line views: a lazily mapped file plus its line index.

use crate::encoding::Encoding;
use crate::error::{ArrayFileError, Result};
use crate::index::{LineIndex, LineTerminator, OffsetTable};
use crate::scope::{validate_file_path, MappedRegion};
use crate::view::slice::{Slice, SliceIndices};
use crate::view::snapshot::TextSnapshot;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Memory-mapped file with lazy line indexing
///
/// Neither the mapping nor the index exist until the first access that needs
/// them. Decoded lines are produced fresh on every call; only the offset
/// table is cached.
#[derive(Debug)]
pub struct MappedLines {
    path: PathBuf,
    encoding: Encoding,
    sequential_advice: bool,

    /// `None` until first use and after `close`
    region: RwLock<Option<Arc<MappedRegion>>>,

    index: LineIndex,
}

impl MappedLines {
    /// Prepare a view over `path` without mapping it yet
    ///
    /// # Errors
    /// * `FileNotFound` if `path` does not exist
    /// * `NotAFile` if `path` is a directory or other non-regular file
    pub fn open(path: &Path, encoding: Encoding, index: LineIndex) -> Result<Self> {
        validate_file_path(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            encoding,
            sequential_advice: false,
            region: RwLock::new(None),
            index,
        })
    }

    /// Re-map `snapshot.path` and adopt the stored index as-is
    ///
    /// # Errors
    /// * `FileNotFound` if the file is gone
    /// * `StaleSnapshot` if the stored offsets run past the current file end
    pub fn restore(snapshot: TextSnapshot) -> Result<Self> {
        Self::restore_with(snapshot, |bytes| LineTerminator::from_bytes(bytes))
    }

    /// Like [`MappedLines::restore`], with the stored terminator bytes
    /// interpreted by `parse_terminator`
    pub fn restore_with(
        snapshot: TextSnapshot,
        parse_terminator: impl FnOnce(Vec<u8>) -> Result<LineTerminator>,
    ) -> Result<Self> {
        let TextSnapshot {
            path,
            encoding,
            terminator,
            skip_leading,
            offsets,
        } = snapshot;

        validate_file_path(&path)?;
        let terminator = parse_terminator(terminator)?;
        let table = OffsetTable::from_offsets(offsets).map_err(|e| {
            ArrayFileError::StaleSnapshot {
                path: path.clone(),
                message: e.to_string(),
            }
        })?;

        let region = MappedRegion::map(&path)?;
        if table.end() > region.len() as u64 {
            return Err(ArrayFileError::StaleSnapshot {
                message: format!(
                    "index ends at byte {} but file has {} bytes",
                    table.end(),
                    region.len()
                ),
                path,
            });
        }

        Ok(Self {
            path,
            encoding,
            sequential_advice: false,
            region: RwLock::new(Some(Arc::new(region))),
            index: LineIndex::from_table(terminator, skip_leading, table),
        })
    }

    pub fn set_sequential_advice(&mut self, enabled: bool) {
        self.sequential_advice = enabled;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn terminator(&self) -> &LineTerminator {
        self.index.terminator()
    }

    pub fn skip_leading(&self) -> usize {
        self.index.skip_leading()
    }

    pub fn is_mapped(&self) -> bool {
        self.region.read().is_some()
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_built()
    }

    /// The mapping, created on first call
    fn region(&self) -> Result<Arc<MappedRegion>> {
        if let Some(region) = self.region.read().as_ref() {
            return Ok(Arc::clone(region));
        }

        let mut slot = self.region.write();
        if let Some(region) = slot.as_ref() {
            return Ok(Arc::clone(region));
        }
        let region = Arc::new(MappedRegion::map_with_advice(
            &self.path,
            self.sequential_advice,
        )?);
        *slot = Some(Arc::clone(&region));
        Ok(region)
    }

    /// Mapping and offset table, building whichever is missing
    fn prepared(&self) -> Result<(Arc<MappedRegion>, Arc<OffsetTable>)> {
        let region = self.region()?;
        let table = self.index.ensure_built(&region);
        Ok((region, table))
    }

    /// Number of logical lines
    pub fn len(&self) -> Result<usize> {
        Ok(self.prepared()?.1.len())
    }

    /// Size of the mapped file in bytes
    pub fn byte_len(&self) -> Result<u64> {
        Ok(self.region()?.len() as u64)
    }

    /// Normalize a possibly negative index against the line count
    ///
    /// # Errors
    /// * `IndexOutOfRange` unless `-len <= index < len`
    pub fn resolve(&self, index: isize) -> Result<usize> {
        let length = self.len()?;
        let resolved = if index < 0 {
            index + length as isize
        } else {
            index
        };
        if resolved < 0 || resolved as usize >= length {
            return Err(ArrayFileError::IndexOutOfRange { index, length });
        }
        Ok(resolved as usize)
    }

    /// Decoded line at a resolved position, terminator stripped
    pub fn line_at(&self, line: usize) -> Result<String> {
        let (region, table) = self.prepared()?;
        decode_line(&region, &table, self.terminator(), self.encoding, line)
    }

    /// Decoded line at a possibly negative index
    pub fn line(&self, index: isize) -> Result<String> {
        self.line_at(self.resolve(index)?)
    }

    /// Undecoded bytes of a line, terminator included
    pub fn raw_line(&self, index: isize) -> Result<Vec<u8>> {
        let line = self.resolve(index)?;
        let (region, table) = self.prepared()?;
        let range = line_range(&table, line)?;
        Ok(region[range].to_vec())
    }

    /// Positions selected by `slice` against the current length
    pub fn positions(&self, slice: Slice) -> Result<SliceIndices> {
        slice.indices(self.len()?)
    }

    /// Eagerly decode every line selected by `slice`
    pub fn slice(&self, slice: Slice) -> Result<Vec<String>> {
        let (region, table) = self.prepared()?;
        slice
            .indices(table.len())?
            .map(|line| decode_line(&region, &table, self.terminator(), self.encoding, line))
            .collect()
    }

    /// Lazily decode lines `start..end` straight from the mapping
    ///
    /// `end` past the table is clamped to the last line.
    ///
    /// # Errors
    /// * `InvalidRange` if `start > end`
    pub fn range(&self, start: usize, end: usize) -> Result<RangeLines> {
        if start > end {
            return Err(ArrayFileError::InvalidRange { start, end });
        }
        let (region, table) = self.prepared()?;
        let end = end.min(table.len());
        Ok(RangeLines {
            region,
            table,
            terminator: self.terminator().clone(),
            encoding: self.encoding,
            next: start.min(end),
            end,
        })
    }

    /// Discard the cached table and rescan the mapping
    pub fn rebuild_index(&self) -> Result<usize> {
        let region = self.region()?;
        Ok(self.index.rebuild(&region).len())
    }

    /// Change the terminator; the index is rebuilt on next use
    pub fn set_terminator(&mut self, terminator: LineTerminator) {
        self.index.set_terminator(terminator);
    }

    /// Release the mapping now rather than at drop
    ///
    /// Iterators created earlier keep their own reference and stay valid.
    /// A later access maps the file again.
    pub fn close(&self) {
        if self.region.write().take().is_some() {
            log::debug!("unmapped {}", self.path.display());
        }
    }

    /// Build the index if needed and capture the serializable state
    pub fn snapshot(&self) -> Result<TextSnapshot> {
        let (_, table) = self.prepared()?;
        Ok(TextSnapshot {
            path: self.path.clone(),
            encoding: self.encoding,
            terminator: self.terminator().as_bytes().to_vec(),
            skip_leading: self.skip_leading(),
            offsets: table.offsets().to_vec(),
        })
    }
}

fn line_range(table: &OffsetTable, line: usize) -> Result<std::ops::Range<usize>> {
    table
        .line_range(line)
        .ok_or(ArrayFileError::IndexOutOfRange {
            index: line as isize,
            length: table.len(),
        })
}

fn decode_line(
    region: &MappedRegion,
    table: &OffsetTable,
    terminator: &LineTerminator,
    encoding: Encoding,
    line: usize,
) -> Result<String> {
    let range = line_range(table, line)?;
    let start = range.start as u64;
    let bytes = region
        .get(range)
        .ok_or_else(|| ArrayFileError::memory_mapping("line offsets exceed the mapped region"))?;
    let text = encoding.decode(terminator.strip(bytes), start)?;
    Ok(text.into_owned())
}

/// Lines decoded from the mapping between two table positions
///
/// Holds its own reference to the mapping and table, so it outlives `close`
/// and index rebuilds on the view that produced it.
#[derive(Debug)]
pub struct RangeLines {
    region: Arc<MappedRegion>,
    table: Arc<OffsetTable>,
    terminator: LineTerminator,
    encoding: Encoding,
    next: usize,
    end: usize,
}

impl RangeLines {
    /// Position of the next line to be yielded
    pub fn position(&self) -> usize {
        self.next
    }
}

impl Iterator for RangeLines {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let line = self.next;
        self.next += 1;
        Some(decode_line(
            &self.region,
            &self.table,
            &self.terminator,
            self.encoding,
            line,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RangeLines {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content).expect("Failed to write test data");
        file.flush().expect("Failed to flush test data");
        file
    }

    fn open(file: &NamedTempFile) -> MappedLines {
        MappedLines::open(file.path(), Encoding::Utf8, LineIndex::default()).unwrap()
    }

    #[test]
    fn test_open_is_lazy() {
        let file = create_test_file(b"line1\nline2\n");
        let lines = open(&file);
        assert!(!lines.is_mapped());
        assert!(!lines.is_indexed());

        assert_eq!(lines.len().unwrap(), 2);
        assert!(lines.is_mapped());
        assert!(lines.is_indexed());
    }

    #[test]
    fn test_open_missing_file() {
        let result = MappedLines::open(
            Path::new("/this/file/does/not/exist.txt"),
            Encoding::Utf8,
            LineIndex::default(),
        );
        assert!(matches!(result, Err(ArrayFileError::FileNotFound { .. })));
    }

    #[test]
    fn test_resolve_bounds() {
        let file = create_test_file(b"a\nb\nc\n");
        let lines = open(&file);
        assert_eq!(lines.resolve(0).unwrap(), 0);
        assert_eq!(lines.resolve(-1).unwrap(), 2);
        assert_eq!(lines.resolve(-3).unwrap(), 0);
        assert!(matches!(
            lines.resolve(3),
            Err(ArrayFileError::IndexOutOfRange {
                index: 3,
                length: 3
            })
        ));
        assert!(lines.resolve(-4).is_err());
    }

    #[test]
    fn test_raw_line_keeps_terminator() {
        let file = create_test_file(b"a\r\nb");
        let lines = open(&file);
        assert_eq!(lines.raw_line(0).unwrap(), b"a\r\n");
        assert_eq!(lines.raw_line(-1).unwrap(), b"b");
        assert_eq!(lines.line(0).unwrap(), "a");
    }

    #[test]
    fn test_decode_error_carries_file_offset() {
        let file = create_test_file(b"ok\nbad \xff\n");
        let lines = open(&file);
        assert_eq!(lines.line(0).unwrap(), "ok");
        match lines.line(1) {
            Err(ArrayFileError::DecodeError { offset, .. }) => assert_eq!(offset, 7),
            other => panic!("Expected DecodeError, got {other:?}"),
        }
    }

    #[test]
    fn test_range_clamps_end() {
        let file = create_test_file(b"a\nb\nc\n");
        let lines = open(&file);
        let items: Vec<String> = lines.range(1, 99).unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(items, vec!["b", "c"]);
        assert_eq!(lines.range(5, 9).unwrap().count(), 0);
        assert!(matches!(
            lines.range(2, 1),
            Err(ArrayFileError::InvalidRange { start: 2, end: 1 })
        ));
    }

    #[test]
    fn test_range_survives_close() {
        let file = create_test_file(b"a\nb\n");
        let lines = open(&file);
        let mut iter = lines.range(0, 2).unwrap();
        lines.close();
        assert!(!lines.is_mapped());
        assert_eq!(iter.next().unwrap().unwrap(), "a");
        assert_eq!(iter.position(), 1);
        assert_eq!(iter.next().unwrap().unwrap(), "b");
        assert!(iter.next().is_none());

        // Next access maps again
        assert_eq!(lines.line(1).unwrap(), "b");
        assert!(lines.is_mapped());
    }

    #[test]
    fn test_close_without_mapping() {
        let file = create_test_file(b"a\n");
        let lines = open(&file);
        lines.close();
        assert!(!lines.is_mapped());
    }

    #[test]
    fn test_snapshot_and_restore() {
        let file = create_test_file(b"a\nb\nc");
        let lines = open(&file);
        let snapshot = lines.snapshot().unwrap();
        assert_eq!(snapshot.offsets, vec![0, 2, 4, 5]);
        assert_eq!(snapshot.terminator, b"\n".to_vec());

        let restored = MappedLines::restore(snapshot).unwrap();
        assert!(restored.is_mapped());
        assert!(restored.is_indexed());
        assert_eq!(restored.line(2).unwrap(), "c");
    }

    #[test]
    fn test_restore_detects_truncated_file() {
        let file = create_test_file(b"a\nb\nc\n");
        let snapshot = open(&file).snapshot().unwrap();
        std::fs::write(file.path(), b"a\n").unwrap();

        assert!(matches!(
            MappedLines::restore(snapshot),
            Err(ArrayFileError::StaleSnapshot { .. })
        ));
    }

    #[test]
    fn test_restore_missing_file() {
        let file = create_test_file(b"a\n");
        let mut snapshot = open(&file).snapshot().unwrap();
        snapshot.path = PathBuf::from("/this/file/does/not/exist.txt");
        assert!(matches!(
            MappedLines::restore(snapshot),
            Err(ArrayFileError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_rebuild_index_after_growth() {
        let file = create_test_file(b"a\nb\n");
        let lines = open(&file);
        assert_eq!(lines.len().unwrap(), 2);
        assert_eq!(lines.rebuild_index().unwrap(), 2);
    }
}
