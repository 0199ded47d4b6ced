//! Array-like views over line-oriented files.
//!
//! Every view implements [`LineAccess`]: a length, indexed and sliced reads
//! with negative-index wraparound, a full forward pass and a bounded range
//! pass. The variants differ in how lines are found and what an item is:
//!
//! - [`TextFile`] splits on `\n` and yields `String`s
//! - [`CustomDelimitedFile`] splits on an arbitrary byte sequence
//! - [`CsvFile`] parses each line of a [`TextFile`] into a [`Record`]

pub mod csv;
pub mod custom;
pub mod mapped;
pub mod record;
pub mod slice;
pub mod snapshot;
pub mod text;

pub use self::csv::CsvFile;
pub use custom::CustomDelimitedFile;
pub use mapped::{MappedLines, RangeLines};
pub use record::{decode_fields, NamedRecord, Record, RecordFormat};
pub use slice::{Slice, SliceIndices};
pub use snapshot::{CsvSnapshot, TextSnapshot};
pub use text::{FileLines, TextFile};

use crate::error::Result;

/// Boxed lazy iterator returned by [`LineAccess::iter`] and [`LineAccess::iter_range`]
pub type LineIter<'a, T> = Box<dyn Iterator<Item = Result<T>> + 'a>;

/// Random access into the logical lines of a file
pub trait LineAccess {
    /// What a single line reads as
    type Item;

    /// Number of logical lines; builds the index on first call
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Item at `index`; negative values count from the end
    ///
    /// # Errors
    /// * `IndexOutOfRange` unless `-len <= index < len`
    fn get(&self, index: isize) -> Result<Self::Item>;

    /// Items selected by a Python-style slice, materialized eagerly
    fn get_slice<S: Into<Slice>>(&self, slice: S) -> Result<Vec<Self::Item>>;

    /// Single forward pass over the whole file
    ///
    /// Each call starts a fresh pass.
    fn iter(&self) -> Result<LineIter<'_, Self::Item>>;

    /// Items `start..end`; `end` past the last line is clamped
    ///
    /// # Errors
    /// * `InvalidRange` if `start > end`
    fn iter_range(&self, start: usize, end: usize) -> Result<LineIter<'_, Self::Item>>;

    /// Collect the full pass into memory
    fn to_vec(&self) -> Result<Vec<Self::Item>> {
        self.iter()?.collect()
    }
}
