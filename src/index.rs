//! Line boundary indexing over a byte region.
//!
//! The index is a table of byte offsets, one per logical line plus a closing
//! entry, so line `i` occupies `offsets[i]..offsets[i + 1]` including its
//! terminator. Terminator detection is pluggable ([`LineTerminator`]) and the
//! table is built lazily, once, behind a lock ([`LineIndex`]).

pub mod lazy;
pub mod offsets;
pub mod terminator;

pub use lazy::LineIndex;
pub use offsets::OffsetTable;
pub use terminator::LineTerminator;
