//! Lazily built, cached line index

use crate::index::offsets::OffsetTable;
use crate::index::terminator::LineTerminator;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug)]
enum IndexState {
    Unbuilt,
    Ready(Arc<OffsetTable>),
}

/// Line index built on first use
///
/// State moves `Unbuilt -> Ready`. The scan runs while holding the write
/// lock, so concurrent first calls build exactly once and readers never see
/// a partially filled table. A rebuild replaces the table wholesale.
#[derive(Debug)]
pub struct LineIndex {
    terminator: LineTerminator,

    /// Lines dropped from the front after every scan (header rows)
    skip_leading: usize,

    state: RwLock<IndexState>,
}

impl LineIndex {
    pub fn new(terminator: LineTerminator) -> Self {
        Self {
            terminator,
            skip_leading: 0,
            state: RwLock::new(IndexState::Unbuilt),
        }
    }

    /// Index that drops the first `count` lines after scanning
    pub fn with_skip(mut self, count: usize) -> Self {
        self.skip_leading = count;
        self
    }

    /// Index that starts out `Ready` with a previously built table
    pub fn from_table(terminator: LineTerminator, skip_leading: usize, table: OffsetTable) -> Self {
        Self {
            terminator,
            skip_leading,
            state: RwLock::new(IndexState::Ready(Arc::new(table))),
        }
    }

    pub fn terminator(&self) -> &LineTerminator {
        &self.terminator
    }

    pub fn skip_leading(&self) -> usize {
        self.skip_leading
    }

    /// Swap the terminator; the cached table is discarded
    pub fn set_terminator(&mut self, terminator: LineTerminator) {
        self.terminator = terminator;
        *self.state.get_mut() = IndexState::Unbuilt;
    }

    pub fn is_built(&self) -> bool {
        matches!(*self.state.read(), IndexState::Ready(_))
    }

    /// The cached table, if built
    pub fn table(&self) -> Option<Arc<OffsetTable>> {
        match &*self.state.read() {
            IndexState::Ready(table) => Some(Arc::clone(table)),
            IndexState::Unbuilt => None,
        }
    }

    /// Build the table from `data` unless already built
    ///
    /// Idempotent: later calls return the cached table without rescanning.
    pub fn ensure_built(&self, data: &[u8]) -> Arc<OffsetTable> {
        if let Some(table) = self.table() {
            return table;
        }

        let mut state = self.state.write();
        // Another caller may have finished the scan while we waited
        if let IndexState::Ready(table) = &*state {
            return Arc::clone(table);
        }

        let table = Arc::new(self.scan(data));
        log::debug!(
            "indexed {} lines over {} bytes",
            table.len(),
            data.len()
        );
        *state = IndexState::Ready(Arc::clone(&table));
        table
    }

    /// Rescan `data` and replace the cached table
    pub fn rebuild(&self, data: &[u8]) -> Arc<OffsetTable> {
        let table = Arc::new(self.scan(data));
        log::trace!("rebuilt index: {} lines", table.len());
        *self.state.write() = IndexState::Ready(Arc::clone(&table));
        table
    }

    /// Drop the cached table; the next access rebuilds it
    pub fn invalidate(&self) {
        *self.state.write() = IndexState::Unbuilt;
    }

    fn scan(&self, data: &[u8]) -> OffsetTable {
        OffsetTable::build(data, &self.terminator).skip_leading(self.skip_leading)
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new(LineTerminator::Newline)
    }
}
