//! Result types for indexing operations

use crate::index::entry::DirEntry;

/// Child that could not be indexed and was left out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: String,
}

/// Visible entries, newest first, plus the children that were skipped
#[derive(Debug, Clone, Default)]
pub struct IndexResult {
    pub entries: Vec<DirEntry>,
    pub skipped: Vec<SkippedEntry>,
}

impl IndexResult {
    pub(crate) fn sort_newest_first(&mut self) {
        self.entries
            .sort_unstable_by(|a, b| b.modified_at.cmp(&a.modified_at));
    }
}
