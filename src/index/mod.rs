//! Directory indexing
//!
//! Sorted listings and recursive name search with encoded file names and
//! derived browse/download URLs.

pub mod entry;
pub mod operations;
pub mod results;

pub use entry::DirEntry;
pub use operations::DirectoryIndexer;
pub use results::{IndexResult, SkippedEntry};
