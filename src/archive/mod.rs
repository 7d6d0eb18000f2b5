//! Folder downloads
//!
//! Packs a directory subtree into an in-memory zip archive.

mod operations;

pub use operations::build_archive;
