//! Storage result types
//!
//! Defines result structures returned by storage operations.

use std::path::PathBuf;

/// Result of a file upload
#[derive(Debug, Clone)]
pub struct UploadResult {
    pub file_path: PathBuf,
    pub bytes_written: u64,
    /// Whether a timestamp suffix was added to avoid overwriting
    pub renamed: bool,
}
