//! File system storage management
//!
//! Handles path validation against the media root and upload placement.

pub mod filesystem;
pub mod operations;
pub mod results;
pub mod validation;

// Re-export commonly used items
pub use filesystem::{EntryKind, entry_kind};
pub use operations::{prepare_upload_path, store_upload};
pub use results::UploadResult;
pub use validation::{Escaping, PathResolver, SymlinkPolicy};
