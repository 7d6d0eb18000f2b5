//! File system helpers
//!
//! Small metadata queries shared by the request handlers.

use std::fs;
use std::io::Result;
use std::path::Path;

/// Kind of object found at a resolved path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Kind of the object at `path`, following symlinks
pub fn entry_kind(path: &Path) -> Result<EntryKind> {
    if fs::metadata(path)?.is_dir() {
        Ok(EntryKind::Directory)
    } else {
        Ok(EntryKind::File)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_entry_kind() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();

        assert_eq!(entry_kind(dir.path()).unwrap(), EntryKind::Directory);
        assert_eq!(entry_kind(&dir.path().join("a.txt")).unwrap(), EntryKind::File);
        assert_eq!(
            entry_kind(&dir.path().join("missing")).unwrap_err().kind(),
            std::io::ErrorKind::NotFound
        );
    }
}
