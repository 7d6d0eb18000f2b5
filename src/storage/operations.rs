//! Storage operations
//!
//! Places and writes uploaded files inside the media root.

use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::MediaError;
use crate::storage::results::UploadResult;
use crate::storage::validation::PathResolver;

/// Picks the destination for an upload of `filename` into `directory`.
///
/// An existing file is never overwritten: the new one gets a `_<unix millis>`
/// suffix before its extension.
pub fn prepare_upload_path(
    resolver: &PathResolver,
    directory: &str,
    filename: &str,
) -> Result<(PathBuf, bool), MediaError> {
    let filename = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| MediaError::InvalidPath(format!("Invalid file name \"{}\"", filename)))?;

    let relative = format!("{}/{}", directory.trim_end_matches('/'), filename);
    let file_path = resolver.resolve_relative(&relative)?;

    match fs::symlink_metadata(&file_path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok((file_path, false)),
        Err(e) => Err(MediaError::Io(e)),
        Ok(_) => {
            let millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0);
            Ok((suffixed_path(&file_path, millis), true))
        }
    }
}

fn suffixed_path(path: &Path, millis: u128) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, millis, ext.to_string_lossy()),
        None => format!("{}_{}", stem, millis),
    };

    path.with_file_name(name)
}

/// Writes an uploaded file to a collision-free destination.
pub fn store_upload(
    resolver: &PathResolver,
    directory: &str,
    filename: &str,
    contents: &[u8],
) -> Result<UploadResult, MediaError> {
    let (file_path, renamed) = prepare_upload_path(resolver, directory, filename)?;

    let parent_is_dir = file_path.parent().is_some_and(Path::is_dir);
    if !parent_is_dir {
        return Err(MediaError::NotFound(directory.to_string()));
    }

    if let Err(e) = fs::write(&file_path, contents) {
        error!("Failed to store upload {}: {}", file_path.display(), e);
        return Err(MediaError::Io(e));
    }

    info!(
        "Stored upload {} ({} bytes{})",
        file_path.display(),
        contents.len(),
        if renamed { ", renamed to avoid overwrite" } else { "" }
    );

    Ok(UploadResult {
        file_path,
        bytes_written: contents.len() as u64,
        renamed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::validation::SymlinkPolicy;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathResolver) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        let resolver = PathResolver::new(dir.path(), SymlinkPolicy::Follow).unwrap();
        (dir, resolver)
    }

    #[test]
    fn test_store_new_file() {
        let (_dir, resolver) = setup();
        let result = store_upload(&resolver, "docs", "notes.txt", b"hello").unwrap();

        assert!(!result.renamed);
        assert_eq!(result.bytes_written, 5);
        assert_eq!(result.file_path, resolver.media_root().join("docs/notes.txt"));
        assert_eq!(fs::read(&result.file_path).unwrap(), b"hello");
    }

    #[test]
    fn test_existing_file_is_not_overwritten() {
        let (_dir, resolver) = setup();
        store_upload(&resolver, "docs", "notes.txt", b"first").unwrap();
        let second = store_upload(&resolver, "docs/", "notes.txt", b"second").unwrap();

        assert!(second.renamed);
        let name = second.file_path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("notes_"));
        assert!(name.ends_with(".txt"));
        assert_eq!(
            fs::read(resolver.media_root().join("docs/notes.txt")).unwrap(),
            b"first"
        );
    }

    #[test]
    fn test_upload_cannot_escape_root() {
        let (_dir, resolver) = setup();
        assert!(matches!(
            store_upload(&resolver, "../..", "evil.sh", b"x"),
            Err(MediaError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_client_supplied_directories_in_filename_are_dropped() {
        let (_dir, resolver) = setup();
        let result = store_upload(&resolver, "docs", "../../evil.sh", b"x").unwrap();
        assert_eq!(result.file_path, resolver.media_root().join("docs/evil.sh"));
    }

    #[test]
    fn test_missing_directory_is_not_found() {
        let (_dir, resolver) = setup();
        assert!(matches!(
            store_upload(&resolver, "nowhere", "a.txt", b"x"),
            Err(MediaError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_contained_upload_through_escaping_symlink_is_rejected() {
        let outside = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();
        let resolver = PathResolver::new(dir.path(), SymlinkPolicy::Contain).unwrap();

        assert!(matches!(
            store_upload(&resolver, "link", "pwned.txt", b"x"),
            Err(MediaError::InvalidPath(_))
        ));
        assert!(!outside.path().join("pwned.txt").exists());

        fs::create_dir(dir.path().join("inbox")).unwrap();
        assert!(store_upload(&resolver, "inbox", "fine.txt", b"x").is_ok());
    }

    #[test]
    fn test_suffix_without_extension() {
        let path = suffixed_path(Path::new("/m/README"), 42);
        assert_eq!(path, Path::new("/m/README_42"));
    }
}
