use log::{debug, info};
use std::fs::File;
use std::io::{self, Cursor};
use std::path::Path;
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{ArchiveStage, MediaError};
use crate::storage::validation::to_url_path;

fn entries_error(message: impl ToString) -> MediaError {
    MediaError::Archive {
        stage: ArchiveStage::Entries,
        message: message.to_string(),
    }
}

/// Zips every regular file under `dir`, named by its path relative to `dir`.
///
/// The whole archive is buffered in memory before it is returned.
pub fn build_archive(dir: &Path) -> Result<Vec<u8>, MediaError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut file_count = 0usize;

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(entries_error)?;

        if !entry.file_type().is_file() {
            debug!("Not archiving non-regular entry {}", entry.path().display());
            continue;
        }

        let relative = entry.path().strip_prefix(dir).map_err(entries_error)?;
        let name = to_url_path(relative);

        let mut source = File::open(entry.path())
            .map_err(|e| entries_error(format!("{}: {}", entry.path().display(), e)))?;

        zip.start_file(name.as_str(), options)
            .map_err(entries_error)?;
        io::copy(&mut source, &mut zip)
            .map_err(|e| entries_error(format!("{}: {}", entry.path().display(), e)))?;

        file_count += 1;
    }

    let buffer = zip
        .finish()
        .map_err(|e| MediaError::Archive {
            stage: ArchiveStage::Finalize,
            message: e.to_string(),
        })?
        .into_inner();

    info!(
        "Archived {} - {} files, {} bytes",
        dir.display(),
        file_count,
        buffer.len()
    );

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn read_entries(bytes: Vec<u8>) -> BTreeMap<String, Vec<u8>> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entries = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).unwrap();
            let mut contents = Vec::new();
            file.read_to_end(&mut contents).unwrap();
            entries.insert(file.name().to_string(), contents);
        }
        entries
    }

    #[test]
    fn test_archive_contains_exactly_the_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"alpha").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.txt"), b"bravo").unwrap();

        let entries = read_entries(build_archive(dir.path()).unwrap());

        let expected: BTreeMap<String, Vec<u8>> = [
            ("a.txt".to_string(), b"alpha".to_vec()),
            ("sub/b.txt".to_string(), b"bravo".to_vec()),
        ]
        .into_iter()
        .collect();
        assert_eq!(entries, expected);
    }

    #[test]
    fn test_empty_directory_gives_valid_empty_archive() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();

        let entries = read_entries(build_archive(dir.path()).unwrap());
        assert!(entries.is_empty());
    }

    #[test]
    fn test_missing_directory_fails_while_building_entries() {
        let dir = TempDir::new().unwrap();
        let err = build_archive(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(
            err,
            MediaError::Archive {
                stage: ArchiveStage::Entries,
                ..
            }
        ));
    }
}
