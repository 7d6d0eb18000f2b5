//! Directory listing and recursive search

use log::{info, warn};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::codec::NameCodec;
use crate::error::MediaError;
use crate::filter::IgnoreFilter;
use crate::index::entry::{DirEntry, download_url, join_url_path, media_url};
use crate::index::results::{IndexResult, SkippedEntry};
use crate::storage::PathResolver;
use crate::storage::validation::to_url_path;

/// Builds listings for directories under the media root.
///
/// Holds one settings snapshot (codec and ignore rules) for the duration of
/// a request.
pub struct DirectoryIndexer<'a> {
    resolver: &'a PathResolver,
    codec: &'a NameCodec,
    filter: &'a IgnoreFilter,
}

impl<'a> DirectoryIndexer<'a> {
    pub fn new(resolver: &'a PathResolver, codec: &'a NameCodec, filter: &'a IgnoreFilter) -> Self {
        Self {
            resolver,
            codec,
            filter,
        }
    }

    /// Immediate children of `dir`, ignored names dropped, newest first.
    pub fn list(&self, dir: &Path) -> Result<IndexResult, MediaError> {
        let url_root = self.url_root(dir)?;

        let children = fs::read_dir(dir)
            .map_err(|e| MediaError::Index(format!("{}: {}", dir.display(), e)))?;

        let mut result = IndexResult::default();

        for child in children {
            let child = match child {
                Ok(child) => child,
                Err(e) => {
                    skip(&mut result, dir.display().to_string(), e.to_string());
                    continue;
                }
            };

            let path = child.path();
            let Some(name) = child.file_name().to_str().map(str::to_owned) else {
                skip(&mut result, path.display().to_string(), "name is not valid UTF-8".into());
                continue;
            };

            if self.filter.should_ignore(&name) {
                continue;
            }

            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    skip(&mut result, path.display().to_string(), e.to_string());
                    continue;
                }
            };

            let modified_at = match metadata.modified() {
                Ok(modified) => modified,
                Err(e) => {
                    skip(&mut result, path.display().to_string(), e.to_string());
                    continue;
                }
            };

            let is_dir = metadata.is_dir();
            let encoded_name = if is_dir {
                name.clone()
            } else {
                self.codec.encode(&name)
            };
            let url_path = join_url_path(&url_root, &encoded_name);

            result.entries.push(DirEntry {
                name,
                is_dir,
                encoded_name,
                modified_at,
                size_bytes: metadata.len(),
                relative_url: media_url(&url_path),
                download_url: download_url(&url_path),
            });
        }

        result.sort_newest_first();

        info!(
            "Listed {} - {} entries, {} skipped",
            dir.display(),
            result.entries.len(),
            result.skipped.len()
        );

        Ok(result)
    }

    /// Files anywhere under `dir` whose name contains `query`, ignoring case.
    ///
    /// Ignore rules are matched against each path relative to the media root,
    /// and ignored directories are not descended into.
    pub fn search(&self, dir: &Path, query: &str) -> Result<IndexResult, MediaError> {
        let url_root = self.url_root(dir)?;

        fs::read_dir(dir).map_err(|e| MediaError::Index(format!("{}: {}", dir.display(), e)))?;

        let needle = query.to_lowercase();
        let media_root = self.resolver.media_root();
        let mut result = IndexResult::default();

        let walker = WalkDir::new(dir).min_depth(1).into_iter().filter_entry(|e| {
            let relative = e
                .path()
                .strip_prefix(media_root)
                .map(to_url_path)
                .unwrap_or_default();
            !self.filter.should_ignore(&relative)
        });

        for item in walker {
            let item = match item {
                Ok(item) => item,
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| dir.display().to_string());
                    skip(&mut result, path, e.to_string());
                    continue;
                }
            };

            if item.file_type().is_dir() {
                continue;
            }

            let Some(name) = item.file_name().to_str() else {
                let path = item.path().display().to_string();
                skip(&mut result, path, "name is not valid UTF-8".into());
                continue;
            };

            if !name.to_lowercase().contains(&needle) {
                continue;
            }

            let metadata = match fs::metadata(item.path()) {
                Ok(metadata) if metadata.is_dir() => continue,
                Ok(metadata) => metadata,
                Err(e) => {
                    skip(&mut result, item.path().display().to_string(), e.to_string());
                    continue;
                }
            };

            let modified_at = match metadata.modified() {
                Ok(modified) => modified,
                Err(e) => {
                    skip(&mut result, item.path().display().to_string(), e.to_string());
                    continue;
                }
            };

            // Only the final segment is encoded; parent directories may contain
            // the same text as the file name and must stay untouched.
            let parent = item
                .path()
                .parent()
                .and_then(|p| p.strip_prefix(dir).ok())
                .map(to_url_path)
                .unwrap_or_default();
            let encoded_name = self.codec.encode(name);
            let url_path = join_url_path(&join_url_path(&url_root, &parent), &encoded_name);

            result.entries.push(DirEntry {
                name: name.to_string(),
                is_dir: false,
                encoded_name,
                modified_at,
                size_bytes: metadata.len(),
                relative_url: media_url(&url_path),
                download_url: download_url(&url_path),
            });
        }

        result.sort_newest_first();

        info!(
            "Searched {} for \"{}\" - {} matches, {} skipped",
            dir.display(),
            query,
            result.entries.len(),
            result.skipped.len()
        );

        Ok(result)
    }

    fn url_root(&self, dir: &Path) -> Result<String, MediaError> {
        self.resolver
            .relative_to_root(dir)
            .ok_or_else(|| MediaError::InvalidPath(dir.display().to_string()))
    }
}

fn skip(result: &mut IndexResult, path: String, reason: String) {
    warn!("Skipping {}: {}", path, reason);
    result.skipped.push(SkippedEntry { path, reason });
}
