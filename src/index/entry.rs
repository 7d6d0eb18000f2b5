//! Listing entries

use chrono::{DateTime, Local};
use humansize::{BINARY, format_size};
use std::time::SystemTime;

/// One visible entry of a listing or search, built per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Raw file system name
    pub name: String,
    pub is_dir: bool,
    /// Encoded token for files, the raw name for directories
    pub encoded_name: String,
    pub modified_at: SystemTime,
    pub size_bytes: u64,
    /// Browse link under `/media/`
    pub relative_url: String,
    pub download_url: String,
}

impl DirEntry {
    pub fn human_size(&self) -> String {
        format_size(self.size_bytes, BINARY)
    }

    /// Local modification time as `dd/mm/yy HH:MM`
    pub fn modified_display(&self) -> String {
        DateTime::<Local>::from(self.modified_at)
            .format("%d/%m/%y %H:%M")
            .to_string()
    }
}

/// Browse URL for a `/`-separated path relative to the media root
pub fn media_url(url_path: &str) -> String {
    let encoded = url_path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::encode(s).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("/media/{}", encoded)
}

/// Download URL carrying the path as an escaped query value
pub fn download_url(url_path: &str) -> String {
    format!("/download?path={}", urlencoding::encode(url_path))
}

/// Joins two `/`-separated paths, skipping empty sides
pub fn join_url_path(base: &str, tail: &str) -> String {
    match (base.trim_matches('/'), tail.trim_matches('/')) {
        ("", tail) => tail.to_string(),
        (base, "") => base.to_string(),
        (base, tail) => format!("{}/{}", base, tail),
    }
}
