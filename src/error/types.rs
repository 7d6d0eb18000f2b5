//! Error types
//!
//! Defines domain-specific error types for the media server core.

use std::fmt;
use std::io;

/// Phase of archive construction that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveStage {
    /// Walking the tree and writing entries
    Entries,
    /// Writing the central directory
    Finalize,
}

impl fmt::Display for ArchiveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveStage::Entries => write!(f, "writing zip entries"),
            ArchiveStage::Finalize => write!(f, "finalizing zip archive"),
        }
    }
}

/// Errors surfaced by path resolution, indexing and archiving
#[derive(Debug)]
pub enum MediaError {
    InvalidPath(String),
    NotFound(String),
    Decode(String),
    Index(String),
    Archive { stage: ArchiveStage, message: String },
    Io(io::Error),
}

impl MediaError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            MediaError::InvalidPath(_) => "invalid_path",
            MediaError::NotFound(_) => "not_found",
            MediaError::Decode(_) => "decode_error",
            MediaError::Index(_) => "index_error",
            MediaError::Archive { .. } => "archive_error",
            MediaError::Io(_) => "io_error",
        }
    }

    /// Maps a filesystem error on `path` to `NotFound` when applicable
    pub fn from_io(path: &str, error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::NotFound {
            MediaError::NotFound(path.to_string())
        } else {
            MediaError::Io(error)
        }
    }
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            MediaError::NotFound(p) => write!(f, "Not found: {}", p),
            MediaError::Decode(s) => write!(f, "Invalid encoded name: {}", s),
            MediaError::Index(s) => write!(f, "Failed to index directory: {}", s),
            MediaError::Archive { stage, message } => {
                write!(f, "Archive error while {}: {}", stage, message)
            }
            MediaError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for MediaError {}

impl From<io::Error> for MediaError {
    fn from(error: io::Error) -> Self {
        MediaError::Io(error)
    }
}

/// Settings file errors
#[derive(Debug)]
pub enum SettingsError {
    Unreadable(String, io::Error),
    Malformed(String, config::ConfigError),
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Unreadable(p, e) => {
                write!(f, "Cannot read settings file \"{}\": {}", p, e)
            }
            SettingsError::Malformed(p, e) => write!(f, "Invalid settings in \"{}\": {}", p, e),
            SettingsError::InvalidValue(msg) => write!(f, "Invalid settings value: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Fatal startup errors
#[derive(Debug)]
pub enum StartupError {
    Config(config::ConfigError),
    Settings(SettingsError),
    MediaRoot(String, io::Error),
    Bind(String, io::Error),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Config(e) => write!(f, "Configuration error: {}", e),
            StartupError::Settings(e) => write!(f, "Settings error: {}", e),
            StartupError::MediaRoot(p, e) => write!(f, "Invalid media root \"{}\": {}", p, e),
            StartupError::Bind(addr, e) => write!(f, "Failed to bind to {}: {}", addr, e),
        }
    }
}

impl std::error::Error for StartupError {}

impl From<config::ConfigError> for StartupError {
    fn from(error: config::ConfigError) -> Self {
        StartupError::Config(error)
    }
}

impl From<SettingsError> for StartupError {
    fn from(error: SettingsError) -> Self {
        StartupError::Settings(error)
    }
}
