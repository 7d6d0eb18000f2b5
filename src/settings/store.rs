//! Settings store backed by a JSON file that may change while the server runs.

use config::{Config, File, FileFormat};
use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use crate::codec::DEFAULT_NAME_SEPARATOR;
use crate::error::SettingsError;

/// Snapshot of the runtime settings
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct MediaSettings {
    /// Path segments hidden from listings and search
    #[serde(default)]
    pub ignore_paths: Vec<String>,

    /// Marks a URL segment as an encoded file name
    pub base_64_name_prefix: String,

    /// Placed between the prefix and the base64 payload
    #[serde(default = "default_separator")]
    pub base_64_name_separator: String,
}

fn default_separator() -> String {
    DEFAULT_NAME_SEPARATOR.to_string()
}

impl MediaSettings {
    fn validate(&self) -> Result<(), SettingsError> {
        if self.base_64_name_prefix.is_empty() {
            return Err(SettingsError::InvalidValue(
                "\"base_64_name_prefix\" cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

struct CachedSettings {
    snapshot: MediaSettings,
    last_modified: SystemTime,
}

/// Caches the settings file and reloads it when its modification time changes.
///
/// The stat, reload and snapshot copy happen under one lock so concurrent
/// readers never see a partially applied reload. Any failure keeps the last
/// good snapshot in effect.
pub struct ConfigStore {
    path: PathBuf,
    state: Mutex<CachedSettings>,
}

impl ConfigStore {
    /// Loads the settings file, failing if it is missing or invalid.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let (snapshot, modified) = load_settings(&path)?;

        info!(
            "Loaded settings from {} (prefix: {}, ignore_paths: {:?})",
            path.display(),
            snapshot.base_64_name_prefix,
            snapshot.ignore_paths
        );

        Ok(Self {
            path,
            state: Mutex::new(CachedSettings {
                snapshot,
                last_modified: modified,
            }),
        })
    }

    /// Current settings, reloading the file first if it changed on disk.
    pub fn get(&self) -> MediaSettings {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let modified = match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                warn!(
                    "Cannot stat settings file {}: {}. Using cached version",
                    self.path.display(),
                    e
                );
                return state.snapshot.clone();
            }
        };

        if state.last_modified == modified {
            return state.snapshot.clone();
        }

        match load_settings(&self.path) {
            Ok((snapshot, modified)) => {
                info!("Reloaded settings from {}", self.path.display());
                state.snapshot = snapshot;
                state.last_modified = modified;
            }
            Err(e) => {
                // Remember the broken version so it is not re-parsed on every request.
                warn!("{}. Using cached version", e);
                state.last_modified = modified;
            }
        }

        state.snapshot.clone()
    }
}

fn load_settings(path: &Path) -> Result<(MediaSettings, SystemTime), SettingsError> {
    let display = path.display().to_string();

    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| SettingsError::Unreadable(display.clone(), e))?;

    let settings: MediaSettings = Config::builder()
        .add_source(File::from(path).format(FileFormat::Json))
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|e| SettingsError::Malformed(display, e))?;

    settings.validate()?;

    Ok((settings, modified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_settings(path: &Path, body: &str, modified: SystemTime) {
        fs::write(path, body).unwrap();
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(modified).unwrap();
    }

    #[test]
    fn test_open_reads_all_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        write_settings(
            &path,
            r#"{"ignore_paths": [".git", "node_modules"], "base_64_name_prefix": "yms", "base_64_name_separator": "-"}"#,
            SystemTime::now(),
        );

        let store = ConfigStore::open(&path).unwrap();
        let settings = store.get();
        assert_eq!(settings.ignore_paths, vec![".git", "node_modules"]);
        assert_eq!(settings.base_64_name_prefix, "yms");
        assert_eq!(settings.base_64_name_separator, "-");
    }

    #[test]
    fn test_open_rejects_empty_prefix() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        write_settings(&path, r#"{"base_64_name_prefix": ""}"#, SystemTime::now());

        assert!(matches!(
            ConfigStore::open(&path),
            Err(SettingsError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_open_fails_without_file() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigStore::open(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_deleted_file_keeps_cached_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        write_settings(
            &path,
            r#"{"ignore_paths": ["tmp"], "base_64_name_prefix": "first"}"#,
            SystemTime::now(),
        );

        let store = ConfigStore::open(&path).unwrap();
        fs::remove_file(&path).unwrap();

        for _ in 0..3 {
            let settings = store.get();
            assert_eq!(settings.base_64_name_prefix, "first");
            assert_eq!(settings.ignore_paths, vec!["tmp"]);
        }

        write_settings(
            &path,
            r#"{"ignore_paths": [], "base_64_name_prefix": "second"}"#,
            SystemTime::now() + Duration::from_secs(60),
        );
        assert_eq!(store.get().base_64_name_prefix, "second");
    }

    #[test]
    fn test_invalid_reload_keeps_cached_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let start = SystemTime::now();
        write_settings(&path, r#"{"base_64_name_prefix": "good"}"#, start);

        let store = ConfigStore::open(&path).unwrap();

        write_settings(&path, "{ not json", start + Duration::from_secs(10));
        assert_eq!(store.get().base_64_name_prefix, "good");

        write_settings(
            &path,
            r#"{"base_64_name_prefix": ""}"#,
            start + Duration::from_secs(20),
        );
        assert_eq!(store.get().base_64_name_prefix, "good");
    }

    #[test]
    fn test_failed_reload_is_not_retried_until_file_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let start = SystemTime::now();
        write_settings(&path, r#"{"base_64_name_prefix": "good"}"#, start);

        let store = ConfigStore::open(&path).unwrap();

        let broken_at = start + Duration::from_secs(10);
        write_settings(&path, "{ not json", broken_at);
        assert_eq!(store.get().base_64_name_prefix, "good");

        // Same mtime as the broken version: the cached snapshot is kept.
        write_settings(&path, r#"{"base_64_name_prefix": "fixed"}"#, broken_at);
        assert_eq!(store.get().base_64_name_prefix, "good");

        write_settings(
            &path,
            r#"{"base_64_name_prefix": "fixed"}"#,
            start + Duration::from_secs(20),
        );
        assert_eq!(store.get().base_64_name_prefix, "fixed");
    }
}
