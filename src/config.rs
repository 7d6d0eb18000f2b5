//! Configuration management for RAX Media Server
//!
//! Startup configuration is read once: an optional `config.toml` with
//! `RAX_MEDIA_*` environment overrides. The media root always comes from
//! `YMS_MEDIA_ROOT`. Settings that may change while the server runs live in
//! [`crate::settings`].

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::storage::SymlinkPolicy;

/// Environment variable naming the media root directory
pub const MEDIA_ROOT_ENV: &str = "YMS_MEDIA_ROOT";

/// Configuration that requires a server restart to take effect
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the HTTP listener
    pub bind_address: String,

    /// Port for the HTTP listener
    pub port: u16,

    /// JSON file with ignore rules and the name codec prefix
    pub settings_path: String,

    /// Directory served under `/static/`
    pub static_dir: String,

    /// Maximum upload request size in MB
    pub max_upload_size_mb: u64,

    /// Whether symlinks may lead outside the media root
    pub symlink_policy: SymlinkPolicy,

    /// Root of the served tree, taken from the environment
    #[serde(skip)]
    pub media_root: PathBuf,
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .set_default("bind_address", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("settings_path", "config/config.json")?
            .set_default("static_dir", "static")?
            .set_default("max_upload_size_mb", 100)?
            .set_default("symlink_policy", "follow")?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("RAX_MEDIA"))
            .build()?;

        let mut config: ServerConfig = settings.try_deserialize()?;

        config.media_root = std::env::var(MEDIA_ROOT_ENV)
            .map(PathBuf::from)
            .map_err(|_| {
                config::ConfigError::Message(format!("Env var {} not found", MEDIA_ROOT_ENV))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.port == 0 {
            return Err(config::ConfigError::Message("Port cannot be 0".into()));
        }

        if self.media_root.as_os_str().is_empty() {
            return Err(config::ConfigError::Message(format!(
                "{} cannot be empty",
                MEDIA_ROOT_ENV
            )));
        }

        if self.settings_path.is_empty() {
            return Err(config::ConfigError::Message(
                "settings_path cannot be empty".into(),
            ));
        }

        if self.max_upload_size_mb == 0 {
            return Err(config::ConfigError::Message(
                "max_upload_size_mb must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as socket address
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get maximum upload size in bytes
    pub fn max_upload_size_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize) * 1024 * 1024
    }

    pub fn settings_path(&self) -> PathBuf {
        PathBuf::from(&self.settings_path)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            settings_path: "config/config.json".to_string(),
            static_dir: "static".to_string(),
            max_upload_size_mb: 100,
            symlink_policy: SymlinkPolicy::Follow,
            media_root: PathBuf::new(),
        }
    }
}
