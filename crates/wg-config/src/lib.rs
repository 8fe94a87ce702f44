//! # wg-config
//!
//! Layered settings for the gallery server. Sources, lowest priority first:
//! built-in defaults, an optional `webgallery.toml`, then `WEBGALLERY__*`
//! environment variables (e.g. `WEBGALLERY__SERVER__PORT=8080`).

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const ENV_PREFIX: &str = "WEBGALLERY";
pub const DEFAULT_FILE: &str = "webgallery";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory served at `/` when it exists
    pub static_dir: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    pub upload_dir: String,
    pub max_upload_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 3000,
                static_dir: "static".to_string(),
            },
            database: DatabaseSettings {
                url: "sqlite:db/gallery.db".to_string(),
                max_connections: 5,
            },
            storage: StorageSettings {
                upload_dir: "uploads".to_string(),
                max_upload_bytes: 10 * 1024 * 1024,
            },
        }
    }
}

impl Settings {
    /// Loads `.env`, then the default file and the process environment.
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("loaded environment from {}", path.display());
        }
        Self::load_from(Some(Path::new(DEFAULT_FILE)), None)
    }

    /// Loads from an explicit file and, when given, an explicit environment map
    /// instead of the process environment.
    pub fn load_from(
        file: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, SettingsError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?);

        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.server.port == 0 {
            return Err(SettingsError::Invalid("server.port must be non-zero".into()));
        }
        if self.storage.max_upload_bytes == 0 {
            return Err(SettingsError::Invalid("storage.max_upload_bytes must be positive".into()));
        }
        if self.storage.upload_dir.trim().is_empty() {
            return Err(SettingsError::Invalid("storage.upload_dir must not be empty".into()));
        }
        Ok(())
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
