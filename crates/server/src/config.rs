use std::{env, fs};

use base64::{engine::general_purpose, Engine};
use parley_shared::constants::DEFAULT_PHOTO_BASE64;

use crate::models::Photo;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read default photo at {path}: {source}")]
    PhotoRead {
        path: String,
        source: std::io::Error,
    },
    #[error("default photo is not valid base64: {0}")]
    PhotoDecode(#[from] base64::DecodeError),
    #[error("default photo is empty")]
    PhotoEmpty,
}

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Handed to every account created by a first login. Loaded once at startup.
    pub default_photo: Photo,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let default_photo = match env::var("DEFAULT_PHOTO_PATH") {
            Ok(path) => {
                let bytes = fs::read(&path).map_err(|source| ConfigError::PhotoRead {
                    path: path.clone(),
                    source,
                })?;
                Photo::from_bytes(bytes).ok_or(ConfigError::PhotoEmpty)?
            }
            Err(_) => builtin_default_photo()?,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./parley.db".into()),
            default_photo,
        })
    }
}

/// Decode the bundled placeholder image.
pub fn builtin_default_photo() -> Result<Photo, ConfigError> {
    let bytes = general_purpose::STANDARD.decode(DEFAULT_PHOTO_BASE64)?;
    Photo::from_bytes(bytes).ok_or(ConfigError::PhotoEmpty)
}
