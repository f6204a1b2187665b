//! Server configuration read from the environment.
//!
//! Repository selection is handled separately by
//! [`crate::db::RepositoryType::from_env`].

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::storage::ImageStoreKind;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub image_store: ImageStoreKind,
    /// Root directory for the local image store; served under `/uploads`.
    pub upload_dir: PathBuf,
    pub image_folder: String,
    /// Prefix for URLs returned by the local image store. Empty yields
    /// root-relative URLs.
    pub public_base_url: String,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            image_store: ImageStoreKind::Local,
            upload_dir: PathBuf::from("uploads"),
            image_folder: "DevEvent".to_string(),
            public_base_url: String::new(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, String> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("Invalid value for {}: {}", name, raw)),
        _ => Ok(None),
    }
}

impl AppConfig {
    /// Read `HOST`, `PORT`, `IMAGE_STORE`, `UPLOAD_DIR`, `IMAGE_FOLDER`,
    /// `PUBLIC_BASE_URL` and `MAX_UPLOAD_BYTES`, falling back to defaults
    /// for unset variables.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();
        let image_store = match env::var("IMAGE_STORE") {
            Ok(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => defaults.image_store,
        };

        Ok(Self {
            host: parse_var("HOST")?.unwrap_or(defaults.host),
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            image_store,
            upload_dir: parse_var("UPLOAD_DIR")?.unwrap_or(defaults.upload_dir),
            image_folder: parse_var("IMAGE_FOLDER")?.unwrap_or(defaults.image_folder),
            public_base_url: parse_var("PUBLIC_BASE_URL")?.unwrap_or(defaults.public_base_url),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES")?.unwrap_or(defaults.max_upload_bytes),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid bind address {}:{}: {}", self.host, self.port, e))
    }
}
