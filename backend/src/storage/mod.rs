//! Image upload backends.
//!
//! An [`ImageStore`] takes an uploaded file and returns the public URL it
//! can be served from. The URL is what gets stored on an event.

use async_trait::async_trait;
use std::sync::Arc;

#[cfg(feature = "cloudinary")]
pub mod cloudinary;
pub mod local;

#[cfg(feature = "cloudinary")]
pub use cloudinary::{CloudinaryConfig, CloudinaryImageStore};
pub use local::LocalImageStore;

/// Error type for image uploads.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Unsupported content type: {0}")]
    UnsupportedType(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `bytes` and return a durable public URL.
    ///
    /// `filename` is the client-supplied name, used only for its extension.
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: Option<&str>,
        content_type: Option<&str>,
    ) -> StorageResult<String>;
}

/// Which [`ImageStore`] the server should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStoreKind {
    Local,
    Cloudinary,
}

impl std::str::FromStr for ImageStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "fs" => Ok(Self::Local),
            "cloudinary" => Ok(Self::Cloudinary),
            _ => Err(format!("Unknown image store: {}", s)),
        }
    }
}

/// Build the configured image store.
pub fn create_image_store(config: &crate::config::AppConfig) -> StorageResult<Arc<dyn ImageStore>> {
    match config.image_store {
        ImageStoreKind::Local => Ok(Arc::new(LocalImageStore::new(
            &config.upload_dir,
            &config.image_folder,
            &config.public_base_url,
        ))),
        ImageStoreKind::Cloudinary => {
            #[cfg(feature = "cloudinary")]
            {
                let settings = CloudinaryConfig::from_env(&config.image_folder)?;
                Ok(Arc::new(CloudinaryImageStore::new(settings)?))
            }
            #[cfg(not(feature = "cloudinary"))]
            {
                Err(StorageError::Configuration(
                    "Cloudinary image store feature not enabled".to_string(),
                ))
            }
        }
    }
}

/// File extension for a raster image upload, from its content type or, when
/// none was sent, its name. `None` for anything else, SVG included.
pub(crate) fn extension_for(filename: Option<&str>, content_type: Option<&str>) -> Option<&'static str> {
    if let Some(ct) = content_type {
        let essence = ct.split(';').next().unwrap_or_default().trim().to_lowercase();
        return match essence.as_str() {
            "image/png" => Some("png"),
            "image/jpeg" | "image/jpg" => Some("jpg"),
            "image/gif" => Some("gif"),
            "image/webp" => Some("webp"),
            "image/avif" => Some("avif"),
            _ => None,
        };
    }

    let ext = filename
        .and_then(|name| std::path::Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());
    match ext.as_deref() {
        Some("png") => Some("png"),
        Some("jpg") | Some("jpeg") => Some("jpg"),
        Some("gif") => Some("gif"),
        Some("webp") => Some("webp"),
        Some("avif") => Some("avif"),
        _ => None,
    }
}
