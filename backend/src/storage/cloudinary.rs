//! Cloudinary image store.
//!
//! Uses a signed upload request against the Cloudinary REST API.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, warn};

use super::{extension_for, ImageStore, StorageError, StorageResult};

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

impl CloudinaryConfig {
    /// Read `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY` and
    /// `CLOUDINARY_API_SECRET`.
    pub fn from_env(folder: &str) -> StorageResult<Self> {
        let var = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| StorageError::Configuration(format!("{} must be set", name)))
        };
        Ok(Self {
            cloud_name: var("CLOUDINARY_CLOUD_NAME")?,
            api_key: var("CLOUDINARY_API_KEY")?,
            api_secret: var("CLOUDINARY_API_SECRET")?,
            folder: folder.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

pub struct CloudinaryImageStore {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl CloudinaryImageStore {
    pub fn new(config: CloudinaryConfig) -> StorageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| StorageError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.config.cloud_name
        )
    }
}

/// SHA-256 signature over the sorted signed parameters followed by the secret.
fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: Option<&str>,
        content_type: Option<&str>,
    ) -> StorageResult<String> {
        let ext = extension_for(filename, content_type).ok_or_else(|| {
            StorageError::UnsupportedType(
                content_type.or(filename).unwrap_or("unknown").to_string(),
            )
        })?;
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", self.config.folder.as_str()), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let name = filename
            .map(str::to_string)
            .unwrap_or_else(|| format!("upload.{}", ext));
        let mut part = Part::bytes(bytes).file_name(name);
        if let Some(ct) = content_type {
            part = part
                .mime_str(ct)
                .map_err(|e| StorageError::UnsupportedType(format!("{}: {}", ct, e)))?;
        }

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("signature_algorithm", "sha256")
            .text("signature", signature);

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Upload(format!("Failed to reach Cloudinary: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<empty response>".to_string());

        if !status.is_success() {
            warn!(%status, "Cloudinary upload rejected");
            return Err(StorageError::Upload(format!(
                "Cloudinary upload failed ({}): {}",
                status,
                body.trim()
            )));
        }

        let parsed: UploadResponse = serde_json::from_str(&body)
            .map_err(|e| StorageError::Upload(format!("Failed to parse upload response: {}", e)))?;
        debug!(url = %parsed.secure_url, "Uploaded image to Cloudinary");
        Ok(parsed.secure_url)
    }
}
