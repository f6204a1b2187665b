//! Filesystem image store.
//!
//! Files land in `{upload_dir}/{folder}/{uuid}.{ext}` and are served by the
//! router under `/uploads`.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

use super::{extension_for, ImageStore, StorageError, StorageResult};

#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    folder: String,
    public_base_url: String,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, folder: &str, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            folder: folder.trim_matches('/').to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
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

        let name = format!("{}.{}", Uuid::new_v4(), ext);
        let dir = self.root.join(&self.folder);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&name), &bytes).await?;
        debug!(file = %name, size = bytes.len(), "Stored image");

        Ok(format!("{}/uploads/{}/{}", self.public_base_url, self.folder, name))
    }
}
