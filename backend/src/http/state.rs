//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::db::DatabaseConnection;
use crate::storage::ImageStore;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub database: Arc<DatabaseConnection>,
    pub images: Arc<dyn ImageStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        database: Arc<DatabaseConnection>,
        images: Arc<dyn ImageStore>,
        config: AppConfig,
    ) -> Self {
        Self {
            database,
            images,
            config: Arc::new(config),
        }
    }

    /// The repository behind the shared connection, connecting on first use.
    pub async fn repository(&self) -> RepositoryResult<Arc<dyn FullRepository>> {
        self.database.connect().await
    }
}
