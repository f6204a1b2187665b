//! Database layer for events and bookings.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers / pages                                  │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service layer (services.rs)                            │
//! │  - validation, slug derivation, date/time/email forms   │
//! │  - booking reference checks                             │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository traits (repository/)                        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴──────────────┐
//!     │ LocalRepository │ Postgres   │
//!     └──────────────────────────────┘
//! ```
//!
//! Callers obtain a repository through a [`DatabaseConnection`], either one
//! they own or the process-wide instance returned by [`database`]:
//!
//! ```ignore
//! use devevent::db::{self, services};
//!
//! async fn example() -> Result<(), devevent::db::RepositoryError> {
//!     let repo = db::database().connect().await?;
//!     let events = services::list_events(repo.as_ref()).await?;
//!     Ok(())
//! }
//! ```

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod connection;
pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::PostgresConfig;

/// Placeholder so configuration code compiles without the Postgres backend.
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

#[cfg(not(feature = "postgres-repo"))]
impl PostgresConfig {
    pub fn from_env() -> Result<Self, String> {
        Err("Postgres repository feature not enabled".to_string())
    }
}

pub use connection::{ConnectionState, Connector, DatabaseConnection};
pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    BookingRepository, ErrorContext, EventRepository, FullRepository, RepositoryError,
    RepositoryResult,
};

use std::sync::{Arc, OnceLock};

/// Process-wide connection, created on first access.
static DATABASE: OnceLock<Arc<DatabaseConnection>> = OnceLock::new();

/// The shared connection for this process.
///
/// The backend is chosen from the environment the first time a caller
/// connects (see [`RepositoryFactory::from_env`]). Nothing is opened until
/// then.
pub fn database() -> &'static Arc<DatabaseConnection> {
    DATABASE.get_or_init(|| Arc::new(DatabaseConnection::from_env()))
}
