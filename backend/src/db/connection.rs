//! Lazily established, shared database handle.
//!
//! [`DatabaseConnection`] builds its repository on first use and hands out
//! the same instance afterwards. Concurrent first callers wait on a single
//! attempt; a failed attempt leaves nothing cached so the next call starts
//! over.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::factory::RepositoryFactory;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};

/// Builds a repository on demand.
pub type Connector =
    Arc<dyn Fn() -> BoxFuture<'static, RepositoryResult<Arc<dyn FullRepository>>> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    Disconnecting = 3,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Connected,
            3 => Self::Disconnecting,
            _ => Self::Disconnected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnecting => "disconnecting",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct DatabaseConnection {
    repository: Mutex<Option<Arc<dyn FullRepository>>>,
    connector: Connector,
    state: AtomicU8,
}

impl fmt::Debug for DatabaseConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConnection")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl DatabaseConnection {
    pub fn new(connector: Connector) -> Self {
        Self {
            repository: Mutex::new(None),
            connector,
            state: AtomicU8::new(ConnectionState::Disconnected as u8),
        }
    }

    /// Connect using the backend selected by the environment.
    ///
    /// See [`RepositoryFactory::from_env`].
    pub fn from_env() -> Self {
        Self::new(Arc::new(|| RepositoryFactory::from_env().boxed()))
    }

    /// Wrap an already built repository. Reconnecting after
    /// [`disconnect`](Self::disconnect) yields the same instance.
    pub fn connected(repository: Arc<dyn FullRepository>) -> Self {
        let reuse = repository.clone();
        Self {
            repository: Mutex::new(Some(repository)),
            connector: Arc::new(move || {
                let repository = reuse.clone();
                async move { Ok::<_, RepositoryError>(repository) }.boxed()
            }),
            state: AtomicU8::new(ConnectionState::Connected as u8),
        }
    }

    /// Return the cached repository, establishing it first if needed.
    pub async fn connect(&self) -> RepositoryResult<Arc<dyn FullRepository>> {
        let mut slot = self.repository.lock().await;
        if let Some(repository) = slot.as_ref() {
            return Ok(repository.clone());
        }

        self.set_state(ConnectionState::Connecting);
        match (self.connector)().await {
            Ok(repository) => {
                *slot = Some(repository.clone());
                self.set_state(ConnectionState::Connected);
                info!("Database connection established");
                Ok(repository)
            }
            Err(e) => {
                self.set_state(ConnectionState::Disconnected);
                warn!(error = %e, "Database connection failed");
                Err(e)
            }
        }
    }

    /// Drop the cached repository. The next [`connect`](Self::connect)
    /// builds a new one.
    pub async fn disconnect(&self) {
        let mut slot = self.repository.lock().await;
        if slot.is_none() {
            return;
        }
        self.set_state(ConnectionState::Disconnecting);
        slot.take();
        self.set_state(ConnectionState::Disconnected);
        info!("Database connection closed");
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}
