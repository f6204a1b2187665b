//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Connection health monitoring
//! - Automatic migration execution
//! - Unique index on `events.slug`, which settles concurrent slug races
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 2)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 5)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 45)

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::debug;

use crate::db::repository::{
    BookingRepository, ErrorContext, EventRepository, RepositoryError, RepositoryResult,
};
use crate::models::{
    Booking, BookingId, BookingRecord, Event, EventId, EventRecord, EventSummary,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 2,
            connection_timeout_sec: 5,
            idle_timeout_sec: 45,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// This blocks while the pool fills its minimum idle connections; call it
    /// from a blocking context.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self { pool })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Run `f` with a pooled connection on the blocking thread pool.
    ///
    /// Failures are reported as-is; nothing is retried here.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new(operation).with_details("get_connection"),
                )
            })?;

            let started = Instant::now();
            let result = f(&mut conn).map_err(|e| e.with_operation(operation));
            debug!(
                operation,
                elapsed_ms = started.elapsed().as_millis() as u64,
                ok = result.is_ok(),
                "postgres query"
            );
            result
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new(operation).with_details("spawn_blocking"),
            )
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

#[async_trait]
impl EventRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn insert_event(&self, record: EventRecord) -> RepositoryResult<Event> {
        let changeset = EventChangeset::from(record);
        self.with_conn("insert_event", move |conn| {
            diesel::insert_into(events::table)
                .values(&changeset)
                .returning(EventRow::as_returning())
                .get_result(conn)
                .map(Event::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn update_event(&self, id: EventId, record: EventRecord) -> RepositoryResult<Event> {
        let changeset = EventChangeset::from(record);
        self.with_conn("update_event", move |conn| {
            diesel::update(events::table.find(id.value()))
                .set((&changeset, events::updated_at.eq(diesel::dsl::now)))
                .returning(EventRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Event::from)
                .ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        format!("Event {} not found", id),
                        ErrorContext::default()
                            .with_entity("event")
                            .with_entity_id(id),
                    )
                })
        })
        .await
    }

    async fn get_event(&self, id: EventId) -> RepositoryResult<Option<Event>> {
        self.with_conn("get_event", move |conn| {
            events::table
                .find(id.value())
                .select(EventRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(Event::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn find_event_by_slug(&self, slug: &str) -> RepositoryResult<Option<Event>> {
        let slug = slug.to_string();
        self.with_conn("find_event_by_slug", move |conn| {
            events::table
                .filter(events::slug.eq(slug))
                .select(EventRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(Event::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<EventId>) -> RepositoryResult<bool> {
        let slug = slug.to_string();
        self.with_conn("slug_exists", move |conn| {
            let mut query = events::table.filter(events::slug.eq(slug)).into_boxed();
            if let Some(id) = exclude {
                query = query.filter(events::event_id.ne(id.value()));
            }
            let count: i64 = query
                .select(count_star())
                .first(conn)
                .map_err(map_diesel_error)?;
            Ok(count > 0)
        })
        .await
    }

    async fn list_events(&self) -> RepositoryResult<Vec<Event>> {
        self.with_conn("list_events", |conn| {
            events::table
                .order((events::created_at.desc(), events::event_id.desc()))
                .select(EventRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(Event::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn find_events_sharing_tags(
        &self,
        tags: &[String],
        exclude: EventId,
    ) -> RepositoryResult<Vec<EventSummary>> {
        let tags = tags.to_vec();
        self.with_conn("find_events_sharing_tags", move |conn| {
            events::table
                .filter(events::event_id.ne(exclude.value()))
                .filter(events::tags.overlaps_with(tags))
                .filter(events::image.ne(""))
                .filter(events::slug.ne(""))
                .order(events::created_at.desc())
                .select(EventSummaryRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(EventSummary::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl BookingRepository for PostgresRepository {
    async fn insert_booking(&self, record: BookingRecord) -> RepositoryResult<Booking> {
        let changeset = BookingChangeset::from(record);
        self.with_conn("insert_booking", move |conn| {
            diesel::insert_into(bookings::table)
                .values(&changeset)
                .returning(BookingRow::as_returning())
                .get_result(conn)
                .map(Booking::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn update_booking(
        &self,
        id: BookingId,
        record: BookingRecord,
    ) -> RepositoryResult<Booking> {
        let changeset = BookingChangeset::from(record);
        self.with_conn("update_booking", move |conn| {
            diesel::update(bookings::table.find(id.value()))
                .set((&changeset, bookings::updated_at.eq(diesel::dsl::now)))
                .returning(BookingRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Booking::from)
                .ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        format!("Booking {} not found", id),
                        ErrorContext::default()
                            .with_entity("booking")
                            .with_entity_id(id),
                    )
                })
        })
        .await
    }

    async fn get_booking(&self, id: BookingId) -> RepositoryResult<Option<Booking>> {
        self.with_conn("get_booking", move |conn| {
            bookings::table
                .find(id.value())
                .select(BookingRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(Booking::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn count_bookings_for_event(&self, event_id: EventId) -> RepositoryResult<u64> {
        self.with_conn("count_bookings_for_event", move |conn| {
            let count: i64 = bookings::table
                .filter(bookings::event_id.eq(event_id.value()))
                .select(count_star())
                .first(conn)
                .map_err(map_diesel_error)?;
            Ok(count.max(0) as u64)
        })
        .await
    }
}
