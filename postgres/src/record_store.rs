//! `PostgresRecordStore`: the `RecordStore` trait over a sqlx `PgPool`.

use crate::rows::{
    EVENT_COLUMNS, EventRow, REGISTRATION_COLUMNS, RegistrationRow, UserRegistrationRow, UserRow,
    convert_all,
};
use rsvp_core::store::{RecordStore, StoreError, StoreFuture};
use rsvp_core::types::{
    Event, EventId, EventPatch, EventStatus, Registration, RegistrationStatus, User, UserId,
    UserRegistration,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Connection pool settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// How long to wait for a connection
    pub connect_timeout: Duration,
    /// How long an idle connection is kept
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

/// Maps a sqlx failure to `DatabaseError`, logging and counting it.
fn database_error(operation: &'static str) -> impl Fn(sqlx::Error) -> StoreError {
    move |e| {
        tracing::warn!(operation, error = %e, "Record store query failed");
        metrics::counter!("record_store.errors", "operation" => operation).increment(1);
        StoreError::DatabaseError(e.to_string())
    }
}

/// Capacities are bounded well below `i32::MAX`; anything larger is a bug upstream.
fn to_i32(value: u32) -> Result<i32, StoreError> {
    i32::try_from(value)
        .map_err(|_| StoreError::SerializationError(format!("value {value} out of range")))
}

/// `PostgreSQL`-backed [`RecordStore`].
///
/// Cheap to clone: clones share the underlying pool.
#[derive(Clone, Debug)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    /// Connect with default pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatabaseError`] if the connection fails.
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        Self::connect(database_url, &PoolConfig::default()).await
    }

    /// Connect with explicit pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatabaseError`] if the connection fails.
    pub async fn connect(database_url: &str, config: &PoolConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::DatabaseError(format!("Failed to connect: {e}")))?;

        tracing::info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connected to PostgreSQL"
        );

        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatabaseError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::DatabaseError(format!("Migration failed: {e}")))?;

        tracing::info!("Database migrations applied");
        Ok(())
    }
}

impl RecordStore for PostgresRecordStore {
    fn insert_event(&self, event: Event) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                INSERT INTO events
                    (event_id, title, description, date, location, capacity, organizer, status, has_waitlist)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (event_id) DO NOTHING
                ",
            )
            .bind(event.event_id.as_str())
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.date.as_str())
            .bind(&event.location)
            .bind(to_i32(event.capacity.value())?)
            .bind(&event.organizer)
            .bind(event.status.as_str())
            .bind(event.has_waitlist)
            .execute(&self.pool)
            .await
            .map_err(database_error("insert_event"))?;

            if result.rows_affected() == 0 {
                return Err(StoreError::AlreadyExists(format!("event {}", event.event_id)));
            }
            Ok(())
        })
    }

    fn get_event(&self, event_id: EventId) -> StoreFuture<'_, Option<Event>> {
        Box::pin(async move {
            let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = $1");
            let row: Option<EventRow> = sqlx::query_as(&sql)
                .bind(event_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error("get_event"))?;

            row.map(Event::try_from).transpose()
        })
    }

    fn list_events(&self, status: Option<EventStatus>) -> StoreFuture<'_, Vec<Event>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {EVENT_COLUMNS} FROM events
                 WHERE ($1::TEXT IS NULL OR status = $1)
                 ORDER BY event_id"
            );
            let rows: Vec<EventRow> = sqlx::query_as(&sql)
                .bind(status.map(|s| s.as_str()))
                .fetch_all(&self.pool)
                .await
                .map_err(database_error("list_events"))?;

            convert_all(rows)
        })
    }

    fn update_event(
        &self,
        event_id: EventId,
        patch: EventPatch,
    ) -> StoreFuture<'_, Option<Event>> {
        Box::pin(async move {
            let capacity = patch
                .capacity
                .map(|c| to_i32(c.value()))
                .transpose()?;
            let sql = format!(
                "UPDATE events SET
                    title = COALESCE($2, title),
                    description = COALESCE($3, description),
                    date = COALESCE($4, date),
                    location = COALESCE($5, location),
                    capacity = COALESCE($6, capacity),
                    organizer = COALESCE($7, organizer),
                    status = COALESCE($8, status),
                    has_waitlist = COALESCE($9, has_waitlist),
                    updated_at = now()
                 WHERE event_id = $1
                 RETURNING {EVENT_COLUMNS}"
            );
            let row: Option<EventRow> = sqlx::query_as(&sql)
                .bind(event_id.as_str())
                .bind(patch.title.as_deref())
                .bind(patch.description.as_deref())
                .bind(patch.date.as_ref().map(|d| d.as_str()))
                .bind(patch.location.as_deref())
                .bind(capacity)
                .bind(patch.organizer.as_deref())
                .bind(patch.status.map(|s| s.as_str()))
                .bind(patch.has_waitlist)
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error("update_event"))?;

            row.map(Event::try_from).transpose()
        })
    }

    fn delete_event(&self, event_id: EventId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM events WHERE event_id = $1")
                .bind(event_id.as_str())
                .execute(&self.pool)
                .await
                .map_err(database_error("delete_event"))?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn insert_user(&self, user: User) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let result = sqlx::query(
                "INSERT INTO users (user_id, name) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING",
            )
            .bind(user.user_id.as_str())
            .bind(&user.name)
            .execute(&self.pool)
            .await
            .map_err(database_error("insert_user"))?;

            if result.rows_affected() == 0 {
                return Err(StoreError::AlreadyExists(format!("user {}", user.user_id)));
            }
            Ok(())
        })
    }

    fn get_user(&self, user_id: UserId) -> StoreFuture<'_, Option<User>> {
        Box::pin(async move {
            let row: Option<UserRow> =
                sqlx::query_as("SELECT user_id, name FROM users WHERE user_id = $1")
                    .bind(user_id.as_str())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(database_error("get_user"))?;

            Ok(row.map(User::from))
        })
    }

    fn insert_registration(&self, registration: Registration) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                INSERT INTO registrations (user_id, event_id, status, registered_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id, event_id) DO NOTHING
                ",
            )
            .bind(registration.user_id.as_str())
            .bind(registration.event_id.as_str())
            .bind(registration.status.as_str())
            .bind(registration.registered_at)
            .execute(&self.pool)
            .await
            .map_err(database_error("insert_registration"))?;

            if result.rows_affected() == 0 {
                return Err(StoreError::AlreadyExists(format!(
                    "registration {}/{}",
                    registration.user_id, registration.event_id
                )));
            }
            Ok(())
        })
    }

    fn get_registration(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> StoreFuture<'_, Option<Registration>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE user_id = $1 AND event_id = $2"
            );
            let row: Option<RegistrationRow> = sqlx::query_as(&sql)
                .bind(user_id.as_str())
                .bind(event_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error("get_registration"))?;

            row.map(Registration::try_from).transpose()
        })
    }

    fn delete_registration(&self, user_id: UserId, event_id: EventId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let result =
                sqlx::query("DELETE FROM registrations WHERE user_id = $1 AND event_id = $2")
                    .bind(user_id.as_str())
                    .bind(event_id.as_str())
                    .execute(&self.pool)
                    .await
                    .map_err(database_error("delete_registration"))?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn transition_registration(
        &self,
        user_id: UserId,
        event_id: EventId,
        from: RegistrationStatus,
        to: RegistrationStatus,
    ) -> StoreFuture<'_, Option<Registration>> {
        Box::pin(async move {
            let sql = format!(
                "UPDATE registrations SET status = $4
                 WHERE user_id = $1 AND event_id = $2 AND status = $3
                 RETURNING {REGISTRATION_COLUMNS}"
            );
            let row: Option<RegistrationRow> = sqlx::query_as(&sql)
                .bind(user_id.as_str())
                .bind(event_id.as_str())
                .bind(from.as_str())
                .bind(to.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error("transition_registration"))?;

            row.map(Registration::try_from).transpose()
        })
    }

    fn list_event_registrations(
        &self,
        event_id: EventId,
        status: Option<RegistrationStatus>,
    ) -> StoreFuture<'_, Vec<Registration>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {REGISTRATION_COLUMNS} FROM registrations
                 WHERE event_id = $1 AND ($2::TEXT IS NULL OR status = $2)
                 ORDER BY registered_at, user_id"
            );
            let rows: Vec<RegistrationRow> = sqlx::query_as(&sql)
                .bind(event_id.as_str())
                .bind(status.map(|s| s.as_str()))
                .fetch_all(&self.pool)
                .await
                .map_err(database_error("list_event_registrations"))?;

            convert_all(rows)
        })
    }

    fn list_user_registrations(&self, user_id: UserId) -> StoreFuture<'_, Vec<UserRegistration>> {
        Box::pin(async move {
            let rows: Vec<UserRegistrationRow> = sqlx::query_as(
                r"
                SELECT r.user_id, r.event_id, r.status, r.registered_at, e.title AS event_title
                FROM registrations r
                LEFT JOIN events e ON e.event_id = r.event_id
                WHERE r.user_id = $1
                ORDER BY r.registered_at, r.event_id
                ",
            )
            .bind(user_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(database_error("list_user_registrations"))?;

            convert_all(rows)
        })
    }

    fn count_registrations(
        &self,
        event_id: EventId,
        status: RegistrationStatus,
    ) -> StoreFuture<'_, u32> {
        Box::pin(async move {
            let (count,): (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status = $2",
            )
            .bind(event_id.as_str())
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(database_error("count_registrations"))?;

            u32::try_from(count)
                .map_err(|_| StoreError::SerializationError(format!("count {count} out of range")))
        })
    }

    fn first_waitlisted(&self, event_id: EventId) -> StoreFuture<'_, Option<Registration>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {REGISTRATION_COLUMNS} FROM registrations
                 WHERE event_id = $1 AND status = 'waitlisted'
                 ORDER BY registered_at, user_id
                 LIMIT 1"
            );
            let row: Option<RegistrationRow> = sqlx::query_as(&sql)
                .bind(event_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error("first_waitlisted"))?;

            row.map(Registration::try_from).transpose()
        })
    }

    fn claim_seat(&self, event_id: EventId, capacity: u32) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                UPDATE events SET confirmed_count = confirmed_count + 1
                WHERE event_id = $1 AND confirmed_count < $2
                ",
            )
            .bind(event_id.as_str())
            .bind(to_i32(capacity)?)
            .execute(&self.pool)
            .await
            .map_err(database_error("claim_seat"))?;

            Ok(result.rows_affected() == 1)
        })
    }

    fn release_seat(&self, event_id: EventId) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query(
                "UPDATE events SET confirmed_count = GREATEST(confirmed_count - 1, 0) WHERE event_id = $1",
            )
            .bind(event_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(database_error("release_seat"))?;

            Ok(())
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(database_error("ping"))?;
            Ok(())
        })
    }
}
