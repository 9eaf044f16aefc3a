use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow},
};

use crate::{
    AggregateId, EventEntry, EventStoreError, NewEventEntry, Result, Version,
    store::{AppendOptions, EventStore, check_expected_version, validate_batch},
};

/// How long a writer waits for another connection's write transaction.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed event store implementation.
#[derive(Clone)]
pub struct SqliteEventStore {
    pool: SqlitePool,
}

impl SqliteEventStore {
    /// Creates a new SQLite event store on top of an existing pool.
    ///
    /// The caller is responsible for running the migrations.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `url` and applies the
    /// migrations.
    ///
    /// `sqlite::memory:` databases live as long as their connection, so the
    /// pool is pinned to a single connection that is never recycled.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);

        let (options, pool_options) = if url.contains(":memory:") {
            (
                options,
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None),
            )
        } else {
            (
                options.journal_mode(SqliteJournalMode::Wal),
                SqlitePoolOptions::new().max_connections(5),
            )
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self::new(pool);
        store.run_migrations().await?;

        tracing::info!(url, "connected to sqlite event store");
        Ok(store)
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_entry(row: SqliteRow) -> Result<EventEntry> {
        Ok(EventEntry {
            sequence_id: row.try_get("sequence_id")?,
            aggregate_id: AggregateId::from(row.try_get::<String, _>("aggregate_id")?),
            event_type: row.try_get("event_type")?,
            occurred_on: row.try_get("occurred_on")?,
            payload: row.try_get("payload")?,
        })
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn append(
        &self,
        entries: Vec<NewEventEntry>,
        options: AppendOptions,
    ) -> Result<Vec<EventEntry>> {
        let aggregate_id = validate_batch(&entries)?;

        // Take the write lock up front. A deferred transaction that starts
        // by reading cannot wait for a concurrent writer and fails as busy.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let current: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE aggregate_id = ?1")
                .bind(aggregate_id.as_str())
                .fetch_one(&mut *tx)
                .await?;
        let current_version = Version::new(current);
        check_expected_version(&aggregate_id, &options, current_version)?;

        let mut stored = Vec::with_capacity(entries.len());
        let mut version = current_version;
        for entry in entries {
            version = version.next();

            let result = sqlx::query(
                r#"
                INSERT INTO events (aggregate_id, version, event_type, occurred_on, payload)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(entry.aggregate_id.as_str())
            .bind(version.as_i64())
            .bind(&entry.event_type)
            .bind(entry.occurred_on)
            .bind(&entry.payload)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                // Another writer appended between our count and insert
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return EventStoreError::ConcurrencyConflict {
                        aggregate_id: aggregate_id.clone(),
                        expected: options.expected_version.unwrap_or(current_version),
                        actual: version,
                    };
                }
                EventStoreError::Database(e)
            })?;

            stored.push(entry.into_entry(result.last_insert_rowid()));
        }

        tx.commit().await?;

        tracing::debug!(%aggregate_id, count = stored.len(), "appended events");
        metrics::counter!("events_appended_total").increment(stored.len() as u64);

        Ok(stored)
    }

    async fn load_all(&self, aggregate_id: &AggregateId) -> Result<Vec<EventEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT sequence_id, aggregate_id, event_type, occurred_on, payload
            FROM events
            WHERE aggregate_id = ?1
            ORDER BY sequence_id ASC
            "#,
        )
        .bind(aggregate_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_entry).collect()
    }

    async fn fetch_by_type(&self, event_type: &str) -> Result<Vec<EventEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT sequence_id, aggregate_id, event_type, occurred_on, payload
            FROM events
            WHERE event_type = ?1
            ORDER BY sequence_id ASC
            "#,
        )
        .bind(event_type)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_entry).collect()
    }

    async fn aggregate_version(&self, aggregate_id: &AggregateId) -> Result<Version> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE aggregate_id = ?1")
            .bind(aggregate_id.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(Version::new(count))
    }
}
