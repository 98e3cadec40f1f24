use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow, PgSslMode};
use sqlx::{PgPool, Row};
use tether_core::repository::{LinkRecord, LinkStore, ReadLinkStore, Result};
use tether_core::{ShortCode, StorageError};
use tokio::time::Instant;
use tracing::{info, warn};
use typed_builder::TypedBuilder;

const SCHEMA: &str = include_str!("../ddl/postgres/links.sql");

/// Connection parameters for [`PostgresLinkStore::connect`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct PostgresSettings {
    #[builder(default = "localhost".to_string(), setter(into))]
    pub host: String,
    #[builder(default = 5432)]
    pub port: u16,
    #[builder(default = "user".to_string(), setter(into))]
    pub username: String,
    #[builder(default = "password".to_string(), setter(into))]
    pub password: String,
    #[builder(default = "dbname".to_string(), setter(into))]
    pub database: String,
    /// libpq style mode: `disable`, `allow`, `prefer`, `require`, `verify-ca`, `verify-full`.
    #[builder(default = "disable".to_string(), setter(into))]
    pub ssl_mode: String,
    /// Total time spent retrying before giving up.
    #[builder(default = Duration::from_secs(60))]
    pub connect_timeout: Duration,
    #[builder(default = Duration::from_secs(1))]
    pub retry_interval: Duration,
    #[builder(default = 10)]
    pub max_connections: u32,
}

impl PostgresSettings {
    fn connect_options(&self) -> Result<PgConnectOptions> {
        let ssl_mode = PgSslMode::from_str(&self.ssl_mode)
            .map_err(|e| StorageError::Operation(format!("invalid ssl mode '{}': {e}", self.ssl_mode)))?;

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(ssl_mode))
    }
}

/// PostgreSQL implementation of the link store.
///
/// Deletes are hard deletes, so a removed code becomes available again.
/// Timestamps are stored as unix epoch microseconds.
#[derive(Debug, Clone)]
pub struct PostgresLinkStore {
    pool: PgPool,
}

impl PostgresLinkStore {
    /// Creates a store from an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool, retrying until the server answers or `connect_timeout` elapses.
    pub async fn connect(settings: &PostgresSettings) -> Result<Self> {
        let options = settings.connect_options()?;
        let deadline = Instant::now() + settings.connect_timeout;
        let mut attempt = 0_u32;

        loop {
            attempt += 1;
            let started = Instant::now();
            // Each attempt gets at most one retry interval, so refused
            // connections are reported and retried on that cadence.
            let budget = settings
                .retry_interval
                .min(deadline.saturating_duration_since(started));

            let result = tokio::time::timeout(
                budget,
                PgPoolOptions::new()
                    .max_connections(settings.max_connections)
                    .connect_with(options.clone()),
            )
            .await;

            let err = match result {
                Ok(Ok(pool)) => {
                    info!(
                        host = %settings.host,
                        port = settings.port,
                        database = %settings.database,
                        attempt,
                        "connected to postgres"
                    );
                    return Ok(Self::new(pool));
                }
                Ok(Err(err)) => err.to_string(),
                Err(_) => format!("attempt timed out after {budget:?}"),
            };

            if Instant::now() >= deadline {
                return Err(StorageError::Unavailable(format!(
                    "could not connect to postgres within {:?} ({attempt} attempts): {err}",
                    settings.connect_timeout
                )));
            }

            warn!(error = %err, attempt, "postgres not ready, retrying");
            tokio::time::sleep_until((started + settings.retry_interval).min(deadline)).await;
        }
    }

    /// Creates the `links` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Waits for checked-out connections to return and closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn now_micros() -> i64 {
    Timestamp::now().as_microsecond()
}

fn not_found(code: &ShortCode) -> StorageError {
    StorageError::NotFound(code.to_string())
}

fn parse_timestamp(column: &str, micros: i64) -> Result<Timestamp> {
    Timestamp::from_microsecond(micros).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{micros}': {e}"))
    })
}

fn parse_count(count: i64) -> Result<u64> {
    u64::try_from(count)
        .map_err(|_| StorageError::InvalidData(format!("negative access_count '{count}'")))
}

fn record_from_row(row: &PgRow) -> Result<LinkRecord> {
    let code: String = row.try_get("code").map_err(map_sqlx_error)?;
    let target_url: String = row.try_get("target_url").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let updated_at: i64 = row.try_get("updated_at").map_err(map_sqlx_error)?;
    let access_count: i64 = row.try_get("access_count").map_err(map_sqlx_error)?;

    Ok(LinkRecord {
        code: ShortCode::new(&code)
            .map_err(|e| StorageError::InvalidData(format!("stored code '{code}': {e}")))?,
        target_url,
        created_at: parse_timestamp("created_at", created_at)?,
        updated_at: parse_timestamp("updated_at", updated_at)?,
        access_count: parse_count(access_count)?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_) => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadLinkStore for PostgresLinkStore {
    async fn get(&self, code: &ShortCode) -> Result<LinkRecord> {
        let row = sqlx::query(
            r#"
            SELECT code, target_url, created_at, updated_at, access_count
            FROM links
            WHERE code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| not_found(code))?;

        record_from_row(&row)
    }
}

#[async_trait]
impl LinkStore for PostgresLinkStore {
    async fn create(&self, code: &ShortCode, target_url: &str) -> Result<LinkRecord> {
        let now = now_micros();

        let result = sqlx::query(
            r#"
            INSERT INTO links (code, target_url, created_at, updated_at, access_count)
            VALUES ($1, $2, $3, $3, 0)
            RETURNING code, target_url, created_at, updated_at, access_count
            "#,
        )
        .bind(code.as_str())
        .bind(target_url)
        .bind(now)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => record_from_row(&row),
            Err(err) if is_unique_violation(&err) => Err(StorageError::Conflict(code.to_string())),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn update(&self, code: &ShortCode, target_url: &str) -> Result<LinkRecord> {
        // GREATEST keeps updated_at from moving backwards if the host clock does.
        let row = sqlx::query(
            r#"
            UPDATE links
            SET target_url = $2,
                updated_at = GREATEST(updated_at, $3)
            WHERE code = $1
            RETURNING code, target_url, created_at, updated_at, access_count
            "#,
        )
        .bind(code.as_str())
        .bind(target_url)
        .bind(now_micros())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| not_found(code))?;

        record_from_row(&row)
    }

    async fn delete(&self, code: &ShortCode) -> Result<()> {
        let result = sqlx::query("DELETE FROM links WHERE code = $1")
            .bind(code.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found(code));
        }
        Ok(())
    }

    async fn increment_access(&self, code: &ShortCode) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            UPDATE links
            SET access_count = access_count + 1
            WHERE code = $1
            RETURNING access_count
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| not_found(code))?;

        parse_count(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_defaults_match_local_development() {
        let settings = PostgresSettings::builder().build();
        assert_eq!(settings.host, "localhost");
        assert_eq!(settings.port, 5432);
        assert_eq!(settings.ssl_mode, "disable");
        assert_eq!(settings.connect_timeout, Duration::from_secs(60));
        assert!(settings.connect_options().is_ok());
    }

    #[test]
    fn unknown_ssl_mode_is_rejected() {
        let settings = PostgresSettings::builder().ssl_mode("sometimes").build();
        assert!(matches!(
            settings.connect_options(),
            Err(StorageError::Operation(_))
        ));
    }

    #[tokio::test]
    async fn connect_gives_up_within_the_connect_timeout() {
        // Nothing listens on port 1, so every attempt is refused.
        let settings = PostgresSettings::builder()
            .host("127.0.0.1")
            .port(1)
            .connect_timeout(Duration::from_millis(300))
            .retry_interval(Duration::from_millis(100))
            .build();

        let started = std::time::Instant::now();
        let err = PostgresLinkStore::connect(&settings).await.unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, StorageError::Unavailable(_)));
        assert!(elapsed >= Duration::from_millis(250), "gave up early: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(2), "overran timeout: {elapsed:?}");
    }

    #[test]
    fn negative_counts_are_invalid_data() {
        assert_eq!(parse_count(3).unwrap(), 3);
        assert!(matches!(parse_count(-1), Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn timestamps_round_trip_through_micros() {
        let ts = Timestamp::from_microsecond(1_704_067_200_123_456).unwrap();
        assert_eq!(parse_timestamp("created_at", ts.as_microsecond()).unwrap(), ts);
    }

    #[test]
    fn pool_errors_map_to_availability_variants() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StorageError::Timeout(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed),
            StorageError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StorageError::Query(_)
        ));
    }
}
