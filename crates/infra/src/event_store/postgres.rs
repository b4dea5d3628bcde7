//! Postgres-backed transfer store implementation.
//!
//! Uniqueness of `event_id` is enforced by the table's primary key. Inserts use
//! `ON CONFLICT (event_id) DO NOTHING`, so the conflict check and the write are
//! a single atomic statement; `rows_affected()` tells whether this call won.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (check violation) | `23514` | `Constraint` | Negative amount reached the table |
//! | Database (numeric out of range) | `22003` | `Constraint` | Amount exceeds `NUMERIC(18,4)` |
//! | Database (other) | Any other | `Backend` | Other database errors |
//! | PoolTimedOut | N/A | `Timeout` | No connection available in time |
//! | PoolClosed / Io / Tls | N/A | `Unavailable` | Database unreachable or shutting down |
//! | ColumnDecode / Decode / ColumnNotFound | N/A | `Decode` | Row does not match the expected shape |
//! | Other | N/A | `Backend` | Anything else |
//!
//! ## Thread Safety
//!
//! `PostgresTransferStore` is `Send + Sync` and can be shared across tasks.
//! Each statement runs on its own pooled connection and autocommits; there is
//! no transaction spanning a batch.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::{Span, debug, field, instrument};

use stationflow_core::{
    APPROVED_STATUS, EventId, StationId, StationSummary, StoredTransfer, TransferEvent,
};

use super::r#trait::{StoreError, TransferStore};

/// Postgres-backed transfer store.
#[derive(Debug, Clone)]
pub struct PostgresTransferStore {
    pool: Arc<PgPool>,
}

impl PostgresTransferStore {
    /// Create a new PostgresTransferStore with the given connection pool.
    ///
    /// The schema must already exist; see [`crate::db::migrate`].
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl TransferStore for PostgresTransferStore {
    #[instrument(
        skip(self, event),
        fields(event_id = %event.event_id(), station_id = %event.station_id(), inserted = field::Empty),
        err
    )]
    async fn try_insert(&self, event: &TransferEvent) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO transfer_events (
                event_id,
                station_id,
                amount,
                status,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(event.event_id().as_str())
        .bind(event.station_id().as_str())
        .bind(event.amount())
        .bind(event.status())
        .bind(event.created_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("try_insert", e))?;

        let inserted = result.rows_affected() == 1;
        Span::current().record("inserted", inserted);
        if !inserted {
            debug!("duplicate event skipped");
        }
        Ok(inserted)
    }

    #[instrument(skip(self), fields(station_id = %station_id, events_count = field::Empty), err)]
    async fn summarize(&self, station_id: &StationId) -> Result<Option<StationSummary>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS events_count,
                COALESCE(SUM(amount) FILTER (WHERE status = $2), 0) AS total_approved
            FROM transfer_events
            WHERE station_id = $1
            "#,
        )
        .bind(station_id.as_str())
        .bind(APPROVED_STATUS)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("summarize", e))?;

        let events_count: i64 = row
            .try_get("events_count")
            .map_err(|e| map_sqlx_error("summarize", e))?;
        let total_approved: Decimal = row
            .try_get("total_approved")
            .map_err(|e| map_sqlx_error("summarize", e))?;

        Span::current().record("events_count", events_count);
        if events_count == 0 {
            return Ok(None);
        }

        Ok(Some(StationSummary {
            station_id: station_id.clone(),
            total_approved,
            events_count: events_count as u64,
        }))
    }

    #[instrument(skip(self), fields(event_id = %event_id), err)]
    async fn find(&self, event_id: &EventId) -> Result<Option<StoredTransfer>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                event_id,
                station_id,
                amount,
                status,
                created_at,
                ingested_at
            FROM transfer_events
            WHERE event_id = $1
            "#,
        )
        .bind(event_id.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find", e))?;

        row.map(|row| TransferRow::from_row(&row).and_then(StoredTransfer::try_from))
            .transpose()
    }
}

/// Map SQLx errors to StoreError.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23514") | Some("22003") => StoreError::Constraint(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Timeout(format!("timed out acquiring connection in {}", operation))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("i/o error in {}: {}", operation, e)),
        sqlx::Error::Tls(e) => StoreError::Unavailable(format!("tls error in {}: {}", operation, e)),
        e @ (sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_)) => {
            StoreError::Decode(format!("{} in {}", e, operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

// SQLx row types

#[derive(Debug)]
struct TransferRow {
    event_id: String,
    station_id: String,
    amount: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    ingested_at: DateTime<Utc>,
}

impl TransferRow {
    fn from_row(row: &sqlx::postgres::PgRow) -> Result<Self, StoreError> {
        let get = |e| map_sqlx_error("find", e);
        Ok(TransferRow {
            event_id: row.try_get("event_id").map_err(get)?,
            station_id: row.try_get("station_id").map_err(get)?,
            amount: row.try_get("amount").map_err(get)?,
            status: row.try_get("status").map_err(get)?,
            created_at: row.try_get("created_at").map_err(get)?,
            ingested_at: row.try_get("ingested_at").map_err(get)?,
        })
    }
}

impl TryFrom<TransferRow> for StoredTransfer {
    type Error = StoreError;

    fn try_from(row: TransferRow) -> Result<Self, Self::Error> {
        let decode = |e: stationflow_core::DomainError| StoreError::Decode(e.to_string());
        let event = TransferEvent::new(
            EventId::new(row.event_id).map_err(decode)?,
            StationId::new(row.station_id).map_err(decode)?,
            row.amount,
            row.status,
            row.created_at,
        )
        .map_err(decode)?;

        Ok(StoredTransfer {
            event,
            ingested_at: row.ingested_at,
        })
    }
}
