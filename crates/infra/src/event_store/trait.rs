use std::sync::Arc;

use thiserror::Error;

use stationflow_core::{EventId, StationId, StationSummary, StoredTransfer, TransferEvent};

/// Transfer store operation error.
///
/// These are **infrastructure errors** only. The store never rejects a
/// well-formed event on business grounds, and "duplicate" / "not found" are
/// ordinary return values, not errors.
///
/// ## Error Categories
///
/// - **Unavailable**: backing storage cannot be reached (pool closed, I/O, TLS)
/// - **Timeout**: no connection could be acquired in time
/// - **Constraint**: a storage-level constraint other than uniqueness fired
/// - **Decode**: a stored row could not be mapped back to a domain value
/// - **Backend**: anything else reported by the storage engine
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage timeout: {0}")]
    Timeout(String),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("failed to decode stored row: {0}")]
    Decode(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether the failure is about reaching the backing store at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}

/// Uniquely-keyed, insert-only store of transfer events.
///
/// ## Insert Semantics
///
/// `try_insert()`:
/// - Stores the event and returns `true` if no event with the same `event_id`
///   exists
/// - Otherwise returns `false` and changes nothing, even if the payload differs
/// - Must be atomic with respect to concurrent callers: for one `event_id`,
///   exactly one concurrent attempt observes `true`
///
/// The conflict check happens at the point of write (a uniqueness constraint
/// or a single critical section). Implementations must not check for
/// existence first and insert afterwards.
///
/// ## Aggregate Semantics
///
/// `summarize()` counts every event of the station and sums `amount` over the
/// approved ones. It returns `None` if the station has no events at all.
///
/// ## Implementation Requirements
///
/// Implementations must:
/// - never update or delete a stored event
/// - assign `ingested_at` once, on the insert that created the record
/// - surface only infrastructure failures as errors
/// - not retry failed writes on their own
#[async_trait::async_trait]
pub trait TransferStore: Send + Sync {
    /// Insert `event` unless its `event_id` is already present.
    async fn try_insert(&self, event: &TransferEvent) -> Result<bool, StoreError>;

    /// Per-station aggregate, or `None` for a station with no events.
    async fn summarize(&self, station_id: &StationId) -> Result<Option<StationSummary>, StoreError>;

    /// Point lookup by event id.
    async fn find(&self, event_id: &EventId) -> Result<Option<StoredTransfer>, StoreError>;
}

#[async_trait::async_trait]
impl<S> TransferStore for Arc<S>
where
    S: TransferStore + ?Sized,
{
    async fn try_insert(&self, event: &TransferEvent) -> Result<bool, StoreError> {
        (**self).try_insert(event).await
    }

    async fn summarize(&self, station_id: &StationId) -> Result<Option<StationSummary>, StoreError> {
        (**self).summarize(station_id).await
    }

    async fn find(&self, event_id: &EventId) -> Result<Option<StoredTransfer>, StoreError> {
        (**self).find(event_id).await
    }
}
