//! Batch ingestion pipeline (application-level orchestration).
//!
//! ## Ingestion Flow
//!
//! ```text
//! Validated batch
//!   ↓
//! for each event, in order:
//!   try_insert (atomic insert-or-skip in the store)
//!     true  → inserted += 1
//!     false → counted as duplicate
//!   ↓
//! BatchOutcome { inserted, duplicates = len - inserted }
//! ```
//!
//! Each insert stands on its own. If the store fails at event `k`, the error is
//! returned as-is and events before `k` stay stored; nothing is rolled back and
//! nothing is retried. Repeats inside one batch need no special handling: the
//! second occurrence meets the row the first one wrote.
//!
//! This module contains no IO itself; it composes the `TransferStore` trait.

use tracing::{Span, field, info, instrument, warn};

use stationflow_core::{BatchOutcome, EventId, StationId, StationSummary, StoredTransfer, TransferEvent};

use crate::event_store::{StoreError, TransferStore};

/// Runs batches of validated events against a [`TransferStore`].
///
/// Holds no event state between calls; the store is the only shared resource,
/// so one coordinator can serve any number of concurrent requests.
///
/// ## Generic Parameters
///
/// - `S`: store implementation (`InMemoryTransferStore`, `PostgresTransferStore`,
///   or `Arc<dyn TransferStore>`)
#[derive(Debug, Clone)]
pub struct IngestionCoordinator<S> {
    store: S,
}

impl<S> IngestionCoordinator<S>
where
    S: TransferStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Insert every event of the batch, counting inserts and duplicates.
    #[instrument(skip(self, events), fields(batch_size = events.len(), inserted = field::Empty, duplicates = field::Empty))]
    pub async fn ingest_batch(&self, events: &[TransferEvent]) -> Result<BatchOutcome, StoreError> {
        info!("ingesting batch of {} events", events.len());

        let mut inserted = 0u64;
        for (idx, event) in events.iter().enumerate() {
            match self.store.try_insert(event).await {
                Ok(true) => inserted += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        index = idx,
                        event_id = %event.event_id(),
                        inserted_so_far = inserted,
                        error = %e,
                        "batch aborted by store failure; earlier inserts are kept"
                    );
                    return Err(e);
                }
            }
        }

        let outcome = BatchOutcome::from_counts(events.len(), inserted);
        let span = Span::current();
        span.record("inserted", outcome.inserted);
        span.record("duplicates", outcome.duplicates);
        info!(
            inserted = outcome.inserted,
            duplicates = outcome.duplicates,
            "batch ingested"
        );
        Ok(outcome)
    }

    /// Station totals, or `None` if nothing was ever recorded for the station.
    pub async fn station_summary(
        &self,
        station_id: &StationId,
    ) -> Result<Option<StationSummary>, StoreError> {
        self.store.summarize(station_id).await
    }

    /// The stored record for `event_id`, as first written.
    pub async fn transfer(&self, event_id: &EventId) -> Result<Option<StoredTransfer>, StoreError> {
        self.store.find(event_id).await
    }
}
