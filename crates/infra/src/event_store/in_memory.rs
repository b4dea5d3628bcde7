use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use tracing::{debug, instrument};

use stationflow_core::{EventId, StationId, StationSummary, StoredTransfer, TransferEvent};

use super::r#trait::{StoreError, TransferStore};

#[derive(Debug, Default)]
struct Tables {
    events: HashMap<EventId, StoredTransfer>,
    by_station: HashMap<StationId, Vec<EventId>>,
}

/// In-memory transfer store.
///
/// Intended for tests/dev. Both tables sit behind one `RwLock`; the write
/// lock is the single point where an `event_id` is claimed, so the existence
/// check and the insert can never be split by another writer.
#[derive(Debug, Default)]
pub struct InMemoryTransferStore {
    tables: RwLock<Tables>,
}

impl InMemoryTransferStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events (all stations).
    pub fn len(&self) -> Result<usize, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables.events.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

#[async_trait::async_trait]
impl TransferStore for InMemoryTransferStore {
    #[instrument(skip(self, event), fields(event_id = %event.event_id()))]
    async fn try_insert(&self, event: &TransferEvent) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let Tables { events, by_station } = &mut *tables;

        match events.entry(event.event_id().clone()) {
            Entry::Occupied(_) => {
                debug!("duplicate event skipped");
                Ok(false)
            }
            Entry::Vacant(slot) => {
                by_station
                    .entry(event.station_id().clone())
                    .or_default()
                    .push(event.event_id().clone());
                slot.insert(StoredTransfer {
                    event: event.clone(),
                    ingested_at: Utc::now(),
                });
                Ok(true)
            }
        }
    }

    #[instrument(skip(self), fields(station_id = %station_id))]
    async fn summarize(&self, station_id: &StationId) -> Result<Option<StationSummary>, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;

        let Some(ids) = tables.by_station.get(station_id) else {
            return Ok(None);
        };

        let events = ids
            .iter()
            .filter_map(|id| tables.events.get(id))
            .map(|stored| &stored.event);

        Ok(StationSummary::from_events(station_id.clone(), events))
    }

    async fn find(&self, event_id: &EventId) -> Result<Option<StoredTransfer>, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables.events.get(event_id).cloned())
    }
}
