//! Read-side and write-side accounting values.

use rust_decimal::Decimal;

use crate::id::StationId;
use crate::transfer::TransferEvent;

/// Per-station aggregate: every event is counted, only approved ones are summed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationSummary {
    pub station_id: StationId,
    pub total_approved: Decimal,
    pub events_count: u64,
}

impl StationSummary {
    /// Fold a station's events into a summary.
    ///
    /// Returns `None` when `events` is empty: an unknown station is not the
    /// same thing as a station whose approved total is zero.
    pub fn from_events<'a, I>(station_id: StationId, events: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a TransferEvent>,
    {
        let mut total_approved = Decimal::ZERO;
        let mut events_count = 0u64;

        for event in events {
            debug_assert_eq!(event.station_id(), &station_id);
            events_count += 1;
            if event.is_approved() {
                total_approved += event.amount();
            }
        }

        (events_count > 0).then_some(Self {
            station_id,
            total_approved,
            events_count,
        })
    }
}

/// Result of ingesting one batch.
///
/// `inserted + duplicates` always equals the batch length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub inserted: u64,
    pub duplicates: u64,
}

impl BatchOutcome {
    pub fn from_counts(batch_len: usize, inserted: u64) -> Self {
        let total = batch_len as u64;
        debug_assert!(inserted <= total);
        Self {
            inserted,
            duplicates: total.saturating_sub(inserted),
        }
    }

    pub fn total(&self) -> u64 {
        self.inserted + self.duplicates
    }
}
