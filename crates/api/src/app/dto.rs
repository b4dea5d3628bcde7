use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stationflow_core::{BatchOutcome, NewTransferEvent, StationSummary, StoredTransfer, TransferEvent};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct BatchTransferRequest {
    pub events: Vec<NewTransferEvent>,
}

impl BatchTransferRequest {
    /// Validate every event up front; the first bad one rejects the batch.
    pub fn into_validated(self) -> Result<Vec<TransferEvent>, axum::response::Response> {
        self.events
            .into_iter()
            .enumerate()
            .map(|(idx, raw)| {
                raw.validate()
                    .map_err(|e| errors::validation_error(format!("events[{idx}]: {e}")))
            })
            .collect()
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct BatchTransferResponse {
    pub inserted: u64,
    pub duplicates: u64,
}

impl From<BatchOutcome> for BatchTransferResponse {
    fn from(outcome: BatchOutcome) -> Self {
        Self {
            inserted: outcome.inserted,
            duplicates: outcome.duplicates,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StationSummaryResponse {
    pub station_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_approved_amount: Decimal,
    pub events_count: u64,
}

impl From<StationSummary> for StationSummaryResponse {
    fn from(summary: StationSummary) -> Self {
        Self {
            station_id: summary.station_id.into_inner(),
            total_approved_amount: summary.total_approved,
            events_count: summary.events_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub event_id: String,
    pub station_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub ingested_at: DateTime<Utc>,
}

impl From<StoredTransfer> for TransferResponse {
    fn from(stored: StoredTransfer) -> Self {
        let event = stored.event;
        Self {
            event_id: event.event_id().to_string(),
            station_id: event.station_id().to_string(),
            amount: event.amount(),
            status: event.status().to_string(),
            created_at: event.created_at(),
            ingested_at: stored.ingested_at,
        }
    }
}
