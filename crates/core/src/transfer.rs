//! Transfer events: raw input, the validated value, and the stored record.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

use crate::error::{DomainError, DomainResult};
use crate::id::{EventId, StationId};

/// The only status that contributes to a station's approved total.
pub const APPROVED_STATUS: &str = "approved";

/// Fractional digits kept for amounts (matches the `NUMERIC(18,4)` column).
pub const AMOUNT_SCALE: u32 = 4;

/// Exclusive upper bound for amounts (14 integer digits).
pub const AMOUNT_LIMIT: Decimal = Decimal::from_parts(0x107A_4000, 0x5AF3, 0, false, 0);

/// A transfer event as submitted by a client, before validation.
///
/// Deserialized straight from the request body. Nothing here is trusted; call
/// [`NewTransferEvent::validate`] to obtain a [`TransferEvent`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewTransferEvent {
    pub event_id: String,
    pub station_id: String,
    pub amount: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl NewTransferEvent {
    pub fn validate(self) -> DomainResult<TransferEvent> {
        let event_id = EventId::new(self.event_id)?;
        let station_id = StationId::new(self.station_id)?;
        TransferEvent::new(event_id, station_id, self.amount, self.status, self.created_at)
    }
}

/// A validated, immutable transfer event.
///
/// Every instance satisfies: non-empty identifiers and status, and
/// `0 <= amount < AMOUNT_LIMIT` with at most `AMOUNT_SCALE` fractional digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    event_id: EventId,
    station_id: StationId,
    amount: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl TransferEvent {
    pub fn new(
        event_id: EventId,
        station_id: StationId,
        amount: Decimal,
        status: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::validation("amount must be >= 0"));
        }

        // Postgres rounds half away from zero when narrowing NUMERIC; do the
        // same here so every backend stores the same value. The limit applies
        // to the stored value, so it is checked after rounding.
        let amount = amount
            .round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
            .abs();
        if amount >= AMOUNT_LIMIT {
            return Err(DomainError::validation(format!(
                "amount must be less than {AMOUNT_LIMIT}"
            )));
        }

        let status = status.into();
        if status.trim().is_empty() {
            return Err(DomainError::validation("status must not be empty"));
        }

        Ok(Self {
            event_id,
            station_id,
            amount,
            status,
            created_at,
        })
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn station_id(&self) -> &StationId {
        &self.station_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Exact, case-sensitive match on [`APPROVED_STATUS`].
    pub fn is_approved(&self) -> bool {
        self.status == APPROVED_STATUS
    }
}

/// A transfer event as held by the store.
///
/// `ingested_at` is assigned once, on the insert that created the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTransfer {
    pub event: TransferEvent,
    pub ingested_at: DateTime<Utc>,
}
