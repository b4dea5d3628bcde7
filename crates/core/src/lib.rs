//! `stationflow-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** types (no infrastructure concerns):
//! identifiers, the validated transfer event, and the accounting values
//! produced by ingestion and aggregation.

pub mod error;
pub mod id;
pub mod summary;
pub mod transfer;

pub use error::{DomainError, DomainResult};
pub use id::{EventId, StationId};
pub use summary::{BatchOutcome, StationSummary};
pub use transfer::{
    NewTransferEvent, StoredTransfer, TransferEvent, AMOUNT_LIMIT, AMOUNT_SCALE, APPROVED_STATUS,
};
