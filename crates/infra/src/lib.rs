//! Infrastructure layer: transfer storage, ingestion orchestration, database wiring.

pub mod db;
pub mod event_store;
pub mod ingestion;


pub use event_store::{InMemoryTransferStore, PostgresTransferStore, StoreError, TransferStore};
pub use ingestion::IngestionCoordinator;
