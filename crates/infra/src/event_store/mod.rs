//! Transfer event store boundary.
//!
//! This module defines the storage-facing abstraction the ingestion path is
//! written against, plus its two backends.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryTransferStore;
pub use postgres::PostgresTransferStore;
pub use r#trait::{StoreError, TransferStore};
