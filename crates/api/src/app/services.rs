use std::sync::Arc;

use tracing::{info, warn};

use stationflow_infra::{
    IngestionCoordinator, InMemoryTransferStore, PostgresTransferStore, StoreError, TransferStore,
    db,
};

use crate::config::AppConfig;

/// Which backend the process is running against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::InMemory => "in_memory",
            StoreBackend::Postgres => "postgres",
        }
    }
}

/// Type-erased coordinator shared by all handlers.
pub type Coordinator = IngestionCoordinator<Arc<dyn TransferStore>>;

/// Service wiring shared by all handlers (one instance per process).
pub struct AppServices {
    coordinator: Coordinator,
    backend: StoreBackend,
    pool: Option<sqlx::PgPool>,
}

impl AppServices {
    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        let store: Arc<dyn TransferStore> = Arc::new(InMemoryTransferStore::new());
        Self {
            coordinator: IngestionCoordinator::new(store),
            backend: StoreBackend::InMemory,
            pool: None,
        }
    }

    /// Postgres wiring: connect, migrate, wrap the pool in a store.
    pub async fn postgres(settings: &db::PoolSettings) -> Result<Self, StoreError> {
        let pool = db::connect(settings).await?;
        db::migrate(&pool).await?;

        let store: Arc<dyn TransferStore> = Arc::new(PostgresTransferStore::new(pool.clone()));
        Ok(Self {
            coordinator: IngestionCoordinator::new(store),
            backend: StoreBackend::Postgres,
            pool: Some(pool),
        })
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn backend(&self) -> StoreBackend {
        self.backend
    }

    /// Release pooled connections (no-op for the in-memory store).
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
            info!("postgres pool closed");
        }
    }
}

/// Build services from configuration.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    let services = match &config.database {
        Some(settings) => AppServices::postgres(settings).await?,
        None => {
            warn!("DATABASE_URL not set; using in-memory transfer store (data is lost on exit)");
            AppServices::in_memory()
        }
    };

    info!(backend = services.backend().as_str(), "transfer store ready");
    Ok(services)
}
