use metrics_exporter_prometheus::PrometheusHandle;
use smartserve::config::AppConfig;
use smartserve::ordering::{
    Catalog, CatalogStore, JsonFileStore, MemoryStore, OrderingService, StoreError,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Where the catalog lives: a JSON snapshot file when DATABASE_PATH is set,
/// otherwise process memory.
pub(crate) enum CatalogBackend {
    Memory(MemoryStore),
    File(JsonFileStore),
}

impl CatalogBackend {
    pub(crate) fn from_config(config: &AppConfig) -> Self {
        match &config.database_path {
            Some(path) => {
                info!(path = %path.display(), "using JSON file catalog store");
                Self::File(JsonFileStore::new(path.clone()))
            }
            None => {
                info!("DATABASE_PATH unset; catalog is kept in memory only");
                Self::Memory(MemoryStore)
            }
        }
    }
}

impl CatalogStore for CatalogBackend {
    fn load(&self) -> Result<Catalog, StoreError> {
        match self {
            Self::Memory(store) => store.load(),
            Self::File(store) => store.load(),
        }
    }

    fn persist(&self, catalog: &Catalog) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.persist(catalog),
            Self::File(store) => store.persist(catalog),
        }
    }
}

pub(crate) fn open_ordering(
    config: &AppConfig,
) -> Result<Arc<OrderingService<CatalogBackend>>, StoreError> {
    let backend = Arc::new(CatalogBackend::from_config(config));
    Ok(Arc::new(OrderingService::open(backend)?))
}
