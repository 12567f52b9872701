use bazaar::catalog::SledCatalog;
use bazaar::ports::{CacheStore, PopularityStore};
use bazaar::search::SearchService;
use std::sync::Arc;

/// Server state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
    pub cache: Arc<dyn CacheStore>,
    pub catalog: SledCatalog,
    pub popularity: Arc<dyn PopularityStore>,
}

impl AppState {
    pub fn new(
        search: Arc<SearchService>,
        cache: Arc<dyn CacheStore>,
        catalog: SledCatalog,
        popularity: Arc<dyn PopularityStore>,
    ) -> Self {
        Self {
            search,
            cache,
            catalog,
            popularity,
        }
    }
}
