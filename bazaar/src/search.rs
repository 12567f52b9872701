use crate::domain::{ProductHit, Suggestion};
use crate::keys;
use crate::ports::{CacheStore, CatalogSearch, PopularityStore};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::{Error, Result, TtlSeconds};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Time-to-live and time-budget knobs for the read-through paths.
#[derive(Clone, Copy, Debug)]
pub struct SearchTunables {
    pub results_ttl: TtlSeconds,
    pub suggestions_ttl: TtlSeconds,
    /// Budget for one cache store call. Exceeding it counts as a miss on
    /// reads and is dropped on writes.
    pub cache_op_timeout: Duration,
    /// Budget for one live catalog query. Exceeding it fails the request.
    pub query_timeout: Duration,
}

impl Default for SearchTunables {
    fn default() -> Self {
        Self {
            results_ttl: TtlSeconds(900),
            suggestions_ttl: TtlSeconds(600),
            cache_op_timeout: Duration::from_millis(250),
            query_timeout: Duration::from_secs(5),
        }
    }
}

/// Read-through facade over the product catalog.
///
/// Every lookup follows the same shape: normalize the term, try the cache,
/// on a miss run the live query and cache what it returned. Callers get the
/// same answer either way and cannot tell a hit from a miss. Cache failures
/// never fail a request; catalog failures always do.
pub struct SearchService {
    cache: Arc<dyn CacheStore>,
    catalog: Arc<dyn CatalogSearch>,
    popularity: Arc<dyn PopularityStore>,
    tunables: SearchTunables,
}

impl SearchService {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        catalog: Arc<dyn CatalogSearch>,
        popularity: Arc<dyn PopularityStore>,
        tunables: SearchTunables,
    ) -> Self {
        Self {
            cache,
            catalog,
            popularity,
            tunables,
        }
    }

    /// Ranked product results for a term.
    pub async fn cached_results(&self, term: &str) -> Result<Vec<ProductHit>> {
        let normalized = keys::normalize_term(term);
        let key = keys::results_key(&normalized);

        if let Some(hits) = self.cache_lookup::<Vec<ProductHit>>(&key).await {
            debug!("cache hit for {}", key);
            return Ok(hits);
        }

        debug!("cache miss for {}", key);
        let hits = self.run_query(self.catalog.search(&normalized)).await?;
        self.cache_fill(&key, &hits, self.tunables.results_ttl).await;
        Ok(hits)
    }

    /// Typeahead suggestions for a term. A miss that the catalog resolves
    /// also bumps the term's popularity counter, best effort.
    pub async fn cached_suggestions(&self, term: &str) -> Result<Vec<Suggestion>> {
        let normalized = keys::normalize_term(term);
        let key = keys::suggestions_key(&normalized);

        if let Some(suggestions) = self.cache_lookup::<Vec<Suggestion>>(&key).await {
            debug!("cache hit for {}", key);
            return Ok(suggestions);
        }

        debug!("cache miss for {}", key);
        let suggestions = self.run_query(self.catalog.suggest(&normalized)).await?;
        self.cache_fill(&key, &suggestions, self.tunables.suggestions_ttl)
            .await;
        self.record_popularity(&normalized).await;
        Ok(suggestions)
    }

    /// Cache read with the fail-open policy: a store error, a store timeout
    /// and an undecodable entry all count as a miss.
    async fn cache_lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let stored = match timeout(self.tunables.cache_op_timeout, self.cache.get(key)).await {
            Ok(Ok(stored)) => stored,
            Ok(Err(e)) => {
                warn!("cache read for {} failed, serving live: {}", key, e);
                return None;
            }
            Err(_) => {
                warn!("cache read for {} timed out, serving live", key);
                return None;
            }
        };

        let raw = stored?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("discarding undecodable cache entry for {}: {}", key, e);
                None
            }
        }
    }

    /// Best-effort cache population. Failures are logged and the fresh
    /// result is returned to the caller regardless.
    async fn cache_fill<T: Serialize>(&self, key: &str, value: &T, ttl: TtlSeconds) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!("could not serialize cache entry for {}: {}", key, e);
                return;
            }
        };

        match timeout(
            self.tunables.cache_op_timeout,
            self.cache.set(key, json, ttl),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("cache write for {} failed: {}", key, e),
            Err(_) => warn!("cache write for {} timed out", key),
        }
    }

    /// Run a live query under its time budget.
    async fn run_query<T>(&self, query: impl Future<Output = Result<T>>) -> Result<T> {
        match timeout(self.tunables.query_timeout, query).await {
            Ok(result) => result,
            Err(_) => Err(Error::Catalog("live query timed out".to_string())),
        }
    }

    /// Bump the counter for a term that just went through the live
    /// suggestion path. Tracking is analytics, not correctness, so every
    /// failure mode ends in the log and nowhere else.
    async fn record_popularity(&self, normalized_term: &str) {
        match timeout(
            self.tunables.cache_op_timeout,
            self.popularity.record(normalized_term),
        )
        .await
        {
            Ok(Ok(count)) => debug!("'{}' searched {} times", normalized_term, count),
            Ok(Err(e)) => warn!("popularity update for '{}' failed: {}", normalized_term, e),
            Err(_) => warn!("popularity update for '{}' timed out", normalized_term),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CacheStats, PopularSearch};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    #[derive(Default)]
    struct FakeStore {
        entries: Mutex<HashMap<String, (String, i64)>>,
        fail_reads: bool,
        fail_writes: bool,
        read_delay: Option<Duration>,
        gets: AtomicUsize,
        sets: AtomicUsize,
    }

    impl FakeStore {
        fn contains_key(&self, key: &str) -> bool {
            self.entries.lock().unwrap().contains_key(key)
        }

        fn seed_raw(&self, key: &str, value: &str, ttl: TtlSeconds) {
            self.entries.lock().unwrap().insert(
                key.to_string(),
                (value.to_string(), Utc::now().timestamp() + ttl.0 as i64),
            );
        }
    }

    #[async_trait]
    impl CacheStore for FakeStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.read_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_reads {
                return Err(Error::Store("injected read failure".to_string()));
            }
            let entries = self.entries.lock().unwrap();
            Ok(entries
                .get(key)
                .filter(|(_, expires_at)| *expires_at > Utc::now().timestamp())
                .map(|(value, _)| value.clone()))
        }

        async fn set(&self, key: &str, value: String, ttl: TtlSeconds) -> Result<()> {
            self.sets.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes {
                return Err(Error::Store("injected write failure".to_string()));
            }
            self.entries.lock().unwrap().insert(
                key.to_string(),
                (value, Utc::now().timestamp() + ttl.0 as i64),
            );
            Ok(())
        }

        async fn delete_by_pattern(&self, _pattern: Option<&str>) -> Result<u64> {
            Ok(0)
        }

        async fn sweep_expired(&self) -> Result<u64> {
            Ok(0)
        }

        async fn stats(&self) -> Result<CacheStats> {
            Ok(CacheStats {
                backend: "fake".to_string(),
                entries: self.entries.lock().unwrap().len() as u64,
            })
        }
    }

    struct FakeCatalog {
        hits: Vec<ProductHit>,
        suggestions: Vec<Suggestion>,
        fail: bool,
        delay: Option<Duration>,
        searches: AtomicUsize,
        suggests: AtomicUsize,
    }

    impl FakeCatalog {
        fn new(hits: Vec<ProductHit>, suggestions: Vec<Suggestion>) -> Self {
            Self {
                hits,
                suggestions,
                fail: false,
                delay: None,
                searches: AtomicUsize::new(0),
                suggests: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CatalogSearch for FakeCatalog {
        async fn search(&self, _term: &str) -> Result<Vec<ProductHit>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(Error::Catalog("injected catalog failure".to_string()));
            }
            Ok(self.hits.clone())
        }

        async fn suggest(&self, _term: &str) -> Result<Vec<Suggestion>> {
            self.suggests.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(Error::Catalog("injected catalog failure".to_string()));
            }
            Ok(self.suggestions.clone())
        }
    }

    #[derive(Default)]
    struct FakePopularity {
        counts: Mutex<HashMap<String, u64>>,
        fail: bool,
        records: AtomicUsize,
    }

    #[async_trait]
    impl PopularityStore for FakePopularity {
        async fn record(&self, term: &str) -> Result<u64> {
            self.records.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Internal("injected tracker failure".to_string()));
            }
            let mut counts = self.counts.lock().unwrap();
            let count = counts.entry(term.to_string()).or_insert(0);
            *count += 1;
            Ok(*count)
        }

        async fn count(&self, term: &str) -> Result<u64> {
            Ok(self.counts.lock().unwrap().get(term).copied().unwrap_or(0))
        }

        async fn top(&self, _limit: usize) -> Result<Vec<PopularSearch>> {
            Ok(Vec::new())
        }
    }

    fn sample_hits() -> Vec<ProductHit> {
        vec![ProductHit {
            id: Uuid::new_v4(),
            name: "Wireless Bluetooth Headphones".to_string(),
            description: "Over-ear, noise cancelling".to_string(),
            price: 79.99,
            image_url: None,
            store_name: "Audio Alley".to_string(),
            rank: 0.8,
        }]
    }

    fn sample_suggestions() -> Vec<Suggestion> {
        vec![Suggestion {
            suggestion: "Wireless Bluetooth Headphones".to_string(),
            popularity: 3,
        }]
    }

    fn service(
        store: Arc<FakeStore>,
        catalog: Arc<FakeCatalog>,
        popularity: Arc<FakePopularity>,
        tunables: SearchTunables,
    ) -> SearchService {
        SearchService::new(store, catalog, popularity, tunables)
    }

    #[tokio::test]
    async fn repeated_search_runs_the_live_query_once() {
        let store = Arc::new(FakeStore::default());
        let catalog = Arc::new(FakeCatalog::new(sample_hits(), Vec::new()));
        let popularity = Arc::new(FakePopularity::default());
        let service = service(
            store.clone(),
            catalog.clone(),
            popularity,
            SearchTunables::default(),
        );

        let first = service.cached_results("headphones").await.unwrap();
        let second = service.cached_results("headphones").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(catalog.searches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn term_variants_share_one_cache_entry() {
        let store = Arc::new(FakeStore::default());
        let catalog = Arc::new(FakeCatalog::new(sample_hits(), Vec::new()));
        let popularity = Arc::new(FakePopularity::default());
        let service = service(
            store.clone(),
            catalog.clone(),
            popularity,
            SearchTunables::default(),
        );

        service.cached_results("Headphones").await.unwrap();
        service.cached_results("  HEADPHONES  ").await.unwrap();

        assert_eq!(catalog.searches.load(Ordering::SeqCst), 1);
        assert!(store.contains_key("search:results:headphones"));
    }

    #[tokio::test]
    async fn expired_entry_reruns_the_live_query() {
        let store = Arc::new(FakeStore::default());
        let catalog = Arc::new(FakeCatalog::new(sample_hits(), Vec::new()));
        let popularity = Arc::new(FakePopularity::default());
        let tunables = SearchTunables {
            results_ttl: TtlSeconds(0),
            ..SearchTunables::default()
        };
        let service = service(store, catalog.clone(), popularity, tunables);

        service.cached_results("headphones").await.unwrap();
        service.cached_results("headphones").await.unwrap();

        assert_eq!(catalog.searches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn store_read_failure_falls_back_to_the_live_query() {
        let store = Arc::new(FakeStore {
            fail_reads: true,
            ..FakeStore::default()
        });
        let catalog = Arc::new(FakeCatalog::new(sample_hits(), Vec::new()));
        let popularity = Arc::new(FakePopularity::default());
        let service = service(store, catalog.clone(), popularity, SearchTunables::default());

        let hits = service.cached_results("headphones").await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(catalog.searches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn store_write_failure_does_not_fail_the_request() {
        let store = Arc::new(FakeStore {
            fail_writes: true,
            ..FakeStore::default()
        });
        let catalog = Arc::new(FakeCatalog::new(sample_hits(), Vec::new()));
        let popularity = Arc::new(FakePopularity::default());
        let service = service(store.clone(), catalog, popularity, SearchTunables::default());

        let hits = service.cached_results("headphones").await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(store.sets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_store_read_counts_as_a_miss() {
        let store = Arc::new(FakeStore {
            read_delay: Some(Duration::from_millis(80)),
            ..FakeStore::default()
        });
        let catalog = Arc::new(FakeCatalog::new(sample_hits(), Vec::new()));
        let popularity = Arc::new(FakePopularity::default());
        let tunables = SearchTunables {
            cache_op_timeout: Duration::from_millis(10),
            ..SearchTunables::default()
        };
        let service = service(store, catalog.clone(), popularity, tunables);

        let hits = service.cached_results("headphones").await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(catalog.searches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn undecodable_entry_falls_back_to_the_live_query() {
        let store = Arc::new(FakeStore::default());
        store.seed_raw("search:results:headphones", "not json", TtlSeconds(900));
        let catalog = Arc::new(FakeCatalog::new(sample_hits(), Vec::new()));
        let popularity = Arc::new(FakePopularity::default());
        let service = service(store, catalog.clone(), popularity, SearchTunables::default());

        let hits = service.cached_results("headphones").await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(catalog.searches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn catalog_failure_surfaces_to_the_caller() {
        let store = Arc::new(FakeStore::default());
        let catalog = Arc::new(FakeCatalog {
            fail: true,
            ..FakeCatalog::new(Vec::new(), Vec::new())
        });
        let popularity = Arc::new(FakePopularity::default());
        let service = service(store, catalog, popularity, SearchTunables::default());

        let err = service.cached_results("headphones").await.unwrap_err();

        assert!(matches!(err, Error::Catalog(_)));
    }

    #[tokio::test]
    async fn slow_catalog_query_fails_the_request() {
        let store = Arc::new(FakeStore::default());
        let catalog = Arc::new(FakeCatalog {
            delay: Some(Duration::from_millis(80)),
            ..FakeCatalog::new(sample_hits(), Vec::new())
        });
        let popularity = Arc::new(FakePopularity::default());
        let tunables = SearchTunables {
            query_timeout: Duration::from_millis(10),
            ..SearchTunables::default()
        };
        let service = service(store, catalog, popularity, tunables);

        let err = service.cached_results("headphones").await.unwrap_err();

        assert!(matches!(err, Error::Catalog(_)));
    }

    #[tokio::test]
    async fn suggestion_miss_records_popularity_once() {
        let store = Arc::new(FakeStore::default());
        let catalog = Arc::new(FakeCatalog::new(Vec::new(), sample_suggestions()));
        let popularity = Arc::new(FakePopularity::default());
        let service = service(
            store.clone(),
            catalog.clone(),
            popularity.clone(),
            SearchTunables::default(),
        );

        service.cached_suggestions("Head ").await.unwrap();
        service.cached_suggestions("head").await.unwrap();

        assert_eq!(catalog.suggests.load(Ordering::SeqCst), 1);
        assert_eq!(popularity.records.load(Ordering::SeqCst), 1);
        assert_eq!(
            popularity.counts.lock().unwrap().get("head").copied(),
            Some(1)
        );
        assert!(store.contains_key("search:suggestions:head"));
    }

    #[tokio::test]
    async fn result_lookups_never_record_popularity() {
        let store = Arc::new(FakeStore::default());
        let catalog = Arc::new(FakeCatalog::new(sample_hits(), Vec::new()));
        let popularity = Arc::new(FakePopularity::default());
        let service = service(store, catalog, popularity.clone(), SearchTunables::default());

        service.cached_results("headphones").await.unwrap();

        assert_eq!(popularity.records.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tracker_failure_never_fails_suggestions() {
        let store = Arc::new(FakeStore::default());
        let catalog = Arc::new(FakeCatalog::new(Vec::new(), sample_suggestions()));
        let popularity = Arc::new(FakePopularity {
            fail: true,
            ..FakePopularity::default()
        });
        let service = service(store, catalog, popularity.clone(), SearchTunables::default());

        let suggestions = service.cached_suggestions("head").await.unwrap();

        assert_eq!(suggestions.len(), 1);
        assert_eq!(popularity.records.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_results_are_cached_like_any_other_answer() {
        let store = Arc::new(FakeStore::default());
        let catalog = Arc::new(FakeCatalog::new(Vec::new(), Vec::new()));
        let popularity = Arc::new(FakePopularity::default());
        let service = service(
            store.clone(),
            catalog.clone(),
            popularity,
            SearchTunables::default(),
        );

        let first = service.cached_results("zzzz").await.unwrap();
        let second = service.cached_results("zzzz").await.unwrap();

        assert!(first.is_empty() && second.is_empty());
        assert_eq!(catalog.searches.load(Ordering::SeqCst), 1);
        assert!(store.contains_key("search:results:zzzz"));
    }
}
