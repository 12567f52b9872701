use crate::domain::{CacheStats, PopularSearch, ProductHit, Suggestion};
use async_trait::async_trait;
use shared::{Result, TtlSeconds};

// Ports are the pluggable seams between the search facade and its
// collaborators: the cache store, the live catalog, and the counters.

/// Port for the durable key/value store backing cached search responses.
///
/// Values are opaque JSON strings; the store never inspects them. An absent
/// or expired key reads as `Ok(None)`, never as an error.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    /// Insert or overwrite an entry with a fresh expiry.
    async fn set(&self, key: &str, value: String, ttl: TtlSeconds) -> Result<()>;
    /// Remove every entry whose key starts with `pattern`, or every entry
    /// when `None`. Returns how many were removed.
    async fn delete_by_pattern(&self, pattern: Option<&str>) -> Result<u64>;
    /// Drop entries past their expiry and return how many were dropped.
    /// Reads already enforce expiry; sweeping only bounds storage growth.
    async fn sweep_expired(&self) -> Result<u64>;
    async fn stats(&self) -> Result<CacheStats>;
}

/// Port for live catalog queries, the operations the cache amortizes.
#[async_trait]
pub trait CatalogSearch: Send + Sync + 'static {
    /// Ranked product results for a term, best match first.
    async fn search(&self, term: &str) -> Result<Vec<ProductHit>>;
    /// Distinct product names resembling the term, strongest first.
    async fn suggest(&self, term: &str) -> Result<Vec<Suggestion>>;
}

/// Port for the monotonic search-term counters.
#[async_trait]
pub trait PopularityStore: Send + Sync + 'static {
    /// Insert-or-increment the counter for a term atomically; concurrent
    /// calls must all be counted. Returns the new count.
    async fn record(&self, term: &str) -> Result<u64>;
    /// Current count for a term, zero if it has never been recorded.
    async fn count(&self, term: &str) -> Result<u64>;
    /// The most-searched terms, highest count first.
    async fn top(&self, limit: usize) -> Result<Vec<PopularSearch>>;
}
