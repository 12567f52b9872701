use async_trait::async_trait;
use bazaar::domain::CacheStats;
use bazaar::ports::CacheStore;
use chrono::Utc;
use moka::future::Cache;
use shared::{Result, TtlSeconds};

/// Cached value plus its absolute expiry. Moka only evicts on a cache-wide
/// time-to-live, so per-entry expiry is carried in the value and checked on
/// every read.
#[derive(Clone)]
struct StoredEntry {
    value: String,
    expires_at: i64,
}

/// In-memory cache store on a bounded moka cache.
///
/// Same contract as the sled backend, without durability: useful for tests
/// and for deployments that can afford to start cold.
pub struct MokaCacheStore {
    cache: Cache<String, StoredEntry>,
}

impl MokaCacheStore {
    pub fn new(max_entries: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_entries).build(),
        }
    }
}

#[async_trait]
impl CacheStore for MokaCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.cache.get(key).await {
            Some(entry) if entry.expires_at > Utc::now().timestamp() => Ok(Some(entry.value)),
            Some(_) => {
                self.cache.invalidate(key).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: TtlSeconds) -> Result<()> {
        let entry = StoredEntry {
            value,
            expires_at: Utc::now().timestamp().saturating_add(ttl.0 as i64),
        };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete_by_pattern(&self, pattern: Option<&str>) -> Result<u64> {
        match pattern {
            Some(prefix) => {
                let doomed: Vec<String> = self
                    .cache
                    .iter()
                    .filter(|(key, _)| key.starts_with(prefix))
                    .map(|(key, _)| key.as_ref().clone())
                    .collect();
                let removed = doomed.len() as u64;
                for key in doomed {
                    self.cache.invalidate(&key).await;
                }
                Ok(removed)
            }
            None => {
                self.cache.run_pending_tasks().await;
                let removed = self.cache.entry_count();
                self.cache.invalidate_all();
                Ok(removed)
            }
        }
    }

    async fn sweep_expired(&self) -> Result<u64> {
        let now = Utc::now().timestamp();
        let doomed: Vec<String> = self
            .cache
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(key, _)| key.as_ref().clone())
            .collect();
        let removed = doomed.len() as u64;
        for key in doomed {
            self.cache.invalidate(&key).await;
        }
        Ok(removed)
    }

    async fn stats(&self) -> Result<CacheStats> {
        self.cache.run_pending_tasks().await;
        Ok(CacheStats {
            backend: "memory".to_string(),
            entries: self.cache.entry_count(),
        })
    }
}
