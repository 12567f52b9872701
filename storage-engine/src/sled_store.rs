use async_trait::async_trait;
use bazaar::domain::CacheStats;
use bazaar::ports::CacheStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::{Error, Result, TtlSeconds};
use sled::Db;

const CACHE_TREE: &str = "search_cache";

/// One cached value with its absolute expiry, stored as JSON.
#[derive(Serialize, Deserialize)]
struct CacheEntry {
    value: String,
    expires_at: i64,
}

impl CacheEntry {
    fn new(value: String, ttl: TtlSeconds) -> Self {
        Self {
            value,
            expires_at: Utc::now().timestamp().saturating_add(ttl.0 as i64),
        }
    }

    fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// Durable cache store on a sled tree.
///
/// Expiry is enforced lazily: a read that finds a stale entry removes it and
/// reports a miss, so correctness never depends on the background sweep.
#[derive(Clone)]
pub struct SledCacheStore {
    db: Db,
}

impl SledCacheStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    fn cache_tree(&self) -> Result<sled::Tree> {
        self.db
            .open_tree(CACHE_TREE)
            .map_err(|e| Error::Store(format!("Failed to open cache tree: {}", e)))
    }
}

#[async_trait]
impl CacheStore for SledCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let tree = self.cache_tree()?;
        let found = tree
            .get(key.as_bytes())
            .map_err(|e| Error::Store(format!("Failed to read cache entry: {}", e)))?;

        match found {
            None => Ok(None),
            Some(bytes) => {
                let entry: CacheEntry = serde_json::from_slice(&bytes)
                    .map_err(|e| Error::Store(format!("Failed to decode cache entry: {}", e)))?;
                if entry.is_expired(Utc::now().timestamp()) {
                    tree.remove(key.as_bytes())
                        .map_err(|e| Error::Store(format!("Failed to drop stale entry: {}", e)))?;
                    return Ok(None);
                }
                Ok(Some(entry.value))
            }
        }
    }

    async fn set(&self, key: &str, value: String, ttl: TtlSeconds) -> Result<()> {
        let tree = self.cache_tree()?;
        let bytes = serde_json::to_vec(&CacheEntry::new(value, ttl))
            .map_err(|e| Error::Store(format!("Failed to encode cache entry: {}", e)))?;
        tree.insert(key.as_bytes(), bytes)
            .map_err(|e| Error::Store(format!("Failed to write cache entry: {}", e)))?;
        Ok(())
    }

    async fn delete_by_pattern(&self, pattern: Option<&str>) -> Result<u64> {
        let tree = self.cache_tree()?;
        match pattern {
            Some(prefix) => {
                let mut removed = 0u64;
                for item in tree.scan_prefix(prefix.as_bytes()) {
                    let (key, _) = item
                        .map_err(|e| Error::Store(format!("Failed to scan cache tree: {}", e)))?;
                    let dropped = tree
                        .remove(&key)
                        .map_err(|e| Error::Store(format!("Failed to remove entry: {}", e)))?;
                    if dropped.is_some() {
                        removed += 1;
                    }
                }
                Ok(removed)
            }
            None => {
                let removed = tree.len() as u64;
                tree.clear()
                    .map_err(|e| Error::Store(format!("Failed to clear cache tree: {}", e)))?;
                Ok(removed)
            }
        }
    }

    async fn sweep_expired(&self) -> Result<u64> {
        let tree = self.cache_tree()?;
        let now = Utc::now().timestamp();
        let mut removed = 0u64;
        for item in tree.iter() {
            let (key, bytes) =
                item.map_err(|e| Error::Store(format!("Failed to scan cache tree: {}", e)))?;
            let expired = match serde_json::from_slice::<CacheEntry>(&bytes) {
                Ok(entry) => entry.is_expired(now),
                // A row that no longer decodes is garbage as well.
                Err(_) => true,
            };
            if expired {
                let dropped = tree
                    .remove(&key)
                    .map_err(|e| Error::Store(format!("Failed to remove entry: {}", e)))?;
                if dropped.is_some() {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    async fn stats(&self) -> Result<CacheStats> {
        Ok(CacheStats {
            backend: "sled".to_string(),
            entries: self.cache_tree()?.len() as u64,
        })
    }
}
