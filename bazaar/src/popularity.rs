use crate::domain::PopularSearch;
use crate::ports::PopularityStore;
use async_trait::async_trait;
use chrono::Utc;
use shared::{Error, Result};
use sled::Db;

const COUNTERS_TREE: &str = "search_popularity";

/// Sled-backed monotonic counters, one row per normalized term.
///
/// Increments go through `update_and_fetch`, sled's compare-and-swap loop,
/// so concurrent bumps of the same term are never lost.
#[derive(Clone)]
pub struct SledPopularity {
    db: Db,
}

impl SledPopularity {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    fn counters_tree(&self) -> Result<sled::Tree> {
        self.db
            .open_tree(COUNTERS_TREE)
            .map_err(|e| Error::Internal(format!("Failed to open counters tree: {}", e)))
    }
}

#[async_trait]
impl PopularityStore for SledPopularity {
    async fn record(&self, term: &str) -> Result<u64> {
        let tree = self.counters_tree()?;
        let now = Utc::now();
        let owned = term.to_string();

        let updated = tree
            .update_and_fetch(term.as_bytes(), move |existing| {
                let row = match existing
                    .and_then(|bytes| serde_json::from_slice::<PopularSearch>(bytes).ok())
                {
                    Some(mut row) => {
                        row.count += 1;
                        row.last_searched_at = now;
                        row
                    }
                    None => PopularSearch {
                        term: owned.clone(),
                        count: 1,
                        last_searched_at: now,
                    },
                };
                match serde_json::to_vec(&row) {
                    Ok(bytes) => Some(bytes),
                    // Keep whatever was there rather than dropping a counter.
                    Err(_) => existing.map(|bytes| bytes.to_vec()),
                }
            })
            .map_err(|e| Error::Internal(format!("Failed to update counter: {}", e)))?;

        Ok(updated
            .as_deref()
            .and_then(|bytes| serde_json::from_slice::<PopularSearch>(bytes).ok())
            .map(|row| row.count)
            .unwrap_or(0))
    }

    async fn count(&self, term: &str) -> Result<u64> {
        let tree = self.counters_tree()?;
        let found = tree
            .get(term.as_bytes())
            .map_err(|e| Error::Internal(format!("Failed to read counter: {}", e)))?;

        Ok(found
            .as_deref()
            .and_then(|bytes| serde_json::from_slice::<PopularSearch>(bytes).ok())
            .map(|row| row.count)
            .unwrap_or(0))
    }

    async fn top(&self, limit: usize) -> Result<Vec<PopularSearch>> {
        let tree = self.counters_tree()?;
        let mut rows = Vec::new();
        for item in tree.iter() {
            let (_, bytes) =
                item.map_err(|e| Error::Internal(format!("Failed to scan counters: {}", e)))?;
            if let Ok(row) = serde_json::from_slice::<PopularSearch>(&bytes) {
                rows.push(row);
            }
        }

        rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
        rows.truncate(limit);
        Ok(rows)
    }
}
