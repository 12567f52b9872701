use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A vendor storefront. Every product belongs to exactly one store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreProfile {
    pub id: Uuid,
    pub name: String,
}

impl StoreProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// A catalog product as persisted, keyed by its id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: Option<String>,
}

impl Product {
    pub fn new(
        store_id: Uuid,
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        image_url: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            store_id,
            name: name.into(),
            description: description.into(),
            price,
            image_url,
        }
    }
}

/// One ranked entry in a search result set. `rank` is the relevance score
/// in (0, 1], higher first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductHit {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub store_name: String,
    pub rank: f32,
}

/// One typeahead candidate: a product name and how often it has been
/// searched for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub suggestion: String,
    pub popularity: u64,
}

/// Durable per-term search counter. Counters are only ever created or
/// incremented, never decremented or deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PopularSearch {
    pub term: String,
    pub count: u64,
    pub last_searched_at: DateTime<Utc>,
}

/// Point-in-time view of the cache store for the admin surface.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheStats {
    pub backend: String,
    pub entries: u64,
}
