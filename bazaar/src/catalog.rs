use crate::domain::{Product, ProductHit, StoreProfile, Suggestion};
use crate::ports::{CatalogSearch, PopularityStore};
use async_trait::async_trait;
use bazaar_query::trigram;
use bazaar_query::{SuggestionCandidate, rank_suggestions, score_product, tokenize};
use shared::{Error, Result};
use sled::Db;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// Most products a single search returns.
pub const RESULT_LIMIT: usize = 20;
/// Most names a single suggestion lookup returns.
pub const SUGGESTION_LIMIT: usize = 10;

const PRODUCTS_TREE: &str = "products";
const STORES_TREE: &str = "stores";

/// Sled-backed product catalog: one tree of products, one of vendor stores.
///
/// Queries scan the products tree and rank in memory with the scoring
/// functions from `bazaar_query`. Suggestion popularity comes from the
/// injected counter store, keyed by the lowercased product name.
#[derive(Clone)]
pub struct SledCatalog {
    db: Db,
    popularity: Arc<dyn PopularityStore>,
}

impl SledCatalog {
    pub fn new(db: Db, popularity: Arc<dyn PopularityStore>) -> Self {
        Self { db, popularity }
    }

    fn products_tree(&self) -> Result<sled::Tree> {
        self.db
            .open_tree(PRODUCTS_TREE)
            .map_err(|e| Error::Internal(format!("Failed to open products tree: {}", e)))
    }

    fn stores_tree(&self) -> Result<sled::Tree> {
        self.db
            .open_tree(STORES_TREE)
            .map_err(|e| Error::Internal(format!("Failed to open stores tree: {}", e)))
    }

    pub fn upsert_store(&self, store: &StoreProfile) -> Result<()> {
        let tree = self.stores_tree()?;
        let bytes = serde_json::to_vec(store)
            .map_err(|e| Error::Internal(format!("Failed to serialize store: {}", e)))?;
        tree.insert(store.id.as_bytes(), bytes)
            .map_err(|e| Error::Internal(format!("Failed to write store: {}", e)))?;
        Ok(())
    }

    pub fn upsert_product(&self, product: &Product) -> Result<()> {
        let tree = self.products_tree()?;
        let bytes = serde_json::to_vec(product)
            .map_err(|e| Error::Internal(format!("Failed to serialize product: {}", e)))?;
        tree.insert(product.id.as_bytes(), bytes)
            .map_err(|e| Error::Internal(format!("Failed to write product: {}", e)))?;
        Ok(())
    }

    pub fn store_name(&self, id: &Uuid) -> Result<Option<String>> {
        let tree = self.stores_tree()?;
        let found = tree
            .get(id.as_bytes())
            .map_err(|e| Error::Internal(format!("Failed to read store: {}", e)))?;

        match found {
            Some(bytes) => {
                let store: StoreProfile = serde_json::from_slice(&bytes)
                    .map_err(|e| Error::Internal(format!("Failed to deserialize store: {}", e)))?;
                Ok(Some(store.name))
            }
            None => Ok(None),
        }
    }

    pub fn product_count(&self) -> Result<u64> {
        Ok(self.products_tree()?.len() as u64)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.products_tree()?.is_empty())
    }

    fn scan_products(&self) -> Result<Vec<Product>> {
        let tree = self.products_tree()?;
        let mut products = Vec::new();
        for item in tree.iter() {
            let (_, bytes) =
                item.map_err(|e| Error::Catalog(format!("Failed to scan products: {}", e)))?;
            let product: Product = serde_json::from_slice(&bytes)
                .map_err(|e| Error::Catalog(format!("Failed to deserialize product: {}", e)))?;
            products.push(product);
        }
        Ok(products)
    }
}

#[async_trait]
impl CatalogSearch for SledCatalog {
    async fn search(&self, term: &str) -> Result<Vec<ProductHit>> {
        let tokens = tokenize(term);
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut store_names: HashMap<Uuid, Option<String>> = HashMap::new();
        let mut hits = Vec::new();
        for product in self.scan_products()? {
            let rank = match score_product(&tokens, &product.name, &product.description) {
                Some(rank) => rank,
                None => continue,
            };

            let store_name = match store_names.get(&product.store_id) {
                Some(cached) => cached.clone(),
                None => {
                    let name = self.store_name(&product.store_id)?;
                    store_names.insert(product.store_id, name.clone());
                    name
                }
            };
            // A product whose owning store row is missing is not presentable.
            let store_name = match store_name {
                Some(name) => name,
                None => continue,
            };

            hits.push(ProductHit {
                id: product.id,
                name: product.name,
                description: product.description,
                price: product.price,
                image_url: product.image_url,
                store_name,
                rank,
            });
        }

        hits.sort_by(|a, b| {
            b.rank
                .partial_cmp(&a.rank)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        hits.truncate(RESULT_LIMIT);
        Ok(hits)
    }

    async fn suggest(&self, term: &str) -> Result<Vec<Suggestion>> {
        let normalized = term.trim().to_lowercase();
        if normalized.is_empty() {
            return Ok(Vec::new());
        }

        // Distinct lowercased names; candidates combine plain substring
        // matches with fuzzy trigram matches.
        let mut seen = HashSet::new();
        let mut matched = Vec::new();
        for product in self.scan_products()? {
            let name = product.name.to_lowercase();
            if !seen.insert(name.clone()) {
                continue;
            }
            let similarity = trigram::similarity(&normalized, &name);
            if similarity >= trigram::SIMILARITY_THRESHOLD || name.contains(&normalized) {
                matched.push((name, similarity));
            }
        }

        let mut candidates = Vec::with_capacity(matched.len());
        for (name, similarity) in matched {
            let popularity = self.popularity.count(&name).await?;
            candidates.push(SuggestionCandidate {
                name,
                similarity,
                popularity,
            });
        }

        Ok(rank_suggestions(candidates, SUGGESTION_LIMIT)
            .into_iter()
            .map(|candidate| Suggestion {
                suggestion: candidate.name,
                popularity: candidate.popularity,
            })
            .collect())
    }
}

/// Populate an empty catalog with a small demo marketplace so a fresh
/// checkout has something to search against.
pub fn seed_demo_catalog(catalog: &SledCatalog) -> Result<u64> {
    let audio = StoreProfile::new("Audio Alley");
    let workshop = StoreProfile::new("Workshop Supply Co");
    let gadgets = StoreProfile::new("Gadget Grove");

    catalog.upsert_store(&audio)?;
    catalog.upsert_store(&workshop)?;
    catalog.upsert_store(&gadgets)?;

    let rows: Vec<(Uuid, &str, &str, f64, Option<&str>)> = vec![
        (
            audio.id,
            "Wireless Bluetooth Headphones",
            "Over-ear headphones with active noise cancelling and a 30 hour battery",
            79.99,
            Some("https://img.example.com/headphones.jpg"),
        ),
        (
            audio.id,
            "Bluetooth Speaker",
            "Portable waterproof speaker with deep bass",
            45.50,
            None,
        ),
        (
            audio.id,
            "Studio Microphone",
            "Cardioid condenser microphone for podcasting and streaming",
            129.00,
            None,
        ),
        (
            audio.id,
            "Headphone Stand",
            "Walnut desk stand that fits most over-ear headphones",
            24.99,
            None,
        ),
        (
            workshop.id,
            "Cordless Drill",
            "18V drill driver with two batteries and a charger",
            99.00,
            None,
        ),
        (
            workshop.id,
            "Screwdriver Set",
            "24-piece magnetic screwdriver set in a canvas roll",
            19.99,
            None,
        ),
        (
            workshop.id,
            "Work Gloves",
            "Cut-resistant work gloves, one pair",
            12.50,
            None,
        ),
        (
            gadgets.id,
            "USB-C Hub",
            "7-in-1 hub with HDMI, card reader and passthrough charging",
            39.99,
            Some("https://img.example.com/usb-c-hub.jpg"),
        ),
        (
            gadgets.id,
            "Mechanical Keyboard",
            "Tenkeyless keyboard with hot-swappable switches",
            89.00,
            None,
        ),
        (
            gadgets.id,
            "Wireless Mouse",
            "Ergonomic wireless mouse with adjustable DPI",
            29.99,
            None,
        ),
        (
            gadgets.id,
            "Laptop Sleeve",
            "Padded 14 inch sleeve with an accessory pocket",
            18.00,
            None,
        ),
        (
            gadgets.id,
            "Webcam",
            "1080p webcam with a privacy shutter and dual microphones",
            54.99,
            None,
        ),
    ];

    let seeded = rows.len() as u64;
    for (store_id, name, description, price, image_url) in rows {
        let product = Product::new(
            store_id,
            name,
            description,
            price,
            image_url.map(str::to_string),
        );
        catalog.upsert_product(&product)?;
    }

    Ok(seeded)
}
