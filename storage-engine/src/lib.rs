#![deny(clippy::all)]

//! Cache store backends.
//!
//! `sled` is the durable default; `moka` keeps the same contract in process
//! memory for tests and deployments that can afford to start cold.

pub mod moka_store;
pub mod sled_store;
pub mod sweeper;

pub use moka_store::MokaCacheStore;
pub use sled_store::SledCacheStore;
pub use sweeper::spawn_sweeper;

use bazaar::ports::CacheStore;
use shared::config::{CacheBackend, Config};
use std::sync::Arc;

/// Build the cache store selected by configuration. The sled backend shares
/// the database handle the rest of the process already holds open.
pub fn store_from_config(config: &Config, db: &sled::Db) -> Arc<dyn CacheStore> {
    match config.cache_backend {
        CacheBackend::Sled => Arc::new(SledCacheStore::new(db.clone())),
        CacheBackend::Memory => Arc::new(MokaCacheStore::new(config.cache_capacity)),
    }
}
