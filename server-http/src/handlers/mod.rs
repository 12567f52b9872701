pub mod admin;
pub mod health;
pub mod search;

pub use admin::{cache_stats, create_product, create_store, flush_cache};
pub use health::health_check;
pub use search::{popular, search};
