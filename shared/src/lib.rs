// shared/src/lib.rs

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("cache store: {0}")]
    Store(String),
    #[error("catalog query: {0}")]
    Catalog(String),
    #[error("internal: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Time-to-live for a cache entry, in whole seconds.
#[derive(Clone, Copy, Debug)]
pub struct TtlSeconds(pub u64);

pub mod config;
