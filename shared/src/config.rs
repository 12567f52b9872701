use crate::TtlSeconds;
use tracing::warn;

/// Backend used for the search-result cache store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheBackend {
    /// Durable sled tree under the data directory (default).
    Sled,
    /// Bounded in-memory moka cache; entries do not survive restarts.
    Memory,
}

impl CacheBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "sled" => Some(CacheBackend::Sled),
            "memory" | "moka" => Some(CacheBackend::Memory),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CacheBackend::Sled => "sled",
            CacheBackend::Memory => "memory",
        }
    }
}

pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub data_dir: String,
    pub cache_backend: CacheBackend,
    /// Max entries for the in-memory backend; ignored by sled.
    pub cache_capacity: u64,
    pub results_ttl: TtlSeconds,
    pub suggestions_ttl: TtlSeconds,
    pub sweep_interval_secs: u64,
    pub cache_op_timeout_ms: u64,
    pub query_timeout_ms: u64,
    pub seed_catalog: bool,
    pub allowed_origins: Vec<String>,
}

impl Config {
    const DEFAULT_DATA_DIR: &str = "./data";
    const DEFAULT_RESULTS_TTL_SECS: u64 = 900;
    const DEFAULT_SUGGESTIONS_TTL_SECS: u64 = 600;
    const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
    const DEFAULT_CACHE_OP_TIMEOUT_MS: u64 = 250;
    const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5_000;
    const DEFAULT_CACHE_CAPACITY: u64 = 100_000;

    pub fn from_env() -> Self {
        let cache_backend = match std::env::var("BAZAAR_CACHE_BACKEND") {
            Ok(raw) => CacheBackend::parse(&raw).unwrap_or_else(|| {
                warn!(
                    "BAZAAR_CACHE_BACKEND '{}' not recognised, falling back to sled",
                    raw
                );
                CacheBackend::Sled
            }),
            Err(_) => CacheBackend::Sled,
        };

        Self {
            host: std::env::var("BAZAAR_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: parse_env("BAZAAR_HTTP_PORT", 8080u16),
            data_dir: std::env::var("BAZAAR_DATA_DIR")
                .unwrap_or_else(|_| Self::DEFAULT_DATA_DIR.to_string()),
            cache_backend,
            cache_capacity: parse_env("BAZAAR_CACHE_CAPACITY", Self::DEFAULT_CACHE_CAPACITY),
            results_ttl: TtlSeconds(parse_env(
                "BAZAAR_RESULTS_TTL_SECS",
                Self::DEFAULT_RESULTS_TTL_SECS,
            )),
            suggestions_ttl: TtlSeconds(parse_env(
                "BAZAAR_SUGGESTIONS_TTL_SECS",
                Self::DEFAULT_SUGGESTIONS_TTL_SECS,
            )),
            sweep_interval_secs: parse_env(
                "BAZAAR_SWEEP_INTERVAL_SECS",
                Self::DEFAULT_SWEEP_INTERVAL_SECS,
            ),
            cache_op_timeout_ms: parse_env(
                "BAZAAR_CACHE_OP_TIMEOUT_MS",
                Self::DEFAULT_CACHE_OP_TIMEOUT_MS,
            ),
            query_timeout_ms: parse_env("BAZAAR_QUERY_TIMEOUT_MS", Self::DEFAULT_QUERY_TIMEOUT_MS),
            seed_catalog: std::env::var("BAZAAR_SEED_CATALOG")
                .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
                .unwrap_or(true),
            allowed_origins: std::env::var("BAZAAR_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
        }
    }
}

fn parse_env<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().unwrap_or_else(|_| {
            warn!("{} '{}' is not a valid value, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
