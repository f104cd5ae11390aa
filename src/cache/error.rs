// src/cache/error.rs

use thiserror::Error;

/// Failures raised by a cache backend. These never leave the cache-aside
/// layer: they are logged and treated as a miss.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Unavailable(err.to_string())
    }
}
