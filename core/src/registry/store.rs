//! Key-value backend seam for the registry

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a [`KeyValueStore`] backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Backend offering atomic single-key set-with-expiry and get.
///
/// Multi-key transactions are not assumed. Implementations must be safe
/// to share between concurrent callers.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Overwrite `key` with `value`, expiring after `ttl`
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Read `key`; `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
}
