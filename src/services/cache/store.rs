use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Kept apart from `AppError`: once serving, a cache failure only falls back to the store.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unreachable: {0}")]
    Connect(String),
    #[error("cache {op} failed: {message}")]
    Command { op: &'static str, message: String },
}

/// String key/value store with per-entry expiry.
#[async_trait]
pub trait CacheStore: Clone + Send + Sync + 'static {
    /// Backend label for logs.
    fn backend(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Overwrites any previous value.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// `true` when a key was actually removed.
    async fn remove(&self, key: &str) -> Result<bool, CacheError>;
}
