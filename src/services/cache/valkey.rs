use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, RedisError, aio::ConnectionManager};

use super::store::{CacheError, CacheStore};

/// Valkey (Redis protocol) store over a shared connection manager.
#[derive(Clone)]
pub struct ValkeyStore {
    conn: ConnectionManager,
}

impl ValkeyStore {
    /// `url` like `redis://localhost:6379`. Fails fast when the server is unreachable.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(|e| CacheError::Connect(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connect(e.to_string()))?;

        Ok(Self { conn })
    }
}

/// `SET .. EX` takes whole seconds and rejects 0.
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

fn command_failed(op: &'static str) -> impl FnOnce(RedisError) -> CacheError {
    move |e| CacheError::Command {
        op,
        message: e.to_string(),
    }
}

#[async_trait]
impl CacheStore for ValkeyStore {
    fn backend(&self) -> &'static str {
        "valkey"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(command_failed("GET"))
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, expiry_seconds(ttl))
            .await
            .map_err(command_failed("SET"))
    }

    async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(key).await.map_err(command_failed("DEL"))?;
        Ok(removed > 0)
    }
}
