//! deadpool-backed Redis pool with the JSON key helpers the session store needs.

use std::sync::Arc;

use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};

use portal_common::RedisConfig;
use portal_core::DomainError;

/// Where to connect and how many connections to keep
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// e.g. `redis://localhost:6379/0`
    pub url: String,
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 16,
        }
    }
}

impl From<&RedisConfig> for RedisPoolConfig {
    fn from(config: &RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Redis pool setup failed: {0}")]
    Setup(String),

    #[error("No Redis connection available: {0}")]
    Checkout(#[from] deadpool_redis::PoolError),

    #[error("Redis command failed: {0}")]
    Command(#[from] redis::RedisError),

    #[error("Stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TTL must be positive, got {0}")]
    InvalidTtl(i64),
}

impl From<RedisPoolError> for DomainError {
    fn from(err: RedisPoolError) -> Self {
        DomainError::CacheError(err.to_string())
    }
}

pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Pool handle; clones share the same connections
#[derive(Clone)]
pub struct RedisPool {
    inner: Pool,
}

/// Pool shared through the service context
pub type SharedRedisPool = Arc<RedisPool>;

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.inner.status();
        f.debug_struct("RedisPool")
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

impl RedisPool {
    /// Build the pool; connections are opened lazily on first use
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let inner = Config::from_url(&config.url)
            .builder()
            .map_err(|e| RedisPoolError::Setup(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::Setup(e.to_string()))?;

        // Strip credentials before logging
        let host = config.url.rsplit('@').next().unwrap_or(&config.url);
        tracing::info!(%host, max_connections = config.max_connections, "Redis pool ready");

        Ok(Self { inner })
    }

    async fn connection(&self) -> RedisResult<Connection> {
        Ok(self.inner.get().await?)
    }

    /// `PING` through a pooled connection
    pub async fn health_check(&self) -> RedisResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    /// `SET key json EX ttl`
    pub async fn put_json<V: Serialize>(&self, key: &str, value: &V, ttl_seconds: i64) -> RedisResult<()> {
        let ttl = match u64::try_from(ttl_seconds) {
            Ok(ttl) if ttl > 0 => ttl,
            _ => return Err(RedisPoolError::InvalidTtl(ttl_seconds)),
        };
        let json = serde_json::to_string(value)?;

        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, json, ttl).await?;
        Ok(())
    }

    /// `GET key`, decoded from JSON; `None` once expired
    pub async fn get_json<V: DeserializeOwned>(&self, key: &str) -> RedisResult<Option<V>> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(key).await?;
        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(RedisPoolError::from)
    }

    /// `DEL key`; true when something was removed
    pub async fn remove(&self, key: &str) -> RedisResult<bool> {
        let mut conn = self.connection().await?;
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_points_at_localhost() {
        let config = RedisPoolConfig::default();
        assert_eq!(config.url, "redis://127.0.0.1:6379");
        assert_eq!(config.max_connections, 16);
    }

    #[test]
    fn test_config_from_app_config() {
        let redis_config = RedisConfig {
            url: "redis://cache:6380/1".to_string(),
            max_connections: 4,
        };
        let pool_config = RedisPoolConfig::from(&redis_config);
        assert_eq!(pool_config.url, "redis://cache:6380/1");
        assert_eq!(pool_config.max_connections, 4);
    }

    #[test]
    fn test_pool_errors_surface_as_cache_errors() {
        let err: DomainError = RedisPoolError::InvalidTtl(0).into();
        assert_eq!(err.code(), "CACHE_ERROR");
    }

    #[tokio::test]
    async fn test_pool_builds_without_connecting() {
        let pool = RedisPool::new(RedisPoolConfig::default()).unwrap();
        assert!(format!("{pool:?}").contains("RedisPool"));
    }
}
