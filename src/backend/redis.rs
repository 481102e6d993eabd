//! Redis cache backend implementation.

use super::CacheBackend;
use crate::config::CacheConfig;
use crate::error::{Error, Result};
use deadpool_redis::{redis::AsyncCommands, Config as PoolConfig, Connection, Pool, Runtime};
use std::time::Duration;

/// Pool statistics information.
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub connections: u32,
    pub idle_connections: u32,
}

/// Redis backend with connection pooling.
///
/// # Example
///
/// ```no_run
/// # use product_catalog::backend::{CacheBackend, RedisBackend};
/// # use product_catalog::config::CacheConfig;
/// # use product_catalog::error::Result;
/// # async fn example() -> Result<()> {
/// let backend = RedisBackend::new(&CacheConfig::default()).await?;
/// assert!(backend.health_check().await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RedisBackend {
    pool: Pool,
}

impl RedisBackend {
    /// Create new Redis backend from configuration.
    ///
    /// The pool connects lazily; a bad host surfaces on first use.
    ///
    /// # Errors
    /// Returns `Err` if pool creation fails.
    pub async fn new(config: &CacheConfig) -> Result<Self> {
        let mut cfg = PoolConfig::from_url(config.connection_string());
        let mut pool_cfg = deadpool_redis::PoolConfig::new(config.pool_size as usize);
        pool_cfg.timeouts.wait = Some(config.connection_timeout);
        pool_cfg.timeouts.create = Some(config.connection_timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| Error::BackendError(format!("Failed to create Redis pool: {}", e)))?;

        info!(
            "✓ Redis backend initialized: {}:{} (db: {}, pool size: {})",
            config.host, config.port, config.database, config.pool_size
        );

        Ok(RedisBackend { pool })
    }

    /// Get current pool statistics.
    pub fn pool_stats(&self) -> PoolStats {
        let status = self.pool.status();
        PoolStats {
            connections: status.size as u32,
            idle_connections: status.available as u32,
        }
    }

    async fn connection(&self) -> Result<Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| Error::BackendError(format!("Failed to get Redis connection: {}", e)))
    }
}

impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;

        let value: Option<Vec<u8>> = conn
            .get(key)
            .await
            .map_err(|e| Error::BackendError(format!("Redis GET failed for key {}: {}", key, e)))?;

        if value.is_some() {
            debug!("✓ Redis GET {} -> HIT", key);
        } else {
            debug!("✓ Redis GET {} -> MISS", key);
        }

        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.connection().await?;

        match ttl {
            Some(duration) => {
                // SET EX rejects 0
                let seconds = duration.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, seconds)
                    .await
                    .map_err(|e| {
                        Error::BackendError(format!("Redis SET_EX failed for key {}: {}", key, e))
                    })?;
                debug!("✓ Redis SET {} (TTL: {}s)", key, seconds);
            }
            None => {
                conn.set::<_, _, ()>(key, value).await.map_err(|e| {
                    Error::BackendError(format!("Redis SET failed for key {}: {}", key, e))
                })?;
                debug!("✓ Redis SET {}", key);
            }
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;

        conn.del::<_, ()>(key)
            .await
            .map_err(|e| Error::BackendError(format!("Redis DEL failed for key {}: {}", key, e)))?;

        debug!("✓ Redis DELETE {}", key);
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        let mut conn = self.connection().await?;

        let pong: String = deadpool_redis::redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| Error::BackendError(format!("Redis PING failed: {}", e)))?;

        Ok(pong.contains("PONG"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Require a running Redis server: cargo test --features redis -- --ignored

    #[tokio::test]
    async fn test_pool_creation_is_lazy() {
        let config = CacheConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..CacheConfig::default()
        };
        let backend = RedisBackend::new(&config).await.expect("pool creation failed");
        assert_eq!(backend.pool_stats().connections, 0);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_backend_error() {
        let config = CacheConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            connection_timeout: Duration::from_millis(200),
            ..CacheConfig::default()
        };
        let backend = RedisBackend::new(&config).await.expect("pool creation failed");
        let err = backend.get("any").await.unwrap_err();
        assert!(matches!(err, Error::BackendError(_)));
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_backend_set_get_delete() {
        let backend = RedisBackend::new(&CacheConfig::default())
            .await
            .expect("Failed to create backend");

        backend
            .set("catalog_test_key", b"listing".to_vec(), Some(Duration::from_secs(30)))
            .await
            .expect("Failed to set");
        let result = backend.get("catalog_test_key").await.expect("Failed to get");
        assert_eq!(result, Some(b"listing".to_vec()));

        backend.delete("catalog_test_key").await.expect("Failed to delete");
        assert_eq!(backend.get("catalog_test_key").await.expect("Failed to get"), None);
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_backend_ttl() {
        let backend = RedisBackend::new(&CacheConfig::default())
            .await
            .expect("Failed to create backend");

        backend
            .set("catalog_ttl_key", b"expires".to_vec(), Some(Duration::from_secs(1)))
            .await
            .expect("Failed to set");
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(backend.get("catalog_ttl_key").await.expect("Failed to get"), None);
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_backend_health_check() {
        let backend = RedisBackend::new(&CacheConfig::default())
            .await
            .expect("Failed to create backend");
        assert!(backend.health_check().await.expect("Failed to check health"));
    }
}
