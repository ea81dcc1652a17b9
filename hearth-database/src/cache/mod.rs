mod redis_store;

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use redis_store::RedisCacheStore;

/// TTL for per-guild configuration rows.
pub const CONFIG_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// With Redis off every read misses and writes are dropped.
#[derive(Clone, Debug)]
enum CacheBackend {
    Disabled,
    Redis(RedisCacheStore),
}

#[derive(Clone, Debug)]
pub struct CacheService {
    key_prefix: String,
    backend: CacheBackend,
}

impl CacheService {
    pub fn disabled(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: prefix.into(),
            backend: CacheBackend::Disabled,
        }
    }

    pub fn redis(redis_url: &str, prefix: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            key_prefix: prefix.into(),
            backend: CacheBackend::Redis(RedisCacheStore::from_url(redis_url)?),
        })
    }

    pub fn is_redis_enabled(&self) -> bool {
        matches!(self.backend, CacheBackend::Redis(_))
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        match &self.backend {
            CacheBackend::Disabled => Ok(()),
            CacheBackend::Redis(store) => store.ping().await,
        }
    }

    pub fn key(&self, suffix: impl AsRef<str>) -> String {
        format!("{}:{}", self.key_prefix, suffix.as_ref())
    }

    pub async fn get_json<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let value = match &self.backend {
            CacheBackend::Disabled => None,
            CacheBackend::Redis(store) => store.get(key).await?,
        };

        value
            .map(|bytes| {
                serde_json::from_slice(&bytes).map_err(|e| {
                    anyhow::anyhow!("failed to deserialize cache value for `{key}`: {e}")
                })
            })
            .transpose()
    }

    pub async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let ttl_seconds = ttl.as_secs().max(1);
        let payload = serde_json::to_vec(value)
            .map_err(|e| anyhow::anyhow!("failed to serialize cache value for `{key}`: {e}"))?;

        match &self.backend {
            CacheBackend::Disabled => Ok(()),
            CacheBackend::Redis(store) => store.set(key, payload, ttl_seconds).await,
        }
    }

    pub async fn del(&self, key: &str) -> anyhow::Result<()> {
        match &self.backend {
            CacheBackend::Disabled => Ok(()),
            CacheBackend::Redis(store) => store.del(key).await,
        }
    }

    pub async fn get_or_load_json<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> anyhow::Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        match self.get_json::<T>(key).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => warn!(?e, cache_key = key, "cache get failed; falling back to database"),
        }

        let loaded = loader().await?;

        if let Err(e) = self.set_json(key, &loaded, ttl).await {
            warn!(?e, cache_key = key, "cache set failed; returning database value");
        }

        Ok(loaded)
    }
}

pub fn guild_settings_key(cache: &CacheService, guild_id: u64) -> String {
    cache.key(format!("guild_settings:{guild_id}"))
}

pub fn ticket_config_key(cache: &CacheService, guild_id: u64) -> String {
    cache.key(format!("ticket_config:{guild_id}"))
}

pub async fn invalidate_guild_settings(cache: &CacheService, guild_id: u64) -> anyhow::Result<()> {
    cache.del(&guild_settings_key(cache, guild_id)).await
}

pub async fn invalidate_ticket_config(cache: &CacheService, guild_id: u64) -> anyhow::Result<()> {
    cache.del(&ticket_config_key(cache, guild_id)).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{CacheService, guild_settings_key, ticket_config_key};

    #[test]
    fn keys_are_prefixed_per_guild() {
        let cache = CacheService::disabled("hearth:test");
        assert_eq!(guild_settings_key(&cache, 42), "hearth:test:guild_settings:42");
        assert_eq!(ticket_config_key(&cache, 7), "hearth:test:ticket_config:7");
    }

    #[tokio::test]
    async fn disabled_cache_always_loads() {
        let cache = CacheService::disabled("hearth:test");
        let first: u64 = cache
            .get_or_load_json("k", Duration::from_secs(5), || async { Ok(1) })
            .await
            .expect("loader runs");
        let second: u64 = cache
            .get_or_load_json("k", Duration::from_secs(5), || async { Ok(2) })
            .await
            .expect("loader runs again");

        assert_eq!((first, second), (1, 2));
        assert!(!cache.is_redis_enabled());
        assert!(cache.ping().await.is_ok());
    }
}
