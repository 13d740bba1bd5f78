use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

use super::types::{CacheStore, InMemoryCacheStore};

const CACHE_PREFIX: &str = "cache";

impl InMemoryCacheStore {
    pub(crate) fn new() -> Self {
        tracing::info!("Creating new in-memory generic cache store");
        Self {
            entry: HashMap::new(),
        }
    }

    fn make_key(prefix: &str, key: &str) -> String {
        format!("{CACHE_PREFIX}:{prefix}:{key}")
    }

    /// Drop every entry whose expiry has passed.
    fn purge_expired(&mut self) {
        let now = Utc::now();
        let before = self.entry.len();
        self.entry
            .retain(|_, (_, expires_at)| expires_at.is_none_or(|at| at > now));
        let purged = before - self.entry.len();
        if purged > 0 {
            tracing::debug!("Purged {} expired cache entries", purged);
        }
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError> {
        let ttl = i64::try_from(ttl)
            .map_err(|_| StorageError::Storage(format!("TTL out of range: {ttl}")))?;
        let expires_at = Utc::now() + Duration::seconds(ttl);
        self.purge_expired();
        self.entry
            .insert(Self::make_key(prefix, key), (value, Some(expires_at)));
        Ok(())
    }

    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        let key = Self::make_key(prefix, key);
        match self.entry.get(&key) {
            Some((_, Some(expires_at))) if *expires_at <= Utc::now() => Ok(None),
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError> {
        self.entry.remove(&Self::make_key(prefix, key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(value: &str) -> CacheData {
        CacheData {
            value: value.to_string(),
        }
    }

    #[test]
    fn test_make_key() {
        assert_eq!(
            InMemoryCacheStore::make_key("session", "user123"),
            "cache:session:user123"
        );
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let mut store = InMemoryCacheStore::new();
        store
            .put_with_ttl("test", "key1", data("value1"), 60)
            .await
            .expect("put");

        let value = store.get("test", "key1").await.expect("get");
        assert_eq!(value.map(|v| v.value), Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_prefixes_are_isolated() {
        let mut store = InMemoryCacheStore::new();
        store
            .put_with_ttl("a", "key", data("from-a"), 60)
            .await
            .expect("put");

        assert!(store.get("b", "key").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_put_with_ttl_is_readable_before_expiry() {
        let mut store = InMemoryCacheStore::new();
        store
            .put_with_ttl("session", "k", data("v"), 3600)
            .await
            .expect("put");

        assert!(store.get("session", "k").await.expect("get").is_some());
    }

    #[tokio::test]
    async fn test_put_with_zero_ttl_expires_immediately() {
        let mut store = InMemoryCacheStore::new();
        store
            .put_with_ttl("session", "k", data("v"), 0)
            .await
            .expect("put");

        assert!(store.get("session", "k").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_expired_entries_are_purged_on_write() {
        let mut store = InMemoryCacheStore::new();
        for key in ["a", "b", "c"] {
            store
                .put_with_ttl("csrf", key, data("v"), 0)
                .await
                .expect("put");
        }
        store
            .put_with_ttl("session", "live", data("v"), 3600)
            .await
            .expect("put");

        assert_eq!(store.entry.len(), 1);
        assert!(store.get("session", "live").await.expect("get").is_some());
    }

    #[tokio::test]
    async fn test_remove() {
        let mut store = InMemoryCacheStore::new();
        store
            .put_with_ttl("test", "k", data("v"), 60)
            .await
            .expect("put");
        store.remove("test", "k").await.expect("remove");

        assert!(store.get("test", "k").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_ok() {
        let mut store = InMemoryCacheStore::new();
        assert!(store.remove("test", "missing").await.is_ok());
    }
}
