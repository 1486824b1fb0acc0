//! Cache Store Module
//!
//! In-memory key space with field-map values, key enumeration and TTL
//! expiration. Shared as `Arc<RwLock<MemoryCache>>`, which is what implements
//! [`CacheStore`] for the coordinator.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use globset::Glob;
use tokio::sync::RwLock;
use tracing::info;

use crate::cache::entry::{CacheEntry, CacheValue};
use crate::cache::{CacheStats, MAX_KEY_LENGTH};
use crate::data::{CacheStore, FieldMap};
use crate::error::StoreError;

// == Memory Cache ==
/// Main cache storage with TTL support and a hard key limit.
#[derive(Debug)]
pub struct MemoryCache {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of keys allowed
    max_entries: usize,
}

impl MemoryCache {
    // == Constructor ==
    /// Creates a new MemoryCache holding at most `max_entries` keys.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            max_entries,
        }
    }

    // == Keys ==
    /// Live keys matching the glob `pattern`, sorted.
    ///
    /// A malformed pattern fails with [`StoreError::InvalidKey`].
    pub fn keys(&mut self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let matcher = Glob::new(pattern)
            .map_err(|e| StoreError::InvalidKey(format!("pattern {:?}: {}", pattern, e)))?
            .compile_matcher();

        self.cleanup_expired();

        let mut keys: Vec<String> = self
            .entries
            .keys()
            .filter(|key| matcher.is_match(key.as_str()))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    // == Get Fields ==
    /// Field map under `key`; empty map when absent or expired.
    pub fn get_fields(&mut self, key: &str) -> Result<FieldMap, StoreError> {
        match self.live_entry(key) {
            Some(CacheValue::Fields(fields)) => {
                let fields = fields.clone();
                self.stats.record_hit();
                Ok(fields)
            }
            Some(CacheValue::Text(_)) => Err(StoreError::WrongType(key.to_string())),
            None => {
                self.stats.record_miss();
                Ok(FieldMap::new())
            }
        }
    }

    // == Set Fields ==
    /// Replaces the field map under `key`. The key never expires.
    pub fn set_fields(&mut self, key: String, fields: FieldMap) -> Result<(), StoreError> {
        Self::validate_key(&key)?;

        if let Some(CacheValue::Text(_)) = self.live_entry(&key) {
            return Err(StoreError::WrongType(key));
        }
        self.ensure_room_for(&key)?;

        self.entries
            .insert(key, CacheEntry::new(CacheValue::Fields(fields), None));
        self.stats.set_total_entries(self.entries.len());
        Ok(())
    }

    // == Delete Fields ==
    /// Removes the field map under `key`. Returns whether one was removed.
    pub fn delete_fields(&mut self, key: &str) -> Result<bool, StoreError> {
        match self.live_entry(key) {
            Some(CacheValue::Fields(_)) => Ok(self.delete(key)),
            Some(CacheValue::Text(_)) => Err(StoreError::WrongType(key.to_string())),
            None => Ok(false),
        }
    }

    // == Set If Absent ==
    /// Stores `value` under `key` with expiry `ttl`, only if `key` holds no
    /// live entry. Returns whether the value was stored.
    pub fn set_if_absent(
        &mut self,
        key: String,
        value: String,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        Self::validate_key(&key)?;

        if self.live_entry(&key).is_some() {
            return Ok(false);
        }
        self.ensure_room_for(&key)?;

        self.entries
            .insert(key, CacheEntry::new(CacheValue::Text(value), Some(ttl)));
        self.stats.set_total_entries(self.entries.len());
        Ok(true)
    }

    // == Get ==
    /// String value under `key`, if any.
    pub fn get(&mut self, key: &str) -> Result<Option<String>, StoreError> {
        match self.live_entry(key) {
            Some(CacheValue::Text(value)) => Ok(Some(value.clone())),
            Some(CacheValue::Fields(_)) => Err(StoreError::WrongType(key.to_string())),
            None => Ok(None),
        }
    }

    // == Delete ==
    /// Removes any entry by key. Returns whether one was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let count = before - self.entries.len();

        self.stats.record_expirations(count);
        self.stats.set_total_entries(self.entries.len());
        count
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    // == Length ==
    /// Returns the current number of keys, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value under `key` if present and not expired; an expired entry is
    /// purged on the way.
    fn live_entry(&mut self, key: &str) -> Option<&CacheValue> {
        if self.entries.get(key).is_some_and(CacheEntry::is_expired) {
            self.entries.remove(key);
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.entries.len());
        }
        self.entries.get(key).map(|entry| &entry.value)
    }

    fn validate_key(key: &str) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("key cannot be empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(StoreError::InvalidKey(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        Ok(())
    }

    /// New keys are refused once the limit is reached; overwrites always fit.
    fn ensure_room_for(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.contains_key(key) || self.entries.len() < self.max_entries {
            return Ok(());
        }
        // Expired entries do not count against the limit
        if self.cleanup_expired() > 0 && self.entries.len() < self.max_entries {
            return Ok(());
        }
        Err(StoreError::CapacityExceeded(self.max_entries))
    }
}

// == CacheStore Implementation ==
#[async_trait]
impl CacheStore for RwLock<MemoryCache> {
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        self.write().await.keys(pattern)
    }

    async fn get_fields(&self, key: &str) -> Result<FieldMap, StoreError> {
        self.write().await.get_fields(key)
    }

    async fn set_fields(&self, key: &str, fields: FieldMap) -> Result<(), StoreError> {
        self.write().await.set_fields(key.to_string(), fields)
    }

    async fn delete_fields(&self, key: &str) -> Result<(), StoreError> {
        self.write().await.delete_fields(key).map(|_| ())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        self.write()
            .await
            .set_if_absent(key.to_string(), value.to_string(), ttl)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.write().await.delete(key);
        Ok(())
    }

    async fn close(&self) {
        self.write().await.clear();
        info!("In-memory cache closed");
    }
}
