//! Advisory lock on top of a [`CacheStore`].
//!
//! Acquire is a single set-if-absent with expiry, never a spin. The holder
//! deletes the key on exit; the expiry frees it if the holder dies.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use super::CacheStore;
use crate::error::{ServiceError, StoreError};

/// Value stored under a held lock key
pub const LOCK_SENTINEL: &str = "locked";

// == Distributed Lock ==
#[derive(Clone)]
pub struct DistributedLock {
    store: Arc<dyn CacheStore>,
    key: String,
    ttl: Duration,
}

impl DistributedLock {
    pub fn new(store: Arc<dyn CacheStore>, key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            ttl,
        }
    }

    /// One attempt at creating `key`. `Ok(true)` iff this call created it.
    pub async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        self.store.set_if_absent(key, LOCK_SENTINEL, ttl).await
    }

    /// Deletes `key`. Failures are logged only; expiry still frees the key.
    pub async fn release(&self, key: &str) {
        release_key(self.store.as_ref(), key).await;
    }

    /// Takes the resource-class lock or reports why it cannot.
    pub async fn acquire(&self) -> Result<LockGuard, ServiceError> {
        match self.try_acquire(&self.key, self.ttl).await {
            Ok(true) => {
                debug!(lock_key = %self.key, "Lock acquired");
                Ok(LockGuard {
                    store: self.store.clone(),
                    key: self.key.clone(),
                    released: false,
                })
            }
            Ok(false) => Err(ServiceError::LockUnavailable(format!(
                "'{}' is held by another request",
                self.key
            ))),
            Err(e) => {
                error!(lock_key = %self.key, error = %e, "Lock backend failure");
                Err(ServiceError::LockUnavailable(format!(
                    "cannot establish exclusivity on '{}': {}",
                    self.key, e
                )))
            }
        }
    }
}

async fn release_key(store: &dyn CacheStore, key: &str) {
    match store.delete(key).await {
        Ok(()) => debug!(lock_key = %key, "Lock released"),
        Err(e) => error!(lock_key = %key, error = %e, "Lock release failed"),
    }
}

// == Lock Guard ==
/// A held lock. Call [`LockGuard::release`] on every exit path; a guard
/// dropped without it (cancelled request) schedules the release on the
/// current runtime.
pub struct LockGuard {
    store: Arc<dyn CacheStore>,
    key: String,
    released: bool,
}

impl LockGuard {
    pub async fn release(mut self) {
        self.released = true;
        release_key(self.store.as_ref(), &self.key).await;
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let store = self.store.clone();
        let key = std::mem::take(&mut self.key);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(lock_key = %key, "Lock guard dropped, releasing in background");
                handle.spawn(async move {
                    release_key(store.as_ref(), &key).await;
                });
            }
            Err(_) => {
                warn!(lock_key = %key, "Lock guard dropped outside a runtime, left to expire");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use tokio::sync::RwLock;

    fn setup() -> (DistributedLock, Arc<RwLock<MemoryCache>>) {
        let cache = Arc::new(RwLock::new(MemoryCache::new(100)));
        let lock = DistributedLock::new(cache.clone(), "test:lock", Duration::from_secs(60));
        (lock, cache)
    }

    #[tokio::test]
    async fn test_acquire_sets_sentinel() {
        let (lock, cache) = setup();
        let guard = lock.acquire().await.unwrap();

        let value = cache.write().await.get("test:lock").unwrap();
        assert_eq!(value.as_deref(), Some(LOCK_SENTINEL));

        guard.release().await;
        assert!(cache.write().await.get("test:lock").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_acquire_is_refused() {
        let (lock, _) = setup();
        let guard = lock.acquire().await.unwrap();

        let second = lock.acquire().await;
        assert!(matches!(second, Err(ServiceError::LockUnavailable(_))));

        guard.release().await;
        assert!(lock.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn test_try_acquire_and_release_by_key() {
        let (lock, _) = setup();
        let ttl = Duration::from_secs(5);

        assert!(lock.try_acquire("other:lock", ttl).await.unwrap());
        assert!(!lock.try_acquire("other:lock", ttl).await.unwrap());

        lock.release("other:lock").await;
        assert!(lock.try_acquire("other:lock", ttl).await.unwrap());
    }

    #[tokio::test]
    async fn test_dropped_guard_releases_in_background() {
        let (lock, cache) = setup();
        {
            let _guard = lock.acquire().await.unwrap();
        }

        // Give the spawned release a chance to run
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.write().await.get("test:lock").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lock_expires() {
        let cache = Arc::new(RwLock::new(MemoryCache::new(100)));
        let lock = DistributedLock::new(cache, "short:lock", Duration::from_millis(100));

        let guard = lock.acquire().await.unwrap();
        std::mem::forget(guard);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(lock.acquire().await.is_ok());
    }
}
