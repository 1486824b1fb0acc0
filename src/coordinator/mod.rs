//! Consistency Coordinator
//!
//! Fronts the primary store with the cache. Every operation runs under the
//! resource-class lock and a deadline; the primary store is always the
//! source of truth and cache failures never reach the caller.
//!
//! # Operations
//! - `list` / `get` - read path, see `reads.rs`
//! - `create` / `update` / `delete` - write path, see `writes.rs`

mod health;
mod reads;
mod reconcile;
mod writes;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use crate::config::Config;
use crate::data::{CacheManager, CacheStore, DistributedLock, PrimaryStore};
use crate::error::{Result, ServiceError};

pub use health::{CacheHealth, HealthSnapshot, PendingWrite};
pub use reconcile::VersionReconciler;

// == Settings ==
/// Lock and deadline parameters for one coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub lock_key: String,
    pub lock_ttl: Duration,
    pub timeout: Duration,
}

impl CoordinatorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            lock_key: config.lock_key.clone(),
            lock_ttl: config.lock_ttl(),
            timeout: config.request_timeout(),
        }
    }
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

// == Coordinator ==
pub struct Coordinator {
    primary: Arc<dyn PrimaryStore>,
    cache: CacheManager,
    lock: DistributedLock,
    health: Arc<CacheHealth>,
    reconciler: VersionReconciler,
    timeout: Duration,
}

impl Coordinator {
    /// Wires a coordinator over the two stores. The lock lives in the same
    /// store as the cached records.
    pub fn new(
        primary: Arc<dyn PrimaryStore>,
        cache_store: Arc<dyn CacheStore>,
        settings: CoordinatorSettings,
    ) -> Self {
        let cache = CacheManager::new(cache_store.clone());
        let lock = DistributedLock::new(cache_store, settings.lock_key, settings.lock_ttl);
        let health = Arc::new(CacheHealth::new());
        let reconciler = VersionReconciler::new(cache.clone(), health.clone());

        Self {
            primary,
            cache,
            lock,
            health,
            reconciler,
            timeout: settings.timeout,
        }
    }

    /// Current state of the list and get cache flags.
    pub fn health(&self) -> HealthSnapshot {
        self.health.snapshot()
    }

    /// Closes both stores.
    pub async fn shutdown(&self) {
        info!("Closing stores");
        self.primary.close().await;
        self.cache.store().close().await;
    }

    /// Runs `work` while holding the resource-class lock. Acquire and work
    /// share one deadline; the lock is released on every exit path.
    async fn exclusive<T, F>(&self, operation: &'static str, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let deadline = Instant::now() + self.timeout;

        let guard = match timeout_at(deadline, self.lock.acquire()).await {
            Ok(guard) => guard?,
            Err(_) => {
                warn!(operation, "Timed out acquiring lock");
                return Err(ServiceError::Timeout(operation));
            }
        };

        let outcome = timeout_at(deadline, work).await;
        guard.release().await;

        outcome.unwrap_or_else(|_| {
            warn!(operation, "Operation timed out");
            Err(ServiceError::Timeout(operation))
        })
    }
}
