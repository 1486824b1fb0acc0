//! Process-local cache health flags.
//!
//! Two independent switches decide whether list and get requests may be
//! answered from the cache. A third, `dirty`, records that the cache may hold
//! an entry we failed to evict; while set, only a full resync turns the get
//! path back on.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{info, warn};

/// Point-in-time view of the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthSnapshot {
    pub list_cache_enabled: bool,
    pub get_cache_enabled: bool,
}

// == Cache Health ==
/// Flags start disabled: the first list resyncs the cache from the primary
/// store, the first verified read or write re-enables gets.
#[derive(Debug, Default)]
pub struct CacheHealth {
    list: AtomicBool,
    get: AtomicBool,
    dirty: AtomicBool,
}

impl CacheHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_enabled(&self) -> bool {
        self.list.load(Ordering::Acquire)
    }

    pub fn get_enabled(&self) -> bool {
        self.get.load(Ordering::Acquire)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn disable_all(&self) {
        self.disable_list();
        self.disable_get();
    }

    pub fn disable_list(&self) {
        if self.list.swap(false, Ordering::AcqRel) {
            warn!("List cache disabled");
        }
    }

    pub fn disable_get(&self) {
        if self.get.swap(false, Ordering::AcqRel) {
            warn!("Get cache disabled");
        }
    }

    /// The cache may hold an entry that no longer matches the primary store.
    pub fn mark_dirty(&self) {
        if !self.dirty.swap(true, Ordering::AcqRel) {
            warn!("Cache marked dirty, waiting for a full resync");
        }
    }

    /// Turns gets back on unless a failed eviction is still outstanding.
    pub fn enable_get_if_clean(&self) {
        if self.is_dirty() {
            return;
        }
        if !self.get.swap(true, Ordering::AcqRel) {
            info!("Get cache enabled");
        }
    }

    /// After a full resync the cache mirrors the primary store exactly.
    pub fn enable_all(&self) {
        self.dirty.store(false, Ordering::Release);
        if !self.list.swap(true, Ordering::AcqRel) {
            info!("List cache enabled");
        }
        if !self.get.swap(true, Ordering::AcqRel) {
            info!("Get cache enabled");
        }
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            list_cache_enabled: self.list_enabled(),
            get_cache_enabled: self.get_enabled(),
        }
    }
}

// == Pending Write ==
/// Armed around a mutation. If the mutation never reports back (timed out or
/// cancelled between its primary and cache steps), dropping the armed guard
/// takes the cache out of service until the next resync.
pub struct PendingWrite<'a> {
    health: &'a CacheHealth,
    armed: bool,
}

impl<'a> PendingWrite<'a> {
    pub fn arm(health: &'a CacheHealth) -> Self {
        Self {
            health,
            armed: true,
        }
    }

    pub fn complete(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingWrite<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Write abandoned midway, cache no longer trusted");
            self.health.disable_all();
            self.health.mark_dirty();
        }
    }
}
