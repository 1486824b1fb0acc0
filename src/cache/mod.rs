//! Cache Module
//!
//! In-memory cache backend: field-map and string keys with TTL expiration.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, CacheValue};
pub use stats::CacheStats;
pub use store::MemoryCache;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
