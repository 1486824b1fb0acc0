//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use globset::Glob;
use tracing::warn;

use crate::data::TASK_KEY_PATTERN;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub server_host: String,
    /// HTTP server port
    pub server_port: u16,
    /// SQLite connection string; `None` keeps the primary store in process
    pub database_url: Option<String>,
    /// Maximum number of keys the cache can hold
    pub cache_max_entries: usize,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Key of the resource-class lock shared by every task operation
    pub lock_key: String,
    /// Lock expiry in seconds
    pub lock_ttl: u64,
    /// Deadline for one coordinated operation, in milliseconds
    pub request_timeout_ms: u64,
    /// Page size used when a list request gives no usable limit
    pub default_page_size: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_HOST` - Bind address (default: 0.0.0.0)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DATABASE_URL` - SQLite URL, e.g. `sqlite://tasks.db` (default: unset)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache keys (default: 100000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `LOCK_KEY` - Resource-class lock key (default: "task-service:lock"),
    ///   must not fall under the task record keyspace
    /// - `LOCK_TTL` - Lock expiry in seconds, non-zero (default: 60)
    /// - `REQUEST_TIMEOUT_MS` - Per-operation deadline (default: 5000)
    /// - `DEFAULT_PAGE_SIZE` - List page size fallback (default: 20)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_host: env::var("SERVER_HOST")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.server_host),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            cache_max_entries: env_or("CACHE_MAX_ENTRIES", defaults.cache_max_entries),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            lock_key: lock_key_or(env::var("LOCK_KEY").ok(), defaults.lock_key),
            lock_ttl: lock_ttl_or(env_or("LOCK_TTL", defaults.lock_ttl), defaults.lock_ttl),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", defaults.request_timeout_ms),
            default_page_size: env_or("DEFAULT_PAGE_SIZE", defaults.default_page_size),
        }
    }

    /// Lock expiry as a Duration.
    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl)
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Per-operation deadline as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            database_url: None,
            cache_max_entries: 100_000,
            cleanup_interval: 1,
            lock_key: "task-service:lock".to_string(),
            lock_ttl: 60,
            request_timeout_ms: 5000,
            default_page_size: 20,
        }
    }
}

/// Parses an environment variable, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Keeps `raw` unless it is empty or would be enumerated as a task record.
fn lock_key_or(raw: Option<String>, default: String) -> String {
    let Some(key) = raw.filter(|v| !v.is_empty()) else {
        return default;
    };

    let collides = Glob::new(TASK_KEY_PATTERN)
        .map(|glob| glob.compile_matcher().is_match(key.as_str()))
        .unwrap_or(true);
    if collides {
        warn!(
            "LOCK_KEY {:?} matches the task keyspace {:?}, using {:?}",
            key, TASK_KEY_PATTERN, default
        );
        return default;
    }
    key
}

/// A zero TTL would make the lock expire as soon as it is taken.
fn lock_ttl_or(ttl: u64, default: u64) -> u64 {
    if ttl == 0 {
        warn!("LOCK_TTL must be at least 1 second, using {}", default);
        return default;
    }
    ttl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert!(config.database_url.is_none());
        assert_eq!(config.cache_max_entries, 100_000);
        assert_eq!(config.lock_key, "task-service:lock");
        assert_eq!(config.lock_ttl(), Duration::from_secs(60));
        assert_eq!(config.request_timeout(), Duration::from_millis(5000));
        assert_eq!(config.default_page_size, 20);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_HOST");
        env::remove_var("SERVER_PORT");
        env::remove_var("DATABASE_URL");
        env::remove_var("CACHE_MAX_ENTRIES");
        env::remove_var("LOCK_KEY");
        env::remove_var("LOCK_TTL");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert!(config.database_url.is_none());
        assert_eq!(config.cache_max_entries, 100_000);
        assert_eq!(config.lock_key, "task-service:lock");
        assert_eq!(config.lock_ttl, 60);
    }

    #[test]
    fn test_lock_key_in_task_keyspace_falls_back() {
        let default = "task-service:lock".to_string();

        assert_eq!(lock_key_or(Some("task:lock".to_string()), default.clone()), default);
        assert_eq!(lock_key_or(Some("task:".to_string()), default.clone()), default);
        assert_eq!(lock_key_or(Some(String::new()), default.clone()), default);
        assert_eq!(lock_key_or(None, default.clone()), default);
    }

    #[test]
    fn test_lock_key_outside_task_keyspace_is_kept() {
        let default = "task-service:lock".to_string();

        assert_eq!(lock_key_or(Some("tasks:lock".to_string()), default.clone()), "tasks:lock");
        assert_eq!(lock_key_or(Some("lock:task".to_string()), default), "lock:task");
    }

    #[test]
    fn test_zero_lock_ttl_falls_back() {
        assert_eq!(lock_ttl_or(0, 60), 60);
        assert_eq!(lock_ttl_or(5, 60), 5);
    }

    #[test]
    fn test_env_or_ignores_unparsable_values() {
        env::set_var("TASK_SERVICE_TEST_PORT", "not-a-number");
        assert_eq!(env_or("TASK_SERVICE_TEST_PORT", 42u16), 42);
        env::remove_var("TASK_SERVICE_TEST_PORT");
    }
}
