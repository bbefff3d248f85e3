//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{AppError, Result};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Upstream used when a request omits the `upstream` parameter
    pub default_upstream: Option<String>,
    /// Maximum number of entries per cache store
    pub cache_capacity: usize,
    /// Memory budget per cache store, in megabytes
    pub cache_memory_mb: usize,
    /// TTL in seconds for documents without usable caching headers
    pub default_ttl_secs: u64,
    /// Lower clamp in seconds applied to every stored TTL
    pub min_ttl_secs: u64,
    /// Upper clamp in seconds applied to every stored TTL
    pub max_ttl_secs: u64,
    /// Floor in seconds for the `max-age` advertised to clients
    pub min_client_cache_secs: u64,
    /// Per-request timeout in seconds for origin fetches
    pub upstream_timeout_secs: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval_secs: u64,
    /// Permit upstreams on loopback and private networks
    pub allow_private_upstreams: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `RESIFT_PORT` - HTTP server port (default: 8080)
    /// - `RESIFT_DEFAULT_UPSTREAM` - Fallback upstream URL (default: none)
    /// - `RESIFT_CACHE_CAPACITY` - Max entries per store (default: 100)
    /// - `RESIFT_CACHE_MEMORY_MB` - Memory budget per store in MB (default: 20)
    /// - `RESIFT_DEFAULT_TTL_SECS` - Fallback TTL in seconds (default: 300)
    /// - `RESIFT_MIN_TTL_SECS` - Minimum stored TTL in seconds (default: 60)
    /// - `RESIFT_MAX_TTL_SECS` - Maximum stored TTL in seconds (default: 86400)
    /// - `RESIFT_MIN_CLIENT_CACHE_SECS` - Client max-age floor (default: 900)
    /// - `RESIFT_UPSTREAM_TIMEOUT_SECS` - Origin fetch timeout (default: 30)
    /// - `RESIFT_CLEANUP_INTERVAL_SECS` - Sweep frequency in seconds (default: 60)
    /// - `RESIFT_ALLOW_PRIVATE_UPSTREAMS` - Allow private-network upstreams (default: false)
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("RESIFT_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            default_upstream: env::var("RESIFT_DEFAULT_UPSTREAM")
                .ok()
                .filter(|v| !v.is_empty()),
            cache_capacity: env::var("RESIFT_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            cache_memory_mb: env::var("RESIFT_CACHE_MEMORY_MB")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            default_ttl_secs: env::var("RESIFT_DEFAULT_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            min_ttl_secs: env::var("RESIFT_MIN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            max_ttl_secs: env::var("RESIFT_MAX_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(86_400),
            min_client_cache_secs: env::var("RESIFT_MIN_CLIENT_CACHE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(900),
            upstream_timeout_secs: env::var("RESIFT_UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            cleanup_interval_secs: env::var("RESIFT_CLEANUP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            allow_private_upstreams: env::var("RESIFT_ALLOW_PRIVATE_UPSTREAMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Checks the loaded values for contradictions.
    ///
    /// # Errors
    /// Returns a configuration error naming the first offending value.
    pub fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(AppError::Config("server port must be nonzero".to_string()));
        }
        if self.cache_capacity == 0 {
            return Err(AppError::Config(
                "cache capacity must be positive".to_string(),
            ));
        }
        if self.cache_memory_mb == 0 {
            return Err(AppError::Config(
                "cache memory budget must be positive".to_string(),
            ));
        }
        if self.default_ttl_secs == 0 {
            return Err(AppError::Config("default TTL must be positive".to_string()));
        }
        if self.max_ttl_secs == 0 {
            return Err(AppError::Config("max TTL must be positive".to_string()));
        }
        if self.min_ttl_secs > self.max_ttl_secs {
            return Err(AppError::Config(format!(
                "min TTL ({}s) exceeds max TTL ({}s)",
                self.min_ttl_secs, self.max_ttl_secs
            )));
        }
        if self.min_client_cache_secs == 0 {
            return Err(AppError::Config(
                "min client cache must be positive".to_string(),
            ));
        }
        if self.upstream_timeout_secs == 0 {
            return Err(AppError::Config(
                "upstream timeout must be positive".to_string(),
            ));
        }
        if self.cleanup_interval_secs == 0 {
            return Err(AppError::Config(
                "cleanup interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    // == Derived Values ==

    /// Memory budget per store in bytes.
    pub fn memory_budget(&self) -> usize {
        self.cache_memory_mb * 1024 * 1024
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    pub fn min_ttl(&self) -> Duration {
        Duration::from_secs(self.min_ttl_secs)
    }

    pub fn max_ttl(&self) -> Duration {
        Duration::from_secs(self.max_ttl_secs)
    }

    pub fn min_client_cache(&self) -> Duration {
        Duration::from_secs(self.min_client_cache_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            default_upstream: None,
            cache_capacity: 100,
            cache_memory_mb: 20,
            default_ttl_secs: 300,
            min_ttl_secs: 60,
            max_ttl_secs: 86_400,
            min_client_cache_secs: 900,
            upstream_timeout_secs: 30,
            cleanup_interval_secs: 60,
            allow_private_upstreams: false,
        }
    }
}
