//! Metrics hooks and expiry policy for cached listings.
//!
//! - **Metrics (`CacheMetrics`)**: hits, misses, writes and degraded reads
//! - **TTL Policies (`TtlPolicy`)**: how long a listing stays cached
//!
//! ```ignore
//! use product_catalog::observability::CacheMetrics;
//! use std::time::Duration;
//!
//! struct PrometheusMetrics;
//!
//! impl CacheMetrics for PrometheusMetrics {
//!     fn record_hit(&self, _key: &str, _duration: Duration) {
//!         // counter!("catalog_cache_hits").inc();
//!     }
//! }
//!
//! // let expander = ProductListExpander::new(backend)
//! //     .with_metrics(Box::new(PrometheusMetrics));
//! ```
//!
//! | Policy | Use Case |
//! |--------|----------|
//! | `Default` | Let the backend decide |
//! | `Fixed` | Every listing expires after the configured minutes |
//! | `Infinite` | Never expire (tests, static catalogs) |

use std::time::Duration;

/// Trait for cache metrics collection.
///
/// Every method has a logging default, so implementors override only what
/// they export.
pub trait CacheMetrics: Send + Sync {
    /// Record a cache hit.
    fn record_hit(&self, key: &str, duration: Duration) {
        debug!("Cache HIT: {} took {:?}", key, duration);
    }

    /// Record a cache miss, including empty and undecodable entries.
    fn record_miss(&self, key: &str, duration: Duration) {
        debug!("Cache MISS: {} took {:?}", key, duration);
    }

    /// Record a cache write.
    fn record_set(&self, key: &str, duration: Duration) {
        debug!("Cache SET: {} took {:?}", key, duration);
    }

    /// Record a failed cache operation.
    fn record_error(&self, key: &str, error: &str) {
        warn!("Cache ERROR for {}: {}", key, error);
    }
}

/// Default metrics implementation (no-op).
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl CacheMetrics for NoOpMetrics {
    fn record_hit(&self, _key: &str, _duration: Duration) {}
    fn record_miss(&self, _key: &str, _duration: Duration) {}
    fn record_set(&self, _key: &str, _duration: Duration) {}
    fn record_error(&self, _key: &str, _error: &str) {}
}

/// TTL (Time-to-Live) policy for cached listings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TtlPolicy {
    /// Use backend's default TTL
    #[default]
    Default,

    /// Fixed duration for all entries
    Fixed(Duration),

    /// No TTL (entries live forever)
    Infinite,
}

impl TtlPolicy {
    /// TTL to pass to the backend.
    pub fn get_ttl(&self) -> Option<Duration> {
        match self {
            TtlPolicy::Default | TtlPolicy::Infinite => None,
            TtlPolicy::Fixed(d) => Some(*d),
        }
    }
}
