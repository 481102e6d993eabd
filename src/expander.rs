//! Cache-aside orchestration for product listings.
//!
//! One call of [`ProductListExpander::get_list`] performs at most one cache
//! read, one store query and one cache write, in that order:
//!
//! ```text
//! validate ─► fingerprint ─► cache GET ──hit (non-empty)──► return
//!                                │
//!                   miss / empty / undecodable / read error
//!                                ▼
//!                          store query ─► cache SET ─► return
//! ```
//!
//! Read failures degrade to the store. Write failures surface as
//! `Error::CacheWrite`. Cancellation and deadline aborts from the request
//! context always surface.

use crate::backend::CacheBackend;
use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::key::ListKey;
use crate::model::Products;
use crate::observability::{CacheMetrics, NoOpMetrics, TtlPolicy};
use crate::query::ProductListQuery;
use crate::repository::ProductRepository;
use crate::serialization::{decode_products, encode_products};
use std::time::Instant;

/// Cache-aside reader of product listings.
///
/// # Example
///
/// ```ignore
/// use product_catalog::{ProductListExpander, backend::InMemoryBackend};
///
/// let expander = ProductListExpander::new(InMemoryBackend::new())
///     .with_ttl_policy(config.cache.ttl_policy());
/// let products = expander.get_list(&ctx, &query, &repository).await?;
/// ```
pub struct ProductListExpander<B: CacheBackend> {
    backend: B,
    metrics: Box<dyn CacheMetrics>,
    ttl_policy: TtlPolicy,
}

impl<B: CacheBackend> ProductListExpander<B> {
    /// Create new expander with given backend.
    pub fn new(backend: B) -> Self {
        ProductListExpander {
            backend,
            metrics: Box::new(NoOpMetrics),
            ttl_policy: TtlPolicy::default(),
        }
    }

    /// Set custom metrics handler.
    pub fn with_metrics(mut self, metrics: Box<dyn CacheMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Set TTL policy for written listings.
    pub fn with_ttl_policy(mut self, policy: TtlPolicy) -> Self {
        self.ttl_policy = policy;
        self
    }

    /// The cache backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Serve a listing from cache, falling back to `repository`.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidSort` / `Error::InvalidDirection`: before any I/O
    /// - `Error::Store` / `Error::MalformedData`: from the store path; nothing
    ///   is cached
    /// - `Error::CacheWrite`: the store answered but the result could not be
    ///   cached
    /// - `Error::Cancelled` / `Error::DeadlineExceeded`: from `ctx`
    pub async fn get_list<R: ProductRepository>(
        &self,
        ctx: &RequestContext,
        query: &ProductListQuery,
        repository: &R,
    ) -> Result<Products> {
        query.validate()?;

        let cache_key = ListKey::fingerprint(query);
        debug!("» Product listing for key: {}", cache_key);

        if let Some(products) = self.read_cached(ctx, &cache_key).await? {
            return Ok(products);
        }

        let products = repository.list_products(ctx, query).await?;
        self.write_cached(ctx, &cache_key, &products).await?;

        debug!(
            "✓ Listing {} loaded from store ({} products)",
            cache_key,
            products.len()
        );
        Ok(products)
    }

    /// Drop the cached listing of `query`, if any.
    ///
    /// # Errors
    ///
    /// Returns the backend error, or a context abort.
    pub async fn evict(&self, ctx: &RequestContext, query: &ProductListQuery) -> Result<()> {
        let cache_key = ListKey::fingerprint(query);
        ctx.run("cache delete", self.backend.delete(&cache_key)).await?;
        info!("✓ Evicted cached listing {}", cache_key);
        Ok(())
    }

    /// `Ok(None)` means "go to the store".
    async fn read_cached(&self, ctx: &RequestContext, cache_key: &str) -> Result<Option<Products>> {
        let timer = Instant::now();

        match ctx.run("cache get", self.backend.get(cache_key)).await {
            Ok(Some(bytes)) => match decode_products(&bytes) {
                Ok(products) if !products.is_empty() => {
                    self.metrics.record_hit(cache_key, timer.elapsed());
                    debug!("✓ Cache hit for {} ({} products)", cache_key, products.len());
                    Ok(Some(products))
                }
                Ok(_) => {
                    self.metrics.record_miss(cache_key, timer.elapsed());
                    debug!("Cached listing {} is empty, reading store", cache_key);
                    Ok(None)
                }
                Err(e) => {
                    self.metrics.record_error(cache_key, &e.to_string());
                    warn!("⚠ Undecodable cache entry {}, reading store: {}", cache_key, e);
                    Ok(None)
                }
            },
            Ok(None) => {
                self.metrics.record_miss(cache_key, timer.elapsed());
                debug!("✗ Cache miss for {}", cache_key);
                Ok(None)
            }
            Err(e) if e.is_context_abort() => Err(e),
            Err(e) => {
                self.metrics.record_error(cache_key, &e.to_string());
                warn!("⚠ Cache read failed for {}, reading store: {}", cache_key, e);
                Ok(None)
            }
        }
    }

    async fn write_cached(
        &self,
        ctx: &RequestContext,
        cache_key: &str,
        products: &Products,
    ) -> Result<()> {
        let timer = Instant::now();

        let bytes = encode_products(products)
            .map_err(|e| Error::CacheWrite(format!("{}: {}", cache_key, e)))?;

        let ttl = self.ttl_policy.get_ttl();
        match ctx.run("cache set", self.backend.set(cache_key, bytes, ttl)).await {
            Ok(()) => {
                self.metrics.record_set(cache_key, timer.elapsed());
                Ok(())
            }
            Err(e) if e.is_context_abort() => Err(e),
            Err(e) => {
                self.metrics.record_error(cache_key, &e.to_string());
                Err(Error::CacheWrite(format!("{}: {}", cache_key, e)))
            }
        }
    }
}
