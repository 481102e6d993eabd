//! Product service: the boundary transports call into.
//!
//! Wraps the listing expander and the repository in `Arc` so one service can
//! be cloned into every request handler.

use crate::backend::CacheBackend;
use crate::clock::{Clock, IdGenerator, SystemClock, UuidV7Generator};
use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::expander::ProductListExpander;
use crate::model::{Product, ProductDraft, Products, SYSTEM_ACTOR};
use crate::query::ProductListQuery;
use crate::repository::ProductRepository;
use std::sync::Arc;
use uuid::Uuid;

/// Product reads and writes over a cache backend and a repository.
///
/// # Example
///
/// ```ignore
/// use product_catalog::{ProductService, RequestContext, backend::InMemoryBackend};
/// use product_catalog::repository::SqlProductRepository;
/// use product_catalog::store::PgStore;
///
/// let store = PgStore::connect(&config.database).await?;
/// let service = ProductService::new(
///     InMemoryBackend::new(),
///     SqlProductRepository::new(store),
/// );
///
/// let ctx = RequestContext::with_timeout(Duration::from_secs(2));
/// let products = service.get_list_product(&ctx, "kang", "Sayur", "name", "asc").await?;
/// ```
pub struct ProductService<B, R, C = SystemClock, G = UuidV7Generator>
where
    B: CacheBackend,
    R: ProductRepository,
    C: Clock,
    G: IdGenerator,
{
    expander: Arc<ProductListExpander<B>>,
    repository: Arc<R>,
    clock: Arc<C>,
    ids: Arc<G>,
}

impl<B, R, C, G> Clone for ProductService<B, R, C, G>
where
    B: CacheBackend,
    R: ProductRepository,
    C: Clock,
    G: IdGenerator,
{
    fn clone(&self) -> Self {
        ProductService {
            expander: Arc::clone(&self.expander),
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            ids: Arc::clone(&self.ids),
        }
    }
}

impl<B: CacheBackend, R: ProductRepository> ProductService<B, R> {
    /// Service with a default expander, the system clock and UUIDv7 ids.
    pub fn new(backend: B, repository: R) -> Self {
        Self::from_expander(ProductListExpander::new(backend), repository)
    }

    /// Service around a configured expander (metrics, TTL policy).
    pub fn from_expander(expander: ProductListExpander<B>, repository: R) -> Self {
        ProductService {
            expander: Arc::new(expander),
            repository: Arc::new(repository),
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidV7Generator),
        }
    }
}

impl<B, R, C, G> ProductService<B, R, C, G>
where
    B: CacheBackend,
    R: ProductRepository,
    C: Clock,
    G: IdGenerator,
{
    /// Replace the clock and id source used by the create path.
    pub fn with_capabilities<C2: Clock, G2: IdGenerator>(
        self,
        clock: C2,
        ids: G2,
    ) -> ProductService<B, R, C2, G2> {
        ProductService {
            expander: self.expander,
            repository: self.repository,
            clock: Arc::new(clock),
            ids: Arc::new(ids),
        }
    }

    /// The listing expander.
    pub fn expander(&self) -> &ProductListExpander<B> {
        &self.expander
    }

    /// The repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Create a product from a draft.
    ///
    /// Cached listings are left as they are and may omit the new product
    /// until they expire.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidDraft`: the draft fails validation
    /// - `Error::AlreadyExists`: the category already has a product by that name
    /// - store and context errors from the lookup or the insert
    pub async fn create_product(
        &self,
        ctx: &RequestContext,
        draft: ProductDraft,
    ) -> Result<Product> {
        draft.validate()?;

        let existing = self
            .repository
            .get_product_by_name(ctx, draft.category_id, &draft.name)
            .await?;
        if existing.is_some() {
            return Err(Error::AlreadyExists {
                category_id: draft.category_id,
                name: draft.name,
            });
        }

        let product = draft.into_product(self.ids.new_id(), self.clock.now(), SYSTEM_ACTOR);
        self.repository.create_product(ctx, &product).await?;

        info!("✓ Created product {} ({})", product.id, product.name);
        Ok(product)
    }

    /// List products through the cache.
    ///
    /// Empty strings mean "no filter" / "no ordering".
    ///
    /// # Errors
    ///
    /// See [`ProductListExpander::get_list`].
    pub async fn get_list_product(
        &self,
        ctx: &RequestContext,
        name: &str,
        category: &str,
        sort: &str,
        direction: &str,
    ) -> Result<Products> {
        let query = ProductListQuery::new(name, category, sort, direction);
        self.expander
            .get_list(ctx, &query, self.repository.as_ref())
            .await
    }

    /// Fetch one product straight from the store.
    ///
    /// # Errors
    ///
    /// - `Error::ProductNotFound`: no product has this id
    /// - store, integrity and context errors
    pub async fn get_product_by_id(&self, ctx: &RequestContext, id: Uuid) -> Result<Product> {
        self.repository
            .get_product_by_id(ctx, id)
            .await?
            .ok_or(Error::ProductNotFound(id))
    }

    /// Whether the cache backend answers its health probe.
    pub async fn cache_healthy(&self) -> bool {
        match self.expander.backend().health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!("⚠ Cache health check failed: {}", e);
                false
            }
        }
    }
}
