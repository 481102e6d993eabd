//! Product repository: the store path of the pipeline.
//!
//! The `ProductRepository` trait decouples the service from any particular
//! database. [`SqlProductRepository`] implements it over any
//! [`StoreDriver`] by building parameterized statements, running them under
//! the caller's [`RequestContext`] and validating every row that comes back.
//!
//! # Error Handling
//!
//! - "no rows" on a point lookup is `Ok(None)`, on a listing an empty list
//! - a row that breaks a product invariant is `Error::MalformedData`
//! - everything else the driver reports is returned unchanged

use crate::context::RequestContext;
use crate::error::Result;
use crate::model::{Product, Products};
use crate::query::{self, ProductListQuery, QueryTemplate};
use crate::row::{self, ProductRow};
use crate::store::StoreDriver;
use uuid::Uuid;

/// Trait for product repository implementations.
#[allow(async_fn_in_trait)]
pub trait ProductRepository: Send + Sync {
    /// Insert a fully stamped product and return its id.
    ///
    /// # Errors
    /// Returns `Err` if the store rejects the insert
    async fn create_product(&self, ctx: &RequestContext, product: &Product) -> Result<Uuid>;

    /// List products matching `query`, in the requested order.
    ///
    /// # Errors
    /// Returns `Err` on invalid ordering, store failure or a malformed row
    async fn list_products(&self, ctx: &RequestContext, query: &ProductListQuery)
        -> Result<Products>;

    /// Fetch one product by id.
    ///
    /// # Returns
    /// - `Ok(Some(product))` - Product found
    /// - `Ok(None)` - No such product (not an error)
    ///
    /// # Errors
    /// Returns `Err` on store failure or a malformed row
    async fn get_product_by_id(&self, ctx: &RequestContext, id: Uuid) -> Result<Option<Product>>;

    /// Fetch one product by category and exact name.
    ///
    /// # Errors
    /// Returns `Err` on store failure or a malformed row
    async fn get_product_by_name(
        &self,
        ctx: &RequestContext,
        category_id: Uuid,
        name: &str,
    ) -> Result<Option<Product>>;
}

/// SQL repository over a store driver.
#[derive(Clone)]
pub struct SqlProductRepository<D: StoreDriver> {
    driver: D,
}

impl<D: StoreDriver> SqlProductRepository<D> {
    pub fn new(driver: D) -> Self {
        SqlProductRepository { driver }
    }

    /// The driver statements are sent to.
    pub fn driver(&self) -> &D {
        &self.driver
    }
}

impl<D: StoreDriver> ProductRepository for SqlProductRepository<D> {
    async fn create_product(&self, ctx: &RequestContext, product: &Product) -> Result<Uuid> {
        let built = query::build_insert(product, self.driver.placeholder_style());
        ctx.run("store insert", self.driver.execute(&built)).await?;
        Ok(product.id)
    }

    async fn list_products(
        &self,
        ctx: &RequestContext,
        query: &ProductListQuery,
    ) -> Result<Products> {
        let built = query::build_list_query(
            &QueryTemplate::LIST_PRODUCTS,
            query,
            self.driver.placeholder_style(),
        )?;
        let rows = ctx.run("store list", self.driver.fetch_all(&built)).await?;
        debug!("» Store returned {} product rows", rows.len());
        row::map_rows(rows)
    }

    async fn get_product_by_id(&self, ctx: &RequestContext, id: Uuid) -> Result<Option<Product>> {
        let built = query::build_get_by_id(id, self.driver.placeholder_style());
        let found: Option<ProductRow> =
            ctx.run("store get", self.driver.fetch_optional(&built)).await?;
        found.map(row::map_row).transpose()
    }

    async fn get_product_by_name(
        &self,
        ctx: &RequestContext,
        category_id: Uuid,
        name: &str,
    ) -> Result<Option<Product>> {
        let built = query::build_get_by_name(category_id, name, self.driver.placeholder_style());
        let found = ctx.run("store get", self.driver.fetch_optional(&built)).await?;
        found.map(row::map_row).transpose()
    }
}
