//! # product-catalog
//!
//! Product catalog retrieval: parameterized SQL over an allow-listed sort
//! vocabulary, row integrity checks at the store boundary, and cache-aside
//! listing reads.
//!
//! ## Features
//!
//! - **Safe Queries:** filter values are always bound; only allow-listed sort
//!   columns are ever written into SQL text
//! - **Trusted Rows:** rows that break a product invariant are rejected as
//!   malformed, never cached
//! - **Cache-Aside Listings:** reads degrade to the store, writes surface
//!   failures
//! - **Backend Agnostic:** in-memory or Redis cache; PostgreSQL or in-memory
//!   store
//! - **Request Context:** every I/O call honours the caller's deadline and
//!   cancellation
//!
//! ## Quick Start
//!
//! ```ignore
//! use product_catalog::{
//!     backend::InMemoryBackend, config::CatalogConfig, repository::SqlProductRepository,
//!     store::PgStore, ProductListExpander, ProductService, RequestContext,
//! };
//!
//! let config = CatalogConfig::from_env()?;
//! let store = PgStore::connect(&config.database).await?;
//! let expander = ProductListExpander::new(InMemoryBackend::new())
//!     .with_ttl_policy(config.cache.ttl_policy());
//! let service = ProductService::from_expander(expander, SqlProductRepository::new(store));
//!
//! let ctx = RequestContext::with_timeout(std::time::Duration::from_secs(2));
//! let products = service
//!     .get_list_product(&ctx, "kangkung", "Sayur", "base_price", "desc")
//!     .await?;
//! ```

#[macro_use]
extern crate log;

pub mod backend;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod expander;
pub mod key;
pub mod model;
pub mod observability;
pub mod query;
pub mod repository;
pub mod row;
pub mod serialization;
pub mod service;
pub mod sort;
pub mod store;

// Re-exports for convenience
pub use backend::CacheBackend;
pub use context::{CancelHandle, RequestContext};
pub use error::{Error, Result};
pub use expander::ProductListExpander;
pub use model::{Product, ProductDraft, Products};
pub use query::ProductListQuery;
pub use repository::{ProductRepository, SqlProductRepository};
pub use service::ProductService;
pub use store::StoreDriver;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
