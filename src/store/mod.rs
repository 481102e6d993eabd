//! Store drivers: where built statements are executed.
//!
//! The repository never talks to a database client directly. It hands a
//! [`BuiltQuery`] to a [`StoreDriver`] and gets raw [`ProductRow`]s back, so
//! the SQL path can be exercised against [`InMemoryStore`] in tests and
//! against PostgreSQL in production.

use crate::error::Result;
use crate::query::{BuiltQuery, PlaceholderStyle};
use crate::row::ProductRow;

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;

/// Trait for store driver implementations.
///
/// Drivers report "no rows" on a point lookup as `Ok(None)`, never as an
/// error. Every other failure comes back as `Error::Store`.
#[allow(async_fn_in_trait)]
pub trait StoreDriver: Send + Sync {
    /// Placeholder convention statements must be rebound into.
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Dollar
    }

    /// Run a statement and return every row.
    ///
    /// # Errors
    /// Returns `Err` if the store is unreachable or rejects the statement
    async fn fetch_all(&self, query: &BuiltQuery) -> Result<Vec<ProductRow>>;

    /// Run a statement expected to yield at most one row.
    ///
    /// # Errors
    /// Returns `Err` if the store is unreachable or rejects the statement
    async fn fetch_optional(&self, query: &BuiltQuery) -> Result<Option<ProductRow>>;

    /// Run a write statement, returning the number of affected rows.
    ///
    /// # Errors
    /// Returns `Err` if the store is unreachable or rejects the statement
    async fn execute(&self, query: &BuiltQuery) -> Result<u64>;
}
