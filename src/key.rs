//! Cache key management for product listings.

use crate::query::ProductListQuery;

/// Namespace of every listing key.
pub const LIST_KEY_PREFIX: &str = "products";

/// Builder for product listing cache keys.
pub struct ListKey;

impl ListKey {
    /// Deterministic cache key for `query`.
    ///
    /// The four fields are written raw, in fixed order, each behind its own
    /// label. Equal queries share a key; changing any single field changes it.
    pub fn fingerprint(query: &ProductListQuery) -> String {
        Self::build_composite(&[
            LIST_KEY_PREFIX,
            "product_name",
            query.name(),
            "category_type",
            query.category(),
            "sort",
            query.sort(),
            "direction",
            query.direction(),
        ])
    }

    /// Build composite key from parts.
    pub fn build_composite(parts: &[&str]) -> String {
        parts.join(":")
    }
}
