//! Catalog domain types.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity stamped on rows created by the service itself.
pub const SYSTEM_ACTOR: &str = "SYSTEM";

const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 150;
const DESCRIPTION_MAX_CHARS: usize = 255;

/// A catalog product.
///
/// Values of this type are always well-formed: rows that would violate an
/// invariant are rejected by [`crate::row::map_row`] before they get here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub supplier_id: Uuid,
    pub unit_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub base_price: f64,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
}

/// An ordered product listing.
pub type Products = Vec<Product>;

/// Fields a caller supplies to create a product.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductDraft {
    pub category_id: Uuid,
    pub supplier_id: Uuid,
    pub unit_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub base_price: f64,
    pub stock: i64,
}

impl ProductDraft {
    /// Check the draft against the create constraints.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDraft` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.category_id.is_nil() || self.supplier_id.is_nil() || self.unit_id.is_nil() {
            return Err(Error::InvalidDraft(
                "category, supplier and unit ids are required".to_string(),
            ));
        }

        let name_len = self.name.chars().count();
        if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name_len) {
            return Err(Error::InvalidDraft(format!(
                "name must be {}-{} characters, got {}",
                NAME_MIN_CHARS, NAME_MAX_CHARS, name_len
            )));
        }

        if let Some(description) = &self.description {
            if description.is_empty() || description.chars().count() > DESCRIPTION_MAX_CHARS {
                return Err(Error::InvalidDraft(format!(
                    "description must be 1-{} characters",
                    DESCRIPTION_MAX_CHARS
                )));
            }
        }

        if !self.base_price.is_finite() || self.base_price <= 0.0 {
            return Err(Error::InvalidDraft(format!(
                "base price must be positive, got {}",
                self.base_price
            )));
        }

        if self.stock < 0 {
            return Err(Error::InvalidDraft(format!(
                "stock must not be negative, got {}",
                self.stock
            )));
        }

        Ok(())
    }

    /// Turn the draft into a new product created by `created_by` at `created_at`.
    pub fn into_product(self, id: Uuid, created_at: DateTime<Utc>, created_by: &str) -> Product {
        Product {
            id,
            category_id: self.category_id,
            supplier_id: self.supplier_id,
            unit_id: self.unit_id,
            name: self.name,
            description: self.description,
            base_price: self.base_price,
            stock: self.stock,
            created_at,
            created_by: created_by.to_string(),
            updated_at: None,
            updated_by: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            category_id: Uuid::from_u128(1),
            supplier_id: Uuid::from_u128(2),
            unit_id: Uuid::from_u128(3),
            name: "Kangkung Potong".to_string(),
            description: Some("Fresh water spinach".to_string()),
            base_price: 3000.0,
            stock: 100,
        }
    }

    #[test]
    fn test_valid_draft() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn test_draft_rejects_short_name() {
        let mut d = draft();
        d.name = "ab".to_string();
        assert!(matches!(d.validate(), Err(Error::InvalidDraft(_))));
    }

    #[test]
    fn test_draft_rejects_empty_description() {
        let mut d = draft();
        d.description = Some(String::new());
        assert!(d.validate().unwrap_err().is_validation());

        d.description = None;
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_draft_rejects_non_positive_price() {
        let mut d = draft();
        d.base_price = 0.0;
        assert!(d.validate().is_err());

        d.base_price = f64::NAN;
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_draft_rejects_negative_stock_and_nil_ids() {
        let mut d = draft();
        d.stock = -1;
        assert!(d.validate().is_err());

        let mut d = draft();
        d.unit_id = Uuid::nil();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_into_product_stamps_creation() {
        let at = Utc::now();
        let id = Uuid::from_u128(42);
        let product = draft().into_product(id, at, SYSTEM_ACTOR);

        assert_eq!(product.id, id);
        assert_eq!(product.created_at, at);
        assert_eq!(product.created_by, "SYSTEM");
        assert!(product.updated_at.is_none());
        assert!(product.updated_by.is_none());
    }
}
