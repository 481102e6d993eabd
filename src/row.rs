//! Store rows and the integrity check at the store/domain boundary.
//!
//! The store is trusted for referential integrity, not for arbitrary
//! corruption. A row that breaks any [`Product`] invariant is reported as
//! [`Error::MalformedData`] instead of being turned into a domain value.

use crate::error::{Error, Result};
use crate::model::{Product, Products};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A raw `products` row, as selected by every read statement.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct ProductRow {
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

/// Timestamps at or before the Unix epoch count as unset.
fn is_set(ts: &DateTime<Utc>) -> bool {
    ts.timestamp() > 0
}

impl ProductRow {
    /// First violated invariant, if any.
    fn violation(&self) -> Option<&'static str> {
        if self.id.is_nil() {
            return Some("nil id");
        }
        if self.category_id.is_nil() {
            return Some("nil category id");
        }
        if self.supplier_id.is_nil() {
            return Some("nil supplier id");
        }
        if self.unit_id.is_nil() {
            return Some("nil unit id");
        }
        if self.name.is_empty() {
            return Some("empty name");
        }
        if self.description.as_deref().is_some_and(str::is_empty) {
            return Some("empty description");
        }
        // NaN fails this too
        if !(self.base_price > 0.0) {
            return Some("non-positive base price");
        }
        if self.stock < 0 {
            return Some("negative stock");
        }
        if !is_set(&self.created_at) {
            return Some("unset created_at");
        }
        if self.created_by.is_empty() {
            return Some("empty created_by");
        }
        match (&self.updated_at, &self.updated_by) {
            (None, None) => None,
            (Some(at), Some(by)) if is_set(at) && !by.is_empty() => None,
            _ => Some("inconsistent update stamp"),
        }
    }

    /// Whether every product invariant holds for this row.
    pub fn is_valid(&self) -> bool {
        self.violation().is_none()
    }
}

impl From<&Product> for ProductRow {
    fn from(p: &Product) -> Self {
        ProductRow {
            id: p.id,
            category_id: p.category_id,
            supplier_id: p.supplier_id,
            unit_id: p.unit_id,
            name: p.name.clone(),
            description: p.description.clone(),
            base_price: p.base_price,
            stock: p.stock,
            created_at: p.created_at,
            created_by: p.created_by.clone(),
            updated_at: p.updated_at,
            updated_by: p.updated_by.clone(),
        }
    }
}

/// Map one row into a product.
///
/// # Errors
///
/// Returns `Error::MalformedData` naming the row and the broken invariant.
pub fn map_row(row: ProductRow) -> Result<Product> {
    if let Some(reason) = row.violation() {
        warn!("✗ Malformed product row {}: {}", row.id, reason);
        return Err(Error::MalformedData(format!("product {}: {}", row.id, reason)));
    }

    Ok(Product {
        id: row.id,
        category_id: row.category_id,
        supplier_id: row.supplier_id,
        unit_id: row.unit_id,
        name: row.name,
        description: row.description,
        base_price: row.base_price,
        stock: row.stock,
        created_at: row.created_at,
        created_by: row.created_by,
        updated_at: row.updated_at,
        updated_by: row.updated_by,
    })
}

/// Map a whole result set. All rows map or none do.
///
/// # Errors
///
/// Returns the `Error::MalformedData` of the first invalid row.
pub fn map_rows(rows: Vec<ProductRow>) -> Result<Products> {
    rows.into_iter().map(map_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valid_row() -> ProductRow {
        ProductRow {
            id: Uuid::from_u128(0xe5ec_5a4e),
            category_id: Uuid::from_u128(0xc1),
            supplier_id: Uuid::from_u128(0x51),
            unit_id: Uuid::from_u128(0x01),
            name: "Kangkung Potong 1".to_string(),
            description: Some("Product description".to_string()),
            base_price: 3000.0,
            stock: 100,
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            created_by: "SYSTEM".to_string(),
            updated_at: None,
            updated_by: None,
        }
    }

    #[test]
    fn test_valid_row_maps() {
        let row = valid_row();
        let product = map_row(row.clone()).expect("valid row rejected");
        assert_eq!(ProductRow::from(&product), row);
    }

    #[test]
    fn test_each_invariant_rejects() {
        let breakers: Vec<fn(&mut ProductRow)> = vec![
            |r| r.id = Uuid::nil(),
            |r| r.category_id = Uuid::nil(),
            |r| r.supplier_id = Uuid::nil(),
            |r| r.unit_id = Uuid::nil(),
            |r| r.name.clear(),
            |r| r.description = Some(String::new()),
            |r| r.base_price = 0.0,
            |r| r.base_price = -1.0,
            |r| r.base_price = f64::NAN,
            |r| r.stock = -1,
            |r| r.created_at = DateTime::<Utc>::UNIX_EPOCH,
            |r| r.created_by.clear(),
            |r| r.updated_at = Some(Utc::now()),
            |r| r.updated_by = Some("admin".to_string()),
            |r| {
                r.updated_at = Some(DateTime::<Utc>::UNIX_EPOCH);
                r.updated_by = Some("admin".to_string());
            },
            |r| {
                r.updated_at = Some(Utc::now());
                r.updated_by = Some(String::new());
            },
        ];

        for (i, brk) in breakers.into_iter().enumerate() {
            let mut row = valid_row();
            brk(&mut row);
            assert!(!row.is_valid(), "breaker #{} left the row valid", i);
            assert!(
                matches!(map_row(row), Err(Error::MalformedData(_))),
                "breaker #{} was not reported as malformed",
                i
            );
        }
    }

    #[test]
    fn test_full_update_stamp_is_valid() {
        let mut row = valid_row();
        row.updated_at = Some(Utc::now());
        row.updated_by = Some("admin".to_string());
        row.description = None;
        row.stock = 0;
        assert!(map_row(row).is_ok());
    }

    #[test]
    fn test_map_rows_is_all_or_nothing() {
        let mut bad = valid_row();
        bad.base_price = -1.0;

        let err = map_rows(vec![valid_row(), bad, valid_row()]).unwrap_err();
        assert!(matches!(err, Error::MalformedData(_)));

        let ok = map_rows(vec![valid_row(), valid_row()]).expect("valid rows rejected");
        assert_eq!(ok.len(), 2);

        assert!(map_rows(Vec::new()).expect("empty set rejected").is_empty());
    }
}
