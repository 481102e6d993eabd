//! Sort allow-list and direction validation.
//!
//! Sort columns cannot be bound as query parameters, so they are checked
//! against a closed vocabulary before being written into SQL text. The
//! vocabulary is fixed here at compile time and never derived from input.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Column names a product listing may be sorted by.
pub const VALID_PRODUCT_SORTS: [&str; 3] = ["created_at", "base_price", "name"];

/// An allow-listed sort column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProductSort {
    CreatedAt,
    BasePrice,
    Name,
}

impl ProductSort {
    /// The column this sort orders by.
    pub fn column(&self) -> &'static str {
        match self {
            ProductSort::CreatedAt => "created_at",
            ProductSort::BasePrice => "base_price",
            ProductSort::Name => "name",
        }
    }
}

impl FromStr for ProductSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "created_at" => Ok(ProductSort::CreatedAt),
            "base_price" => Ok(ProductSort::BasePrice),
            "name" => Ok(ProductSort::Name),
            _ => Err(Error::InvalidSort(s.to_string())),
        }
    }
}

impl fmt::Display for ProductSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction.
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(Error::InvalidDirection(s.to_string())),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Validate a requested sort column and direction.
///
/// An empty `sort` or `direction` means "not requested" and passes. Membership
/// is case-insensitive.
///
/// # Errors
///
/// - `Error::InvalidSort` if `sort` is non-empty and not in `allowed`
/// - `Error::InvalidDirection` if `direction` is non-empty and not asc/desc
pub fn validate_sort_direction(allowed: &[&str], sort: &str, direction: &str) -> Result<()> {
    if !sort.is_empty() && !allowed.iter().any(|a| a.eq_ignore_ascii_case(sort)) {
        return Err(Error::InvalidSort(sort.to_string()));
    }

    if !direction.trim().is_empty() {
        direction.parse::<SortDirection>()?;
    }

    Ok(())
}

/// Validate and resolve a requested ordering.
///
/// Returns `None` when no sort was requested. A sort without a direction
/// orders ascending.
///
/// # Errors
///
/// Same as [`validate_sort_direction`] against [`VALID_PRODUCT_SORTS`].
pub fn resolve_order(sort: &str, direction: &str) -> Result<Option<(ProductSort, SortDirection)>> {
    validate_sort_direction(&VALID_PRODUCT_SORTS, sort, direction)?;

    if sort.is_empty() {
        return Ok(None);
    }

    let column = sort.parse::<ProductSort>()?;
    let dir = if direction.trim().is_empty() {
        SortDirection::default()
    } else {
        direction.parse()?
    };

    Ok(Some((column, dir)))
}
