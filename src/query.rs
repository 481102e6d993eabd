//! Parameterized SQL assembly for product reads and writes.
//!
//! Filter values only ever travel as bind arguments. The single piece of
//! text interpolated into a statement is the `ORDER BY` column, and only
//! after it has resolved through the allow-list in [`crate::sort`].
//!
//! Clauses are collected with `?` markers, joined, and then renumbered into
//! the store's native placeholder style by [`rebind`].

use crate::error::Result;
use crate::model::Product;
use crate::sort::{self, ProductSort, SortDirection};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A fixed statement skeleton that clauses are appended to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryTemplate(&'static str);

impl QueryTemplate {
    /// Product listing: products joined to their category, open `WHERE`.
    pub const LIST_PRODUCTS: QueryTemplate = QueryTemplate(concat!(
        "SELECT p.id, p.category_id, p.supplier_id, p.unit_id, p.name, ",
        "p.description, p.base_price, p.stock, p.created_at, p.created_by, p.updated_at, ",
        "p.updated_by FROM products p JOIN categories c ON p.category_id = c.id WHERE 1=1"
    ));

    /// Point lookup by id.
    pub const GET_PRODUCT_BY_ID: QueryTemplate = QueryTemplate(concat!(
        "SELECT p.id, p.category_id, p.supplier_id, p.unit_id, p.name, ",
        "p.description, p.base_price, p.stock, p.created_at, p.created_by, p.updated_at, ",
        "p.updated_by FROM products p WHERE p.id = ?"
    ));

    /// Point lookup by (category, exact name).
    pub const GET_PRODUCT_BY_NAME: QueryTemplate = QueryTemplate(concat!(
        "SELECT p.id, p.category_id, p.supplier_id, p.unit_id, p.name, ",
        "p.description, p.base_price, p.stock, p.created_at, p.created_by, p.updated_at, ",
        "p.updated_by FROM products p WHERE p.category_id = ? AND p.name = ?"
    ));

    /// Insert of a new product.
    pub const CREATE_PRODUCT: QueryTemplate = QueryTemplate(concat!(
        "INSERT INTO products (id, category_id, supplier_id, unit_id, name, description, ",
        "base_price, stock, created_at, created_by) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ));

    /// Raw template text with `?` markers.
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Positional placeholder convention of a store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` markers (MySQL, SQLite)
    Question,
    /// `$1, $2, ...` markers (PostgreSQL)
    #[default]
    Dollar,
}

/// A single bind argument.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Uuid(Uuid),
    Text(String),
    OptText(Option<String>),
    Float(f64),
    Int(i64),
    Timestamp(DateTime<Utc>),
}

/// Statement text plus its positional arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub args: Vec<BindValue>,
}

/// Filters and ordering for a product listing.
///
/// Empty strings mean "not requested". The four fields are also the input of
/// the cache fingerprint (see [`crate::key::ListKey`]).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ProductListQuery {
    name: String,
    category: String,
    sort: String,
    direction: String,
}

impl ProductListQuery {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        sort: impl Into<String>,
        direction: impl Into<String>,
    ) -> Self {
        ProductListQuery {
            name: name.into(),
            category: category.into(),
            sort: sort.into(),
            direction: direction.into(),
        }
    }

    /// Case-insensitive name substring filter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exact category name filter.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Requested sort column, as given.
    pub fn sort(&self) -> &str {
        &self.sort
    }

    /// Requested sort direction, as given.
    pub fn direction(&self) -> &str {
        &self.direction
    }

    /// Validate sort and direction without resolving them.
    pub fn validate(&self) -> Result<()> {
        sort::validate_sort_direction(&sort::VALID_PRODUCT_SORTS, &self.sort, &self.direction)
    }

    /// Resolved ordering, if any was requested.
    pub fn order(&self) -> Result<Option<(ProductSort, SortDirection)>> {
        sort::resolve_order(&self.sort, &self.direction)
    }
}

/// Accumulates clauses and arguments before the final join and rebind.
struct QueryBuilder {
    clauses: Vec<String>,
    args: Vec<BindValue>,
}

impl QueryBuilder {
    fn new(template: &QueryTemplate) -> Self {
        QueryBuilder {
            clauses: vec![template.as_str().to_string()],
            args: Vec::new(),
        }
    }

    fn clause(&mut self, text: impl Into<String>) -> &mut Self {
        self.clauses.push(text.into());
        self
    }

    fn bind(&mut self, value: BindValue) -> &mut Self {
        self.args.push(value);
        self
    }

    fn finish(self, style: PlaceholderStyle) -> BuiltQuery {
        let joined = self.clauses.join(" ");
        BuiltQuery {
            sql: rebind(&joined, style),
            args: self.args,
        }
    }
}

/// Renumber `?` markers into `style`.
///
/// Statements built here never carry a literal `?` outside a placeholder.
pub fn rebind(sql: &str, style: PlaceholderStyle) -> String {
    match style {
        PlaceholderStyle::Question => sql.to_string(),
        PlaceholderStyle::Dollar => {
            let mut out = String::with_capacity(sql.len() + 8);
            let mut n = 0;
            for ch in sql.chars() {
                if ch == '?' {
                    n += 1;
                    out.push('$');
                    out.push_str(&n.to_string());
                } else {
                    out.push(ch);
                }
            }
            out
        }
    }
}

/// Build the listing statement for `query` on top of `template`.
///
/// Clause order is fixed: category, then name, then ordering.
///
/// # Errors
///
/// Returns `Error::InvalidSort` / `Error::InvalidDirection` when the
/// requested ordering fails validation. Nothing is built in that case.
pub fn build_list_query(
    template: &QueryTemplate,
    query: &ProductListQuery,
    style: PlaceholderStyle,
) -> Result<BuiltQuery> {
    let order = query.order()?;
    let mut builder = QueryBuilder::new(template);

    if !query.category().is_empty() {
        builder
            .clause("AND c.name = ?")
            .bind(BindValue::Text(query.category().to_string()));
    }

    if !query.name().is_empty() {
        builder
            .clause("AND LOWER(p.name) LIKE LOWER(?)")
            .bind(BindValue::Text(format!("%{}%", query.name())));
    }

    if let Some((column, direction)) = order {
        builder.clause(format!(
            "ORDER BY p.{} {}",
            column.column(),
            direction.keyword()
        ));
    }

    Ok(builder.finish(style))
}

/// Point lookup of one product by id.
pub fn build_get_by_id(id: Uuid, style: PlaceholderStyle) -> BuiltQuery {
    let mut builder = QueryBuilder::new(&QueryTemplate::GET_PRODUCT_BY_ID);
    builder.bind(BindValue::Uuid(id));
    builder.finish(style)
}

/// Point lookup of one product by category and exact name.
pub fn build_get_by_name(category_id: Uuid, name: &str, style: PlaceholderStyle) -> BuiltQuery {
    let mut builder = QueryBuilder::new(&QueryTemplate::GET_PRODUCT_BY_NAME);
    builder
        .bind(BindValue::Uuid(category_id))
        .bind(BindValue::Text(name.to_string()));
    builder.finish(style)
}

/// Insert of `product`, arguments in column order.
pub fn build_insert(product: &Product, style: PlaceholderStyle) -> BuiltQuery {
    let mut builder = QueryBuilder::new(&QueryTemplate::CREATE_PRODUCT);
    builder
        .bind(BindValue::Uuid(product.id))
        .bind(BindValue::Uuid(product.category_id))
        .bind(BindValue::Uuid(product.supplier_id))
        .bind(BindValue::Uuid(product.unit_id))
        .bind(BindValue::Text(product.name.clone()))
        .bind(BindValue::OptText(product.description.clone()))
        .bind(BindValue::Float(product.base_price))
        .bind(BindValue::Int(product.stock))
        .bind(BindValue::Timestamp(product.created_at))
        .bind(BindValue::Text(product.created_by.clone()));
    builder.finish(style)
}
