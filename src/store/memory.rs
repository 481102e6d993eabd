//! In-memory store driver.
//!
//! Interprets exactly the statements [`crate::query`] builds against a vector
//! of rows, and records every statement it sees. Used by tests and benches in
//! place of a live database.

use super::StoreDriver;
use crate::error::{Error, Result};
use crate::query::{BindValue, BuiltQuery, PlaceholderStyle};
use crate::row::ProductRow;
use crate::sort::{ProductSort, SortDirection};
use dashmap::DashMap;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    rows: RwLock<Vec<ProductRow>>,
    categories: DashMap<Uuid, String>,
    statements: Mutex<Vec<BuiltQuery>>,
    failure: Mutex<Option<Error>>,
    latency: Mutex<Option<Duration>>,
    list_calls: AtomicUsize,
    lookup_calls: AtomicUsize,
    exec_calls: AtomicUsize,
}

/// Store driver over an in-process row vector.
///
/// Clones share the same rows and counters.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
    style: PlaceholderStyle,
}

impl InMemoryStore {
    /// Empty store expecting `$n` placeholders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store expecting the given placeholder style.
    pub fn with_style(style: PlaceholderStyle) -> Self {
        InMemoryStore {
            inner: Arc::default(),
            style,
        }
    }

    /// Register a category so listing by category name can resolve it.
    pub fn add_category(&self, id: Uuid, name: impl Into<String>) {
        self.inner.categories.insert(id, name.into());
    }

    /// Insert a row as-is, bypassing every check. Malformed rows are allowed.
    pub async fn insert_row(&self, row: ProductRow) {
        self.inner.rows.write().await.push(row);
    }

    /// Snapshot of every stored row.
    pub async fn rows(&self) -> Vec<ProductRow> {
        self.inner.rows.read().await.clone()
    }

    /// Make every following call fail with `err` (`None` to recover).
    pub async fn set_failure(&self, err: Option<Error>) {
        *self.inner.failure.lock().await = err;
    }

    /// Delay every following call by `latency`.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        *self.inner.latency.lock().await = latency;
    }

    /// Every statement received so far, in order.
    pub async fn statements(&self) -> Vec<BuiltQuery> {
        self.inner.statements.lock().await.clone()
    }

    /// Number of `fetch_all` calls.
    pub fn list_calls(&self) -> usize {
        self.inner.list_calls.load(AtomicOrdering::SeqCst)
    }

    /// Number of `fetch_optional` calls.
    pub fn lookup_calls(&self) -> usize {
        self.inner.lookup_calls.load(AtomicOrdering::SeqCst)
    }

    /// Number of `execute` calls.
    pub fn exec_calls(&self) -> usize {
        self.inner.exec_calls.load(AtomicOrdering::SeqCst)
    }

    async fn enter(&self, query: &BuiltQuery) -> Result<()> {
        self.inner.statements.lock().await.push(query.clone());

        let latency = *self.inner.latency.lock().await;
        if let Some(d) = latency {
            tokio::time::sleep(d).await;
        }

        match self.inner.failure.lock().await.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn text_arg<'a>(args: &mut impl Iterator<Item = &'a BindValue>) -> Result<&'a str> {
        match args.next() {
            Some(BindValue::Text(v)) => Ok(v),
            other => Err(Error::Store(format!("expected text argument, got {:?}", other))),
        }
    }

    fn uuid_arg<'a>(args: &mut impl Iterator<Item = &'a BindValue>) -> Result<Uuid> {
        match args.next() {
            Some(BindValue::Uuid(v)) => Ok(*v),
            other => Err(Error::Store(format!("expected uuid argument, got {:?}", other))),
        }
    }

    fn order_of(sql: &str) -> Result<Option<(ProductSort, SortDirection)>> {
        let Some(pos) = sql.find("ORDER BY p.") else {
            return Ok(None);
        };
        let mut words = sql[pos + "ORDER BY p.".len()..].split_whitespace();
        let column = words.next().unwrap_or_default().parse::<ProductSort>()?;
        let direction = words.next().unwrap_or_default().parse::<SortDirection>()?;
        Ok(Some((column, direction)))
    }

    fn compare(a: &ProductRow, b: &ProductRow, column: ProductSort) -> Ordering {
        match column {
            ProductSort::CreatedAt => a.created_at.cmp(&b.created_at),
            ProductSort::BasePrice => a
                .base_price
                .partial_cmp(&b.base_price)
                .unwrap_or(Ordering::Equal),
            ProductSort::Name => a.name.cmp(&b.name),
        }
    }

    fn row_from_insert(args: &[BindValue]) -> Result<ProductRow> {
        match args {
            [
                BindValue::Uuid(id),
                BindValue::Uuid(category_id),
                BindValue::Uuid(supplier_id),
                BindValue::Uuid(unit_id),
                BindValue::Text(name),
                BindValue::OptText(description),
                BindValue::Float(base_price),
                BindValue::Int(stock),
                BindValue::Timestamp(created_at),
                BindValue::Text(created_by),
            ] => {
                Ok(ProductRow {
                    id: *id,
                    category_id: *category_id,
                    supplier_id: *supplier_id,
                    unit_id: *unit_id,
                    name: name.clone(),
                    description: description.clone(),
                    base_price: *base_price,
                    stock: *stock,
                    created_at: *created_at,
                    created_by: created_by.clone(),
                    updated_at: None,
                    updated_by: None,
                })
            }
            _ => Err(Error::Store(format!(
                "insert arguments do not match the products columns: {:?}",
                args
            ))),
        }
    }
}

impl StoreDriver for InMemoryStore {
    fn placeholder_style(&self) -> PlaceholderStyle {
        self.style
    }

    async fn fetch_all(&self, query: &BuiltQuery) -> Result<Vec<ProductRow>> {
        self.inner.list_calls.fetch_add(1, AtomicOrdering::SeqCst);
        self.enter(query).await?;

        let mut args = query.args.iter();
        let category = if query.sql.contains("c.name =") {
            Some(Self::text_arg(&mut args)?)
        } else {
            None
        };
        let pattern = if query.sql.contains("LIKE") {
            Some(Self::text_arg(&mut args)?.trim_matches('%').to_lowercase())
        } else {
            None
        };

        let mut rows: Vec<ProductRow> = self
            .inner
            .rows
            .read()
            .await
            .iter()
            .filter(|r| match category {
                Some(c) => self
                    .inner
                    .categories
                    .get(&r.category_id)
                    .is_some_and(|name| name.as_str() == c),
                None => true,
            })
            .filter(|r| match &pattern {
                Some(p) => r.name.to_lowercase().contains(p.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        if let Some((column, direction)) = Self::order_of(&query.sql)? {
            rows.sort_by(|a, b| {
                let ord = Self::compare(a, b, column);
                match direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        Ok(rows)
    }

    async fn fetch_optional(&self, query: &BuiltQuery) -> Result<Option<ProductRow>> {
        self.inner.lookup_calls.fetch_add(1, AtomicOrdering::SeqCst);
        self.enter(query).await?;

        let mut args = query.args.iter();
        let rows = self.inner.rows.read().await;

        if query.sql.contains("p.category_id =") {
            let category_id = Self::uuid_arg(&mut args)?;
            let name = Self::text_arg(&mut args)?;
            return Ok(rows
                .iter()
                .find(|r| r.category_id == category_id && r.name == name)
                .cloned());
        }

        let id = Self::uuid_arg(&mut args)?;
        Ok(rows.iter().find(|r| r.id == id).cloned())
    }

    async fn execute(&self, query: &BuiltQuery) -> Result<u64> {
        self.inner.exec_calls.fetch_add(1, AtomicOrdering::SeqCst);
        self.enter(query).await?;

        let row = Self::row_from_insert(&query.args)?;
        let mut rows = self.inner.rows.write().await;
        if rows.iter().any(|r| r.id == row.id) {
            return Err(Error::Store(format!("duplicate key: products.id {}", row.id)));
        }
        rows.push(row);
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{
        build_get_by_id, build_get_by_name, build_list_query, ProductListQuery, QueryTemplate,
    };
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    fn row(n: u128, category: u128, name: &str, price: f64) -> ProductRow {
        ProductRow {
            id: Uuid::from_u128(n),
            category_id: Uuid::from_u128(category),
            supplier_id: Uuid::from_u128(0x51),
            unit_id: Uuid::from_u128(0x01),
            name: name.to_string(),
            description: None,
            base_price: price,
            stock: 10,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + ChronoDuration::minutes(n as i64),
            created_by: "SYSTEM".to_string(),
            updated_at: None,
            updated_by: None,
        }
    }

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.add_category(Uuid::from_u128(0xc1), "Sayur");
        store.add_category(Uuid::from_u128(0xc2), "Buah");
        store.insert_row(row(1, 0xc1, "Kangkung", 3000.0)).await;
        store.insert_row(row(2, 0xc1, "Bayam", 2500.0)).await;
        store.insert_row(row(3, 0xc2, "Apel", 12000.0)).await;
        store
    }

    fn list(q: &ProductListQuery) -> BuiltQuery {
        build_list_query(&QueryTemplate::LIST_PRODUCTS, q, PlaceholderStyle::Dollar).unwrap()
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let store = seeded().await;

        let all = store.fetch_all(&list(&ProductListQuery::default())).await.unwrap();
        assert_eq!(all.len(), 3);

        let sayur = store
            .fetch_all(&list(&ProductListQuery::new("", "Sayur", "base_price", "asc")))
            .await
            .unwrap();
        let names: Vec<_> = sayur.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Bayam", "Kangkung"]);

        let by_name = store
            .fetch_all(&list(&ProductListQuery::new("KANG", "", "", "")))
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);

        assert_eq!(store.list_calls(), 3);
        assert_eq!(store.statements().await.len(), 3);
    }

    #[tokio::test]
    async fn test_point_lookups() {
        let store = seeded().await;

        let found = store
            .fetch_optional(&build_get_by_id(Uuid::from_u128(2), PlaceholderStyle::Dollar))
            .await
            .unwrap();
        assert_eq!(found.map(|r| r.name), Some("Bayam".to_string()));

        let missing = store
            .fetch_optional(&build_get_by_id(Uuid::from_u128(99), PlaceholderStyle::Dollar))
            .await
            .unwrap();
        assert!(missing.is_none());

        let by_name = store
            .fetch_optional(&build_get_by_name(
                Uuid::from_u128(0xc2),
                "Apel",
                PlaceholderStyle::Dollar,
            ))
            .await
            .unwrap();
        assert!(by_name.is_some());
        assert_eq!(store.lookup_calls(), 3);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = seeded().await;
        store
            .set_failure(Some(Error::Store("connection refused".into())))
            .await;

        let err = store
            .fetch_all(&list(&ProductListQuery::default()))
            .await
            .unwrap_err();
        assert_eq!(err, Error::Store("connection refused".into()));

        store.set_failure(None).await;
        assert!(store.fetch_all(&list(&ProductListQuery::default())).await.is_ok());
    }
}
