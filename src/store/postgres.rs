//! PostgreSQL store driver on a `sqlx` connection pool.

use super::StoreDriver;
use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::query::{BindValue, BuiltQuery, PlaceholderStyle};
use crate::row::ProductRow;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Bind every argument of a built statement, in order.
///
/// Works for both `sqlx::query` and `sqlx::query_as` builders.
macro_rules! bind_args {
    ($query:expr, $args:expr) => {{
        let mut q = $query;
        for arg in $args {
            q = match arg {
                BindValue::Uuid(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.clone()),
                BindValue::OptText(v) => q.bind(v.clone()),
                BindValue::Float(v) => q.bind(*v),
                BindValue::Int(v) => q.bind(*v),
                BindValue::Timestamp(v) => q.bind(*v),
            };
        }
        q
    }};
}

/// Store driver backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    /// Open a pool sized and aged from `config`.
    ///
    /// # Errors
    /// Returns `Err` if the URL is empty or the first connection fails
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(Error::ConfigError("database url is empty".to_string()));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_open_conns)
            .min_connections(config.max_idle_conns.min(config.max_open_conns))
            .max_lifetime(config.max_conn_lifetime)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await?;

        info!(
            "✓ PostgreSQL pool initialized (max_open: {}, max_idle: {})",
            config.max_open_conns, config.max_idle_conns
        );

        Ok(PgStore { pool })
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl StoreDriver for PgStore {
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Dollar
    }

    async fn fetch_all(&self, query: &BuiltQuery) -> Result<Vec<ProductRow>> {
        debug!("» SQL: {}", query.sql);
        let rows = bind_args!(sqlx::query_as::<_, ProductRow>(&query.sql), &query.args)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn fetch_optional(&self, query: &BuiltQuery) -> Result<Option<ProductRow>> {
        debug!("» SQL: {}", query.sql);
        let row = bind_args!(sqlx::query_as::<_, ProductRow>(&query.sql), &query.args)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn execute(&self, query: &BuiltQuery) -> Result<u64> {
        debug!("» SQL: {}", query.sql);
        let done = bind_args!(sqlx::query(&query.sql), &query.args)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }
}
