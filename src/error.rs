//! Error types for the catalog pipeline.

use std::fmt;
use uuid::Uuid;

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the catalog pipeline.
///
/// Variants fall into the families the service boundary cares about:
/// validation (rejected before any I/O), not-found, malformed store data,
/// cache failures (reads degrade, writes surface), store failures and
/// request-context aborts.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Requested sort column is not in the allow-list.
    InvalidSort(String),

    /// Requested sort direction is neither `asc` nor `desc`.
    InvalidDirection(String),

    /// A create request failed field validation.
    InvalidDraft(String),

    /// Point lookup found no product with this id.
    ProductNotFound(Uuid),

    /// A product with the same name already exists in the category.
    AlreadyExists {
        /// Category the name collided in
        category_id: Uuid,
        /// The colliding name
        name: String,
    },

    /// A store row failed integrity validation.
    ///
    /// Fatal to the request. Nothing derived from the row is cached.
    MalformedData(String),

    /// Cache backend error (Redis connection lost, timeout, protocol error).
    ///
    /// On the read path this is swallowed and the request falls back to the
    /// store.
    BackendError(String),

    /// Writing a freshly loaded list into the cache failed.
    ///
    /// Surfaced to the caller: the cache is unexpectedly unusable.
    CacheWrite(String),

    /// Any store failure other than "no rows".
    Store(String),

    /// Serialization failed when converting a value to cache bytes.
    SerializationError(String),

    /// Deserialization failed when converting cache bytes to a value.
    DeserializationError(String),

    /// Cache entry header is invalid (bad magic or corrupted envelope).
    InvalidCacheEntry(String),

    /// Schema version mismatch between code and cached data.
    VersionMismatch {
        /// Expected schema version (from compiled code)
        expected: u32,
        /// Found schema version (from cached entry)
        found: u32,
    },

    /// The caller cancelled the request while this operation was in flight.
    Cancelled(String),

    /// The caller's deadline passed while this operation was in flight.
    DeadlineExceeded(String),

    /// Configuration error during wiring.
    ConfigError(String),
}

impl Error {
    /// True for input errors rejected before any I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidSort(_) | Error::InvalidDirection(_) | Error::InvalidDraft(_)
        )
    }

    /// True when a point lookup found nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ProductNotFound(_))
    }

    /// True when the caller's context aborted the operation.
    pub fn is_context_abort(&self) -> bool {
        matches!(self, Error::Cancelled(_) | Error::DeadlineExceeded(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSort(sort) => write!(f, "Invalid sort argument: {}", sort),
            Error::InvalidDirection(dir) => {
                write!(f, "Invalid sort direction argument: {}", dir)
            }
            Error::InvalidDraft(msg) => write!(f, "Invalid product: {}", msg),
            Error::ProductNotFound(id) => write!(f, "Product not found: {}", id),
            Error::AlreadyExists { category_id, name } => write!(
                f,
                "Product already exists: {} in category {}",
                name, category_id
            ),
            Error::MalformedData(msg) => {
                write!(f, "Database returned malformed data: {}", msg)
            }
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::CacheWrite(msg) => write!(f, "Cache write failed: {}", msg),
            Error::Store(msg) => write!(f, "Store error: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::InvalidCacheEntry(msg) => write!(f, "Invalid cache entry: {}", msg),
            Error::VersionMismatch { expected, found } => write!(
                f,
                "Cache version mismatch: expected {}, found {}",
                expected, found
            ),
            Error::Cancelled(op) => write!(f, "Cancelled during {}", op),
            Error::DeadlineExceeded(op) => write!(f, "Deadline exceeded during {}", op),
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

#[cfg(feature = "redis")]
impl From<redis::RedisError> for Error {
    fn from(e: redis::RedisError) -> Self {
        Error::BackendError(format!("Redis error: {}", e))
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::Store(e.to_string())
    }
}
