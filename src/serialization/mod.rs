//! Postcard-based cache encoding with versioned envelopes.
//!
//! Every cached listing follows this format:
//! ```text
//! ┌─────────────────┬──────────────────┬──────────────────────────┐
//! │  MAGIC (4 bytes)│ VERSION (varint) │ POSTCARD PAYLOAD (N bytes)│
//! └─────────────────┴──────────────────┴──────────────────────────┘
//!   "PCAT"               u32                postcard(Products)
//! ```
//!
//! Magic and version are checked on every read. An entry from another
//! writer or an older schema is rejected, and the caller treats it as a miss.
//!
//! # Example
//!
//! ```rust
//! use product_catalog::serialization::{decode_products, encode_products};
//!
//! # fn main() -> product_catalog::Result<()> {
//! let bytes = encode_products(&Vec::new())?;
//! assert_eq!(&bytes[0..4], b"PCAT");
//! assert!(decode_products(&bytes)?.is_empty());
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::model::Products;
use serde::{Deserialize, Serialize};

/// Magic header of catalog cache entries: b"PCAT"
pub const CACHE_MAGIC: [u8; 4] = *b"PCAT";

/// Current schema version of cached listings.
///
/// **CRITICAL:** Increment when `Product` changes shape (fields added,
/// removed, reordered or retyped). Entries written under the old version
/// then read as misses and are rebuilt from the store.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Versioned envelope around a cached payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CacheEnvelope<T> {
    /// Must be `CACHE_MAGIC`
    pub magic: [u8; 4],
    /// Must be `CURRENT_SCHEMA_VERSION`
    pub version: u32,
    pub payload: T,
}

impl<T> CacheEnvelope<T> {
    /// Wrap `payload` with the current magic and version.
    pub fn new(payload: T) -> Self {
        Self {
            magic: CACHE_MAGIC,
            version: CURRENT_SCHEMA_VERSION,
            payload,
        }
    }
}

/// Serialize a value inside an envelope.
///
/// # Errors
///
/// Returns `Error::SerializationError` if Postcard serialization fails.
pub fn serialize_for_cache<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    postcard::to_allocvec(&CacheEnvelope::new(value)).map_err(|e| {
        error!("Cache serialization failed: {}", e);
        Error::SerializationError(e.to_string())
    })
}

/// Deserialize a value from an envelope, validating magic and version.
///
/// # Errors
///
/// - `Error::DeserializationError`: truncated or corrupted bytes
/// - `Error::InvalidCacheEntry`: wrong magic header
/// - `Error::VersionMismatch`: written under another schema version
pub fn deserialize_from_cache<'de, T: Deserialize<'de>>(bytes: &'de [u8]) -> Result<T> {
    let envelope: CacheEnvelope<T> = postcard::from_bytes(bytes).map_err(|e| {
        error!("Cache deserialization failed: {}", e);
        Error::DeserializationError(e.to_string())
    })?;

    if envelope.magic != CACHE_MAGIC {
        warn!(
            "Invalid cache entry: expected magic {:?}, got {:?}",
            CACHE_MAGIC, envelope.magic
        );
        return Err(Error::InvalidCacheEntry(format!(
            "Invalid magic: expected {:?}, got {:?}",
            CACHE_MAGIC, envelope.magic
        )));
    }

    if envelope.version != CURRENT_SCHEMA_VERSION {
        warn!(
            "Cache version mismatch: expected {}, got {}",
            CURRENT_SCHEMA_VERSION, envelope.version
        );
        return Err(Error::VersionMismatch {
            expected: CURRENT_SCHEMA_VERSION,
            found: envelope.version,
        });
    }

    Ok(envelope.payload)
}

/// Encode a product listing for the cache.
///
/// # Errors
///
/// Returns `Error::SerializationError` if encoding fails.
pub fn encode_products(products: &Products) -> Result<Vec<u8>> {
    serialize_for_cache(products)
}

/// Decode a cached product listing.
///
/// # Errors
///
/// Same as [`deserialize_from_cache`].
pub fn decode_products(bytes: &[u8]) -> Result<Products> {
    deserialize_from_cache(bytes)
}
