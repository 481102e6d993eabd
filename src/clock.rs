//! Time and id-generation capabilities for the create path.
//!
//! Both are injected into [`crate::ProductService`] rather than read from
//! ambient globals, so tests can pin them.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Source of "now".
pub trait Clock: Send + Sync {
    /// Current wall-clock time in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant. Useful in tests.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Source of new product ids.
pub trait IdGenerator: Send + Sync {
    /// A fresh, unique, non-nil id.
    fn new_id(&self) -> Uuid;
}

/// Time-ordered UUIDv7 ids.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn new_id(&self) -> Uuid {
        Uuid::now_v7()
    }
}
