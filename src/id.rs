//! Unique identifiers for sticker results.
//!
//! Two interchangeable strategies behind one trait: random v4 UUIDs from the
//! OS entropy source (the default), and a hashed-clock fallback for targets
//! without one. The engine picks a strategy once at construction; nothing
//! inspects the id format afterwards.

use std::hash::{BuildHasher, Hasher, RandomState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

/// A source of fresh unique sticker ids.
pub trait IdSource: Send + Sync {
    /// Generate one new id, distinct from every previous call.
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs backed by the OS secure random source.
#[derive(Debug, Default)]
pub struct UuidSource;

impl IdSource for UuidSource {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Pseudo-random fallback: wall clock plus a per-source counter, mixed
/// through a randomly keyed hasher. Not cryptographic; unique within and
/// across runs in practice.
#[derive(Debug, Default)]
pub struct ClockSource {
    counter: AtomicU64,
}

impl IdSource for ClockSource {
    fn next_id(&self) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX));
        let count = self.counter.fetch_add(1, Ordering::Relaxed);

        let mut hasher = RandomState::new().build_hasher();
        hasher.write_u64(nanos);
        hasher.write_u64(count);
        format!("{nanos:016x}-{count:04x}-{:016x}", hasher.finish())
    }
}

/// The default id source for this platform.
#[must_use]
pub fn default_id_source() -> Box<dyn IdSource> {
    Box::new(UuidSource)
}
