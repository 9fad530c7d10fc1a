//! Result cache: LRU eviction, TTL expiry, and engine-version gating for
//! detection results.

mod cache;
mod key;

pub use cache::{CacheEntry, CacheStatistics, MostHit, ReferenceCache};
pub use key::{CacheKey, SHORT_KEY_LIMIT};
