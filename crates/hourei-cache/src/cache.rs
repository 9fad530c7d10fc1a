use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use hourei_core::Reference;
use serde::Serialize;
use tracing::{debug, trace};

use crate::CacheKey;

/// One memoized detection result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub references: Arc<[Reference]>,
    pub inserted_at: Instant,
    pub hit_count: u64,
    pub engine_version: String,
}

/// The entry with the most hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MostHit {
    pub key: String,
    pub hits: u64,
}

/// Observability-only cache counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub size: usize,
    pub capacity: usize,
    pub evictions: u64,
    /// Sum of per-entry hit counts over live entries.
    pub total_hits: u64,
    pub oldest_entry_age: Option<Duration>,
    pub most_hit: Option<MostHit>,
}

struct Slot {
    entry: CacheEntry,
    last_used: u64,
}

#[derive(Default)]
struct CacheState {
    slots: HashMap<CacheKey, Slot>,
    /// last_used tick → key, oldest first.
    recency: BTreeMap<u64, CacheKey>,
    tick: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
    engine_version: String,
}

impl CacheState {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn remove(&mut self, key: &CacheKey) -> Option<Slot> {
        let slot = self.slots.remove(key)?;
        self.recency.remove(&slot.last_used);
        Some(slot)
    }

    fn touch(&mut self, key: &CacheKey) {
        let tick = self.next_tick();
        if let Some(slot) = self.slots.get_mut(key) {
            self.recency.remove(&slot.last_used);
            slot.last_used = tick;
            self.recency.insert(tick, key.clone());
        }
    }

    fn is_stale(&self, entry: &CacheEntry, ttl: Duration) -> bool {
        entry.engine_version != self.engine_version || entry.inserted_at.elapsed() > ttl
    }
}

/// LRU + TTL + engine-version gated memoization of detection results.
///
/// Safe to share across threads behind an [`Arc`]: the map is guarded by a
/// mutex and every operation takes `&self`. Stale entries (expired, or
/// written by another engine version) are treated as misses and evicted on
/// access, so results never leak across versions.
pub struct ReferenceCache {
    capacity: usize,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl ReferenceCache {
    pub fn new(capacity: usize, ttl: Duration, engine_version: impl Into<String>) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            state: Mutex::new(CacheState {
                engine_version: engine_version.into(),
                ..CacheState::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn engine_version(&self) -> String {
        self.lock().engine_version.clone()
    }

    /// Switch the current engine version; entries written under any other
    /// version become misses.
    pub fn set_engine_version(&self, version: impl Into<String>) {
        self.lock().engine_version = version.into();
    }

    /// Look up a result. Returns a copy owned by the caller.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<Reference>> {
        let mut state = self.lock();
        let Some(stale) = state
            .slots
            .get(key)
            .map(|slot| state.is_stale(&slot.entry, self.ttl))
        else {
            state.misses += 1;
            trace!(key = %key, "cache miss");
            return None;
        };
        if stale {
            state.remove(key);
            state.misses += 1;
            state.evictions += 1;
            debug!(key = %key, "evicted stale cache entry");
            return None;
        }

        state.hits += 1;
        state.touch(key);
        let slot = state.slots.get_mut(key)?;
        slot.entry.hit_count += 1;
        trace!(key = %key, hits = slot.entry.hit_count, "cache hit");
        Some(slot.entry.references.to_vec())
    }

    /// Store a result under the current engine version, evicting the least
    /// recently used entries beyond capacity.
    pub fn set(&self, key: CacheKey, references: &[Reference]) {
        let mut state = self.lock();
        state.remove(&key);
        let tick = state.next_tick();
        let entry = CacheEntry {
            references: Arc::from(references),
            inserted_at: Instant::now(),
            hit_count: 0,
            engine_version: state.engine_version.clone(),
        };
        state.recency.insert(tick, key.clone());
        state.slots.insert(
            key,
            Slot {
                entry,
                last_used: tick,
            },
        );

        while state.slots.len() > self.capacity {
            let Some((_, oldest)) = state.recency.pop_first() else {
                break;
            };
            state.slots.remove(&oldest);
            state.evictions += 1;
            trace!(key = %oldest, "evicted least recently used entry");
        }
    }

    /// True when a fresh entry exists. Does not count as a hit or miss.
    pub fn has(&self, key: &CacheKey) -> bool {
        let mut state = self.lock();
        let Some(stale) = state
            .slots
            .get(key)
            .map(|slot| state.is_stale(&slot.entry, self.ttl))
        else {
            return false;
        };
        if stale {
            state.remove(key);
            state.evictions += 1;
            return false;
        }
        true
    }

    pub fn delete(&self, key: &CacheKey) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Drop every entry. Hit and miss counters are kept.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.slots.clear();
        state.recency.clear();
        debug!("cache cleared");
    }

    /// Evict every expired or version-mismatched entry; returns how many.
    pub fn prune_expired(&self) -> usize {
        let mut state = self.lock();
        let stale: Vec<CacheKey> = state
            .slots
            .iter()
            .filter(|(_, slot)| state.is_stale(&slot.entry, self.ttl))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            state.remove(key);
        }
        state.evictions += stale.len() as u64;
        if !stale.is_empty() {
            debug!(count = stale.len(), "pruned stale cache entries");
        }
        stale.len()
    }

    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn statistics(&self) -> CacheStatistics {
        let state = self.lock();
        let lookups = state.hits + state.misses;
        let hit_rate = if lookups == 0 {
            0.0
        } else {
            state.hits as f64 / lookups as f64
        };
        let oldest_entry_age = state
            .slots
            .values()
            .map(|slot| slot.entry.inserted_at)
            .min()
            .map(|t| t.elapsed());
        let most_hit = state
            .slots
            .iter()
            .filter(|(_, slot)| slot.entry.hit_count > 0)
            .max_by(|(ka, a), (kb, b)| {
                a.entry
                    .hit_count
                    .cmp(&b.entry.hit_count)
                    .then_with(|| kb.cmp(ka))
            })
            .map(|(key, slot)| MostHit {
                key: key.to_string(),
                hits: slot.entry.hit_count,
            });

        CacheStatistics {
            hits: state.hits,
            misses: state.misses,
            hit_rate,
            size: state.slots.len(),
            capacity: self.capacity,
            evictions: state.evictions,
            total_hits: state.slots.values().map(|s| s.entry.hit_count).sum(),
            oldest_entry_age,
            most_hit,
        }
    }
}
