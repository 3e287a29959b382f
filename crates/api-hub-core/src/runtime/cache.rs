// crates/api-hub-core/src/runtime/cache.rs
// ============================================================================
// Module: API Hub Query Cache
// Description: Keyed read cache with explicit invalidation.
// Purpose: Serve repeated reads without hitting the store until a write lands.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`QueryCache`] is an explicit object owned by the data-access layer; there
//! is no process-wide instance. Entries are keyed by [`CacheKey`] and cloned
//! out on read. Writers invalidate exactly the keys they affect, either one key
//! at a time or a whole [`Collection`] (every filtered task query, for
//! example).
//!
//! Every invalidation bumps a generation counter. Readers snapshot it before
//! going to the store and pass it to [`QueryCache::insert`], which refuses
//! the value when a write landed in between. Entries expire after the
//! [`CachePolicy`] TTL and the map never holds more than its capacity.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

use crate::core::ApiKey;
use crate::core::MockResponse;
use crate::core::Project;
use crate::core::Task;
use crate::core::TaskId;
use crate::interfaces::TaskFilter;

// ============================================================================
// SECTION: Keys
// ============================================================================

/// Cached query collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Project listings.
    Projects,
    /// Filtered task listings.
    Tasks,
    /// API key listings.
    ApiKeys,
    /// Per-task mock listings and single-scenario lookups.
    MockResponses,
}

/// Cache key for one query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// All projects.
    Projects,
    /// Tasks matching a filter.
    Tasks(TaskFilter),
    /// All API keys.
    ApiKeys,
    /// Every mock response of one task.
    MockResponses(TaskId),
    /// One task scenario.
    MockResponse(TaskId, String),
}

impl CacheKey {
    /// Returns the collection this key belongs to.
    #[must_use]
    pub const fn collection(&self) -> Collection {
        match self {
            Self::Projects => Collection::Projects,
            Self::Tasks(_) => Collection::Tasks,
            Self::ApiKeys => Collection::ApiKeys,
            Self::MockResponses(_) | Self::MockResponse(..) => Collection::MockResponses,
        }
    }

    /// Returns the task a mock key is scoped to.
    #[must_use]
    pub const fn mock_task(&self) -> Option<&TaskId> {
        match self {
            Self::MockResponses(task_id) | Self::MockResponse(task_id, _) => Some(task_id),
            Self::Projects | Self::Tasks(_) | Self::ApiKeys => None,
        }
    }
}

// ============================================================================
// SECTION: Values
// ============================================================================

/// Cached query result.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    /// Project listing.
    Projects(Vec<Project>),
    /// Task listing.
    Tasks(Vec<Task>),
    /// API key listing.
    ApiKeys(Vec<ApiKey>),
    /// Mock listing for one task.
    MockResponses(Vec<MockResponse>),
    /// Single scenario lookup; `None` caches a miss.
    MockResponse(Option<MockResponse>),
}

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Lifetime and size bounds for cached entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Age after which an entry is treated as absent.
    pub ttl: Duration,
    /// Maximum number of entries held at once.
    pub capacity: usize,
}

impl CachePolicy {
    /// Default entry lifetime.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30);
    /// Default entry bound.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Policy that never stores anything.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { ttl: Duration::ZERO, capacity: 0 }
    }

    /// Returns true when entries can be stored at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.capacity > 0 && !self.ttl.is_zero()
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self { ttl: Self::DEFAULT_TTL, capacity: Self::DEFAULT_CAPACITY }
    }
}

/// Invalidation counter observed before a store read.
///
/// [`QueryCache::insert`] refuses values read under an older generation, so a
/// listing that raced with a write is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeneration(u64);

// ============================================================================
// SECTION: Query Cache
// ============================================================================

/// Stored value with its insertion time.
#[derive(Debug)]
struct CacheEntry {
    /// Cached value.
    value: CachedValue,
    /// Insertion time, for expiry.
    stored_at: Instant,
    /// Insertion order, for eviction.
    sequence: u64,
}

/// Entries plus the invalidation counter.
#[derive(Debug, Default)]
struct CacheState {
    /// Entries by key.
    entries: HashMap<CacheKey, CacheEntry>,
    /// Bumped by every invalidation.
    generation: u64,
    /// Next insertion sequence number.
    next_sequence: u64,
}

/// Mutex-guarded query cache bounded by a [`CachePolicy`].
#[derive(Debug, Default)]
pub struct QueryCache {
    /// Lifetime and size bounds.
    policy: CachePolicy,
    /// Entries and generation.
    state: Mutex<CacheState>,
}

impl QueryCache {
    /// Creates an empty cache with the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache with an explicit policy.
    #[must_use]
    pub fn with_policy(policy: CachePolicy) -> Self {
        Self { policy, state: Mutex::default() }
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Locks the state, recovering from poisoning since entries are disposable.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current invalidation generation.
    #[must_use]
    pub fn generation(&self) -> CacheGeneration {
        CacheGeneration(self.lock().generation)
    }

    /// Returns a clone of the cached value for a key; expired entries are dropped.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        let mut state = self.lock();
        let expired = state.entries.get(key)?.stored_at.elapsed() >= self.policy.ttl;
        if expired {
            state.entries.remove(key);
            return None;
        }
        state.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Stores a value read under `observed`.
    ///
    /// Returns false without storing when caching is disabled or an
    /// invalidation happened since `observed` was taken. When full, expired
    /// entries are pruned first and then the oldest entry is evicted.
    pub fn insert(&self, key: CacheKey, value: CachedValue, observed: CacheGeneration) -> bool {
        if !self.policy.is_enabled() {
            return false;
        }
        let mut state = self.lock();
        if state.generation != observed.0 {
            return false;
        }
        if !state.entries.contains_key(&key) && state.entries.len() >= self.policy.capacity {
            let ttl = self.policy.ttl;
            state.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
            if state.entries.len() >= self.policy.capacity {
                let oldest = state
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.sequence)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    state.entries.remove(&oldest);
                }
            }
        }
        let sequence = state.next_sequence;
        state.next_sequence = sequence.wrapping_add(1);
        state.entries.insert(key, CacheEntry { value, stored_at: Instant::now(), sequence });
        true
    }

    /// Returns true when a live entry is cached for a key.
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock()
            .entries
            .get(key)
            .is_some_and(|entry| entry.stored_at.elapsed() < self.policy.ttl)
    }

    /// Returns the number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns true when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Drops one key.
    pub fn invalidate(&self, key: &CacheKey) {
        let mut state = self.lock();
        state.generation = state.generation.wrapping_add(1);
        state.entries.remove(key);
    }

    /// Drops every key in a collection.
    pub fn invalidate_collection(&self, collection: Collection) {
        let mut state = self.lock();
        state.generation = state.generation.wrapping_add(1);
        state.entries.retain(|key, _| key.collection() != collection);
    }

    /// Drops every mock key scoped to one task.
    pub fn invalidate_task_mocks(&self, task_id: &TaskId) {
        let mut state = self.lock();
        state.generation = state.generation.wrapping_add(1);
        state.entries.retain(|key, _| key.mock_task() != Some(task_id));
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.generation = state.generation.wrapping_add(1);
        state.entries.clear();
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
