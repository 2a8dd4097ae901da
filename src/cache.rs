//! Pluggable response cache (§4.3).
//!
//! A cache is anything that can answer `has`/`get`/`put` for a
//! [`Fingerprint`](crate::fingerprint::Fingerprint) key. The dispatcher
//! treats it as an opaque `Arc<dyn Cache>`, so callers can swap in their
//! own backend. The default impl is an async trait plus a
//! `Mutex<HashMap<..>>`, with the lock never held across an `.await`.
//! There is no TTL or LRU eviction: a cached entry lives for the cache's
//! lifetime (§6 Non-goals).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::fingerprint::Fingerprint;
use crate::response::ResponseRecord;

/// A response cache keyed by request fingerprint.
///
/// Implementations must be safe to share across concurrent workers
/// (§4.3) — `Cache` requires `Send + Sync` so it can live behind an
/// `Arc` shared by every worker task.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Whether `key` currently has a cached response.
    async fn has(&self, key: &Fingerprint) -> bool;

    /// Fetch the cached response for `key`, if any.
    async fn get(&self, key: &Fingerprint) -> Option<ResponseRecord>;

    /// Store `response` under `key`, overwriting any existing entry.
    async fn put(&self, key: Fingerprint, response: ResponseRecord);
}

/// In-memory cache backed by a `Mutex<HashMap<..>>`. No TTL, no
/// eviction, no capacity bound — entries persist for the cache's
/// lifetime (§6 Non-goals).
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<Fingerprint, ResponseRecord>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn has(&self, key: &Fingerprint) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key)
    }

    async fn get(&self, key: &Fingerprint) -> Option<ResponseRecord> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    async fn put(&self, key: Fingerprint, response: ResponseRecord) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, response);
    }
}

/// A cache that never stores anything. Every request is a miss; every
/// `put` is discarded. The explicit null object used when a caller wants
/// no caching at all, rather than making caching `Option<Arc<dyn Cache>>`
/// throughout the dispatcher.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

#[async_trait]
impl Cache for NoCache {
    async fn has(&self, _key: &Fingerprint) -> bool {
        false
    }

    async fn get(&self, _key: &Fingerprint) -> Option<ResponseRecord> {
        None
    }

    async fn put(&self, _key: Fingerprint, _response: ResponseRecord) {}
}
