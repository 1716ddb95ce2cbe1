use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::models::{Model, ProviderId, Tier};

/// Cache key: provider plus a non-reversible credential fingerprint. The raw
/// credential is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub provider: ProviderId,
    pub fingerprint: String,
}

impl CacheKey {
    /// `scope` separates credentials that list different things with the
    /// same key (an Azure key against two resource endpoints).
    pub fn new(provider: ProviderId, credential: &str, scope: Option<&str>) -> Self {
        Self {
            provider,
            fingerprint: fingerprint(credential, scope),
        }
    }
}

pub fn fingerprint(credential: &str, scope: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"modelcat:cred:");
    hasher.update(credential.as_bytes());
    if let Some(scope) = scope {
        hasher.update(b":");
        hasher.update(scope.trim_end_matches('/').as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// A resolved model list. Entries are replaced wholesale, never mutated.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub models: Arc<Vec<Model>>,
    pub fetched_at: Instant,
    pub tier: Tier,
}

/// Short-TTL memo of resolved model lists, keyed per (provider, credential).
///
/// Expired entries are treated as absent and dropped lazily on read;
/// `evict_expired()` bounds memory between reads.
#[derive(Clone)]
pub struct ResultCache {
    entries: Arc<DashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        if let Some(entry) = self.entries.get(key) {
            if entry.fetched_at.elapsed() < self.ttl {
                return Some(entry.value().clone());
            }
            // expired: drop the read ref before removing
            drop(entry);
            self.entries
                .remove_if(key, |_, e| e.fetched_at.elapsed() >= self.ttl);
        }
        None
    }

    /// Store a fresh entry. `fetched_at` is stamped under the entry lock and
    /// never moves backwards for a key.
    pub fn put(&self, key: CacheKey, models: Vec<Model>, tier: Tier) -> CacheEntry {
        let models = Arc::new(models);
        match self.entries.entry(key) {
            Entry::Occupied(mut slot) => {
                let fetched_at = Instant::now().max(slot.get().fetched_at);
                let entry = CacheEntry {
                    models,
                    fetched_at,
                    tier,
                };
                slot.insert(entry.clone());
                entry
            }
            Entry::Vacant(slot) => {
                let entry = CacheEntry {
                    models,
                    fetched_at: Instant::now(),
                    tier,
                };
                slot.insert(entry.clone());
                entry
            }
        }
    }

    /// Drop every entry for one provider (e.g. its credentials changed).
    pub fn invalidate_provider(&self, provider: ProviderId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| k.provider != provider);
        before.saturating_sub(self.entries.len())
    }

    pub fn invalidate_all(&self) -> usize {
        let before = self.entries.len();
        self.entries.clear();
        before
    }

    /// Remove all expired entries. Called periodically by the sweep job.
    pub fn evict_expired(&self) -> usize {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
        before.saturating_sub(self.entries.len())
    }

    /// Current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
