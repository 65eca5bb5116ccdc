//! Decryption memoization
//!
//! Process-wide memo of decrypted note payloads so repeated renders of the
//! same note avoid redundant cryptographic work. Entries are keyed by
//! `(ciphertext, key fingerprint)` so a key rotation can never serve a
//! plaintext computed under a previous key, and the cache is bounded with
//! oldest-insertion eviction rather than growing without limit.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, OnceLock};

use tracing::trace;

use crate::constants::DECRYPTION_CACHE_CAPACITY;

#[derive(Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    ciphertext: String,
    key_fingerprint: String,
}

struct CacheInner {
    entries: HashMap<CacheKey, String>,
    order: VecDeque<CacheKey>,
}

/// Bounded memo of ciphertext → plaintext, scoped by key fingerprint.
///
/// Within a process lifetime, identical ciphertext decrypted under the same
/// key always returns the identical cached plaintext. Overwrites of an
/// existing entry are idempotent (same key maps the same ciphertext to the
/// same plaintext).
pub struct DecryptionCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

impl DecryptionCache {
    /// Create a cache bounded to `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// The process-wide cache shared by default-constructed codecs.
    pub fn global() -> Arc<DecryptionCache> {
        static GLOBAL: OnceLock<Arc<DecryptionCache>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(DecryptionCache::new(DECRYPTION_CACHE_CAPACITY)))
            .clone()
    }

    /// Look up the plaintext cached for `(ciphertext, key_fingerprint)`.
    pub fn get(&self, ciphertext: &str, key_fingerprint: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        let hit = inner
            .entries
            .get(&CacheKey {
                ciphertext: ciphertext.to_string(),
                key_fingerprint: key_fingerprint.to_string(),
            })
            .cloned();
        if hit.is_some() {
            trace!(key_fingerprint, "Decryption cache hit");
        }
        hit
    }

    /// Record a successful decryption.
    pub fn insert(&self, ciphertext: &str, key_fingerprint: &str, plaintext: &str) {
        let key = CacheKey {
            ciphertext: ciphertext.to_string(),
            key_fingerprint: key_fingerprint.to_string(),
        };

        let mut inner = self.inner.lock().unwrap();
        if inner.entries.insert(key.clone(), plaintext.to_string()).is_some() {
            // Idempotent overwrite; insertion order is unchanged
            return;
        }
        inner.order.push_back(key);
        while inner.order.len() > self.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.entries.remove(&evicted);
            }
        }
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.clear();
        inner.order.clear();
    }
}
