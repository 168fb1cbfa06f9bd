//! Response cache.
//!
//! Rendered responses are cached under a key built from the repository
//! name, the *resolved* commit id and any path qualifiers. Because the id is
//! content-addressed, an entry never goes stale while its key is valid;
//! the TTL only bounds memory. If the revision cannot be resolved there is
//! no key and the response is simply not cached.
//!
//! - `ResponseCache`: port injected into the HTTP layer
//! - `MemoryCache`: in-process map with TTL expiry and an entry cap
//! - `NoCache`: stores nothing

use axum::body::Bytes;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::{CacheConfig, Config};
use crate::git::resolver;

/// A rendered response body plus the headers needed to replay it.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub content_type: String,
    pub content_disposition: Option<String>,
    pub body: Bytes,
}

impl CachedResponse {
    pub fn new(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            content_disposition: None,
            body: body.into(),
        }
    }

    pub fn json<T: serde::Serialize>(value: &T) -> serde_json::Result<Self> {
        Ok(Self::new("application/json", serde_json::to_vec(value)?))
    }
}

pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &str) -> Option<CachedResponse>;
    fn insert(&self, key: String, response: CachedResponse);
}

pub struct NoCache;

impl ResponseCache for NoCache {
    fn get(&self, _key: &str) -> Option<CachedResponse> {
        None
    }

    fn insert(&self, _key: String, _response: CachedResponse) {}
}

struct CacheEntry {
    response: CachedResponse,
    inserted_at: Instant,
    /// Insertion order, for evicting the oldest entry.
    seq: u64,
}

#[derive(Default)]
struct Entries {
    map: HashMap<String, CacheEntry>,
    next_seq: u64,
}

/// In-process cache holding at most `max_entries` responses.
///
/// Expired entries are dropped on every insert; when the cache is still
/// full the oldest entry is evicted.
pub struct MemoryCache {
    entries: Mutex<Entries>,
    ttl: Duration,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Drop expired entries.
    pub fn purge(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            self.purge_locked(&mut entries);
        }
    }

    fn purge_locked(&self, entries: &mut Entries) {
        let before = entries.map.len();
        let ttl = self.ttl;
        entries.map.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        let dropped = before - entries.map.len();
        if dropped > 0 {
            tracing::debug!("Cache purged {} expired entries, {} left", dropped, entries.map.len());
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().map(|e| e.map.len()).unwrap_or(0)
    }
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &str) -> Option<CachedResponse> {
        let mut entries = self.entries.lock().ok()?;
        match entries.map.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                tracing::debug!("Cache hit: {}", key);
                Some(entry.response.clone())
            }
            Some(_) => {
                entries.map.remove(key);
                None
            }
            None => None,
        }
    }

    fn insert(&self, key: String, response: CachedResponse) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        self.purge_locked(&mut entries);

        while entries.map.len() >= self.max_entries && !entries.map.contains_key(&key) {
            let oldest = entries
                .map
                .iter()
                .min_by_key(|(_, entry)| entry.seq)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(oldest) => {
                    tracing::debug!("Cache full, evicting {}", oldest);
                    entries.map.remove(&oldest);
                }
                None => break,
            }
        }

        let seq = entries.next_seq;
        entries.next_seq += 1;
        entries.map.insert(
            key,
            CacheEntry {
                response,
                inserted_at: Instant::now(),
                seq,
            },
        );
    }
}

pub fn from_config(config: &CacheConfig) -> Arc<dyn ResponseCache> {
    if config.enabled {
        Arc::new(MemoryCache::new(config.ttl(), config.max_entries))
    } else {
        Arc::new(NoCache)
    }
}

/// Key for a response about `revision` of repository `name`.
///
/// Returns `None` when the revision does not resolve or the repository is
/// missing; such responses are served uncached.
pub fn cache_key(
    prefix: &str,
    config: &Config,
    name: &str,
    revision: &str,
    extras: &[String],
) -> Option<String> {
    cache_key_at(prefix, &config.repository_path(name), name, revision, extras)
}

fn cache_key_at(
    prefix: &str,
    path: &Path,
    name: &str,
    revision: &str,
    extras: &[String],
) -> Option<String> {
    let id = resolver::resolve_ref(path, revision).ok().flatten()?;
    let mut key = format!("{}-{}-{}", prefix, name, id);
    for extra in extras {
        key.push('-');
        key.push_str(extra);
    }
    Some(key)
}
