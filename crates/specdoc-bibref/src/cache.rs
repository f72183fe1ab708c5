//! Process-wide cache for remote lookup responses.
//!
//! Caching across resolution passes is optional: correctness never depends
//! on it. When used, the discipline is single-writer/multiple-reader,
//! entries are immutable once stored, and invalidation is explicit — there
//! is no implicit expiry.

use crate::client::RemoteLookup;
use crate::error::Result;
use crate::record::{BiblioRecord, RefMap};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Concurrency-safe store of previously fetched records.
#[derive(Debug, Default)]
pub struct RemoteCache {
    entries: RwLock<HashMap<String, BiblioRecord>>,
}

impl RemoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached record.
    pub fn get(&self, key: &str) -> Option<BiblioRecord> {
        // Entries are immutable once stored, so a poisoned lock still
        // holds a valid map.
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    /// Store fetched records. A key already present keeps its existing
    /// entry; stored entries are never overwritten.
    pub fn store(&self, records: &RefMap) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for (key, record) in records {
            entries
                .entry(key.clone())
                .or_insert_with(|| record.clone());
        }
    }

    /// Explicitly drop the given keys so the next lookup refetches them.
    pub fn invalidate<'k>(&self, keys: impl IntoIterator<Item = &'k str>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for key in keys {
            entries.remove(key);
        }
    }

    /// Explicitly drop every cached entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A lookup wrapper that consults a [`RemoteCache`] before the inner
/// source and stores whatever the source returns.
pub struct CachedLookup<L> {
    inner: L,
    cache: RemoteCache,
}

impl<L: RemoteLookup> CachedLookup<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            cache: RemoteCache::new(),
        }
    }

    pub fn cache(&self) -> &RemoteCache {
        &self.cache
    }
}

#[async_trait]
impl<L: RemoteLookup> RemoteLookup for CachedLookup<L> {
    /// Cache hits are served even when the backing fetch fails; the call
    /// errors only when it has nothing at all to return, so that keys the
    /// cache still covers keep resolving while the service is down.
    async fn lookup(&self, keys: &[String]) -> Result<RefMap> {
        let mut found = RefMap::new();
        let mut missing: Vec<String> = Vec::new();
        for key in keys {
            match self.cache.get(key) {
                Some(record) => {
                    found.insert(key.clone(), record);
                }
                None => missing.push(key.clone()),
            }
        }

        if !missing.is_empty() {
            match self.inner.lookup(&missing).await {
                Ok(fetched) => {
                    self.cache.store(&fetched);
                    found.extend(fetched);
                }
                Err(error) if found.is_empty() => return Err(error),
                Err(error) => {
                    tracing::warn!(
                        error = %error,
                        cached = found.len(),
                        missing = missing.len(),
                        "serving cached records only; fetch for uncached keys failed"
                    );
                }
            }
        }

        Ok(found)
    }
}
