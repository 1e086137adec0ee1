//! In-memory keyed store with per-entry expiry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::entry::CacheEntry;

/// In-memory response cache with lazy expiry.
///
/// Cloning is cheap and yields a handle onto the same store, so a cache can be
/// created once and handed to every consumer that should share it. Expired
/// entries are only removed when read; there is no background sweep.
pub struct ResponseCache<V> {
  entries: Arc<Mutex<HashMap<String, CacheEntry<V>>>>,
}

impl<V> ResponseCache<V> {
  pub fn new() -> Self {
    Self {
      entries: Arc::new(Mutex::new(HashMap::new())),
    }
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
    // Every mutation is a single insert/remove, so a poisoned map is still consistent
    self.entries.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Get a fresh value. An expired entry is evicted and `None` returned.
  pub fn get(&self, key: &str) -> Option<Arc<V>> {
    self.get_entry(key).map(|(value, _)| value)
  }

  /// Like `get`, also returning the wall-clock time the value was stored.
  pub(super) fn get_entry(&self, key: &str) -> Option<(Arc<V>, chrono::DateTime<chrono::Utc>)> {
    let mut entries = self.lock();
    let entry = entries.get(key)?;

    let now = Instant::now();
    if entry.is_fresh(now) {
      return Some((Arc::clone(&entry.value), entry.cached_at));
    }

    let age_ms = now.duration_since(entry.stored_at).as_millis() as u64;
    debug!(key, age_ms, "evicting expired cache entry");
    entries.remove(key);
    None
  }

  /// Whether a fresh entry exists. Evicts an expired one.
  pub fn has(&self, key: &str) -> bool {
    self.get_entry(key).is_some()
  }

  /// Insert or replace the entry for `key`.
  ///
  /// A zero `ttl` stores an entry that is already expired; the next read
  /// evicts it.
  pub fn set(&self, key: &str, value: V, ttl: Duration) {
    self.set_shared(key, Arc::new(value), ttl);
  }

  pub(super) fn set_shared(&self, key: &str, value: Arc<V>, ttl: Duration) {
    self
      .lock()
      .insert(key.to_string(), CacheEntry::new(value, ttl));
  }

  /// Remove the entry for `key`, if any.
  pub fn delete(&self, key: &str) {
    self.lock().remove(key);
  }

  /// Remove the entries cached for `endpoint` and for every path below it.
  ///
  /// `/goals` matches `/goals`, `/goals?…` and `/goals/…`, but not
  /// `/goalsettings`. Returns how many were removed.
  pub fn invalidate_endpoint(&self, endpoint: &str) -> usize {
    let endpoint = endpoint.trim_end_matches('/');
    let mut entries = self.lock();
    let before = entries.len();
    entries.retain(|key, _| !is_under_endpoint(key, endpoint));
    let removed = before - entries.len();
    if removed > 0 {
      debug!(endpoint, removed, "invalidated cache entries");
    }
    removed
  }

  /// Remove all entries.
  pub fn clear(&self) {
    self.lock().clear();
  }

  /// Number of stored entries, counting expired ones not yet read.
  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

fn is_under_endpoint(key: &str, endpoint: &str) -> bool {
  match key.strip_prefix(endpoint) {
    Some(rest) => rest.is_empty() || rest.starts_with('?') || rest.starts_with('/'),
    None => false,
  }
}

impl<V> Default for ResponseCache<V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<V> Clone for ResponseCache<V> {
  fn clone(&self) -> Self {
    Self {
      entries: Arc::clone(&self.entries),
    }
  }
}

impl<V> std::fmt::Debug for ResponseCache<V> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ResponseCache")
      .field("entries", &self.len())
      .finish()
  }
}
