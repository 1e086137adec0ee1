//! Stale-while-revalidate fetching on top of `ResponseCache`.

use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::store::ResponseCache;

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }
}

/// Indicates where returned data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh entry served; a background refresh was started
  Cache,
  /// Cold key, fetched and awaited
  Network,
}

impl<V> ResponseCache<V>
where
  V: Send + Sync + 'static,
{
  /// Fetch with stale-while-revalidate semantics.
  ///
  /// 1. Fresh entry: return it at once and run `producer` in a detached task.
  ///    A successful refresh overwrites the entry; a failed one is logged and
  ///    dropped, leaving the existing entry in place.
  /// 2. No fresh entry: await `producer`, store the value with `ttl` and return
  ///    it. This is the only path whose error reaches the caller, and a failure
  ///    leaves nothing behind in the cache.
  ///
  /// Concurrent cold fetches for one key are not de-duplicated; each runs the
  /// producer and the last to finish owns the slot.
  pub async fn fetch<F, Fut, E>(
    &self,
    key: &str,
    producer: F,
    ttl: Duration,
  ) -> Result<CacheResult<Arc<V>>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
    E: Display + Send + 'static,
  {
    if let Some((value, cached_at)) = self.get_entry(key) {
      debug!(key, "cache hit, refreshing in background");
      self.spawn_refresh(key, producer(), ttl);
      return Ok(CacheResult::from_cache(value, cached_at));
    }

    debug!(key, "cache miss");
    let value = Arc::new(producer().await?);
    self.set_shared(key, Arc::clone(&value), ttl);
    Ok(CacheResult::from_network(value))
  }

  /// Value-only form of [`fetch`](Self::fetch).
  pub async fn cached_fetch<F, Fut, E>(&self, key: &str, producer: F, ttl: Duration) -> Result<Arc<V>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
    E: Display + Send + 'static,
  {
    self
      .fetch(key, producer, ttl)
      .await
      .map(|result| result.data)
  }

  /// Detached refresh. Nobody awaits the handle, so its outcome is only
  /// visible through the cache and the log.
  fn spawn_refresh<Fut, E>(&self, key: &str, refresh: Fut, ttl: Duration)
  where
    Fut: Future<Output = Result<V, E>> + Send + 'static,
    E: Display + Send + 'static,
  {
    let cache = self.clone();
    let key = key.to_string();

    tokio::spawn(async move {
      match refresh.await {
        Ok(value) => {
          cache.set(&key, value, ttl);
          debug!(key = %key, "background refresh stored");
        }
        Err(e) => {
          debug!(key = %key, error = %e, "background refresh failed, keeping cached value");
        }
      }
    });
  }
}
