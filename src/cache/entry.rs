//! A single time-stamped cache slot.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// A stored value with its write time and expiry.
#[derive(Debug)]
pub struct CacheEntry<V> {
  /// Shared, read-only handle to the payload
  pub value: Arc<V>,
  /// Monotonic write time, used for expiry
  pub stored_at: Instant,
  /// `stored_at + ttl`
  pub expires_at: Instant,
  /// Wall-clock write time, for display only
  pub cached_at: DateTime<Utc>,
  ttl: Duration,
}

impl<V> CacheEntry<V> {
  pub fn new(value: Arc<V>, ttl: Duration) -> Self {
    let stored_at = Instant::now();
    Self {
      value,
      stored_at,
      expires_at: stored_at + ttl,
      cached_at: Utc::now(),
      ttl,
    }
  }

  /// Fresh while `now <= expires_at`. A zero TTL is never fresh.
  pub fn is_fresh(&self, now: Instant) -> bool {
    !self.ttl.is_zero() && now <= self.expires_at
  }
}
