//! Ready-made recognizer configurations.

use std::sync::Arc;

use super::recognizer::{GestureCallbacks, GestureRecognizer};
use super::types::GestureConfig;

/// Swipe left for the next lesson, right for the previous one.
pub fn lesson_navigation<N, P>(config: GestureConfig, on_next: N, on_previous: P) -> GestureRecognizer
where
  N: Fn() + Send + Sync + 'static,
  P: Fn() + Send + Sync + 'static,
{
  let callbacks = GestureCallbacks {
    on_swipe_left: Some(Arc::new(on_next)),
    on_swipe_right: Some(Arc::new(on_previous)),
    ..Default::default()
  };
  GestureRecognizer::new(config, callbacks)
}

/// Only pull-to-refresh is wired.
pub fn pull_to_refresh<R>(config: GestureConfig, on_refresh: R) -> GestureRecognizer
where
  R: Fn() + Send + Sync + 'static,
{
  let callbacks = GestureCallbacks {
    on_pull_to_refresh: Some(Arc::new(on_refresh)),
    ..Default::default()
  };
  GestureRecognizer::new(config, callbacks)
}

/// Horizontal swipe either way dismisses. Needs a longer, faster swipe than
/// the defaults.
pub fn swipe_to_dismiss<D>(enabled: bool, on_dismiss: D) -> GestureRecognizer
where
  D: Fn() + Send + Sync + 'static,
{
  let config = GestureConfig {
    distance_threshold: 100.0,
    velocity_threshold: 0.5,
    enabled,
    ..Default::default()
  };
  let on_dismiss: Arc<dyn Fn() + Send + Sync> = Arc::new(on_dismiss);
  let callbacks = GestureCallbacks {
    on_swipe_left: Some(Arc::clone(&on_dismiss)),
    on_swipe_right: Some(on_dismiss),
    ..Default::default()
  };
  GestureRecognizer::new(config, callbacks)
}
