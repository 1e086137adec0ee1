use serde::Deserialize;
use std::fmt;
use tracing::warn;

/// A touch sample: position in px and timestamp in ms.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TouchPoint {
  pub x: f64,
  pub y: f64,
  pub t: f64,
}

impl TouchPoint {
  pub fn new(x: f64, y: f64, t: f64) -> Self {
    Self { x, y, t }
  }
}

/// A recognized gesture, one per completed touch sequence at most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
  SwipeLeft,
  SwipeRight,
  SwipeUp,
  SwipeDown,
  PullToRefresh,
}

impl fmt::Display for Gesture {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Gesture::SwipeLeft => "swipe-left",
      Gesture::SwipeRight => "swipe-right",
      Gesture::SwipeUp => "swipe-up",
      Gesture::SwipeDown => "swipe-down",
      Gesture::PullToRefresh => "pull-to-refresh",
    };
    f.write_str(name)
  }
}

/// What the host should do with the move event it just delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResponse {
  /// Let the platform scroll as usual
  Passthrough,
  /// A pull-to-refresh is in progress; suppress the default scroll
  PreventDefault,
}

/// Recognizer sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
  /// Minimum straight-line displacement for a swipe, in px
  pub distance_threshold: f64,
  /// Minimum average speed for a swipe, in px/ms
  pub velocity_threshold: f64,
  /// Minimum downward pull at scroll-top, in px
  pub pull_to_refresh_threshold: f64,
  /// Master switch, checked by every handler
  pub enabled: bool,
}

impl Default for GestureConfig {
  fn default() -> Self {
    Self {
      distance_threshold: 50.0,
      velocity_threshold: 0.3,
      pull_to_refresh_threshold: 80.0,
      enabled: true,
    }
  }
}

impl GestureConfig {
  /// Replace non-positive or non-finite thresholds with their defaults.
  pub fn normalized(self) -> Self {
    let defaults = Self::default();
    Self {
      distance_threshold: positive_or(
        "distance_threshold",
        self.distance_threshold,
        defaults.distance_threshold,
      ),
      velocity_threshold: positive_or(
        "velocity_threshold",
        self.velocity_threshold,
        defaults.velocity_threshold,
      ),
      pull_to_refresh_threshold: positive_or(
        "pull_to_refresh_threshold",
        self.pull_to_refresh_threshold,
        defaults.pull_to_refresh_threshold,
      ),
      enabled: self.enabled,
    }
  }
}

fn positive_or(name: &str, value: f64, default: f64) -> f64 {
  if value.is_finite() && value > 0.0 {
    return value;
  }
  warn!(threshold = name, value, default, "invalid gesture threshold, using default");
  default
}
