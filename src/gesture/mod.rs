//! Touch gesture recognition.
//!
//! A `GestureRecognizer` consumes one pointer's touch start/move/end stream and
//! the host's scroll offset, and fires at most one of five callbacks per
//! completed sequence: a swipe in one of four directions or pull-to-refresh.

mod presets;
mod recognizer;
mod types;

pub use presets::{lesson_navigation, pull_to_refresh, swipe_to_dismiss};
pub use recognizer::{Callback, GestureCallbacks, GestureRecognizer, GestureSession, RecognizerState};
pub use types::{Gesture, GestureConfig, MoveResponse, TouchPoint};
