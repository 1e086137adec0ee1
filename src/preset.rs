use clap::ValueEnum;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::gesture::{self, Callback, Gesture, GestureCallbacks, GestureConfig, GestureRecognizer};

/// Which recognizer wiring to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preset {
  /// Every gesture has a handler
  #[default]
  All,
  /// Swipe left/right moves between lessons
  Lesson,
  /// Pull down at the top of the page to refresh
  Refresh,
  /// Horizontal swipe dismisses
  Dismiss,
}

/// What a fired callback asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Gesture(Gesture),
  NextLesson,
  PreviousLesson,
  Refresh,
  Dismiss,
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Action::Gesture(g) => write!(f, "{}", g),
      Action::NextLesson => f.write_str("next lesson"),
      Action::PreviousLesson => f.write_str("previous lesson"),
      Action::Refresh => f.write_str("refresh"),
      Action::Dismiss => f.write_str("dismiss"),
    }
  }
}

fn emit(tx: &mpsc::UnboundedSender<Action>, action: Action) -> impl Fn() + Send + Sync + 'static {
  let tx = tx.clone();
  move || {
    // Receiver gone means the app is shutting down
    let _ = tx.send(action);
  }
}

/// Build a recognizer whose callbacks send `Action`s to `tx`.
pub fn recognizer_for(
  preset: Preset,
  config: GestureConfig,
  tx: &mpsc::UnboundedSender<Action>,
) -> GestureRecognizer {
  match preset {
    Preset::All => {
      let on = |gesture: Gesture| -> Option<Callback> {
        Some(Arc::new(emit(tx, Action::Gesture(gesture))))
      };
      let callbacks = GestureCallbacks {
        on_swipe_left: on(Gesture::SwipeLeft),
        on_swipe_right: on(Gesture::SwipeRight),
        on_swipe_up: on(Gesture::SwipeUp),
        on_swipe_down: on(Gesture::SwipeDown),
        on_pull_to_refresh: Some(Arc::new(emit(tx, Action::Refresh))),
      };
      GestureRecognizer::new(config, callbacks)
    }
    Preset::Lesson => gesture::lesson_navigation(
      config,
      emit(tx, Action::NextLesson),
      emit(tx, Action::PreviousLesson),
    ),
    Preset::Refresh => gesture::pull_to_refresh(config, emit(tx, Action::Refresh)),
    Preset::Dismiss => gesture::swipe_to_dismiss(config.enabled, emit(tx, Action::Dismiss)),
  }
}
