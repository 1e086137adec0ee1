//! Swipe and pull-to-refresh recognition over a single-pointer touch stream.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use super::types::{Gesture, GestureConfig, MoveResponse, TouchPoint};

/// A gesture callback. Shared so one handler can serve several gestures.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Optional handlers, one per gesture.
#[derive(Clone, Default)]
pub struct GestureCallbacks {
  pub on_swipe_left: Option<Callback>,
  pub on_swipe_right: Option<Callback>,
  pub on_swipe_up: Option<Callback>,
  pub on_swipe_down: Option<Callback>,
  pub on_pull_to_refresh: Option<Callback>,
}

impl GestureCallbacks {
  fn for_gesture(&self, gesture: Gesture) -> Option<&Callback> {
    match gesture {
      Gesture::SwipeLeft => self.on_swipe_left.as_ref(),
      Gesture::SwipeRight => self.on_swipe_right.as_ref(),
      Gesture::SwipeUp => self.on_swipe_up.as_ref(),
      Gesture::SwipeDown => self.on_swipe_down.as_ref(),
      Gesture::PullToRefresh => self.on_pull_to_refresh.as_ref(),
    }
  }
}

impl fmt::Debug for GestureCallbacks {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("GestureCallbacks")
      .field("on_swipe_left", &self.on_swipe_left.is_some())
      .field("on_swipe_right", &self.on_swipe_right.is_some())
      .field("on_swipe_up", &self.on_swipe_up.is_some())
      .field("on_swipe_down", &self.on_swipe_down.is_some())
      .field("on_pull_to_refresh", &self.on_pull_to_refresh.is_some())
      .finish()
  }
}

/// State of the touch session in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSession {
  pub origin: TouchPoint,
  pub latest: TouchPoint,
  /// Downward displacement since origin while at scroll-top
  pub pull_distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecognizerState {
  Idle,
  Tracking(GestureSession),
}

/// Turns touch start/move/end into at most one gesture callback.
///
/// | state    | event  | result                                              |
/// |----------|--------|-----------------------------------------------------|
/// | Idle     | start  | Tracking, pull distance 0                           |
/// | Tracking | start  | Tracking, session restarted at the new origin       |
/// | Tracking | move   | pull tracked if at scroll-top and moving down       |
/// | Tracking | end    | pull-to-refresh, else swipe, else nothing; Idle     |
/// | any      | cancel | Idle                                                |
///
/// While disabled, every handler is a no-op and the state is left alone.
#[derive(Debug)]
pub struct GestureRecognizer {
  config: GestureConfig,
  callbacks: GestureCallbacks,
  state: RecognizerState,
}

impl GestureRecognizer {
  pub fn new(config: GestureConfig, callbacks: GestureCallbacks) -> Self {
    Self {
      config: config.normalized(),
      callbacks,
      state: RecognizerState::Idle,
    }
  }

  pub fn config(&self) -> &GestureConfig {
    &self.config
  }

  pub fn state(&self) -> &RecognizerState {
    &self.state
  }

  pub fn is_enabled(&self) -> bool {
    self.config.enabled
  }

  pub fn set_enabled(&mut self, enabled: bool) {
    self.config.enabled = enabled;
  }

  pub fn is_tracking(&self) -> bool {
    matches!(self.state, RecognizerState::Tracking(_))
  }

  /// Current pull distance, 0 when idle.
  pub fn pull_distance(&self) -> f64 {
    match &self.state {
      RecognizerState::Tracking(session) => session.pull_distance,
      RecognizerState::Idle => 0.0,
    }
  }

  pub fn touch_start(&mut self, point: TouchPoint) {
    if !self.config.enabled {
      return;
    }
    self.state = RecognizerState::Tracking(GestureSession {
      origin: point,
      latest: point,
      pull_distance: 0.0,
    });
  }

  /// Track a move. `scroll_top` is the host's current vertical scroll offset.
  pub fn touch_move(&mut self, point: TouchPoint, scroll_top: f64) -> MoveResponse {
    if !self.config.enabled {
      return MoveResponse::Passthrough;
    }
    let RecognizerState::Tracking(session) = &mut self.state else {
      return MoveResponse::Passthrough;
    };

    if self.callbacks.on_pull_to_refresh.is_none() || scroll_top != 0.0 {
      return MoveResponse::Passthrough;
    }

    let dy = point.y - session.origin.y;
    if dy <= 0.0 {
      return MoveResponse::Passthrough;
    }

    session.latest = point;
    session.pull_distance = dy;
    MoveResponse::PreventDefault
  }

  /// Finish the session and fire at most one callback.
  ///
  /// Returns the gesture whose callback fired.
  pub fn touch_end(&mut self, point: TouchPoint) -> Option<Gesture> {
    if !self.config.enabled {
      return None;
    }
    let RecognizerState::Tracking(session) = std::mem::replace(&mut self.state, RecognizerState::Idle)
    else {
      return None;
    };

    let gesture = self.classify(&session, point)?;
    let callback = self.callbacks.for_gesture(gesture)?;

    info!(%gesture, "gesture recognized");
    callback();
    Some(gesture)
  }

  /// Drop the session without classifying it.
  pub fn touch_cancel(&mut self) {
    if !self.config.enabled {
      return;
    }
    self.state = RecognizerState::Idle;
  }

  fn classify(&self, session: &GestureSession, end: TouchPoint) -> Option<Gesture> {
    if self.callbacks.on_pull_to_refresh.is_some()
      && session.pull_distance >= self.config.pull_to_refresh_threshold
    {
      return Some(Gesture::PullToRefresh);
    }

    let dx = end.x - session.origin.x;
    let dy = end.y - session.origin.y;
    let distance = dx.hypot(dy);
    let elapsed = end.t - session.origin.t;
    // Zero elapsed time gives an infinite (or NaN, if no distance) velocity
    let velocity = distance / elapsed;

    debug!(dx, dy, distance, elapsed, velocity, "touch sequence ended");

    if !(velocity >= self.config.velocity_threshold && distance >= self.config.distance_threshold)
    {
      return None;
    }

    // Ties go to the vertical axis; no displacement on the axis means no direction
    if dx.abs() > dy.abs() {
      if dx > 0.0 {
        Some(Gesture::SwipeRight)
      } else if dx < 0.0 {
        Some(Gesture::SwipeLeft)
      } else {
        None
      }
    } else if dy > 0.0 {
      Some(Gesture::SwipeDown)
    } else if dy < 0.0 {
      Some(Gesture::SwipeUp)
    } else {
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;
  use std::sync::Mutex;

  /// Records which callbacks fired.
  #[derive(Clone, Default)]
  struct Recorder {
    fired: Arc<Mutex<HashMap<Gesture, usize>>>,
  }

  impl Recorder {
    fn callback(&self, gesture: Gesture) -> Option<Callback> {
      let fired = Arc::clone(&self.fired);
      Some(Arc::new(move || {
        *fired.lock().unwrap().entry(gesture).or_default() += 1;
      }))
    }

    fn all(&self) -> GestureCallbacks {
      GestureCallbacks {
        on_swipe_left: self.callback(Gesture::SwipeLeft),
        on_swipe_right: self.callback(Gesture::SwipeRight),
        on_swipe_up: self.callback(Gesture::SwipeUp),
        on_swipe_down: self.callback(Gesture::SwipeDown),
        on_pull_to_refresh: self.callback(Gesture::PullToRefresh),
      }
    }

    fn fired(&self) -> Vec<(Gesture, usize)> {
      let mut fired: Vec<_> = self
        .fired
        .lock()
        .unwrap()
        .iter()
        .map(|(g, n)| (*g, *n))
        .collect();
      fired.sort_by_key(|(g, _)| *g as u8);
      fired
    }
  }

  fn p(x: f64, y: f64, t: f64) -> TouchPoint {
    TouchPoint::new(x, y, t)
  }

  fn swipe(recognizer: &mut GestureRecognizer, from: TouchPoint, to: TouchPoint) -> Option<Gesture> {
    recognizer.touch_start(from);
    recognizer.touch_move(to, 120.0);
    recognizer.touch_end(to)
  }

  #[test]
  fn test_swipe_left_fires_only_left() {
    let recorder = Recorder::default();
    let mut recognizer = GestureRecognizer::new(GestureConfig::default(), recorder.all());

    let fired = swipe(&mut recognizer, p(200.0, 100.0, 0.0), p(140.0, 100.0, 100.0));

    assert_eq!(fired, Some(Gesture::SwipeLeft));
    assert_eq!(recorder.fired(), vec![(Gesture::SwipeLeft, 1)]);
    assert!(!recognizer.is_tracking());
  }

  #[test]
  fn test_each_direction() {
    let recorder = Recorder::default();
    let mut recognizer = GestureRecognizer::new(GestureConfig::default(), recorder.all());
    let origin = p(100.0, 100.0, 0.0);

    assert_eq!(
      swipe(&mut recognizer, origin, p(180.0, 110.0, 100.0)),
      Some(Gesture::SwipeRight)
    );
    assert_eq!(
      swipe(&mut recognizer, origin, p(90.0, 20.0, 100.0)),
      Some(Gesture::SwipeUp)
    );
    // Not at scroll-top, so a downward drag is a plain swipe
    assert_eq!(
      swipe(&mut recognizer, origin, p(95.0, 200.0, 100.0)),
      Some(Gesture::SwipeDown)
    );
  }

  #[test]
  fn test_short_swipe_fires_nothing() {
    let recorder = Recorder::default();
    let mut recognizer = GestureRecognizer::new(GestureConfig::default(), recorder.all());

    let fired = swipe(&mut recognizer, p(200.0, 100.0, 0.0), p(170.0, 100.0, 50.0));

    assert_eq!(fired, None);
    assert!(recorder.fired().is_empty());
    assert!(!recognizer.is_tracking());
  }

  #[test]
  fn test_slow_swipe_fires_nothing() {
    let recorder = Recorder::default();
    let mut recognizer = GestureRecognizer::new(GestureConfig::default(), recorder.all());

    // 60px in 1s is 0.06 px/ms
    let fired = swipe(&mut recognizer, p(200.0, 100.0, 0.0), p(140.0, 100.0, 1000.0));
    assert_eq!(fired, None);
  }

  #[test]
  fn test_diagonal_tie_is_vertical() {
    let recorder = Recorder::default();
    let mut recognizer = GestureRecognizer::new(GestureConfig::default(), recorder.all());

    let fired = swipe(&mut recognizer, p(100.0, 100.0, 0.0), p(160.0, 40.0, 100.0));
    assert_eq!(fired, Some(Gesture::SwipeUp));
  }

  #[test]
  fn test_missing_callback_fires_nothing() {
    let recorder = Recorder::default();
    let callbacks = GestureCallbacks {
      on_swipe_right: recorder.callback(Gesture::SwipeRight),
      ..Default::default()
    };
    let mut recognizer = GestureRecognizer::new(GestureConfig::default(), callbacks);

    let fired = swipe(&mut recognizer, p(200.0, 100.0, 0.0), p(100.0, 100.0, 100.0));
    assert_eq!(fired, None);
    assert!(recorder.fired().is_empty());
  }

  #[test]
  fn test_pull_to_refresh_beats_swipe_down() {
    let recorder = Recorder::default();
    let mut recognizer = GestureRecognizer::new(GestureConfig::default(), recorder.all());

    recognizer.touch_start(p(100.0, 50.0, 0.0));
    assert_eq!(
      recognizer.touch_move(p(100.0, 90.0, 50.0), 0.0),
      MoveResponse::PreventDefault
    );
    assert_eq!(
      recognizer.touch_move(p(100.0, 140.0, 100.0), 0.0),
      MoveResponse::PreventDefault
    );
    assert_eq!(recognizer.pull_distance(), 90.0);

    let fired = recognizer.touch_end(p(100.0, 140.0, 100.0));

    assert_eq!(fired, Some(Gesture::PullToRefresh));
    assert_eq!(recorder.fired(), vec![(Gesture::PullToRefresh, 1)]);
    assert_eq!(recognizer.pull_distance(), 0.0);
  }

  #[test]
  fn test_short_pull_falls_back_to_swipe() {
    let recorder = Recorder::default();
    let mut recognizer = GestureRecognizer::new(GestureConfig::default(), recorder.all());

    recognizer.touch_start(p(100.0, 50.0, 0.0));
    recognizer.touch_move(p(100.0, 110.0, 100.0), 0.0);
    let fired = recognizer.touch_end(p(100.0, 110.0, 100.0));

    assert_eq!(fired, Some(Gesture::SwipeDown));
  }

  #[test]
  fn test_pull_requires_scroll_top_and_downward_move() {
    let recorder = Recorder::default();
    let mut recognizer = GestureRecognizer::new(GestureConfig::default(), recorder.all());

    recognizer.touch_start(p(100.0, 200.0, 0.0));
    assert_eq!(
      recognizer.touch_move(p(100.0, 300.0, 50.0), 15.0),
      MoveResponse::Passthrough
    );
    assert_eq!(
      recognizer.touch_move(p(100.0, 150.0, 60.0), 0.0),
      MoveResponse::Passthrough
    );
    assert_eq!(recognizer.pull_distance(), 0.0);
  }

  #[test]
  fn test_pull_ignored_without_refresh_callback() {
    let recorder = Recorder::default();
    let callbacks = GestureCallbacks {
      on_swipe_down: recorder.callback(Gesture::SwipeDown),
      ..Default::default()
    };
    let mut recognizer = GestureRecognizer::new(GestureConfig::default(), callbacks);

    recognizer.touch_start(p(100.0, 50.0, 0.0));
    assert_eq!(
      recognizer.touch_move(p(100.0, 150.0, 100.0), 0.0),
      MoveResponse::Passthrough
    );
    assert_eq!(recognizer.touch_end(p(100.0, 150.0, 100.0)), Some(Gesture::SwipeDown));
  }

  #[test]
  fn test_disabled_mid_session_fires_nothing() {
    let recorder = Recorder::default();
    let mut recognizer = GestureRecognizer::new(GestureConfig::default(), recorder.all());

    recognizer.touch_start(p(200.0, 100.0, 0.0));
    recognizer.set_enabled(false);

    assert_eq!(recognizer.touch_end(p(100.0, 100.0, 100.0)), None);
    assert!(recorder.fired().is_empty());
    // State is untouched while disabled
    assert!(recognizer.is_tracking());
  }

  #[test]
  fn test_disabled_start_is_noop() {
    let config = GestureConfig {
      enabled: false,
      ..Default::default()
    };
    let mut recognizer = GestureRecognizer::new(config, GestureCallbacks::default());

    recognizer.touch_start(p(0.0, 0.0, 0.0));
    assert_eq!(recognizer.state(), &RecognizerState::Idle);
  }

  #[test]
  fn test_cancel_discards_session() {
    let recorder = Recorder::default();
    let mut recognizer = GestureRecognizer::new(GestureConfig::default(), recorder.all());

    recognizer.touch_start(p(200.0, 100.0, 0.0));
    recognizer.touch_cancel();

    assert_eq!(recognizer.touch_end(p(100.0, 100.0, 100.0)), None);
    assert!(recorder.fired().is_empty());
  }

  #[test]
  fn test_end_without_start_is_ignored() {
    let recorder = Recorder::default();
    let mut recognizer = GestureRecognizer::new(GestureConfig::default(), recorder.all());

    assert_eq!(recognizer.touch_end(p(100.0, 100.0, 100.0)), None);
  }

  #[test]
  fn test_invalid_pull_threshold_still_allows_swipes() {
    let recorder = Recorder::default();
    let config = GestureConfig {
      pull_to_refresh_threshold: -5.0,
      ..Default::default()
    };
    let mut recognizer = GestureRecognizer::new(config, recorder.all());

    let fired = swipe(&mut recognizer, p(200.0, 100.0, 0.0), p(100.0, 100.0, 100.0));

    assert_eq!(fired, Some(Gesture::SwipeLeft));
    assert_eq!(recorder.fired(), vec![(Gesture::SwipeLeft, 1)]);
  }

  #[test]
  fn test_stationary_tap_fires_nothing() {
    let recorder = Recorder::default();
    // Built directly so the zero thresholds survive and only direction decides
    let mut recognizer = GestureRecognizer {
      config: GestureConfig {
        distance_threshold: 0.0,
        velocity_threshold: 0.0,
        ..Default::default()
      },
      callbacks: recorder.all(),
      state: RecognizerState::Idle,
    };

    recognizer.touch_start(p(100.0, 100.0, 0.0));
    assert_eq!(recognizer.touch_end(p(100.0, 100.0, 100.0)), None);
    assert!(recorder.fired().is_empty());
  }

  #[test]
  fn test_start_while_tracking_restarts_session() {
    let recorder = Recorder::default();
    let mut recognizer = GestureRecognizer::new(GestureConfig::default(), recorder.all());

    recognizer.touch_start(p(200.0, 0.0, 0.0));
    recognizer.touch_move(p(200.0, 50.0, 100.0), 0.0);
    assert_eq!(recognizer.pull_distance(), 50.0);

    // From the first origin this would be 160px in 600ms, too slow to count
    recognizer.touch_start(p(100.0, 0.0, 500.0));
    assert_eq!(recognizer.pull_distance(), 0.0);
    assert!(matches!(
      recognizer.state(),
      RecognizerState::Tracking(session) if session.origin == p(100.0, 0.0, 500.0)
    ));

    assert_eq!(recognizer.touch_end(p(40.0, 0.0, 600.0)), Some(Gesture::SwipeLeft));
  }

  #[test]
  fn test_zero_elapsed_time_counts_as_fast() {
    let recorder = Recorder::default();
    let mut recognizer = GestureRecognizer::new(GestureConfig::default(), recorder.all());

    let fired = swipe(&mut recognizer, p(200.0, 100.0, 10.0), p(100.0, 100.0, 10.0));
    assert_eq!(fired, Some(Gesture::SwipeLeft));

    let fired = swipe(&mut recognizer, p(200.0, 100.0, 10.0), p(200.0, 100.0, 10.0));
    assert_eq!(fired, None);
  }
}
