//! Offline replay of recorded touch traces.
//!
//! A trace is a YAML list of events:
//!
//! ```yaml
//! events:
//!   - { type: start, x: 200, y: 100, t: 0 }
//!   - { type: move, x: 150, y: 100, t: 50, scroll_top: 0 }
//!   - { type: end, x: 130, y: 100, t: 90 }
//!   - { type: disable }
//! ```

use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::sync::mpsc;

use crate::gesture::{GestureConfig, TouchPoint};
use crate::preset::{self, Action, Preset};

#[derive(Debug, Clone, Deserialize)]
pub struct Trace {
  pub events: Vec<TraceEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TraceEvent {
  Start {
    x: f64,
    y: f64,
    t: f64,
  },
  Move {
    x: f64,
    y: f64,
    t: f64,
    #[serde(default)]
    scroll_top: f64,
  },
  End {
    x: f64,
    y: f64,
    t: f64,
  },
  Cancel,
  Enable,
  Disable,
}

/// An action fired while replaying, tagged with the index of the event that fired it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
  pub index: usize,
  pub action: Action,
}

impl Trace {
  pub fn load(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read trace {}: {}", path.display(), e))?;

    serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse trace {}: {}", path.display(), e))
  }
}

/// Feed every event through a fresh recognizer and collect what fired.
pub fn replay(trace: &Trace, preset: Preset, config: GestureConfig) -> Vec<Fired> {
  let (tx, mut rx) = mpsc::unbounded_channel();
  let mut recognizer = preset::recognizer_for(preset, config, &tx);
  let mut fired = Vec::new();

  for (index, event) in trace.events.iter().enumerate() {
    match *event {
      TraceEvent::Start { x, y, t } => recognizer.touch_start(TouchPoint::new(x, y, t)),
      TraceEvent::Move { x, y, t, scroll_top } => {
        recognizer.touch_move(TouchPoint::new(x, y, t), scroll_top);
      }
      TraceEvent::End { x, y, t } => {
        recognizer.touch_end(TouchPoint::new(x, y, t));
      }
      TraceEvent::Cancel => recognizer.touch_cancel(),
      TraceEvent::Enable => recognizer.set_enabled(true),
      TraceEvent::Disable => recognizer.set_enabled(false),
    }

    while let Ok(action) = rx.try_recv() {
      fired.push(Fired { index, action });
    }
  }

  fired
}
