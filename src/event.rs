use crossterm::event::{
  self, Event as CrosstermEvent, KeyEvent, MouseButton, MouseEvent, MouseEventKind,
};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::config::TerminalConfig;
use crate::gesture::TouchPoint;

/// Touch phases reconstructed from the left mouse button.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchEvent {
  Start(TouchPoint),
  Move(TouchPoint),
  End(TouchPoint),
}

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Left-button press, drag or release
  Touch(TouchEvent),
  /// Mouse wheel; positive scrolls down
  Scroll(f64),
  /// Terminal resized
  Resize,
  /// Periodic tick for UI refresh
  Tick,
}

/// Event handler that produces events from terminal input and a tick timer
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration, terminal: TerminalConfig) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    let epoch = Instant::now();

    // Spawn terminal event reader
    tokio::task::spawn_blocking(move || loop {
      let next = if event::poll(tick_rate).unwrap_or(false) {
        match event::read() {
          Ok(CrosstermEvent::Key(key)) => Some(Event::Key(key)),
          Ok(CrosstermEvent::Mouse(mouse)) => {
            let t = epoch.elapsed().as_secs_f64() * 1000.0;
            translate_mouse(&mouse, t, &terminal)
          }
          Ok(CrosstermEvent::Resize(_, _)) => Some(Event::Resize),
          _ => None,
        }
      } else {
        Some(Event::Tick)
      };

      if let Some(evt) = next {
        if tx.send(evt).is_err() {
          break;
        }
      }
    });

    Self { rx }
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}

/// Map a mouse event in cell coordinates to a touch or scroll event in px.
fn translate_mouse(mouse: &MouseEvent, t: f64, terminal: &TerminalConfig) -> Option<Event> {
  let point = TouchPoint::new(
    f64::from(mouse.column) * terminal.cell_width_px,
    f64::from(mouse.row) * terminal.cell_height_px,
    t,
  );

  match mouse.kind {
    MouseEventKind::Down(MouseButton::Left) => Some(Event::Touch(TouchEvent::Start(point))),
    MouseEventKind::Drag(MouseButton::Left) => Some(Event::Touch(TouchEvent::Move(point))),
    MouseEventKind::Up(MouseButton::Left) => Some(Event::Touch(TouchEvent::End(point))),
    MouseEventKind::ScrollDown => Some(Event::Scroll(terminal.scroll_step_px)),
    MouseEventKind::ScrollUp => Some(Event::Scroll(-terminal.scroll_step_px)),
    _ => None,
  }
}
