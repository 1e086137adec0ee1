use crate::config::Config;
use crate::event::{Event, EventHandler, TouchEvent};
use crate::gesture::{GestureRecognizer, MoveResponse};
use crate::preset::{self, Action, Preset};
use crate::ui;
use color_eyre::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::collections::VecDeque;
use std::io::stdout;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

const HISTORY_LIMIT: usize = 200;

/// Interactive gesture pad: mouse drags in, recognized gestures out.
pub struct App {
  preset: Preset,
  recognizer: GestureRecognizer,
  actions: mpsc::UnboundedReceiver<Action>,

  /// Virtual page scroll offset in px, driven by the mouse wheel
  scroll_top: f64,

  /// Whether the last move suppressed scrolling
  pulling: bool,

  /// Most recent first
  history: VecDeque<String>,

  config: Config,

  should_quit: bool,
}

impl App {
  pub fn new(config: Config, preset: Preset) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    let recognizer = preset::recognizer_for(preset, config.gestures, &tx);

    Self {
      preset,
      recognizer,
      actions: rx,
      scroll_top: 0.0,
      pulling: false,
      history: VecDeque::new(),
      config,
      should_quit: false,
    }
  }

  pub fn preset(&self) -> Preset {
    self.preset
  }

  pub fn recognizer(&self) -> &GestureRecognizer {
    &self.recognizer
  }

  pub fn scroll_top(&self) -> f64 {
    self.scroll_top
  }

  pub fn is_pulling(&self) -> bool {
    self.pulling
  }

  pub fn history(&self) -> impl Iterator<Item = &str> {
    self.history.iter().map(String::as_str)
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(250), self.config.terminal.clone());
    info!(preset = ?self.preset, "gesture pad started");

    let result = self.event_loop(&mut terminal, &mut events).await;

    // Cleanup terminal
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(
    &mut self,
    terminal: &mut Terminal<B>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  pub fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => match key.code {
        KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
          self.should_quit = true;
        }
        KeyCode::Char('e') => {
          let enabled = !self.recognizer.is_enabled();
          self.recognizer.set_enabled(enabled);
          let status = if enabled { "enabled" } else { "disabled" };
          self.record(format!("recognizer {}", status));
        }
        KeyCode::Home => self.scroll_top = 0.0,
        _ => {}
      },
      Event::Touch(touch) => self.handle_touch(touch),
      Event::Scroll(delta) => {
        // Scrolling is blocked while a pull is being tracked
        if !self.pulling {
          self.scroll_top = (self.scroll_top + delta).max(0.0);
        }
      }
      Event::Resize | Event::Tick => {}
    }
  }

  fn handle_touch(&mut self, touch: TouchEvent) {
    match touch {
      TouchEvent::Start(point) => self.recognizer.touch_start(point),
      TouchEvent::Move(point) => {
        let response = self.recognizer.touch_move(point, self.scroll_top);
        self.pulling = response == MoveResponse::PreventDefault;
      }
      TouchEvent::End(point) => {
        self.recognizer.touch_end(point);
        self.pulling = false;
        self.drain_actions();
      }
    }
  }

  fn drain_actions(&mut self) {
    while let Ok(action) = self.actions.try_recv() {
      if action == Action::Refresh {
        self.scroll_top = 0.0;
      }
      self.record(action.to_string());
    }
  }

  fn record(&mut self, line: String) {
    self.history.push_front(line);
    self.history.truncate(HISTORY_LIMIT);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::gesture::TouchPoint;
  use crossterm::event::KeyEvent;

  fn touch(event: TouchEvent) -> Event {
    Event::Touch(event)
  }

  #[test]
  fn test_swipe_is_recorded() {
    let mut app = App::new(Config::default(), Preset::All);

    app.handle_event(touch(TouchEvent::Start(TouchPoint::new(200.0, 100.0, 0.0))));
    app.handle_event(touch(TouchEvent::Move(TouchPoint::new(150.0, 100.0, 50.0))));
    app.handle_event(touch(TouchEvent::End(TouchPoint::new(100.0, 100.0, 100.0))));

    assert_eq!(app.history().collect::<Vec<_>>(), vec!["swipe-left"]);
  }

  #[test]
  fn test_pull_blocks_scroll_until_release() {
    let mut app = App::new(Config::default(), Preset::Refresh);

    app.handle_event(touch(TouchEvent::Start(TouchPoint::new(100.0, 0.0, 0.0))));
    app.handle_event(touch(TouchEvent::Move(TouchPoint::new(100.0, 48.0, 100.0))));
    assert!(app.is_pulling());

    app.handle_event(Event::Scroll(40.0));
    assert_eq!(app.scroll_top(), 0.0);

    app.handle_event(touch(TouchEvent::Move(TouchPoint::new(100.0, 96.0, 200.0))));
    app.handle_event(touch(TouchEvent::End(TouchPoint::new(100.0, 96.0, 200.0))));

    assert!(!app.is_pulling());
    assert_eq!(app.history().collect::<Vec<_>>(), vec!["refresh"]);
  }

  #[test]
  fn test_scroll_clamps_at_top() {
    let mut app = App::new(Config::default(), Preset::All);

    app.handle_event(Event::Scroll(40.0));
    app.handle_event(Event::Scroll(-100.0));
    assert_eq!(app.scroll_top(), 0.0);
  }

  #[test]
  fn test_toggle_enabled() {
    let mut app = App::new(Config::default(), Preset::All);

    app.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE)));
    assert!(!app.recognizer().is_enabled());

    app.handle_event(touch(TouchEvent::Start(TouchPoint::new(200.0, 100.0, 0.0))));
    app.handle_event(touch(TouchEvent::End(TouchPoint::new(100.0, 100.0, 100.0))));
    assert_eq!(app.history().collect::<Vec<_>>(), vec!["recognizer disabled"]);
  }

  #[test]
  fn test_quit_keys() {
    let mut app = App::new(Config::default(), Preset::All);
    app.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
    assert!(app.should_quit);
  }
}
