use crate::app::App;
use crate::gesture::RecognizerState;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Gesture pad
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  draw_header(frame, chunks[0], app);
  draw_pad(frame, chunks[1], app);
  draw_status_bar(frame, chunks[2], app);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
  let header = Line::from(vec![
    Span::styled(" ielts-client ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" preset: {:?} ", app.preset()).to_lowercase(),
      Style::default().fg(Color::Yellow).bold(),
    ),
    Span::raw("  "),
    // Shortcuts - keys highlighted, descriptions dimmed
    Span::styled("<drag>", Style::default().fg(Color::Cyan)),
    Span::styled(" gesture", Style::default().fg(Color::DarkGray)),
    Span::raw("   "),
    Span::styled("<wheel>", Style::default().fg(Color::Cyan)),
    Span::styled(" scroll", Style::default().fg(Color::DarkGray)),
    Span::raw("   "),
    Span::styled("<e>", Style::default().fg(Color::Cyan)),
    Span::styled(" toggle", Style::default().fg(Color::DarkGray)),
    Span::raw("   "),
    Span::styled("<q>", Style::default().fg(Color::Cyan)),
    Span::styled(" quit", Style::default().fg(Color::DarkGray)),
  ]);

  let paragraph = Paragraph::new(header).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

fn draw_pad(frame: &mut Frame, area: Rect, app: &App) {
  let items: Vec<ListItem> = app
    .history()
    .enumerate()
    .map(|(i, line)| {
      let style = if i == 0 {
        Style::default().fg(Color::Green).bold()
      } else {
        Style::default().fg(Color::White)
      };
      ListItem::new(line.to_string()).style(style)
    })
    .collect();

  let list = List::new(items).block(
    Block::default()
      .borders(Borders::ALL)
      .title(" gestures ")
      .border_style(Style::default().fg(Color::DarkGray)),
  );
  frame.render_widget(list, area);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let recognizer = app.recognizer();
  let config = recognizer.config();

  let (state, style) = match recognizer.state() {
    _ if !config.enabled => ("disabled".to_string(), Style::default().fg(Color::Red)),
    RecognizerState::Tracking(session) if app.is_pulling() => (
      format!("pulling {:.0}px", session.pull_distance),
      Style::default().fg(Color::Yellow),
    ),
    RecognizerState::Tracking(_) => ("tracking".to_string(), Style::default().fg(Color::Cyan)),
    RecognizerState::Idle => ("idle".to_string(), Style::default().fg(Color::DarkGray)),
  };

  let line = Line::from(vec![
    Span::styled(format!(" {} ", state), style),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" scroll {:.0}px ", app.scroll_top()),
      Style::default().fg(Color::DarkGray),
    ),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(
        " swipe {:.0}px {:.2}px/ms  pull {:.0}px",
        config.distance_threshold, config.velocity_threshold, config.pull_to_refresh_threshold
      ),
      Style::default().fg(Color::DarkGray),
    ),
  ]);

  frame.render_widget(Paragraph::new(line), area);
}
