//! TUI rendering — orchestrates all panes.

pub mod animal_list;
pub mod pedigree;

use akita_core::animal::Gender;
use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::{App, PromptField, Screen};

pub(crate) fn gender_glyph(gender: Gender) -> (&'static str, Color) {
  match gender {
    Gender::Male => ("♂", Color::LightBlue),
    Gender::Female => ("♀", Color::LightMagenta),
  }
}

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0]);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);

  if app.prompt.is_some() {
    draw_prompt(f, rows[1], app);
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " akita  [/] search  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{date} "),
    Style::default().fg(Color::DarkGray),
  );

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
    .split(area);

  animal_list::draw(f, cols[0], app);

  if app.current_view().is_some() {
    pedigree::draw(f, cols[1], app);
  } else {
    draw_empty_pedigree(f, cols[1]);
  }
}

fn draw_empty_pedigree(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Pedigree ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new("Select an animal and press Enter.")
      .style(Style::default().fg(Color::DarkGray)),
    inner,
  );
}

// ─── Enrollment prompt ────────────────────────────────────────────────────────

fn draw_prompt(f: &mut Frame, body: Rect, app: &App) {
  let Some(prompt) = &app.prompt else {
    return;
  };

  let width = body.width.min(60);
  let area = Rect {
    x: body.x + (body.width - width) / 2,
    y: body.y + body.height.saturating_sub(6) / 2,
    width,
    height: body.height.min(6),
  };

  let field_line = |label: &str, value: &str, active: bool| {
    let style = if active {
      Style::default().fg(Color::Yellow)
    } else {
      Style::default()
    };
    let cursor = if active { "_" } else { "" };
    Line::from(vec![
      Span::styled(format!("{label:<17}"), Style::default().fg(Color::DarkGray)),
      Span::styled(format!("{value}{cursor}"), style),
    ])
  };

  let lines = vec![
    field_line(
      "Registered name",
      &prompt.registered_name,
      prompt.field == PromptField::RegisteredName,
    ),
    field_line(
      "Call name",
      &prompt.call_name,
      prompt.field == PromptField::CallName,
    ),
    Line::from(""),
    Line::from(Span::styled(
      "Tab switch  Enter next/save  Esc cancel",
      Style::default().fg(Color::DarkGray),
    )),
  ];

  let block = Block::default()
    .title(format!(" Add {} of {} ", prompt.slot, prompt.subject_name))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow));
  let inner = block.inner(area);
  f.render_widget(Clear, area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(lines), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match &app.screen {
    _ if app.prompt.is_some() => ("ENROLL", "Type the new ancestor's names"),
    Screen::AnimalList if app.filter_active => (
      "SEARCH",
      "Type to filter  Esc cancel  Enter select",
    ),
    Screen::AnimalList => (
      "NORMAL",
      "↑↓/jk navigate  / search  Enter pedigree  q quit",
    ),
    Screen::Pedigree => (
      "PEDIGREE",
      "↑↓/jk move  Space fold  e/c all  Enter open  ⌫ back  s/d add sire/dam  r reload  Esc list",
    ),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
