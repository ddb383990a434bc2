//! Pedigree pane — right panel.
//!
//! Draws the rows of the current [`akita_core::view::PedigreeView`] as an
//! indented tree with fold markers and empty-slot hints.

use akita_core::{
  animal::Slot,
  view::{Expander, PedigreeRow},
};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::{
  app::{App, Screen},
  ui::gender_glyph,
};

/// Render the pedigree pane into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(view) = app.current_view() else {
    return;
  };
  let root = view.tree();

  let border = if app.screen == Screen::Pedigree {
    Color::Gray
  } else {
    Color::DarkGray
  };
  let back = if app.history.is_empty() {
    String::new()
  } else {
    format!("  ⌫ {}", app.history.len())
  };
  let block = Block::default()
    .title(format!(" {} — {} gen{back} ", root.call_name, root.generations()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let rows = view.rows();
  let items: Vec<ListItem> = rows.iter().map(row_line).map(ListItem::new).collect();

  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut state = ListState::default();
  if app.screen == Screen::Pedigree && !rows.is_empty() {
    state.select(Some(app.tree_cursor));
  }

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner,
    &mut state,
  );
}

fn row_line(row: &PedigreeRow) -> Line<'static> {
  let dim = Style::default().fg(Color::DarkGray);
  let marker = match row.expander {
    Expander::None => "  ",
    Expander::Expanded => "▾ ",
    Expander::Collapsed => "▸ ",
  };
  let (glyph, color) = gender_glyph(row.gender);

  let mut spans = vec![
    Span::raw("  ".repeat(row.generation)),
    Span::raw(marker),
  ];
  if let Some(slot) = row.slot {
    spans.push(Span::styled(format!("{slot}: "), dim));
  }
  spans.push(Span::styled(format!("{glyph} "), Style::default().fg(color)));
  spans.push(Span::styled(
    row.call_name.clone(),
    Style::default().add_modifier(Modifier::BOLD),
  ));
  spans.push(Span::styled(format!("  {}", row.registered_name), dim));

  if !row.titles.is_empty() {
    let mut titles = row.titles.join(", ");
    if row.hidden_titles > 0 {
      titles.push_str(&format!(" +{}", row.hidden_titles));
    }
    spans.push(Span::styled(
      format!("  [{titles}]"),
      Style::default().fg(Color::Yellow),
    ));
  }

  let open: Vec<&str> = row
    .open_slots
    .iter()
    .map(|slot| match slot {
      Slot::Sire => "s:+sire",
      Slot::Dam => "d:+dam",
    })
    .collect();
  if !open.is_empty() {
    spans.push(Span::styled(format!("  ({})", open.join(" ")), dim));
  }

  Line::from(spans)
}
