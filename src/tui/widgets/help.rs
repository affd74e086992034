use ratatui::layout::{Alignment, Rect};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::widgets::popup_area;

const HELP_TEXT: &str = "\
Board:
  h / l, ←/→: Select column
  j / k, ↑/↓: Select card
  H / L, < / >: Move card to the neighbouring column
  1 / 2 / 3: Move card to To Do / In Progress / Done
  n: New task
  d: Delete selected task
  /: Search titles, descriptions and tags
  Esc: Clear search

General:
  Tab: Switch between Kanban Board and Overview
  r: Reload from storage
  ?: Show/hide help
  q, Ctrl+C: Quit
";

pub fn render_help(f: &mut Frame, area: Rect) {
    let popup_area = popup_area(area, 60, 70);

    // Clear the background first so the board does not show through
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(HELP_TEXT)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}
