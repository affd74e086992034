use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::tui::app::{TaskField, TaskForm};
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::popup_area;

pub fn render_task_form(f: &mut Frame, area: Rect, form: &TaskForm, palette: &Palette) {
    let popup_area = popup_area(area, 60, 40);
    f.render_widget(Clear, popup_area);

    let outer = Block::default().borders(Borders::ALL).title("New Task (To Do)");
    let inner = outer.inner(popup_area);
    f.render_widget(outer, popup_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
        .split(inner);

    let fields = [
        (TaskField::Title, "Title", form.title.as_str()),
        (TaskField::Tags, "Tags (comma-separated)", form.tags.as_str()),
    ];
    for ((field, label, value), row) in fields.into_iter().zip(rows.iter()) {
        let active = form.field == field;
        let border_style = if active {
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let text = if active { format!("{}▏", value) } else { value.to_string() };
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).border_style(border_style).title(label));
        f.render_widget(paragraph, *row);
    }
}

/// Single-line search prompt shown in place of the status bar
pub fn render_search_prompt(f: &mut Frame, area: Rect, query: &str, palette: &Palette) {
    let paragraph = Paragraph::new(format!("Search: {}▏", query)).style(Style::default().fg(palette.accent));
    f.render_widget(paragraph, area);
}
