use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::models::Task;
use crate::tui::widgets::popup_area;

pub fn render_confirm_delete(f: &mut Frame, area: Rect, task: &Task) {
    let popup_area = popup_area(area, 50, 35);

    // Clear the background first so the board does not show through
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Delete this task?"),
        Line::from(""),
        Line::from(Span::styled(task.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("y / Enter: delete    n / Esc: cancel"),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm Delete")
                .title_alignment(Alignment::Center),
        )
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
