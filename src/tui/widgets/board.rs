use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;

use crate::board::Columns;
use crate::calendar::Zone;
use crate::models::{Task, TaskKind, TimeSlot};
use crate::tui::widgets::color::{get_contrast_text_color, Palette};
use crate::utils::{format_tags_brackets, truncate};

/// Two-line card: title, then deadline and tags
pub fn card_lines(task: &Task, zone: &Zone, max_width: usize) -> Vec<String> {
    let marker = if task.kind == TaskKind::Event { "◆" } else { "•" };
    let first = truncate(&format!("{} {}", marker, task.title), max_width);

    let mut details = Vec::new();
    if let Some(deadline) = &task.deadline {
        details.push(format!("due {}", zone.date_of(deadline)));
    }
    if !task.tags.is_empty() {
        details.push(format_tags_brackets(&task.tags));
    }
    if details.is_empty() {
        vec![first]
    } else {
        vec![first, truncate(&format!("  {}", details.join(" ")), max_width)]
    }
}

pub fn render_board(
    f: &mut Frame,
    areas: [Rect; 3],
    columns: &Columns<'_>,
    selected: (TimeSlot, usize),
    zone: &Zone,
    palette: &Palette,
) {
    for (slot, area) in TimeSlot::ALL.into_iter().zip(areas) {
        let tasks = columns.column(slot);
        let color = palette.column(slot);
        let is_selected_column = slot == selected.0;
        let max_width = area.width.saturating_sub(4) as usize;

        let items: Vec<ListItem> = tasks
            .iter()
            .map(|task| ListItem::new(card_lines(task, zone, max_width).into_iter().map(Line::from).collect::<Vec<_>>()))
            .collect();

        let border_style = if is_selected_column {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        let title = Line::from(vec![
            Span::styled(format!(" {} ", slot.label()), border_style),
            Span::raw(format!("({}) ", tasks.len())),
        ]);

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).border_style(border_style).title(title))
            .highlight_style(
                Style::default()
                    .fg(get_contrast_text_color(color))
                    .bg(color)
                    .add_modifier(Modifier::BOLD),
            );

        let mut state = ListState::default();
        if is_selected_column && !tasks.is_empty() {
            state.select(Some(selected.1.min(tasks.len() - 1)));
        }
        f.render_stateful_widget(list, area, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};

    #[test]
    fn cards_show_deadline_and_tags_on_a_second_line() {
        let at = Utc.with_ymd_and_hms(2025, 1, 6, 3, 0, 0).unwrap();
        let mut task = Task {
            id: 1,
            title: "Write the quarterly report".into(),
            description: None,
            time_slot: TimeSlot::Todo,
            deadline: Some(at),
            kind: TaskKind::Task,
            tags: vec!["work".into()],
            user_id: "alice".into(),
            created_at: at,
            updated_at: at,
        };
        let zone = Zone::Fixed(FixedOffset::west_opt(5 * 3600).unwrap());
        assert_eq!(card_lines(&task, &zone, 40), vec!["• Write the quarterly report", "  due 2025-01-05 [work]"]);
        assert_eq!(card_lines(&task, &zone, 10)[0], "• Write...");

        task.deadline = None;
        task.tags.clear();
        task.kind = TaskKind::Event;
        assert_eq!(card_lines(&task, &zone, 40), vec!["◆ Write the quarterly report"]);
    }
}
