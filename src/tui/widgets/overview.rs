use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::dashboard::{Dashboard, DueLabel};
use crate::models::TimeSlot;
use crate::tui::widgets::color::Palette;

pub fn render_overview(f: &mut Frame, area: Rect, dashboard: Option<&Dashboard>, palette: &Palette) {
    let Some(dashboard) = dashboard else {
        let paragraph = Paragraph::new("Overview unavailable. Press r to reload.")
            .block(Block::default().borders(Borders::ALL).title("Overview"));
        f.render_widget(paragraph, area);
        return;
    };

    let split = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let tasks = &dashboard.tasks;
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let count_line = |label: &str, count: usize, style: Style| {
        Line::from(vec![Span::styled(format!("{:<13}", label), style), Span::raw(count.to_string())])
    };
    let summary = vec![
        count_line("Total", tasks.total, bold),
        count_line("Completed", tasks.done, Style::default().fg(palette.column(TimeSlot::Done))),
        count_line("In progress", tasks.in_progress, Style::default().fg(palette.column(TimeSlot::InProgress))),
        count_line("To do", tasks.todo, Style::default().fg(palette.column(TimeSlot::Todo))),
        Line::from(""),
        Line::from(tasks.sentence()),
        Line::from(""),
        Line::from(dashboard.journal_sentence()),
        Line::from(dashboard.habit_sentence()),
    ];
    let paragraph = Paragraph::new(summary)
        .block(Block::default().borders(Borders::ALL).title("Task Overview"))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, split[0]);

    let upcoming: Vec<Line> = if dashboard.upcoming.is_empty() {
        vec![Line::from("Nothing due")]
    } else {
        dashboard
            .upcoming
            .iter()
            .map(|deadline| {
                let style = match deadline.label {
                    DueLabel::Overdue => Style::default().fg(ratatui::style::Color::Red).add_modifier(Modifier::BOLD),
                    DueLabel::DueToday => Style::default().fg(palette.accent),
                    _ => Style::default(),
                };
                Line::from(vec![
                    Span::styled(format!("{:<13}", deadline.label.to_string()), style),
                    Span::raw(deadline.title.clone()),
                ])
            })
            .collect()
    };
    let paragraph = Paragraph::new(upcoming)
        .block(Block::default().borders(Borders::ALL).title("Upcoming Deadlines"))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, split[1]);
}
