use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::widgets::color::{get_contrast_text_color, Palette};

/// Fit as many hints as the width allows, bullet separated, ending in "..." when cut short
pub fn fit_hints(key_hints: &[String], max_width: usize) -> String {
    const SEPARATOR: &str = " • ";
    const ELLIPSIS: &str = "...";

    let mut hints_text = String::new();
    for (i, hint) in key_hints.iter().enumerate() {
        let current_len = hints_text.chars().count();
        let would_be_len = if i == 0 {
            hint.chars().count()
        } else {
            current_len + SEPARATOR.chars().count() + hint.chars().count()
        };

        if would_be_len > max_width {
            if hints_text.is_empty() {
                hints_text = hint.chars().take(max_width.saturating_sub(ELLIPSIS.len())).collect();
            } else if current_len + ELLIPSIS.len() > max_width {
                hints_text = hints_text.chars().take(max_width.saturating_sub(ELLIPSIS.len())).collect();
            }
            hints_text.push_str(ELLIPSIS);
            break;
        }

        if i > 0 {
            hints_text.push_str(SEPARATOR);
        }
        hints_text.push_str(hint);
    }
    hints_text
}

pub fn render_status_bar(f: &mut Frame, area: Rect, message: Option<&str>, key_hints: &[String], palette: &Palette) {
    let max_width = area.width as usize;
    let (content, style) = match message {
        Some(msg) => {
            let mut content = msg.to_string();
            if content.chars().count() > max_width {
                content = content.chars().take(max_width.saturating_sub(3)).collect::<String>() + "...";
            }
            let style = Style::default()
                .fg(get_contrast_text_color(palette.accent))
                .bg(palette.accent)
                .add_modifier(Modifier::BOLD);
            (content, style)
        }
        None => (fit_hints(key_hints, max_width), Style::default()),
    };

    f.render_widget(Paragraph::new(content).style(style), area);
}
