use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Tabs;
use ratatui::Frame;

use crate::tui::app::Tab;
use crate::tui::widgets::color::{get_contrast_text_color, Palette};

pub fn render_tabs(f: &mut Frame, area: Rect, current_tab: Tab, palette: &Palette) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|tab| Line::from(vec![Span::raw("  "), Span::raw(tab.title()), Span::raw("  ")]))
        .collect();

    let tabs = Tabs::new(titles)
        .select(current_tab.index())
        .highlight_style(
            Style::default()
                .fg(get_contrast_text_color(palette.accent))
                .bg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )
        .divider("  ")
        .padding("", "");

    f.render_widget(tabs, area);
}
