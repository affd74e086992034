use ratatui::layout::Alignment;
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::tui::app::{App, Mode, Tab};
use crate::tui::widgets::{
    board::render_board,
    confirm_delete::render_confirm_delete,
    help::render_help,
    overview::render_overview,
    status_bar::render_status_bar,
    tabs::render_tabs,
    task_form::{render_search_prompt, render_task_form},
};
use crate::tui::Layout;

pub fn render(f: &mut Frame, app: &App, layout: &Layout) {
    let title = format!(" daybook - {} ", app.session.user_id);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center);
    f.render_widget(outer_block, f.area());

    render_tabs(f, layout.tabs_area, app.current_tab, &app.palette);

    match app.current_tab {
        Tab::Board => {
            let columns = app.columns();
            render_board(
                f,
                layout.columns(),
                &columns,
                (app.selected_column, app.selected_row),
                &app.zone,
                &app.palette,
            );
        }
        Tab::Overview => render_overview(f, layout.main_area, app.dashboard.as_ref(), &app.palette),
    }

    if app.mode == Mode::Search {
        render_search_prompt(f, layout.status_area, &app.search_query, &app.palette);
    } else {
        render_status_bar(
            f,
            layout.status_area,
            app.status.message.as_deref(),
            &app.key_hints(),
            &app.palette,
        );
    }

    // Popups render last so they sit on top
    match app.mode {
        Mode::Help => render_help(f, layout.inner_area),
        Mode::NewTask => render_task_form(f, layout.inner_area, &app.task_form, &app.palette),
        Mode::ConfirmDelete => {
            if let Some(task) = app.pending_delete.and_then(|id| app.board.task(id)) {
                render_confirm_delete(f, layout.inner_area, task);
            }
        }
        Mode::Normal | Mode::Search => {}
    }
}
