use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, size as terminal_size};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;

use crate::models::TimeSlot;
use crate::tui::app::{App, Mode, Tab};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;

/// Raw mode plus alternate screen for the lifetime of the board
struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    fn enter() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self { active: true })
    }

    fn leave(&mut self) -> Result<(), TuiError> {
        if std::mem::take(&mut self.active) {
            disable_raw_mode()?;
            execute!(io::stdout(), LeaveAlternateScreen)?;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check terminal size before entering alternate screen so the message stays readable
    let (width, height) = terminal_size()?;
    let (min_width, min_height) = (Layout::MIN_WIDTH + 2, Layout::MIN_HEIGHT + 2);
    if width < min_width || height < min_height {
        return Err(TuiError::RenderError(format!(
            "The board needs at least {}x{} cells, this terminal is {}x{}",
            min_width, min_height, width, height
        )));
    }

    let mut guard = TerminalGuard::enter()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        app.check_status_message_timeout();

        let terminal_size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, terminal_size.width, terminal_size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect);
            crate::tui::render::render(f, &app, &layout);
        })?;

        // Only Press events, Windows also reports Release
        if event::poll(std::time::Duration::from_millis(16))? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event)? {
                    break;
                }
            }
        }
    }

    app.board.close();
    guard.leave()?;

    Ok(())
}

/// Apply one key press. Returns true when the user asked to quit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c') {
        return Ok(true);
    }

    match app.mode {
        Mode::Help => handle_help_mode(app, key_event),
        Mode::Search => handle_search_mode(app, key_event),
        Mode::NewTask => handle_create_mode(app, key_event),
        Mode::ConfirmDelete => handle_delete_confirmation(app, key_event),
        Mode::Normal => handle_normal_mode(app, key_event),
    }
}

fn handle_normal_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Char('?') => app.mode = Mode::Help,
        KeyCode::Tab | KeyCode::BackTab => app.next_tab(),
        KeyCode::Char('r') => app.reload(),
        _ if app.current_tab == Tab::Board => handle_board_key(app, key_event),
        _ => {}
    }
    Ok(false)
}

fn handle_board_key(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Char('h') | KeyCode::Left => app.select_column_by(-1),
        KeyCode::Char('l') | KeyCode::Right => app.select_column_by(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_selection_down(),
        KeyCode::Char('H') | KeyCode::Char('<') => app.drop_selected_by(-1),
        KeyCode::Char('L') | KeyCode::Char('>') => app.drop_selected_by(1),
        KeyCode::Char(c @ '1'..='3') => {
            let index = c as usize - '1' as usize;
            if let Some(slot) = TimeSlot::from_index(index) {
                app.drop_selected(slot.as_str());
            }
        }
        KeyCode::Char('n') => app.enter_create_mode(),
        KeyCode::Char('d') | KeyCode::Delete => app.begin_delete(),
        KeyCode::Char('/') => app.enter_search_mode(),
        KeyCode::Esc => app.clear_search(),
        _ => {}
    }
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if matches!(key_event.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
        app.mode = Mode::Normal;
    }
    Ok(false)
}

fn handle_search_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Esc => app.clear_search(),
        KeyCode::Enter => app.mode = Mode::Normal,
        KeyCode::Char(c) => app.add_to_search(c),
        KeyCode::Backspace => app.remove_from_search(),
        _ => {}
    }
    Ok(false)
}

fn handle_create_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Esc => app.mode = Mode::Normal,
        KeyCode::Enter => app.save_task_form(),
        KeyCode::Tab | KeyCode::BackTab => app.task_form.next_field(),
        KeyCode::Backspace => {
            app.task_form.current_mut().pop();
        }
        KeyCode::Char(c) => app.task_form.current_mut().push(c),
        _ => {}
    }
    Ok(false)
}

fn handle_delete_confirmation(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Enter => app.confirm_delete(),
        KeyCode::Char('n') | KeyCode::Esc => app.cancel_delete(),
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TaskStore;
    use crate::tui::app::app_with_tasks as app;

    fn press(app: &mut App, keys: &str) -> bool {
        let mut quit = false;
        for c in keys.chars() {
            quit = handle_key_event(app, KeyEvent::from(KeyCode::Char(c))).unwrap();
        }
        quit
    }

    #[test]
    fn number_keys_drop_on_columns() {
        let mut app = app(&["a"]);
        press(&mut app, "2");
        assert_eq!(app.board.tasks()[0].time_slot, TimeSlot::InProgress);
        // Dropping onto the current column changes nothing
        press(&mut app, "2");
        assert_eq!(app.database.list_tasks("alice").unwrap()[0].time_slot, TimeSlot::InProgress);
        press(&mut app, "<");
        assert_eq!(app.board.tasks()[0].time_slot, TimeSlot::Todo);
    }

    #[test]
    fn typing_a_new_task() {
        let mut app = app(&[]);
        press(&mut app, "n");
        assert_eq!(app.mode, Mode::NewTask);
        press(&mut app, "nq");
        handle_key_event(&mut app, KeyEvent::from(KeyCode::Enter)).unwrap();
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.board.tasks()[0].title, "nq");
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut app = app(&["a"]);
        press(&mut app, "dn");
        assert_eq!(app.board.tasks().len(), 1);
        press(&mut app, "dy");
        assert!(app.board.tasks().is_empty());
    }

    #[test]
    fn quit_only_from_normal_mode() {
        let mut app = app(&[]);
        press(&mut app, "/");
        assert!(!press(&mut app, "q"));
        assert_eq!(app.search_query, "q");
        handle_key_event(&mut app, KeyEvent::from(KeyCode::Esc)).unwrap();
        assert!(press(&mut app, "q"));
    }
}
