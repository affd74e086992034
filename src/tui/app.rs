use std::time::Instant;
use tracing::{info, warn};

use crate::auth::Session;
use crate::board::{Columns, DropOutcome, TaskBoard};
use crate::calendar::Zone;
use crate::dashboard::Dashboard;
use crate::models::{NewTask, Task, TimeSlot};
use crate::tui::error::TuiError;
use crate::tui::widgets::color::Palette;
use crate::utils::parse_tags;
use crate::{Config, Database};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Board,
    Overview,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Board, Tab::Overview];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Board => "Kanban Board",
            Tab::Overview => "Overview",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Board => 0,
            Tab::Overview => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Search,
    Help,
    NewTask,
    ConfirmDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskField {
    #[default]
    Title,
    Tags,
}

/// The new-task popup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub tags: String,
    pub field: TaskField,
}

impl TaskForm {
    pub fn current_mut(&mut self) -> &mut String {
        match self.field {
            TaskField::Title => &mut self.title,
            TaskField::Tags => &mut self.tags,
        }
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            TaskField::Title => TaskField::Tags,
            TaskField::Tags => TaskField::Title,
        };
    }
}

#[derive(Debug, Default)]
pub struct Status {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

pub struct App {
    pub config: Config,
    pub database: Database,
    pub session: Session,
    pub zone: Zone,
    pub palette: Palette,
    pub board: TaskBoard,
    pub dashboard: Option<Dashboard>,
    pub current_tab: Tab,
    pub mode: Mode,
    pub selected_column: TimeSlot,
    pub selected_row: usize,
    pub search_query: String,
    pub task_form: TaskForm,
    /// Task awaiting delete confirmation
    pub pending_delete: Option<i64>,
    pub status: Status,
}

impl App {
    pub fn new(config: Config, database: Database, session: Session, zone: Zone) -> Result<Self, TuiError> {
        let board = TaskBoard::load(&database, &session)?;
        let palette = Palette::from_config(&config.colors);
        Ok(Self {
            config,
            database,
            session,
            zone,
            palette,
            board,
            dashboard: None,
            current_tab: Tab::Board,
            mode: Mode::Normal,
            selected_column: TimeSlot::Todo,
            selected_row: 0,
            search_query: String::new(),
            task_form: TaskForm::default(),
            pending_delete: None,
            status: Status::default(),
        })
    }

    /// Board columns after the search filter
    pub fn columns(&self) -> Columns<'_> {
        self.board.search(&self.search_query)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.columns().column(self.selected_column).get(self.selected_row).copied()
    }

    fn selected_task_id(&self) -> Option<i64> {
        self.selected_task().map(|t| t.id)
    }

    /// Keep the row index inside the selected column
    pub fn clamp_selection(&mut self) {
        let len = self.columns().column(self.selected_column).len();
        self.selected_row = self.selected_row.min(len.saturating_sub(1));
    }

    pub fn select_column(&mut self, slot: TimeSlot) {
        self.selected_column = slot;
        self.clamp_selection();
    }

    pub fn select_column_by(&mut self, delta: isize) {
        if let Some(slot) = neighbour(self.selected_column, delta) {
            self.select_column(slot);
        }
    }

    pub fn move_selection_up(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        let len = self.columns().column(self.selected_column).len();
        if self.selected_row + 1 < len {
            self.selected_row += 1;
        }
    }

    /// Drop the selected card onto `target`; the selection follows the card
    pub fn drop_selected(&mut self, target: &str) {
        let Some(task_id) = self.selected_task_id() else {
            return;
        };
        match self.board.drop_task(&self.database, task_id, target) {
            Ok(DropOutcome::Moved(task)) => {
                self.selected_column = task.time_slot;
                self.selected_row = self
                    .columns()
                    .column(task.time_slot)
                    .iter()
                    .position(|t| t.id == task.id)
                    .unwrap_or(0);
                self.set_status_message(format!("Moved \"{}\" to {}", task.title, task.time_slot.label()));
                self.dashboard = None;
            }
            Ok(DropOutcome::Ignored) => {}
            Err(e) => {
                self.clamp_selection();
                self.set_status_message(format!("Failed to move task: {}", e));
            }
        }
    }

    /// Drop the selected card on the column `delta` steps away, if there is one
    pub fn drop_selected_by(&mut self, delta: isize) {
        if let Some(slot) = neighbour(self.selected_column, delta) {
            self.drop_selected(slot.as_str());
        }
    }

    pub fn reload(&mut self) {
        match self.board.reload(&self.database) {
            Ok(()) => {
                self.clamp_selection();
                self.dashboard = None;
                self.refresh_overview();
                self.set_status_message("Reloaded".to_string());
            }
            Err(e) => self.set_status_message(format!("Failed to reload data: {}", e)),
        }
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        self.refresh_overview();
    }

    pub fn next_tab(&mut self) {
        let next = Tab::ALL[(self.current_tab.index() + 1) % Tab::ALL.len()];
        self.switch_tab(next);
    }

    /// Fetch the overview figures if they are shown and stale
    pub fn refresh_overview(&mut self) {
        if self.current_tab != Tab::Overview || self.dashboard.is_some() {
            return;
        }
        match Dashboard::load(&self.database, &self.session, &self.zone, self.config.upcoming_days) {
            Ok(dashboard) => self.dashboard = Some(dashboard),
            Err(e) => {
                warn!(error = %e, "overview unavailable");
                self.set_status_message(format!("Failed to load overview: {}", e));
            }
        }
    }

    pub fn enter_create_mode(&mut self) {
        self.task_form = TaskForm::default();
        self.mode = Mode::NewTask;
    }

    pub fn save_task_form(&mut self) {
        if self.task_form.title.trim().is_empty() {
            self.set_status_message("Validation error: Title is required".to_string());
            return;
        }
        let mut task = NewTask::new(self.task_form.title.trim());
        task.tags = parse_tags(Some(&self.task_form.tags));
        match self.board.create_task(&self.database, &task) {
            Ok(created) => {
                info!(task_id = created.id, "task created from board");
                self.mode = Mode::Normal;
                self.select_column(TimeSlot::Todo);
                self.selected_row = self
                    .columns()
                    .todo
                    .iter()
                    .position(|t| t.id == created.id)
                    .unwrap_or(0);
                self.dashboard = None;
                self.set_status_message("Task created".to_string());
            }
            Err(e) => self.set_status_message(format!("Failed to create task: {}", e)),
        }
    }

    pub fn begin_delete(&mut self) {
        if let Some(id) = self.selected_task_id() {
            self.pending_delete = Some(id);
            self.mode = Mode::ConfirmDelete;
        }
    }

    pub fn confirm_delete(&mut self) {
        self.mode = Mode::Normal;
        let Some(id) = self.pending_delete.take() else {
            return;
        };
        match self.board.delete_task(&self.database, id) {
            Ok(()) => self.set_status_message("Task deleted".to_string()),
            Err(e) => self.set_status_message(format!("Failed to delete task: {}", e)),
        }
        self.dashboard = None;
        self.clamp_selection();
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.mode = Mode::Normal;
    }

    pub fn enter_search_mode(&mut self) {
        self.mode = Mode::Search;
    }

    pub fn add_to_search(&mut self, ch: char) {
        self.search_query.push(ch);
        self.selected_row = 0;
        self.clamp_selection();
    }

    pub fn remove_from_search(&mut self) {
        self.search_query.pop();
        self.clamp_selection();
    }

    pub fn clear_search(&mut self) {
        self.search_query.clear();
        self.mode = Mode::Normal;
        self.clamp_selection();
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    /// Clear the status message after a few seconds
    pub fn check_status_message_timeout(&mut self) {
        const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 3;
        if let Some(time) = self.status.message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS {
                self.clear_status_message();
            }
        }
    }

    /// Key hints for the status bar in the current mode
    pub fn key_hints(&self) -> Vec<String> {
        let hints: &[&str] = match (self.mode, self.current_tab) {
            (Mode::Normal, Tab::Board) => &[
                "h/l column", "j/k card", "H/L move", "1-3 drop", "n new", "d delete", "/ search",
                "Tab overview", "r reload", "? help", "q quit",
            ],
            (Mode::Normal, Tab::Overview) => &["Tab board", "r reload", "? help", "q quit"],
            (Mode::Search, _) => &["type to filter", "Enter keep", "Esc clear"],
            (Mode::NewTask, _) => &["Tab next field", "Enter save", "Esc cancel"],
            (Mode::ConfirmDelete, _) => &["y/Enter delete", "n/Esc cancel"],
            (Mode::Help, _) => &["Esc/? close"],
        };
        hints.iter().map(|h| h.to_string()).collect()
    }
}

fn neighbour(slot: TimeSlot, delta: isize) -> Option<TimeSlot> {
    slot.index().checked_add_signed(delta).and_then(TimeSlot::from_index)
}

/// App over an in-memory database holding `titles` as alice's tasks
#[cfg(test)]
pub(crate) fn app_with_tasks(titles: &[&str]) -> App {
    use crate::store::TaskStore;

    let db = Database::open_in_memory().unwrap();
    for title in titles {
        db.insert_task("alice", &NewTask::new(*title)).unwrap();
    }
    let session = Session { user_id: "alice".into(), started_at: chrono::Utc::now() };
    App::new(Config::default(), db, session, Zone::Local).unwrap()
}
