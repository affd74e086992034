//! Kanban task board: the three-column status state machine and the view that applies it.
//!
//! Columns are `todo`, `in_progress` and `done`. Every column is reachable from every other
//! and none is terminal. A drop onto the task's own column is a no-op; a drop onto anything
//! that is not a column is ignored.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::auth::Session;
use crate::calendar::matches_query;
use crate::models::{NewTask, Task, TaskKind, TimeSlot};
use crate::store::{StoreError, TaskStore};
use crate::view::ViewState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("task {id} is already in {slot}")]
    NoChange { id: i64, slot: TimeSlot },
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Move a task to `target`. Pure; storage is not touched.
pub fn transition(task: &Task, target: TimeSlot) -> Result<Task, TransitionError> {
    if task.time_slot == target {
        return Err(TransitionError::NoChange { id: task.id, slot: target });
    }
    let mut moved = task.clone();
    moved.time_slot = target;
    Ok(moved)
}

/// Column id carried by a drop event; `None` for anything outside the three columns
pub fn parse_drop_target(target: &str) -> Option<TimeSlot> {
    target.trim().parse().ok()
}

/// Result of a drop that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Storage confirmed the move; carries the stored row
    Moved(Task),
    /// Same column, unknown column or unknown task
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BoardSummary {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl BoardSummary {
    /// Counts task-typed records only; events occupy columns but are not work items
    pub fn of<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut summary = BoardSummary::default();
        for task in tasks.into_iter().filter(|t| t.kind == TaskKind::Task) {
            summary.total += 1;
            match task.time_slot {
                TimeSlot::Todo => summary.todo += 1,
                TimeSlot::InProgress => summary.in_progress += 1,
                TimeSlot::Done => summary.done += 1,
            }
        }
        summary
    }

    pub fn sentence(&self) -> String {
        format!(
            "You have {} tasks To Do and {} tasks In Progress. Keep up the good work!",
            self.todo, self.in_progress
        )
    }
}

/// The three partitions of a task list, in list order
#[derive(Debug, Clone, Default)]
pub struct Columns<'a> {
    pub todo: Vec<&'a Task>,
    pub in_progress: Vec<&'a Task>,
    pub done: Vec<&'a Task>,
}

impl<'a> Columns<'a> {
    pub fn partition(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut columns = Columns::default();
        for task in tasks {
            columns.column_mut(task.time_slot).push(task);
        }
        columns
    }

    pub fn column(&self, slot: TimeSlot) -> &[&'a Task] {
        match slot {
            TimeSlot::Todo => &self.todo,
            TimeSlot::InProgress => &self.in_progress,
            TimeSlot::Done => &self.done,
        }
    }

    fn column_mut(&mut self, slot: TimeSlot) -> &mut Vec<&'a Task> {
        match slot {
            TimeSlot::Todo => &mut self.todo,
            TimeSlot::InProgress => &mut self.in_progress,
            TimeSlot::Done => &mut self.done,
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        TimeSlot::ALL.into_iter().any(|slot| self.column(slot).iter().any(|t| t.id == id))
    }

    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The signed-in user's task board
#[derive(Debug)]
pub struct TaskBoard {
    user_id: String,
    state: ViewState<Task>,
}

impl TaskBoard {
    pub fn new(session: &Session) -> Self {
        Self { user_id: session.user_id.clone(), state: ViewState::new() }
    }

    /// Build a board and fetch its tasks
    pub fn load(store: &dyn TaskStore, session: &Session) -> Result<Self, BoardError> {
        let mut board = Self::new(session);
        board.reload(store)?;
        Ok(board)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn tasks(&self) -> &[Task] {
        self.state.records()
    }

    pub fn task(&self, id: i64) -> Option<&Task> {
        self.tasks().iter().find(|t| t.id == id)
    }

    pub fn columns(&self) -> Columns<'_> {
        Columns::partition(self.tasks())
    }

    /// Columns restricted to tasks whose title, description or tags match `query`
    pub fn search(&self, query: &str) -> Columns<'_> {
        Columns::partition(self.tasks().iter().filter(|t| {
            let text = format!("{}\n{}", t.title, t.description.as_deref().unwrap_or(""));
            matches_query(query, &text, &t.tags)
        }))
    }

    pub fn summary(&self) -> BoardSummary {
        BoardSummary::of(self.tasks())
    }

    /// Replace the local copy with what storage holds
    #[instrument(skip(self, store), fields(user = %self.user_id))]
    pub fn reload(&mut self, store: &dyn TaskStore) -> Result<(), BoardError> {
        let ticket = self.state.begin_fetch();
        let tasks = store.list_tasks(&self.user_id)?;
        debug!(count = tasks.len(), "board fetched");
        self.state.apply(ticket, tasks);
        Ok(())
    }

    /// Handle a drop of `task_id` onto the column named `target`
    #[instrument(skip(self, store), fields(user = %self.user_id))]
    pub fn drop_task(
        &mut self,
        store: &dyn TaskStore,
        task_id: i64,
        target: &str,
    ) -> Result<DropOutcome, BoardError> {
        let Some(slot) = parse_drop_target(target) else {
            debug!(drop_target = target, "drop outside any column ignored");
            return Ok(DropOutcome::Ignored);
        };
        let Some(task) = self.task(task_id) else {
            warn!(task_id, "drop of a task not on the board ignored");
            return Ok(DropOutcome::Ignored);
        };
        let from = task.time_slot;
        let moved = match transition(task, slot) {
            Ok(moved) => moved,
            Err(err) => {
                debug!(%err, "no-op drop");
                return Ok(DropOutcome::Ignored);
            }
        };

        match store.update_task_slot(&self.user_id, moved.id, moved.time_slot) {
            Ok(stored) => {
                info!(task_id, %from, to = %stored.time_slot, "task moved");
                self.state.patch(|t| t.id == stored.id, stored.clone());
                Ok(DropOutcome::Moved(stored))
            }
            Err(err) => {
                error!(task_id, error = %err, "failed to move task, reconciling with storage");
                self.reconcile(store);
                Err(err.into())
            }
        }
    }

    /// Create a task in `todo`, then refetch. A failed refetch does not undo the stored row.
    #[instrument(skip(self, store, task), fields(user = %self.user_id))]
    pub fn create_task(&mut self, store: &dyn TaskStore, task: &NewTask) -> Result<Task, BoardError> {
        let created = store.insert_task(&self.user_id, task).inspect_err(|err| {
            error!(error = %err, "failed to create task");
        })?;
        info!(task_id = created.id, "task created");
        self.reconcile(store);
        Ok(created)
    }

    #[instrument(skip(self, store), fields(user = %self.user_id))]
    pub fn delete_task(&mut self, store: &dyn TaskStore, task_id: i64) -> Result<(), BoardError> {
        match store.delete_task(&self.user_id, task_id) {
            Ok(()) => {
                info!(task_id, "task deleted");
                self.state.remove(|t| t.id == task_id);
                Ok(())
            }
            Err(err) => {
                error!(task_id, error = %err, "failed to delete task");
                self.reconcile(store);
                Err(err.into())
            }
        }
    }

    /// Stop accepting results, e.g. when the screen showing the board closes
    pub fn close(&mut self) {
        self.state.unmount();
    }

    fn reconcile(&mut self, store: &dyn TaskStore) {
        if let Err(err) = self.reload(store) {
            warn!(error = %err, "refetch after failed mutation also failed; keeping last confirmed state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use chrono::Utc;
    use std::cell::Cell;

    fn session(user: &str) -> Session {
        Session { user_id: user.to_string(), started_at: Utc::now() }
    }

    fn seeded(titles: &[&str]) -> (Database, TaskBoard) {
        let db = Database::open_in_memory().unwrap();
        for title in titles {
            db.insert_task("alice", &NewTask::new(*title)).unwrap();
        }
        let board = TaskBoard::load(&db, &session("alice")).unwrap();
        (db, board)
    }

    /// Wraps a real store and fails slot updates on demand
    struct FlakyStore<'a> {
        inner: &'a Database,
        fail_updates: Cell<bool>,
        fail_lists: Cell<bool>,
    }

    impl<'a> FlakyStore<'a> {
        fn new(inner: &'a Database) -> Self {
            Self { inner, fail_updates: Cell::new(false), fail_lists: Cell::new(false) }
        }
    }

    impl TaskStore for FlakyStore<'_> {
        fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>, StoreError> {
            if self.fail_lists.get() {
                return Err(StoreError::Backend("read timeout".into()));
            }
            self.inner.list_tasks(user_id)
        }
        fn insert_task(&self, user_id: &str, task: &NewTask) -> Result<Task, StoreError> {
            self.inner.insert_task(user_id, task)
        }
        fn update_task_slot(&self, user_id: &str, id: i64, slot: TimeSlot) -> Result<Task, StoreError> {
            if self.fail_updates.get() {
                return Err(StoreError::Backend("connection reset".into()));
            }
            self.inner.update_task_slot(user_id, id, slot)
        }
        fn delete_task(&self, user_id: &str, id: i64) -> Result<(), StoreError> {
            self.inner.delete_task(user_id, id)
        }
    }

    #[test]
    fn transition_changes_only_the_slot() {
        let (_db, board) = seeded(&["a"]);
        let task = &board.tasks()[0];
        let moved = transition(task, TimeSlot::Done).unwrap();
        assert_eq!(moved.time_slot, TimeSlot::Done);
        assert_eq!(moved.title, task.title);
        assert_eq!(
            transition(task, TimeSlot::Todo),
            Err(TransitionError::NoChange { id: task.id, slot: TimeSlot::Todo })
        );
    }

    #[test]
    fn every_column_reaches_every_other() {
        let (db, mut board) = seeded(&["a"]);
        let id = board.tasks()[0].id;
        for (target, expected) in [
            ("done", TimeSlot::Done),
            ("todo", TimeSlot::Todo),
            ("in_progress", TimeSlot::InProgress),
            ("done", TimeSlot::Done),
            ("in_progress", TimeSlot::InProgress),
        ] {
            let outcome = board.drop_task(&db, id, target).unwrap();
            assert!(matches!(outcome, DropOutcome::Moved(ref t) if t.time_slot == expected));
            assert_eq!(board.task(id).unwrap().time_slot, expected);
        }
        assert_eq!(db.list_tasks("alice").unwrap()[0].time_slot, TimeSlot::InProgress);
    }

    #[test]
    fn dropping_on_the_same_column_changes_nothing() {
        let (db, mut board) = seeded(&["a", "b"]);
        let before = board.tasks().to_vec();
        let id = before[0].id;
        assert_eq!(board.drop_task(&db, id, "todo").unwrap(), DropOutcome::Ignored);
        assert_eq!(board.tasks(), before.as_slice());
        assert_eq!(db.list_tasks("alice").unwrap(), before);
    }

    #[test]
    fn malformed_targets_and_unknown_tasks_are_ignored() {
        let (db, mut board) = seeded(&["a"]);
        let id = board.tasks()[0].id;
        assert_eq!(board.drop_task(&db, id, "trash").unwrap(), DropOutcome::Ignored);
        assert_eq!(board.drop_task(&db, id, "").unwrap(), DropOutcome::Ignored);
        assert_eq!(board.drop_task(&db, 999, "done").unwrap(), DropOutcome::Ignored);
        assert_eq!(board.tasks()[0].time_slot, TimeSlot::Todo);
    }

    #[test]
    fn failed_update_leaves_board_matching_storage() {
        let db = Database::open_in_memory().unwrap();
        db.insert_task("alice", &NewTask::new("a")).unwrap();
        let store = FlakyStore::new(&db);
        store.fail_updates.set(true);
        let mut board = TaskBoard::load(&store, &session("alice")).unwrap();
        let id = board.tasks()[0].id;

        assert!(board.drop_task(&store, id, "done").is_err());
        assert_eq!(board.tasks()[0].time_slot, TimeSlot::Todo);
        assert_eq!(board.tasks(), db.list_tasks("alice").unwrap().as_slice());

        store.fail_updates.set(false);
        assert!(matches!(board.drop_task(&store, id, "done").unwrap(), DropOutcome::Moved(_)));
    }

    #[test]
    fn refetch_picks_up_changes_made_elsewhere() {
        let db = Database::open_in_memory().unwrap();
        let task = db.insert_task("alice", &NewTask::new("a")).unwrap();
        let store = FlakyStore::new(&db);
        store.fail_updates.set(true);
        let mut board = TaskBoard::load(&store, &session("alice")).unwrap();
        // Another client finishes the task behind the board's back
        db.update_task_slot("alice", task.id, TimeSlot::Done).unwrap();

        assert!(board.drop_task(&store, task.id, "in_progress").is_err());
        assert_eq!(board.task(task.id).unwrap().time_slot, TimeSlot::Done);
    }

    #[test]
    fn partitions_cover_every_task_once() {
        let (db, mut board) = seeded(&["a", "b", "c", "d"]);
        let ids: Vec<i64> = board.tasks().iter().map(|t| t.id).collect();
        board.drop_task(&db, ids[0], "done").unwrap();
        board.drop_task(&db, ids[1], "in_progress").unwrap();

        let columns = board.columns();
        assert_eq!(columns.len(), board.tasks().len());
        assert_eq!(columns.todo.len(), 2);
        assert_eq!(columns.column(TimeSlot::Done)[0].id, ids[0]);

        let summary = board.summary();
        assert_eq!(summary, BoardSummary { total: 4, todo: 2, in_progress: 1, done: 1 });
        assert_eq!(summary.total, summary.todo + summary.in_progress + summary.done);
    }

    #[test]
    fn events_are_shown_but_not_counted() {
        let db = Database::open_in_memory().unwrap();
        db.insert_task("alice", &NewTask::new("task")).unwrap();
        let mut event = NewTask::new("standup");
        event.kind = TaskKind::Event;
        db.insert_task("alice", &event).unwrap();

        let board = TaskBoard::load(&db, &session("alice")).unwrap();
        assert_eq!(board.columns().todo.len(), 2);
        assert_eq!(board.summary().total, 1);
        assert!(board.summary().sentence().starts_with("You have 1 tasks To Do and 0 tasks In Progress"));
    }

    #[test]
    fn create_and_delete_reconcile_with_storage() {
        let (db, mut board) = seeded(&[]);
        let created = board.create_task(&db, &NewTask::new("new")).unwrap();
        assert_eq!(created.time_slot, TimeSlot::Todo);
        assert_eq!(board.tasks().len(), 1);

        board.delete_task(&db, created.id).unwrap();
        assert!(board.tasks().is_empty());
        assert!(board.delete_task(&db, created.id).is_err());
        assert!(board.tasks().is_empty());
    }

    #[test]
    fn created_task_is_returned_when_refetch_fails() {
        let db = Database::open_in_memory().unwrap();
        let store = FlakyStore::new(&db);
        let mut board = TaskBoard::load(&store, &session("alice")).unwrap();

        store.fail_lists.set(true);
        let created = board.create_task(&store, &NewTask::new("kept")).unwrap();
        assert_eq!(db.list_tasks("alice").unwrap(), vec![created]);

        store.fail_lists.set(false);
        board.reload(&store).unwrap();
        assert_eq!(board.tasks().len(), 1);
    }

    #[test]
    fn search_matches_title_and_tags() {
        let db = Database::open_in_memory().unwrap();
        let mut tagged = NewTask::new("buy milk");
        tagged.tags = vec!["errand".into()];
        db.insert_task("alice", &tagged).unwrap();
        db.insert_task("alice", &NewTask::new("write code")).unwrap();
        let board = TaskBoard::load(&db, &session("alice")).unwrap();

        assert_eq!(board.search("CODE").todo[0].title, "write code");
        assert_eq!(board.search("errand").len(), 1);
        assert_eq!(board.search("").len(), 2);
    }

    #[test]
    fn closed_board_ignores_late_results() {
        let (db, mut board) = seeded(&["a"]);
        board.close();
        db.insert_task("alice", &NewTask::new("b")).unwrap();
        board.reload(&db).unwrap();
        assert_eq!(board.tasks().len(), 1);
    }
}
