use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::habits;
use crate::models::{
    Habit, HabitCompletion, JournalEntry, JournalPatch, NewHabit, NewJournalEntry, NewTask,
    Task, TimeSlot,
};
use crate::store::{HabitStore, JournalStore, StoreError, TaskStore, TimeRange};
use crate::utils::{format_timestamp, now_utc, parse_timestamp};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("Failed to encode column: {0}")]
    EncodeError(#[from] serde_json::Error),
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Backend(format!("failed to encode column: {}", err))
    }
}

const TASK_COLUMNS: &str =
    "id, title, description, time_slot, deadline, type, tags, user_id, created_at, updated_at";
const HABIT_COLUMNS: &str =
    "id, title, description, schedule, checklist, category, tags, user_id, created_at";
const COMPLETION_COLUMNS: &str = "id, habit_id, user_id, completed_at";
const JOURNAL_COLUMNS: &str = "id, content, original_content, mood, tags, ai_summary, \
     created_at, updated_at, user_id";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create a new database connection and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        let db = Database { conn };
        db.initialize_schema()?;
        debug!(path = %db_path.display(), "database opened");

        Ok(db)
    }

    /// Private database for tests and throwaway sessions
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let db = Database { conn: Connection::open_in_memory()? };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize the database schema (tables and indexes)
    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id         TEXT NOT NULL,
                title           TEXT NOT NULL,
                description     TEXT,
                time_slot       TEXT NOT NULL DEFAULT 'todo'
                                CHECK (time_slot IN ('todo', 'in_progress', 'done')),
                deadline        TEXT,
                type            TEXT NOT NULL DEFAULT 'task',
                tags            TEXT NOT NULL DEFAULT '[]',
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS habits (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id         TEXT NOT NULL,
                title           TEXT NOT NULL,
                description     TEXT,
                schedule        TEXT NOT NULL,
                checklist       TEXT NOT NULL DEFAULT '[]',
                category        TEXT,
                tags            TEXT NOT NULL DEFAULT '[]',
                created_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS habit_completions (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                habit_id        INTEGER NOT NULL,
                user_id         TEXT NOT NULL,
                completed_at    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS journal_entries (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id          TEXT NOT NULL,
                content          TEXT NOT NULL,
                original_content TEXT NOT NULL,
                mood             TEXT NOT NULL,
                tags             TEXT NOT NULL DEFAULT '[]',
                ai_summary       TEXT,
                created_at       TEXT NOT NULL,
                updated_at       TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_habits_user ON habits(user_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_completions_user ON habit_completions(user_id, completed_at);
            CREATE INDEX IF NOT EXISTS idx_completions_habit ON habit_completions(habit_id);
            CREATE INDEX IF NOT EXISTS idx_journal_user ON journal_entries(user_id, created_at);",
        )?;
        Ok(())
    }

    /// Attach an AI summary to an entry. Summaries come from an external process; nothing
    /// in daybook generates them.
    pub fn set_ai_summary(&self, user_id: &str, id: i64, summary: Option<&str>) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE journal_entries SET ai_summary = ?1 WHERE id = ?2 AND user_id = ?3",
            rusqlite::params![summary, id, user_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn get_task(&self, user_id: &str, id: i64) -> Result<Task, StoreError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = ?1 AND user_id = ?2", TASK_COLUMNS);
        self.conn
            .query_row(&sql, rusqlite::params![id, user_id], Self::row_to_task)
            .optional()?
            .ok_or(StoreError::NotFound { table: "tasks", id })
    }

    fn get_habit(&self, user_id: &str, id: i64) -> Result<Habit, StoreError> {
        let sql = format!("SELECT {} FROM habits WHERE id = ?1 AND user_id = ?2", HABIT_COLUMNS);
        self.conn
            .query_row(&sql, rusqlite::params![id, user_id], Self::row_to_habit)
            .optional()?
            .ok_or(StoreError::NotFound { table: "habits", id })
    }

    fn get_journal_entry(&self, user_id: &str, id: i64) -> Result<JournalEntry, StoreError> {
        let sql = format!(
            "SELECT {} FROM journal_entries WHERE id = ?1 AND user_id = ?2",
            JOURNAL_COLUMNS
        );
        self.conn
            .query_row(&sql, rusqlite::params![id, user_id], Self::row_to_journal)
            .optional()?
            .ok_or(StoreError::NotFound { table: "journal_entries", id })
    }

    /// Helper function to map a row to a Task
    fn row_to_task(row: &Row) -> Result<Task, rusqlite::Error> {
        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            time_slot: get_parsed(row, 3)?,
            deadline: get_optional_timestamp(row, 4)?,
            kind: get_parsed(row, 5)?,
            tags: get_json(row, 6)?,
            user_id: row.get(7)?,
            created_at: get_timestamp(row, 8)?,
            updated_at: get_timestamp(row, 9)?,
        })
    }

    /// Helper function to map a row to a Habit
    fn row_to_habit(row: &Row) -> Result<Habit, rusqlite::Error> {
        Ok(Habit {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            schedule: get_json(row, 3)?,
            checklist: get_json(row, 4)?,
            category: row.get(5)?,
            tags: get_json(row, 6)?,
            user_id: row.get(7)?,
            created_at: get_timestamp(row, 8)?,
        })
    }

    fn row_to_completion(row: &Row) -> Result<HabitCompletion, rusqlite::Error> {
        Ok(HabitCompletion {
            id: row.get(0)?,
            habit_id: row.get(1)?,
            user_id: row.get(2)?,
            completed_at: get_timestamp(row, 3)?,
        })
    }

    /// Helper function to map a row to a JournalEntry
    fn row_to_journal(row: &Row) -> Result<JournalEntry, rusqlite::Error> {
        Ok(JournalEntry {
            id: row.get(0)?,
            content: row.get(1)?,
            original_content: row.get(2)?,
            mood: get_parsed(row, 3)?,
            tags: get_json(row, 4)?,
            ai_summary: row.get(5)?,
            created_at: get_timestamp(row, 6)?,
            updated_at: get_optional_timestamp(row, 7)?,
            user_id: row.get(8)?,
        })
    }
}

impl TaskStore for Database {
    #[instrument(skip(self))]
    fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
            TASK_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(rusqlite::params![user_id], Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = tasks.len(), "tasks loaded");
        Ok(tasks)
    }

    #[instrument(skip(self, task), fields(title = %task.title))]
    fn insert_task(&self, user_id: &str, task: &NewTask) -> Result<Task, StoreError> {
        if task.title.trim().is_empty() {
            return Err(StoreError::Invalid("task title is required".to_string()));
        }
        let now = format_timestamp(&now_utc());
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO tasks (user_id, title, description, time_slot, deadline, type, tags, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                user_id,
                task.title.trim(),
                task.description,
                TimeSlot::Todo.as_str(),
                task.deadline.as_ref().map(format_timestamp),
                task.kind.as_str(),
                serde_json::to_string(&task.tags)?,
                now,
                now
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        self.get_task(user_id, id)
    }

    #[instrument(skip(self))]
    fn update_task_slot(&self, user_id: &str, id: i64, slot: TimeSlot) -> Result<Task, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE tasks SET time_slot = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
            rusqlite::params![slot.as_str(), format_timestamp(&now_utc()), id, user_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { table: "tasks", id });
        }
        tx.commit()?;
        self.get_task(user_id, id)
    }

    #[instrument(skip(self))]
    fn delete_task(&self, user_id: &str, id: i64) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
            rusqlite::params![id, user_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { table: "tasks", id });
        }
        tx.commit()?;
        Ok(())
    }
}

impl HabitStore for Database {
    #[instrument(skip(self))]
    fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>, StoreError> {
        let sql = format!(
            "SELECT {} FROM habits WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
            HABIT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let habits = stmt
            .query_map(rusqlite::params![user_id], Self::row_to_habit)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    #[instrument(skip(self, habit), fields(title = %habit.title))]
    fn insert_habit(&self, user_id: &str, habit: &NewHabit) -> Result<Habit, StoreError> {
        if habit.title.trim().is_empty() {
            return Err(StoreError::Invalid("habit title is required".to_string()));
        }
        // Rows written by other clients skip the form, so the schedule is checked here too
        habits::validate_schedule(&habit.schedule)
            .map_err(|e| StoreError::Invalid(e.to_string()))?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO habits (user_id, title, description, schedule, checklist, category, tags, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                user_id,
                habit.title.trim(),
                habit.description,
                serde_json::to_string(&habit.schedule)?,
                serde_json::to_string(&habit.checklist)?,
                habit.category,
                serde_json::to_string(&habit.tags)?,
                format_timestamp(&now_utc())
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        self.get_habit(user_id, id)
    }

    /// Deletes the habit and its completion history
    #[instrument(skip(self))]
    fn delete_habit(&self, user_id: &str, id: i64) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM habit_completions WHERE habit_id = ?1 AND user_id = ?2",
            rusqlite::params![id, user_id],
        )?;
        let changed = tx.execute(
            "DELETE FROM habits WHERE id = ?1 AND user_id = ?2",
            rusqlite::params![id, user_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { table: "habits", id });
        }
        tx.commit()?;
        Ok(())
    }

    #[instrument(skip(self))]
    fn list_completions(&self, user_id: &str) -> Result<Vec<HabitCompletion>, StoreError> {
        let sql = format!(
            "SELECT {} FROM habit_completions WHERE user_id = ?1 ORDER BY completed_at DESC, id DESC",
            COMPLETION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let completions = stmt
            .query_map(rusqlite::params![user_id], Self::row_to_completion)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(completions)
    }

    #[instrument(skip(self))]
    fn insert_completion(
        &self,
        user_id: &str,
        habit_id: i64,
        completed_at: DateTime<Utc>,
    ) -> Result<HabitCompletion, StoreError> {
        // Completions may only reference the user's own habits
        self.get_habit(user_id, habit_id)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO habit_completions (habit_id, user_id, completed_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![habit_id, user_id, format_timestamp(&completed_at)],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        let sql = format!("SELECT {} FROM habit_completions WHERE id = ?1", COMPLETION_COLUMNS);
        Ok(self.conn.query_row(&sql, rusqlite::params![id], Self::row_to_completion)?)
    }
}

impl JournalStore for Database {
    #[instrument(skip(self))]
    fn list_journal_entries(
        &self,
        user_id: &str,
        range: Option<TimeRange>,
    ) -> Result<Vec<JournalEntry>, StoreError> {
        let entries = if let Some(range) = range {
            let sql = format!(
                "SELECT {} FROM journal_entries
                 WHERE user_id = ?1 AND created_at >= ?2 AND created_at <= ?3
                 ORDER BY created_at DESC, id DESC",
                JOURNAL_COLUMNS
            );
            let mut stmt = self.conn.prepare(&sql)?;
            stmt.query_map(
                rusqlite::params![
                    user_id,
                    format_timestamp(&range.start),
                    format_timestamp(&range.end)
                ],
                Self::row_to_journal,
            )?
            .collect::<Result<Vec<_>, _>>()?
        } else {
            let sql = format!(
                "SELECT {} FROM journal_entries WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
                JOURNAL_COLUMNS
            );
            let mut stmt = self.conn.prepare(&sql)?;
            stmt.query_map(rusqlite::params![user_id], Self::row_to_journal)?
                .collect::<Result<Vec<_>, _>>()?
        };
        debug!(count = entries.len(), "journal entries loaded");
        Ok(entries)
    }

    fn journal_timestamps(&self, user_id: &str) -> Result<Vec<DateTime<Utc>>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT created_at FROM journal_entries WHERE user_id = ?1")?;
        let stamps = stmt
            .query_map(rusqlite::params![user_id], |row| get_timestamp(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stamps)
    }

    #[instrument(skip(self, entry))]
    fn insert_journal_entry(
        &self,
        user_id: &str,
        entry: &NewJournalEntry,
    ) -> Result<JournalEntry, StoreError> {
        if entry.content.trim().is_empty() {
            return Err(StoreError::Invalid("journal content is required".to_string()));
        }
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO journal_entries (user_id, content, original_content, mood, tags, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                user_id,
                entry.content,
                entry.content,
                entry.mood.as_str(),
                serde_json::to_string(&entry.tags)?,
                format_timestamp(&now_utc())
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        self.get_journal_entry(user_id, id)
    }

    #[instrument(skip(self, patch))]
    fn update_journal_entry(
        &self,
        user_id: &str,
        id: i64,
        patch: &JournalPatch,
    ) -> Result<JournalEntry, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE journal_entries SET content = ?1, mood = ?2, tags = ?3, updated_at = ?4
             WHERE id = ?5 AND user_id = ?6",
            rusqlite::params![
                patch.content,
                patch.mood.as_str(),
                serde_json::to_string(&patch.tags)?,
                patch.updated_at.as_ref().map(format_timestamp),
                id,
                user_id
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { table: "journal_entries", id });
        }
        tx.commit()?;
        self.get_journal_entry(user_id, id)
    }

    #[instrument(skip(self))]
    fn delete_journal_entry(&self, user_id: &str, id: i64) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "DELETE FROM journal_entries WHERE id = ?1 AND user_id = ?2",
            rusqlite::params![id, user_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { table: "journal_entries", id });
        }
        tx.commit()?;
        Ok(())
    }
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn get_timestamp(row: &Row, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).map_err(|e| conversion_error(idx, e))
}

fn get_optional_timestamp(row: &Row, idx: usize) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| parse_timestamp(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn get_parsed<T>(row: &Row, idx: usize) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| conversion_error(idx, e))
}

fn get_json<T: DeserializeOwned>(row: &Row, idx: usize) -> Result<T, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e))
}
