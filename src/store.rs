//! Storage seam. Views receive a store as a parameter and never reach for a global handle.
//!
//! Every method is scoped by `user_id`; mutations return the row as storage recorded it so
//! callers reconcile against the authoritative copy.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    Habit, HabitCompletion, JournalEntry, JournalPatch, NewHabit, NewJournalEntry, NewTask,
    Task, TimeSlot,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{table} row {id} not found")]
    NotFound { table: &'static str, id: i64 },
    #[error("rejected by storage: {0}")]
    Invalid(String),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Inclusive creation-time window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start && *ts <= self.end
    }
}

pub trait TaskStore {
    /// All tasks of the user, newest first
    fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>, StoreError>;
    fn insert_task(&self, user_id: &str, task: &NewTask) -> Result<Task, StoreError>;
    fn update_task_slot(&self, user_id: &str, id: i64, slot: TimeSlot) -> Result<Task, StoreError>;
    fn delete_task(&self, user_id: &str, id: i64) -> Result<(), StoreError>;
}

pub trait HabitStore {
    /// All habits of the user, newest first
    fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>, StoreError>;
    fn insert_habit(&self, user_id: &str, habit: &NewHabit) -> Result<Habit, StoreError>;
    fn delete_habit(&self, user_id: &str, id: i64) -> Result<(), StoreError>;
    fn list_completions(&self, user_id: &str) -> Result<Vec<HabitCompletion>, StoreError>;
    fn insert_completion(
        &self,
        user_id: &str,
        habit_id: i64,
        completed_at: DateTime<Utc>,
    ) -> Result<HabitCompletion, StoreError>;
}

pub trait JournalStore {
    /// Entries of the user, newest first, optionally restricted to a creation-time window
    fn list_journal_entries(
        &self,
        user_id: &str,
        range: Option<TimeRange>,
    ) -> Result<Vec<JournalEntry>, StoreError>;
    /// Creation times of every entry of the user
    fn journal_timestamps(&self, user_id: &str) -> Result<Vec<DateTime<Utc>>, StoreError>;
    fn insert_journal_entry(
        &self,
        user_id: &str,
        entry: &NewJournalEntry,
    ) -> Result<JournalEntry, StoreError>;
    fn update_journal_entry(
        &self,
        user_id: &str,
        id: i64,
        patch: &JournalPatch,
    ) -> Result<JournalEntry, StoreError>;
    fn delete_journal_entry(&self, user_id: &str, id: i64) -> Result<(), StoreError>;
}
