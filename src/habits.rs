use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::auth::Session;
use crate::calendar::{self, MonthColumn, Zone};
use crate::models::{ChecklistItem, Habit, HabitCompletion, NewHabit, Schedule, ScheduleType};
use crate::store::{HabitStore, StoreError};
use crate::view::ViewState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("daily habits take no days, got {0:?}")]
    DaysOnDaily(Vec<u8>),
    #[error("weekday {0} out of range 0-6 (Sunday = 0)")]
    InvalidWeekday(u8),
    #[error("day of month {0} out of range 1-31")]
    InvalidMonthDay(u8),
}

#[derive(Debug, Error)]
pub enum HabitError {
    #[error("Habit title is required")]
    TitleRequired,
    #[error("Invalid schedule: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

fn check_day(kind: ScheduleType, day: u8) -> Result<(), ScheduleError> {
    match kind {
        ScheduleType::Daily => Err(ScheduleError::DaysOnDaily(vec![day])),
        ScheduleType::Weekly if day > 6 => Err(ScheduleError::InvalidWeekday(day)),
        ScheduleType::Monthly if !(1..=31).contains(&day) => Err(ScheduleError::InvalidMonthDay(day)),
        _ => Ok(()),
    }
}

/// Check the day indices of an already-built schedule
pub fn validate_schedule(schedule: &Schedule) -> Result<(), ScheduleError> {
    if schedule.kind == ScheduleType::Daily {
        if schedule.days.is_empty() {
            return Ok(());
        }
        return Err(ScheduleError::DaysOnDaily(schedule.days.clone()));
    }
    schedule.days.iter().try_for_each(|d| check_day(schedule.kind, *d))
}

impl Schedule {
    /// Validated schedule with sorted, de-duplicated days
    pub fn new(kind: ScheduleType, days: impl IntoIterator<Item = u8>) -> Result<Self, ScheduleError> {
        let days: BTreeSet<u8> = days.into_iter().collect();
        let schedule = Schedule { kind, days: days.into_iter().collect() };
        validate_schedule(&schedule)?;
        Ok(schedule)
    }

    pub fn daily() -> Self {
        Schedule { kind: ScheduleType::Daily, days: Vec::new() }
    }

    pub fn describe(&self) -> String {
        const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
        match self.kind {
            ScheduleType::Daily => "daily".to_string(),
            ScheduleType::Weekly if self.days.is_empty() => "weekly".to_string(),
            ScheduleType::Weekly => {
                let names: Vec<&str> = self
                    .days
                    .iter()
                    .filter_map(|d| WEEKDAYS.get(*d as usize).copied())
                    .collect();
                format!("weekly on {}", names.join(", "))
            }
            ScheduleType::Monthly if self.days.is_empty() => "monthly".to_string(),
            ScheduleType::Monthly => {
                let days: Vec<String> = self.days.iter().map(u8::to_string).collect();
                format!("monthly on day {}", days.join(", "))
            }
        }
    }
}

/// State of the habit creation form
#[derive(Debug, Clone, PartialEq)]
pub struct HabitDraft {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    schedule: Schedule,
    checklist: Vec<ChecklistItem>,
}

impl Default for HabitDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category: None,
            tags: Vec::new(),
            schedule: Schedule::daily(),
            checklist: vec![ChecklistItem { id: Uuid::new_v4().to_string(), title: String::new() }],
        }
    }
}

impl HabitDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn checklist(&self) -> &[ChecklistItem] {
        &self.checklist
    }

    /// Switching type clears the selected days
    pub fn set_schedule_type(&mut self, kind: ScheduleType) {
        if self.schedule.kind != kind {
            self.schedule = Schedule { kind, days: Vec::new() };
        }
    }

    /// Select or deselect a day for the current schedule type
    pub fn toggle_day(&mut self, day: u8) -> Result<(), ScheduleError> {
        check_day(self.schedule.kind, day)?;
        let days = &mut self.schedule.days;
        match days.binary_search(&day) {
            Ok(pos) => {
                days.remove(pos);
            }
            Err(pos) => days.insert(pos, day),
        }
        Ok(())
    }

    pub fn add_item(&mut self) -> &str {
        let id = Uuid::new_v4().to_string();
        self.checklist.push(ChecklistItem { id, title: String::new() });
        &self.checklist[self.checklist.len() - 1].id
    }

    pub fn remove_item(&mut self, id: &str) {
        self.checklist.retain(|item| item.id != id);
    }

    pub fn rename_item(&mut self, id: &str, title: impl Into<String>) {
        if let Some(item) = self.checklist.iter_mut().find(|item| item.id == id) {
            item.title = title.into();
        }
    }

    /// Convenience for non-interactive callers: append an item with a title
    pub fn push_item(&mut self, title: impl Into<String>) {
        let id = self.add_item().to_string();
        self.rename_item(&id, title);
    }

    /// Validated record ready for storage. Blank checklist items are dropped.
    pub fn submit(&self) -> Result<NewHabit, HabitError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(HabitError::TitleRequired);
        }
        validate_schedule(&self.schedule)?;
        let description = self.description.trim();
        Ok(NewHabit {
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            schedule: self.schedule.clone(),
            checklist: self
                .checklist
                .iter()
                .filter(|item| !item.title.trim().is_empty())
                .cloned()
                .collect(),
            category: self.category.clone().filter(|c| !c.trim().is_empty()),
            tags: self.tags.clone(),
        })
    }
}

/// Consecutive local days with at least one completion, ending today or, if nothing was done
/// yet today, yesterday
pub fn current_streak<'a, I>(completions: I, today: NaiveDate, zone: &Zone) -> u32
where
    I: IntoIterator<Item = &'a DateTime<Utc>>,
{
    let days: BTreeSet<NaiveDate> = completions.into_iter().map(|ts| zone.date_of(ts)).collect();
    let mut day = if days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };
    let mut streak = 0;
    while days.contains(&day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

/// Habits plus their completion history for the signed-in user
#[derive(Debug)]
pub struct HabitsView {
    user_id: String,
    zone: Zone,
    habits: ViewState<Habit>,
    completions: ViewState<HabitCompletion>,
}

impl HabitsView {
    pub fn load(store: &dyn HabitStore, session: &Session, zone: Zone) -> Result<Self, HabitError> {
        let mut view = Self {
            user_id: session.user_id.clone(),
            zone,
            habits: ViewState::new(),
            completions: ViewState::new(),
        };
        view.reload(store)?;
        Ok(view)
    }

    pub fn habits(&self) -> &[Habit] {
        self.habits.records()
    }

    pub fn completions(&self) -> &[HabitCompletion] {
        self.completions.records()
    }

    #[instrument(skip(self, store), fields(user = %self.user_id))]
    pub fn reload(&mut self, store: &dyn HabitStore) -> Result<(), HabitError> {
        let habits_ticket = self.habits.begin_fetch();
        let completions_ticket = self.completions.begin_fetch();
        let habits = store.list_habits(&self.user_id)?;
        let completions = store.list_completions(&self.user_id)?;
        self.habits.apply(habits_ticket, habits);
        self.completions.apply(completions_ticket, completions);
        Ok(())
    }

    #[instrument(skip(self, store, draft), fields(user = %self.user_id))]
    pub fn create(&mut self, store: &dyn HabitStore, draft: &HabitDraft) -> Result<Habit, HabitError> {
        let new = draft.submit()?;
        let habit = store.insert_habit(&self.user_id, &new).inspect_err(|err| {
            error!(error = %err, "failed to create habit");
        })?;
        info!(habit_id = habit.id, schedule = %habit.schedule.kind, "habit created");
        self.reconcile(store);
        Ok(habit)
    }

    #[instrument(skip(self, store), fields(user = %self.user_id))]
    pub fn complete(
        &mut self,
        store: &dyn HabitStore,
        habit_id: i64,
        at: DateTime<Utc>,
    ) -> Result<HabitCompletion, HabitError> {
        let completion = store.insert_completion(&self.user_id, habit_id, at).inspect_err(|err| {
            error!(habit_id, error = %err, "failed to record completion");
        })?;
        info!(habit_id, "habit completed");
        self.reconcile(store);
        Ok(completion)
    }

    #[instrument(skip(self, store), fields(user = %self.user_id))]
    pub fn delete(&mut self, store: &dyn HabitStore, habit_id: i64) -> Result<(), HabitError> {
        if let Err(err) = store.delete_habit(&self.user_id, habit_id) {
            error!(habit_id, error = %err, "failed to delete habit");
            self.reconcile(store);
            return Err(err.into());
        }
        info!(habit_id, "habit deleted");
        self.habits.remove(|h| h.id == habit_id);
        self.completions.remove(|c| c.habit_id == habit_id);
        self.reconcile(store);
        Ok(())
    }

    /// Completions per local day across all habits
    pub fn contributions(&self) -> BTreeMap<NaiveDate, u32> {
        calendar::contribution_counts(self.completions().iter().map(|c| &c.completed_at), &self.zone)
    }

    pub fn year_grid(&self, year: i32) -> Vec<MonthColumn> {
        calendar::year_grid(year, &self.contributions())
    }

    pub fn streak(&self, habit_id: i64, today: NaiveDate) -> u32 {
        current_streak(
            self.completions()
                .iter()
                .filter(|c| c.habit_id == habit_id)
                .map(|c| &c.completed_at),
            today,
            &self.zone,
        )
    }

    fn reconcile(&mut self, store: &dyn HabitStore) {
        if let Err(err) = self.reload(store) {
            warn!(error = %err, "refetch after habit change failed");
        }
    }
}
