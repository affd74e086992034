//! Summary statistics for the dashboard and the schedule agenda.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::auth::Session;
use crate::board::BoardSummary;
use crate::calendar::{self, DayGroup, YearMonth, Zone};
use crate::models::{ParseEnumError, Task, TimeSlot};
use crate::store::{HabitStore, JournalStore, StoreError, TaskStore};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// How close a deadline is, relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DueLabel {
    Overdue,
    DueToday,
    DueTomorrow,
    InDays(i64),
}

impl DueLabel {
    pub fn from_days(days: i64) -> Self {
        match days {
            d if d < 0 => DueLabel::Overdue,
            0 => DueLabel::DueToday,
            1 => DueLabel::DueTomorrow,
            d => DueLabel::InDays(d),
        }
    }
}

impl fmt::Display for DueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueLabel::Overdue => write!(f, "Overdue"),
            DueLabel::DueToday => write!(f, "Due Today"),
            DueLabel::DueTomorrow => write!(f, "Due Tomorrow"),
            DueLabel::InDays(n) => write!(f, "In {} days", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deadline {
    pub task_id: i64,
    pub title: String,
    pub due: NaiveDate,
    pub label: DueLabel,
}

/// Unfinished tasks due within `window_days` of `today`, soonest first. Overdue tasks are
/// always included.
pub fn upcoming_deadlines<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    today: NaiveDate,
    window_days: u32,
    zone: &Zone,
) -> Vec<Deadline> {
    let mut deadlines: Vec<(chrono::DateTime<chrono::Utc>, Deadline)> = tasks
        .into_iter()
        .filter(|t| t.time_slot != TimeSlot::Done)
        .filter_map(|t| {
            let at = t.deadline?;
            let due = zone.date_of(&at);
            let days = (due - today).num_days();
            (days <= i64::from(window_days)).then(|| {
                (at, Deadline { task_id: t.id, title: t.title.clone(), due, label: DueLabel::from_days(days) })
            })
        })
        .collect();
    deadlines.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.task_id.cmp(&b.1.task_id)));
    deadlines.into_iter().map(|(_, d)| d).collect()
}

/// Span of the schedule agenda
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgendaRange {
    Day,
    #[default]
    Week,
    Month,
}

impl AgendaRange {
    pub const ALL: [AgendaRange; 3] = [AgendaRange::Day, AgendaRange::Week, AgendaRange::Month];

    pub fn as_str(self) -> &'static str {
        match self {
            AgendaRange::Day => "day",
            AgendaRange::Week => "week",
            AgendaRange::Month => "month",
        }
    }

    /// Inclusive first and last day of the range containing `date`. Weeks start on Sunday.
    pub fn window(self, date: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            AgendaRange::Day => (date, date),
            AgendaRange::Week => {
                let start = date - Duration::days(i64::from(date.weekday().num_days_from_sunday()));
                (start, start + Duration::days(6))
            }
            AgendaRange::Month => {
                let ym = YearMonth::of(date);
                (ym.first_day(), ym.last_day())
            }
        }
    }
}

impl fmt::Display for AgendaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgendaRange {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgendaRange::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ParseEnumError { kind: "agenda range", value: s.to_string() })
    }
}

/// Tasks with a deadline inside the range containing `date`, grouped by due day in
/// chronological order
pub fn agenda<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    range: AgendaRange,
    date: NaiveDate,
    zone: &Zone,
) -> Vec<DayGroup<&'a Task>> {
    let (first, last) = range.window(date);
    let mut due: Vec<&Task> = tasks
        .into_iter()
        .filter(|t| t.deadline.is_some_and(|at| (first..=last).contains(&zone.date_of(&at))))
        .collect();
    due.sort_by_key(|t| (t.deadline, t.id));
    let mut groups = calendar::group_by_day(due, zone, |t| t.deadline.unwrap_or(t.created_at));
    groups.reverse();
    groups
}

/// Everything the dashboard shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub tasks: BoardSummary,
    pub journal_entries: usize,
    pub habits: usize,
    pub upcoming: Vec<Deadline>,
}

impl Dashboard {
    #[instrument(skip(store, session, zone), fields(user = %session.user_id))]
    pub fn load<S>(store: &S, session: &Session, zone: &Zone, window_days: u32) -> Result<Self, DashboardError>
    where
        S: TaskStore + HabitStore + JournalStore + ?Sized,
    {
        let user_id = session.user_id.as_str();
        let tasks = store.list_tasks(user_id)?;
        let journal_entries = store.journal_timestamps(user_id)?.len();
        let habits = store.list_habits(user_id)?.len();
        let upcoming = upcoming_deadlines(&tasks, zone.today(), window_days, zone);
        debug!(tasks = tasks.len(), journal_entries, habits, upcoming = upcoming.len(), "dashboard loaded");
        Ok(Self { tasks: BoardSummary::of(&tasks), journal_entries, habits, upcoming })
    }

    pub fn journal_sentence(&self) -> String {
        format!("You have written {} journal entries.", self.journal_entries)
    }

    pub fn habit_sentence(&self) -> String {
        format!("You are tracking {} habits.", self.habits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::models::{Mood, NewJournalEntry, NewTask, TaskKind};
    use chrono::{FixedOffset, TimeZone, Utc};

    fn utc() -> Zone {
        Zone::Fixed(FixedOffset::east_opt(0).unwrap())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: i64, slot: TimeSlot, deadline: Option<(i32, u32, u32)>) -> Task {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        Task {
            id,
            title: format!("task {}", id),
            description: None,
            time_slot: slot,
            deadline: deadline.map(|(y, m, d)| Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()),
            kind: TaskKind::Task,
            tags: vec![],
            user_id: "alice".into(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn due_labels() {
        assert_eq!(DueLabel::from_days(-3).to_string(), "Overdue");
        assert_eq!(DueLabel::from_days(0).to_string(), "Due Today");
        assert_eq!(DueLabel::from_days(1).to_string(), "Due Tomorrow");
        assert_eq!(DueLabel::from_days(4).to_string(), "In 4 days");
    }

    #[test]
    fn upcoming_skips_done_and_far_tasks() {
        let today = date(2025, 3, 10);
        let tasks = vec![
            task(1, TimeSlot::Todo, Some((2025, 3, 14))),
            task(2, TimeSlot::Done, Some((2025, 3, 11))),
            task(3, TimeSlot::InProgress, Some((2025, 3, 1))),
            task(4, TimeSlot::Todo, Some((2025, 4, 30))),
            task(5, TimeSlot::Todo, None),
            task(6, TimeSlot::Todo, Some((2025, 3, 10))),
        ];
        let upcoming = upcoming_deadlines(&tasks, today, 7, &utc());
        let ids: Vec<i64> = upcoming.iter().map(|d| d.task_id).collect();
        assert_eq!(ids, vec![3, 6, 1]);
        assert_eq!(upcoming[0].label, DueLabel::Overdue);
        assert_eq!(upcoming[1].label, DueLabel::DueToday);
        assert_eq!(upcoming[2].label, DueLabel::InDays(4));
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2025-03-12 is a Wednesday
        assert_eq!(AgendaRange::Week.window(date(2025, 3, 12)), (date(2025, 3, 9), date(2025, 3, 15)));
        assert_eq!(AgendaRange::Week.window(date(2025, 3, 9)), (date(2025, 3, 9), date(2025, 3, 15)));
        assert_eq!(AgendaRange::Month.window(date(2024, 2, 10)), (date(2024, 2, 1), date(2024, 2, 29)));
        assert_eq!(AgendaRange::Day.window(date(2025, 1, 1)), (date(2025, 1, 1), date(2025, 1, 1)));
        assert_eq!("month".parse::<AgendaRange>(), Ok(AgendaRange::Month));
        assert!("year".parse::<AgendaRange>().is_err());
    }

    #[test]
    fn agenda_groups_in_chronological_order() {
        let tasks = vec![
            task(1, TimeSlot::Todo, Some((2025, 3, 14))),
            task(2, TimeSlot::Done, Some((2025, 3, 10))),
            task(3, TimeSlot::Todo, Some((2025, 3, 16))),
            task(4, TimeSlot::Todo, Some((2025, 3, 10))),
        ];
        let groups = agenda(&tasks, AgendaRange::Week, date(2025, 3, 12), &utc());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, date(2025, 3, 10));
        assert_eq!(groups[0].items.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(groups[1].date, date(2025, 3, 14));
    }

    #[test]
    fn dashboard_counts_the_users_records() {
        let db = Database::open_in_memory().unwrap();
        let session = Session { user_id: "alice".into(), started_at: Utc::now() };
        db.insert_task("alice", &NewTask::new("one")).unwrap();
        db.insert_task("bob", &NewTask::new("not mine")).unwrap();
        db.insert_journal_entry(
            "alice",
            &NewJournalEntry { content: "hello".into(), mood: Mood::Happy, tags: vec![] },
        )
        .unwrap();

        let dashboard = Dashboard::load(&db, &session, &utc(), 7).unwrap();
        assert_eq!(dashboard.tasks.total, 1);
        assert_eq!(dashboard.tasks.todo, 1);
        assert_eq!(dashboard.habits, 0);
        assert_eq!(dashboard.journal_sentence(), "You have written 1 journal entries.");
        assert!(dashboard.upcoming.is_empty());
    }
}
