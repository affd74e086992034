use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} value: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Kanban column a task currently occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Todo,
    InProgress,
    Done,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 3] = [TimeSlot::Todo, TimeSlot::InProgress, TimeSlot::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeSlot::Todo => "todo",
            TimeSlot::InProgress => "in_progress",
            TimeSlot::Done => "done",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeSlot::Todo => "To Do",
            TimeSlot::InProgress => "In Progress",
            TimeSlot::Done => "Done",
        }
    }

    /// Column position on the board, left to right
    pub fn index(self) -> usize {
        match self {
            TimeSlot::Todo => 0,
            TimeSlot::InProgress => 1,
            TimeSlot::Done => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<TimeSlot> {
        TimeSlot::ALL.get(index).copied()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeSlot {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TimeSlot::Todo),
            "in_progress" => Ok(TimeSlot::InProgress),
            "done" => Ok(TimeSlot::Done),
            other => Err(ParseEnumError { kind: "time_slot", value: other.to_string() }),
        }
    }
}

/// Tasks count toward board statistics, events only occupy a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Task,
    Event,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Task => "task",
            TaskKind::Event => "event",
        }
    }
}

impl FromStr for TaskKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" => Ok(TaskKind::Task),
            "event" => Ok(TaskKind::Event),
            other => Err(ParseEnumError { kind: "type", value: other.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub time_slot: TimeSlot,
    pub deadline: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub tags: Vec<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a user supplies when creating a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub tags: Vec<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            deadline: None,
            kind: TaskKind::Task,
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl ScheduleType {
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleType::Daily => "daily",
            ScheduleType::Weekly => "weekly",
            ScheduleType::Monthly => "monthly",
        }
    }
}

impl fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(ScheduleType::Daily),
            "weekly" => Ok(ScheduleType::Weekly),
            "monthly" => Ok(ScheduleType::Monthly),
            other => Err(ParseEnumError { kind: "schedule", value: other.to_string() }),
        }
    }
}

/// Recurrence rule of a habit. Construct through `Schedule::new` (habits module) to get
/// validated day indices.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(rename = "type")]
    pub kind: ScheduleType,
    pub days: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub schedule: Schedule,
    pub checklist: Vec<ChecklistItem>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHabit {
    pub title: String,
    pub description: Option<String>,
    pub schedule: Schedule,
    pub checklist: Vec<ChecklistItem>,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitCompletion {
    pub id: i64,
    pub habit_id: i64,
    pub user_id: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Relaxed,
    Neutral,
    Sad,
    Worried,
}

impl Mood {
    pub const ALL: [Mood; 5] = [Mood::Happy, Mood::Relaxed, Mood::Neutral, Mood::Sad, Mood::Worried];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Relaxed => "relaxed",
            Mood::Neutral => "neutral",
            Mood::Sad => "sad",
            Mood::Worried => "worried",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Relaxed => "😌",
            Mood::Neutral => "😐",
            Mood::Sad => "😔",
            Mood::Worried => "😟",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ParseEnumError { kind: "mood", value: s.to_string() })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: i64,
    pub content: String,
    pub original_content: String,
    pub mood: Mood,
    pub tags: Vec<String>,
    pub ai_summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub user_id: String,
}

impl JournalEntry {
    /// First line of the content, used as the entry heading
    pub fn heading(&self) -> &str {
        self.content.lines().next().unwrap_or("")
    }

    /// Everything after the heading line
    pub fn body(&self) -> String {
        self.content.lines().skip(1).collect::<Vec<_>>().join("\n")
    }

    pub fn is_edited(&self) -> bool {
        self.updated_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJournalEntry {
    pub content: String,
    pub mood: Mood,
    pub tags: Vec<String>,
}

/// Changes applied to an existing journal entry
#[derive(Debug, Clone, PartialEq)]
pub struct JournalPatch {
    pub content: String,
    pub mood: Mood,
    pub tags: Vec<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_slot_strings_match_column_ids() {
        for slot in TimeSlot::ALL {
            assert_eq!(slot.as_str().parse::<TimeSlot>(), Ok(slot));
            assert_eq!(TimeSlot::from_index(slot.index()), Some(slot));
        }
        assert!("backlog".parse::<TimeSlot>().is_err());
        assert_eq!(TimeSlot::from_index(3), None);
    }

    #[test]
    fn task_serializes_kind_as_type() {
        let json = serde_json::to_value(NewTask::new("write report")).unwrap();
        assert_eq!(json["type"], "task");
        assert_eq!(serde_json::to_value(TimeSlot::InProgress).unwrap(), "in_progress");
    }

    #[test]
    fn schedule_serializes_like_the_stored_column() {
        let schedule = Schedule { kind: ScheduleType::Weekly, days: vec![1, 3] };
        let json = serde_json::to_string(&schedule).unwrap();
        assert_eq!(json, r#"{"type":"weekly","days":[1,3]}"#);
    }

    #[test]
    fn mood_parses_by_name() {
        assert_eq!("relaxed".parse::<Mood>(), Ok(Mood::Relaxed));
        assert!("angry".parse::<Mood>().is_err());
    }

    #[test]
    fn journal_heading_and_body_split_on_first_line() {
        let entry = JournalEntry {
            id: 1,
            content: "Good day\nshipped the release\nslept early".into(),
            original_content: String::new(),
            mood: Mood::Happy,
            tags: vec![],
            ai_summary: None,
            created_at: Utc::now(),
            updated_at: None,
            user_id: "u1".into(),
        };
        assert_eq!(entry.heading(), "Good day");
        assert_eq!(entry.body(), "shipped the release\nslept early");
    }
}
