use chrono::{Datelike, NaiveDate};
use clap::{ArgAction, Parser, Subcommand};
use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::auth::{AuthError, AuthProvider, SessionFile, require_session};
use crate::board::{BoardError, Columns, DropOutcome, TaskBoard, parse_drop_target};
use crate::calendar::{CalendarError, DayGroup, MonthColumn, YearMonth, Zone};
use crate::config::Config;
use crate::dashboard::{self, AgendaRange, Dashboard, DashboardError};
use crate::database::{Database, DatabaseError};
use crate::habits::{HabitDraft, HabitError, HabitsView, ScheduleError};
use crate::journal::{JournalDraft, JournalError, JournalView};
use crate::models::{JournalEntry, Mood, NewTask, ScheduleType, Task, TaskKind, TimeSlot};
use crate::store::{JournalStore, StoreError};
use crate::utils::{format_tags_brackets, now_utc, parse_date, parse_tags, truncate};

#[derive(Parser)]
#[command(name = "daybook")]
#[command(about = "Tasks, habits and a journal - a personal productivity tracker for the terminal")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Database file to use instead of the configured one
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long, global = true)]
    pub dev: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less log output
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Launch the interactive kanban board (default if no subcommand)
    Tui,
    /// Sign in; every other command acts on this user's records
    Login {
        user: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// Print the kanban board
    Board {
        /// Only show tasks whose title, description or tags contain this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Manage habits
    Habit {
        #[command(subcommand)]
        command: HabitCommand,
    },
    /// Print the habit contribution grid for a year
    Grid {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Manage journal entries
    Journal {
        #[command(subcommand)]
        command: JournalCommand,
    },
    /// List months that have journal entries, newest first
    Months,
    /// Summary of tasks, journal, habits and upcoming deadlines
    Dashboard {
        #[arg(long)]
        json: bool,
    },
    /// Tasks due in the day, week or month containing a date
    Agenda {
        #[arg(long, default_value = "week")]
        range: AgendaRange,
        /// Date inside the range (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum TaskCommand {
    /// Add a task to the To Do column
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,
        /// Record as an event rather than a task
        #[arg(long)]
        event: bool,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// List tasks, newest first
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Move a task to another column (todo, in_progress, done)
    Move {
        id: i64,
        column: String,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum HabitCommand {
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// daily, weekly or monthly
        #[arg(long, default_value = "daily")]
        schedule: ScheduleType,
        /// Weekdays (0 = Sunday .. 6) for weekly, month days (1-31) for monthly
        #[arg(long, value_delimiter = ',')]
        days: Vec<u8>,
        /// Checklist item, repeatable
        #[arg(long = "item")]
        items: Vec<String>,
        #[arg(long)]
        category: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    List {
        #[arg(long)]
        json: bool,
    },
    /// Record a completion now
    Complete {
        id: i64,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum JournalCommand {
    Add {
        content: String,
        /// happy, relaxed, neutral, sad or worried
        #[arg(long)]
        mood: Option<Mood>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    Edit {
        id: i64,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        mood: Option<Mood>,
        /// Comma-separated tags, replacing the current ones
        #[arg(long)]
        tags: Option<String>,
    },
    Delete {
        id: i64,
    },
    /// Entries of a month grouped by day
    List {
        /// YYYY-MM, defaults to the current month
        #[arg(long)]
        month: Option<YearMonth>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Board(#[from] BoardError),
    #[error("{0}")]
    Habit(#[from] HabitError),
    #[error("{0}")]
    Schedule(#[from] ScheduleError),
    #[error("{0}")]
    Journal(#[from] JournalError),
    #[error("{0}")]
    Dashboard(#[from] DashboardError),
    #[error("{0}")]
    Calendar(#[from] CalendarError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to set up logging: {0}")]
    Logging(String),
}

/// Install the global subscriber. `RUST_LOG` wins over the -v/-q counters, which win over
/// the configured level. With `log_file` set, output goes there instead of stderr.
pub fn init_tracing(verbose: u8, quiet: u8, configured: Option<&str>, log_file: Option<&Path>) -> Result<(), CliError> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        configured.unwrap_or("warn")
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| CliError::Logging(format!("invalid RUST_LOG / log filter: {e}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true);

    let init_result = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| CliError::Logging(e.to_string()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| CliError::Logging(format!("{}: {}", path.display(), e)))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => builder
            .with_ansi(std::io::stderr().is_terminal())
            .with_writer(std::io::stderr)
            .try_init(),
    };

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Everything a command handler needs
pub struct Context {
    pub db: Database,
    pub auth: SessionFile,
    pub config: Config,
    pub zone: Zone,
}

/// Run one non-interactive command
pub fn dispatch(ctx: &Context, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Tui => Ok(()),
        Commands::Login { user } => handle_login(ctx, &user),
        Commands::Logout => handle_logout(ctx),
        Commands::Whoami => handle_whoami(ctx),
        Commands::Task { command } => handle_task(ctx, command),
        Commands::Board { search } => handle_board(ctx, search.as_deref()),
        Commands::Habit { command } => handle_habit(ctx, command),
        Commands::Grid { year } => handle_grid(ctx, year),
        Commands::Journal { command } => handle_journal(ctx, command),
        Commands::Months => handle_months(ctx),
        Commands::Dashboard { json } => handle_dashboard(ctx, json),
        Commands::Agenda { range, date } => handle_agenda(ctx, range, date.as_deref()),
    }
}

fn handle_login(ctx: &Context, user: &str) -> Result<(), CliError> {
    let session = ctx.auth.login(user)?;
    println!("Signed in as {}", session.user_id);
    Ok(())
}

fn handle_logout(ctx: &Context) -> Result<(), CliError> {
    if ctx.auth.logout()? {
        println!("Signed out");
    } else {
        println!("No one is signed in");
    }
    Ok(())
}

fn handle_whoami(ctx: &Context) -> Result<(), CliError> {
    match ctx.auth.session()? {
        Some(session) => println!(
            "{} (since {})",
            session.user_id,
            session.started_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
        ),
        None => return Err(AuthError::NotSignedIn.into()),
    }
    Ok(())
}

fn parse_day(date: &str) -> Result<NaiveDate, CliError> {
    parse_date(date).map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", date, e)))
}

fn handle_task(ctx: &Context, command: TaskCommand) -> Result<(), CliError> {
    let session = require_session(&ctx.auth)?;
    let mut board = TaskBoard::load(&ctx.db, &session)?;

    match command {
        TaskCommand::Add { title, description, deadline, event, tags } => {
            let mut task = NewTask::new(title);
            task.description = description.filter(|d| !d.trim().is_empty());
            task.deadline = deadline.as_deref().map(parse_day).transpose()?.map(|d| ctx.zone.start_of_day(d));
            task.kind = if event { TaskKind::Event } else { TaskKind::Task };
            task.tags = parse_tags(tags.as_deref());
            let created = board.create_task(&ctx.db, &task)?;
            println!("Task created successfully (ID: {})", created.id);
        }
        TaskCommand::List { search, json } => {
            let query = search.unwrap_or_default();
            let columns = board.search(&query);
            let tasks: Vec<&Task> = board.tasks().iter().filter(|t| columns.contains(t.id)).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks");
            } else {
                for task in tasks {
                    println!("{}", format_task_line(task, &ctx.zone, true));
                }
            }
        }
        TaskCommand::Move { id, column } => match board.drop_task(&ctx.db, id, &column)? {
            DropOutcome::Moved(task) => println!("Task {} moved to {}", task.id, task.time_slot.label()),
            DropOutcome::Ignored => match (parse_drop_target(&column), board.task(id)) {
                (None, _) => println!("Ignored: '{}' is not a column (todo, in_progress, done)", column),
                (Some(_), None) => return Err(StoreError::NotFound { table: "tasks", id }.into()),
                (Some(slot), Some(_)) => println!("Task {} is already in {}", id, slot.label()),
            },
        },
        TaskCommand::Delete { id } => {
            board.delete_task(&ctx.db, id)?;
            println!("Task {} deleted", id);
        }
    }
    Ok(())
}

fn handle_board(ctx: &Context, search: Option<&str>) -> Result<(), CliError> {
    let session = require_session(&ctx.auth)?;
    let board = TaskBoard::load(&ctx.db, &session)?;
    let columns = board.search(search.unwrap_or(""));
    print!("{}", format_board(&columns, &ctx.zone));
    println!();
    println!("{}", board.summary().sentence());
    Ok(())
}

fn handle_habit(ctx: &Context, command: HabitCommand) -> Result<(), CliError> {
    let session = require_session(&ctx.auth)?;
    let mut view = HabitsView::load(&ctx.db, &session, ctx.zone)?;

    match command {
        HabitCommand::Add { title, description, schedule, days, items, category, tags } => {
            let mut draft = HabitDraft::new(title);
            draft.description = description.unwrap_or_default();
            draft.category = category;
            draft.tags = parse_tags(tags.as_deref());
            draft.set_schedule_type(schedule);
            for day in days.into_iter().collect::<BTreeSet<_>>() {
                draft.toggle_day(day)?;
            }
            for item in items {
                draft.push_item(item);
            }
            let habit = view.create(&ctx.db, &draft)?;
            println!("Habit created successfully (ID: {}, {})", habit.id, habit.schedule.describe());
        }
        HabitCommand::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(view.habits())?);
            } else if view.habits().is_empty() {
                println!("No habits");
            } else {
                let today = ctx.zone.today();
                for habit in view.habits() {
                    println!(
                        "#{:<4} {:<30} {:<24} streak {}{}",
                        habit.id,
                        truncate(&habit.title, 30),
                        habit.schedule.describe(),
                        view.streak(habit.id, today),
                        tags_suffix(&habit.tags)
                    );
                    for item in &habit.checklist {
                        println!("        - {}", item.title);
                    }
                }
            }
        }
        HabitCommand::Complete { id } => {
            view.complete(&ctx.db, id, now_utc())?;
            println!("Habit {} completed (streak {})", id, view.streak(id, ctx.zone.today()));
        }
        HabitCommand::Delete { id } => {
            view.delete(&ctx.db, id)?;
            println!("Habit {} deleted", id);
        }
    }
    Ok(())
}

fn handle_grid(ctx: &Context, year: Option<i32>) -> Result<(), CliError> {
    let session = require_session(&ctx.auth)?;
    let view = HabitsView::load(&ctx.db, &session, ctx.zone)?;
    let year = year.unwrap_or_else(|| ctx.zone.today().year());
    print!("{}", format_grid(year, &view.year_grid(year)));
    Ok(())
}

fn handle_journal(ctx: &Context, command: JournalCommand) -> Result<(), CliError> {
    let session = require_session(&ctx.auth)?;

    match command {
        JournalCommand::Add { content, mood, tags } => {
            let mut view = JournalView::load(&ctx.db, &session, ctx.zone, None)?;
            let draft = JournalDraft { content, mood, tags: parse_tags(tags.as_deref()) };
            let entry = view.create(&ctx.db, &draft)?;
            println!("Journal entry created successfully (ID: {})", entry.id);
        }
        JournalCommand::Edit { id, content, mood, tags } => {
            let mut view = load_month_of(ctx, &session.user_id, id, |month| {
                JournalView::load(&ctx.db, &session, ctx.zone, Some(month))
            })?;
            view.begin_edit(id)?;
            if let Some(content) = content {
                view.set_content(content)?;
            }
            if let Some(mood) = mood {
                view.set_mood(mood)?;
            }
            if let Some(tags) = tags {
                view.set_tags(parse_tags(Some(&tags)))?;
            }
            let entry = view.commit_edit(&ctx.db)?;
            let note = if entry.is_edited() { " (edited)" } else { "" };
            println!("Journal entry {} updated{}", entry.id, note);
        }
        JournalCommand::Delete { id } => {
            let mut view = JournalView::load(&ctx.db, &session, ctx.zone, None)?;
            view.delete(&ctx.db, id)?;
            println!("Journal entry {} deleted", id);
        }
        JournalCommand::List { month, search, json } => {
            let view = JournalView::load(&ctx.db, &session, ctx.zone, month)?;
            let groups = view.grouped(search.as_deref().unwrap_or(""));
            if json {
                println!("{}", serde_json::to_string_pretty(&groups)?);
            } else {
                println!("{}", view.month());
                print!("{}", format_journal(&groups, &ctx.zone));
                println!("{}", view.summary_sentence());
            }
        }
    }
    Ok(())
}

/// Load the journal month holding entry `id`
fn load_month_of<F>(ctx: &Context, user_id: &str, id: i64, load: F) -> Result<JournalView, CliError>
where
    F: FnOnce(YearMonth) -> Result<JournalView, JournalError>,
{
    let entry = ctx
        .db
        .list_journal_entries(user_id, None)?
        .into_iter()
        .find(|e| e.id == id)
        .ok_or(StoreError::NotFound { table: "journal_entries", id })?;
    Ok(load(YearMonth::of(ctx.zone.date_of(&entry.created_at)))?)
}

fn handle_months(ctx: &Context) -> Result<(), CliError> {
    let session = require_session(&ctx.auth)?;
    let view = JournalView::load(&ctx.db, &session, ctx.zone, None)?;
    for month in view.available_months() {
        println!("{}", month);
    }
    Ok(())
}

fn handle_dashboard(ctx: &Context, json: bool) -> Result<(), CliError> {
    let session = require_session(&ctx.auth)?;
    let dashboard = Dashboard::load(&ctx.db, &session, &ctx.zone, ctx.config.upcoming_days)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        print!("{}", format_dashboard(&dashboard));
    }
    Ok(())
}

fn handle_agenda(ctx: &Context, range: AgendaRange, date: Option<&str>) -> Result<(), CliError> {
    let session = require_session(&ctx.auth)?;
    let board = TaskBoard::load(&ctx.db, &session)?;
    let date = date.map(parse_day).transpose()?.unwrap_or_else(|| ctx.zone.today());
    let (first, last) = range.window(date);
    println!("Agenda for {} to {}", first, last);
    let groups = dashboard::agenda(board.tasks(), range, date, &ctx.zone);
    if groups.is_empty() {
        println!("Nothing scheduled");
    }
    for group in groups {
        println!("{}", group.date.format("%a %Y-%m-%d"));
        for task in group.items {
            println!("  {}", format_task_line(task, &ctx.zone, true));
        }
    }
    Ok(())
}

/// One task as a list line
pub fn format_task_line(task: &Task, zone: &Zone, with_column: bool) -> String {
    let mut line = format!("#{:<4} {}", task.id, task.title);
    if with_column {
        line.push_str(&format!(" [{}]", task.time_slot.label()));
    }
    if task.kind == TaskKind::Event {
        line.push_str(" (event)");
    }
    if let Some(deadline) = &task.deadline {
        line.push_str(&format!(" due {}", zone.date_of(deadline)));
    }
    line.push_str(&tags_suffix(&task.tags));
    line
}

/// The three columns, one block each, with their counts
pub fn format_board(columns: &Columns<'_>, zone: &Zone) -> String {
    let mut out = String::new();
    for slot in TimeSlot::ALL {
        let tasks = columns.column(slot);
        out.push_str(&format!("{} ({})\n", slot.label(), tasks.len()));
        for task in tasks {
            out.push_str(&format!("  {}\n", format_task_line(task, zone, false)));
        }
    }
    out
}

/// One row per month: label, a glyph per day, and the month's completion total
pub fn format_grid(year: i32, months: &[MonthColumn]) -> String {
    let mut out = format!("Habit completions in {}\n", year);
    for column in months {
        let label = column.month.first_day().format("%b");
        let glyphs: String = column.days.iter().map(|cell| cell.level.glyph()).collect();
        let total: u32 = column.days.iter().map(|cell| cell.count).sum();
        out.push_str(&format!("{} {:<31} {}\n", label, glyphs, total));
    }
    out
}

pub fn format_journal(groups: &[DayGroup<&JournalEntry>], zone: &Zone) -> String {
    let mut out = String::new();
    if groups.is_empty() {
        out.push_str("No journal entries\n");
    }
    for group in groups {
        out.push_str(&format!("{}\n", group.date.format("%A, %B %-d, %Y")));
        for entry in &group.items {
            let time = match zone {
                Zone::Local => entry.created_at.with_timezone(&chrono::Local).format("%H:%M").to_string(),
                Zone::Fixed(offset) => entry.created_at.with_timezone(offset).format("%H:%M").to_string(),
            };
            let edited = if entry.is_edited() { " (edited)" } else { "" };
            out.push_str(&format!(
                "  #{:<4} {} {} {}{}{}\n",
                entry.id,
                time,
                entry.mood.emoji(),
                entry.heading(),
                edited,
                tags_suffix(&entry.tags)
            ));
            for line in entry.body().lines() {
                out.push_str(&format!("          {}\n", line));
            }
            if let Some(summary) = &entry.ai_summary {
                out.push_str(&format!("          Summary: {}\n", summary));
            }
        }
    }
    out
}

pub fn format_dashboard(dashboard: &Dashboard) -> String {
    let tasks = &dashboard.tasks;
    let mut out = String::new();
    out.push_str("Task overview\n");
    out.push_str(&format!(
        "  Total {}  Completed {}  In progress {}  To do {}\n",
        tasks.total, tasks.done, tasks.in_progress, tasks.todo
    ));
    out.push_str(&format!("  {}\n", tasks.sentence()));
    out.push_str(&format!("Journal\n  {}\n", dashboard.journal_sentence()));
    out.push_str(&format!("Habits\n  {}\n", dashboard.habit_sentence()));
    out.push_str("Upcoming deadlines\n");
    if dashboard.upcoming.is_empty() {
        out.push_str("  Nothing due\n");
    }
    for deadline in &dashboard.upcoming {
        out.push_str(&format!("  {:<13} {} (#{}, {})\n", deadline.label.to_string(), deadline.title, deadline.task_id, deadline.due));
    }
    out
}

fn tags_suffix(tags: &[String]) -> String {
    if tags.is_empty() {
        String::new()
    } else {
        format!(" {}", format_tags_brackets(tags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardSummary;
    use crate::calendar::year_grid;
    use crate::dashboard::{Deadline, DueLabel};
    use chrono::{FixedOffset, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn utc() -> Zone {
        Zone::Fixed(FixedOffset::east_opt(0).unwrap())
    }

    fn task(id: i64, slot: TimeSlot) -> Task {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        Task {
            id,
            title: format!("task {}", id),
            description: None,
            time_slot: slot,
            deadline: None,
            kind: TaskKind::Task,
            tags: vec!["work".into()],
            user_id: "alice".into(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["daybook", "task", "move", "3", "done", "--db", "x.db", "-vv"]).unwrap();
        assert_eq!(cli.db.as_deref(), Some("x.db"));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.command, Some(Commands::Task { command: TaskCommand::Move { id: 3, column: "done".into() } }));
    }

    #[test]
    fn cli_parses_typed_values() {
        let cli = Cli::try_parse_from(["daybook", "habit", "add", "Run", "--schedule", "weekly", "--days", "1,3"]).unwrap();
        match cli.command {
            Some(Commands::Habit { command: HabitCommand::Add { schedule, days, .. } }) => {
                assert_eq!(schedule, ScheduleType::Weekly);
                assert_eq!(days, vec![1, 3]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(Cli::try_parse_from(["daybook", "journal", "add", "hi", "--mood", "grumpy"]).is_err());
        assert!(Cli::try_parse_from(["daybook", "agenda", "--range", "month"]).is_ok());
        assert!(Cli::try_parse_from(["daybook", "journal", "list", "--month", "2025-13"]).is_err());
    }

    #[test]
    fn board_lists_every_column_with_counts() {
        let tasks = vec![task(1, TimeSlot::Todo), task(2, TimeSlot::Done), task(3, TimeSlot::Todo)];
        let out = format_board(&Columns::partition(&tasks), &utc());
        assert!(out.starts_with("To Do (2)\n  #1    task 1 [work]\n  #3    task 3 [work]\n"));
        assert!(out.contains("In Progress (0)\n"));
        assert!(out.contains("Done (1)\n  #2"));
    }

    #[test]
    fn grid_has_a_glyph_per_day() {
        let mut counts = BTreeMap::new();
        counts.insert(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(), 5);
        let out = format_grid(2024, &year_grid(2024, &counts));
        let feb = out.lines().find(|l| l.starts_with("Feb")).unwrap();
        assert!(feb.contains('█'));
        assert!(feb.ends_with(" 5"));
        assert_eq!(out.lines().count(), 13);
    }

    #[test]
    fn dashboard_text_lists_deadlines() {
        let dashboard = Dashboard {
            tasks: BoardSummary { total: 3, todo: 2, in_progress: 1, done: 0 },
            journal_entries: 4,
            habits: 1,
            upcoming: vec![Deadline {
                task_id: 7,
                title: "Ship".into(),
                due: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
                label: DueLabel::DueTomorrow,
            }],
        };
        let out = format_dashboard(&dashboard);
        assert!(out.contains("You have 2 tasks To Do and 1 tasks In Progress."));
        assert!(out.contains("You have written 4 journal entries."));
        assert!(out.contains("Due Tomorrow  Ship (#7, 2025-03-12)"));
    }
}
