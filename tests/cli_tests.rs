mod common;

use common::Sandbox;
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn data_commands_require_a_session() {
    let sandbox = Sandbox::new();
    for args in [&["board"][..], &["task", "list"], &["journal", "list"], &["dashboard"], &["whoami"]] {
        sandbox
            .daybook()
            .args(args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not signed in"));
    }
}

#[test]
fn login_whoami_logout() {
    let sandbox = Sandbox::new();
    sandbox
        .daybook()
        .args(["login", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as alice"));
    assert!(sandbox.dir.path().join("session.toml").exists());
    assert!(sandbox.run(&["whoami"]).starts_with("alice"));
    assert!(sandbox.run(&["logout"]).contains("Signed out"));
    sandbox.daybook().arg("whoami").assert().failure();
}

#[test]
fn tasks_move_between_columns() {
    let sandbox = Sandbox::signed_in("alice");
    sandbox
        .daybook()
        .args(["task", "add", "Write report", "--tags", "work, q1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Task created successfully (ID: 1)"));
    sandbox.run(&["task", "add", "Water plants"]);

    let board = sandbox.run(&["board"]);
    assert!(board.contains("To Do (2)"));
    assert!(board.contains("Write report [work] [q1]"));
    assert!(board.contains("You have 2 tasks To Do and 0 tasks In Progress."));

    assert!(sandbox.run(&["task", "move", "1", "in_progress"]).contains("Task 1 moved to In Progress"));
    let board = sandbox.run(&["board"]);
    assert!(board.contains("To Do (1)"));
    assert!(board.contains("In Progress (1)\n  #1"));

    assert!(sandbox.run(&["task", "move", "1", "in_progress"]).contains("already in In Progress"));
    assert!(sandbox.run(&["task", "move", "1", "archive"]).contains("is not a column"));
    sandbox
        .daybook()
        .args(["task", "move", "42", "done"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn task_list_json_keeps_field_names() {
    let sandbox = Sandbox::signed_in("alice");
    sandbox.run(&["task", "add", "Standup", "--event", "--deadline", "2030-01-15"]);
    let json: Value = serde_json::from_str(&sandbox.run(&["task", "list", "--json"])).unwrap();
    let task = &json[0];
    assert_eq!(task["title"], "Standup");
    assert_eq!(task["time_slot"], "todo");
    assert_eq!(task["type"], "event");
    assert_eq!(task["user_id"], "alice");
    assert!(task["deadline"].as_str().unwrap().starts_with("2030-01-15T00:00:00"));
}

#[test]
fn users_only_see_their_own_records() {
    let sandbox = Sandbox::signed_in("alice");
    sandbox.run(&["task", "add", "Private"]);
    sandbox.run(&["login", "bob"]);
    let board = sandbox.run(&["board"]);
    assert!(board.contains("To Do (0)"));
    assert!(!board.contains("Private"));
    sandbox.daybook().args(["task", "delete", "1"]).assert().failure();
}

#[test]
fn journal_requires_mood_and_searches_by_day() {
    let sandbox = Sandbox::signed_in("alice");
    sandbox
        .daybook()
        .args(["journal", "add", "no mood here"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pick a mood"));

    sandbox.run(&["journal", "add", "buy milk", "--mood", "neutral", "--tags", "errand"]);
    sandbox.run(&["journal", "add", "write code", "--mood", "happy", "--tags", "work"]);

    let found = sandbox.run(&["journal", "list", "--search", "code"]);
    assert!(found.contains("write code"));
    assert!(!found.contains("buy milk"));

    let current = chrono::Utc::now().format("%Y-%m").to_string();
    assert_eq!(sandbox.run(&["months"]).trim(), current);
    sandbox
        .daybook()
        .args(["journal", "list", "--month", "2000-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No journal entries"));
}

#[test]
fn out_of_range_months_are_rejected() {
    let sandbox = Sandbox::signed_in("alice");
    for month in ["300000-01", "2025-13"] {
        sandbox
            .daybook()
            .args(["journal", "list", "--month", month])
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("expected YYYY-MM"));
    }
}

#[test]
fn journal_edit_marks_changed_content() {
    let sandbox = Sandbox::signed_in("alice");
    sandbox.run(&["journal", "add", "first draft", "--mood", "sad"]);
    assert!(sandbox.run(&["journal", "edit", "1", "--mood", "relaxed"]).trim().ends_with("updated"));
    assert!(sandbox.run(&["journal", "edit", "1", "--content", "second draft"]).contains("(edited)"));

    let json: Value = serde_json::from_str(&sandbox.run(&["journal", "list", "--json"])).unwrap();
    let entry = &json[0]["items"][0];
    assert_eq!(entry["content"], "second draft");
    assert_eq!(entry["original_content"], "first draft");
    assert_eq!(entry["mood"], "relaxed");
    assert!(entry["updated_at"].is_string());
}

#[test]
fn habit_schedules_are_validated() {
    let sandbox = Sandbox::signed_in("alice");
    sandbox
        .daybook()
        .args(["habit", "add", "Stretch", "--days", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("daily habits take no days"));
    sandbox
        .daybook()
        .args(["habit", "add", "Run", "--schedule", "weekly", "--days", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("weekday 7 out of range"));

    let out = sandbox.run(&["habit", "add", "Run", "--schedule", "weekly", "--days", "3,1", "--item", "Shoes"]);
    assert!(out.contains("weekly on Mon, Wed"));

    let json: Value = serde_json::from_str(&sandbox.run(&["habit", "list", "--json"])).unwrap();
    assert_eq!(json[0]["schedule"]["type"], "weekly");
    assert_eq!(json[0]["schedule"]["days"], serde_json::json!([1, 3]));
    assert_eq!(json[0]["checklist"][0]["title"], "Shoes");
}

#[test]
fn completions_fill_the_grid() {
    let sandbox = Sandbox::signed_in("alice");
    sandbox.run(&["habit", "add", "Read"]);
    assert!(sandbox.run(&["habit", "complete", "1"]).contains("streak 1"));

    let year = chrono::Utc::now().format("%Y").to_string();
    let grid = sandbox.run(&["grid"]);
    assert!(grid.starts_with(&format!("Habit completions in {}", year)));
    assert!(grid.contains('░'));
    assert_eq!(grid.lines().count(), 13);

    sandbox.daybook().args(["habit", "complete", "99"]).assert().failure();
}

#[test]
fn dashboard_and_agenda_show_deadlines() {
    let sandbox = Sandbox::signed_in("alice");
    let today = chrono::Utc::now().date_naive();
    let soon = (today + chrono::Duration::days(1)).format("%Y-%m-%d").to_string();
    sandbox.run(&["task", "add", "Submit form", "--deadline", &soon]);
    sandbox.run(&["task", "add", "Someday"]);

    let dashboard = sandbox.run(&["dashboard"]);
    assert!(dashboard.contains("You have 2 tasks To Do and 0 tasks In Progress."));
    assert!(dashboard.contains("You have written 0 journal entries."));
    assert!(dashboard.contains("Due Tomorrow"));
    assert!(dashboard.contains("Submit form"));

    let agenda = sandbox.run(&["agenda", "--range", "day", "--date", &soon]);
    assert!(agenda.contains("Submit form"));
    assert!(!agenda.contains("Someday"));

    sandbox
        .daybook()
        .args(["agenda", "--date", "not-a-date"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date format"));
}
