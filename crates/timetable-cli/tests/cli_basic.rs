//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway home directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_timetable"))
        .args(args)
        .env("HOME", home)
        .env_remove("TIMETABLE_ENV")
        .env_remove("TIMETABLE_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(home: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

fn add_weekly(home: &Path, subject: &str, day: &str) -> String {
    let entry = run_json(
        home,
        &[
            "--at", "2024-05-06T08:00", "entry", "add", subject, "--day", day, "--start", "09:00",
            "--end", "10:00", "--repeat", "Weekly", "--alert", "15",
        ],
    );
    entry["id"].as_str().unwrap().to_string()
}

#[test]
fn test_entry_add_writes_outbox() {
    let home = tempfile::tempdir().unwrap();
    add_weekly(home.path(), "Maths", "Monday");

    let pending = run_json(home.path(), &["reminders", "pending"]);
    let pending = pending.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["fire_at"], "2024-05-06T08:45:00");
    assert_eq!(pending[0]["title"], "Time for Maths");
}

#[test]
fn test_update_start_reschedules_reminder() {
    let home = tempfile::tempdir().unwrap();
    let id = add_weekly(home.path(), "Maths", "Monday");

    let updated = run_json(
        home.path(),
        &["--at", "2024-05-06T08:05", "entry", "update", &id, "--start", "11:30"],
    );
    assert_eq!(updated["start_time"], "11:30");

    let pending = run_json(home.path(), &["reminders", "pending"]);
    let pending = pending.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["fire_at"], "2024-05-06T11:15:00");
}

#[test]
fn test_list_filters_by_day_and_search() {
    let home = tempfile::tempdir().unwrap();
    add_weekly(home.path(), "Maths", "Monday");
    add_weekly(home.path(), "Art", "Tuesday");
    add_weekly(home.path(), "Applied Maths", "Tuesday");

    let tuesday = run_json(home.path(), &["entry", "list", "--day", "tue"]);
    assert_eq!(tuesday.as_array().unwrap().len(), 2);

    let maths = run_json(home.path(), &["entry", "list", "--search", "maths"]);
    assert_eq!(maths.as_array().unwrap().len(), 2);

    let both = run_json(
        home.path(),
        &["entry", "list", "--day", "Tuesday", "--search", "MATHS"],
    );
    let both = both.as_array().unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0]["subject"], "Applied Maths");
}

#[test]
fn test_done_resets_next_week() {
    let home = tempfile::tempdir().unwrap();
    let id = add_weekly(home.path(), "Maths", "Monday");

    let status = run_json(home.path(), &["--at", "2024-05-06T10:00", "entry", "done", &id]);
    assert_eq!(status["done"], true);

    let later = run_json(home.path(), &["--at", "2024-05-13T10:00", "entry", "get", &id]);
    assert_eq!(later["done"], false);
}

#[test]
fn test_done_before_occurrence_fails() {
    let home = tempfile::tempdir().unwrap();
    let id = add_weekly(home.path(), "Art", "Friday");

    let (_, stderr, code) =
        run_cli(home.path(), &["--at", "2024-05-06T10:00", "entry", "done", &id]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
}

#[test]
fn test_unknown_entry_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["entry", "delete", "missing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not found"), "stderr: {stderr}");
}

#[test]
fn test_agenda_summary() {
    let home = tempfile::tempdir().unwrap();
    add_weekly(home.path(), "Maths", "Monday");
    add_weekly(home.path(), "Art", "Tuesday");

    let summary = run_json(home.path(), &["--at", "2024-05-06T08:00", "agenda", "summary"]);
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["completion_rate"], 0);
}

#[test]
fn test_config_set_and_get() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) =
        run_cli(home.path(), &["config", "set", "reminders.user_name", "Pavan"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "reminders.user_name = Pavan");
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "reminders.user_name"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "Pavan");

    let (_, _, code) = run_cli(home.path(), &["config", "get", "reminders.volume"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_reset_names_file() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "reminders.max_batch", "5"]);
    assert_eq!(code, 0);

    let (path, _, code) = run_cli(home.path(), &["config", "path"]);
    assert_eq!(code, 0);
    assert!(path.trim().ends_with("config.toml"), "path: {path}");

    let (stdout, _, code) = run_cli(home.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    assert!(stdout.contains(path.trim()), "stdout: {stdout}");

    let (value, _, _) = run_cli(home.path(), &["config", "get", "reminders.max_batch"]);
    assert_eq!(value.trim(), "50");
}
