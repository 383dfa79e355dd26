//! Basic CLI E2E tests.
//!
//! Tests invoke the built `dayslot` binary with `HOME` pointed at a
//! temporary directory so the user's configuration is never touched.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

struct Sandbox {
    home: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("Failed to create temp home"),
        }
    }

    /// Write `content` to a file inside the sandbox and return its path.
    fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.home.path().join(name);
        std::fs::write(&path, content).expect("Failed to write fixture");
        path
    }

    /// Run a CLI command and return (stdout, stderr, exit code).
    fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = Command::new(env!("CARGO_BIN_EXE_dayslot"))
            .args(args)
            .env("HOME", self.home.path())
            .env_remove("DAYSLOT_ENV")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute CLI command");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);

        (stdout, stderr, code)
    }

    fn run_success(&self, args: &[&str]) -> String {
        let (stdout, stderr, code) = self.run(args);
        assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
        stdout
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path is not UTF-8")
}

#[test]
fn test_slots_around_events() {
    let sandbox = Sandbox::new();
    let events = sandbox.file(
        "events.json",
        r#"[
            {"title": "Standup", "start": "2026-03-14T09:00:00", "end": "2026-03-14T10:00:00"},
            {"title": "Lunch", "start_time": "12:00", "end_time": "13:00"}
        ]"#,
    );

    let stdout = sandbox.run_success(&["slots", "--date", "2026-03-14", "--events", path_str(&events)]);
    let slots: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let slots = slots.as_array().unwrap();

    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0]["start"], "2026-03-14T07:00:00");
    assert_eq!(slots[0]["end"], "2026-03-14T09:00:00");
    assert_eq!(slots[0]["duration_minutes"], 120);
    assert_eq!(slots[2]["id"], "slot_3");
    assert_eq!(slots[2]["duration_minutes"], 600);
}

#[test]
fn test_slots_without_events_uses_sleep_window() {
    let sandbox = Sandbox::new();
    let stdout = sandbox.run_success(&[
        "slots",
        "--date",
        "2026-03-14",
        "--sleep-start",
        "22:00",
        "--sleep-end",
        "06:00",
    ]);
    let slots: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(slots[0]["start"], "2026-03-14T06:00:00");
    assert_eq!(slots[0]["end"], "2026-03-14T22:00:00");
}

#[test]
fn test_slots_rejects_inverted_day() {
    let sandbox = Sandbox::new();
    let (_, stderr, code) = sandbox.run(&[
        "slots",
        "--date",
        "2026-03-14",
        "--day-start",
        "18:00",
        "--day-end",
        "09:00",
    ]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_slots_rejects_bad_date() {
    let sandbox = Sandbox::new();
    let (_, _, code) = sandbox.run(&["slots", "--date", "14/03/2026"]);
    assert_ne!(code, 0);
}

#[test]
fn test_plan_text_output() {
    let sandbox = Sandbox::new();
    let tasks = sandbox.file(
        "tasks.json",
        r#"[{"title": "Write report", "duration_minutes": 90, "priority": "high"}]"#,
    );

    let stdout = sandbox.run_success(&["plan", "--date", "2026-03-14", "--tasks", path_str(&tasks), "--text"]);
    assert!(stdout.contains("Scheduled 1 task(s):"));
    assert!(stdout.contains("Write report (07:00-08:30) [high priority]"));
}

#[test]
fn test_plan_json_reports_rejected_tasks_on_stderr() {
    let sandbox = Sandbox::new();
    let events = sandbox.file(
        "events.json",
        r#"[
            {"start": "10:00", "end": "11:00"},
            {"start": "16:00", "end": "17:00"}
        ]"#,
    );
    let tasks = sandbox.file(
        "tasks.json",
        r#"[
            {"title": "Read chapter", "duration_minutes": 45},
            {"title": "", "duration_minutes": 30},
            {"task_name": "Marathon", "estimated_duration_minutes": 480, "priority": "low"}
        ]"#,
    );

    let (stdout, stderr, code) = sandbox.run(&[
        "plan",
        "--date",
        "2026-03-14",
        "--tasks",
        path_str(&tasks),
        "--events",
        path_str(&events),
    ]);
    assert_eq!(code, 0, "{stderr}");
    assert!(stderr.contains("skipped task #2"));

    let result: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(result["success"], false);
    assert_eq!(result["scheduled"].as_array().unwrap().len(), 1);
    assert_eq!(result["unscheduled"][0]["title"], "Marathon");
}

#[test]
fn test_plan_survives_wrongly_typed_entries() {
    let sandbox = Sandbox::new();
    let events = sandbox.file(
        "events.json",
        r#"[
            {"start": 900, "end": "10:00"},
            null,
            {"start": "09:00", "end": "10:00"}
        ]"#,
    );
    let tasks = sandbox.file(
        "tasks.json",
        r#"[
            {"title": "Write", "duration_minutes": "45"},
            30.5,
            {"title": "Call bank", "duration_minutes": 30}
        ]"#,
    );

    let (stdout, stderr, code) = sandbox.run(&[
        "plan",
        "--date",
        "2026-03-14",
        "--tasks",
        path_str(&tasks),
        "--events",
        path_str(&events),
    ]);
    assert_eq!(code, 0, "{stderr}");
    assert!(stderr.contains("skipped task #1"));
    assert!(stderr.contains("skipped task #2"));

    let result: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(result["success"], true);
    // The 09:00-10:00 event still blocks time, so slot_1 ends at 09:00
    assert_eq!(result["scheduled"][0]["task"]["title"], "Call bank");
    assert_eq!(result["scheduled"][0]["slot_id"], "slot_1");
    assert_eq!(result["scheduled"][0]["start"], "2026-03-14T07:00:00");
}

#[test]
fn test_slots_skip_wrongly_typed_events() {
    let sandbox = Sandbox::new();
    let events = sandbox.file(
        "events.json",
        r#"[
            {"start": "09:00", "end": "10:00"},
            {"start": 900, "end": "10:00"},
            "standup"
        ]"#,
    );

    let stdout = sandbox.run_success(&["slots", "--date", "2026-03-14", "--events", path_str(&events)]);
    let slots: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let slots = slots.as_array().unwrap();

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0]["end"], "2026-03-14T09:00:00");
    assert_eq!(slots[1]["start"], "2026-03-14T10:00:00");
}

#[test]
fn test_plan_proposals_output() {
    let sandbox = Sandbox::new();
    let tasks = sandbox.file(
        "tasks.json",
        r#"[{"title": "Gym", "duration_minutes": 60, "reasoning": "Leg day"}]"#,
    );

    let stdout = sandbox.run_success(&["plan", "--date", "2026-03-14", "--tasks", path_str(&tasks), "--proposals"]);
    let proposals: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(proposals[0]["task_name"], "Gym");
    assert_eq!(proposals[0]["assigned_date"], "2026-03-14");
    assert_eq!(proposals[0]["estimated_duration_minutes"], 60);
    assert_eq!(proposals[0]["reasoning"], "Leg day");
}

#[test]
fn test_plan_missing_tasks_file_fails() {
    let sandbox = Sandbox::new();
    let (_, stderr, code) = sandbox.run(&["plan", "--date", "2026-03-14", "--tasks", "/nonexistent/tasks.json"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("cannot read"));
}

#[test]
fn test_config_get_default() {
    let sandbox = Sandbox::new();
    let stdout = sandbox.run_success(&["config", "get", "day.sleep_start"]);
    assert_eq!(stdout.trim(), "23:00");
}

#[test]
fn test_config_set_then_get() {
    let sandbox = Sandbox::new();
    sandbox.run_success(&["config", "set", "day.min_slot_minutes", "30"]);
    let stdout = sandbox.run_success(&["config", "get", "day.min_slot_minutes"]);
    assert_eq!(stdout.trim(), "30");

    sandbox.run_success(&["config", "reset"]);
    let stdout = sandbox.run_success(&["config", "get", "day.min_slot_minutes"]);
    assert_eq!(stdout.trim(), "15");
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let sandbox = Sandbox::new();
    let (_, stderr, code) = sandbox.run(&["config", "set", "day.nope", "1"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Unknown configuration key"));
}

#[test]
fn test_config_set_rejects_unusable_day() {
    let sandbox = Sandbox::new();
    let (_, _, code) = sandbox.run(&["config", "set", "day.day_end", "25:00"]);
    assert_ne!(code, 0);
    let stdout = sandbox.run_success(&["config", "get", "day.day_end"]);
    assert_eq!(stdout.trim(), "23:59");
}

#[test]
fn test_config_list_is_json() {
    let sandbox = Sandbox::new();
    let stdout = sandbox.run_success(&["config", "list"]);
    let config: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(config["scoring"]["weights"]["high"], 3.0);
}
