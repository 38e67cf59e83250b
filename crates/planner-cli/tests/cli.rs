//! E2E CLI tests covering:
//! - Overlap checks on calendar (day) plans, with and without exclusion
//! - Resize cascades on timeline (millisecond) plans, written back with `--write`
//! - Rejections reported as JSON with exit status 3
//! - Plan validation and malformed input
//!
//! Each test runs `planner` as a subprocess against a plan in a temp directory.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

const CALENDAR: &str = r##"{
    "groups": [{"id": "tm1", "title": "Alice"}, {"id": "tm2", "title": "Bob"}],
    "projects": [{"id": "proj1", "name": "Project Alpha", "color": "#FFD700"}],
    "items": [
        {"id": "1", "teamMemberId": "tm1", "projectId": "proj1", "startDate": "2024-08-05", "endDate": "2024-08-07"}
    ]
}"##;

const TIMELINE: &str = r#"{
    "groups": [{"id": "g", "title": "Alice"}],
    "projects": [{"id": "p", "name": "Project Alpha"}],
    "items": [
        {"id": "a", "group": "g", "project": "p", "start_time": 10, "end_time": 20},
        {"id": "b", "group": "g", "project": "p", "start_time": 25, "end_time": 30}
    ]
}"#;

fn planner_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("planner"));
    cmd.env("PLANNER_LOG", "error");
    cmd
}

/// Write `contents` to `plan.json` in `dir`.
fn write_plan(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("plan.json");
    fs::write(&path, contents).expect("write plan");
    path
}

/// Run `planner --plan <path> <args>` and return (exit code, parsed stdout).
fn run_json(path: &Path, args: &[&str]) -> (i32, Value) {
    let output = planner_cmd()
        .arg("--plan")
        .arg(path)
        .args(args)
        .output()
        .expect("planner should not crash");
    let json: Value = serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    });
    (output.status.code().expect("exit code"), json)
}

/// Bounds of assignment `id`, read with calendar or timeline field names.
fn span_of(assignments: &Value, id: &str) -> (Value, Value) {
    let a = assignments
        .as_array()
        .expect("assignments array")
        .iter()
        .find(|a| a["id"] == id)
        .unwrap_or_else(|| panic!("assignment {id} missing"));
    let field = |calendar: &str, timeline: &str| {
        a.get(calendar)
            .or_else(|| a.get(timeline))
            .cloned()
            .unwrap_or(Value::Null)
    };
    (field("startDate", "start_time"), field("endDate", "end_time"))
}

// ---------------------------------------------------------------------------
// Overlap checks
// ---------------------------------------------------------------------------

#[test]
fn check_date_inside_and_outside_assignment() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(dir.path(), CALENDAR);

    let (code, json) = run_json(&plan, &["check-date", "--member", "tm1", "--date", "2024-08-06"]);
    assert_eq!(code, 0);
    assert_eq!(json["overlapping"], true);

    let (_, json) = run_json(&plan, &["check-date", "--member", "tm1", "--date", "2024-08-08"]);
    assert_eq!(json["overlapping"], false);

    // Another lane never collides.
    let (_, json) = run_json(&plan, &["check-date", "--member", "tm2", "--date", "2024-08-06"]);
    assert_eq!(json["overlapping"], false);
}

#[test]
fn check_range_honours_exclusion() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(dir.path(), CALENDAR);
    let range = ["check-range", "--member", "tm1", "--start", "2024-08-06", "--end", "2024-08-08"];

    let (_, json) = run_json(&plan, &range);
    assert_eq!(json["overlapping"], true);

    let mut excluded = range.to_vec();
    excluded.extend(["--exclude", "1"]);
    let (_, json) = run_json(&plan, &excluded);
    assert_eq!(json["overlapping"], false);
}

#[test]
fn check_reads_plan_from_stdin() {
    planner_cmd()
        .args(["check-date", "--member", "tm1", "--date", "2024-08-07"])
        .write_stdin(CALENDAR)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"overlapping\": true"));
}

// ---------------------------------------------------------------------------
// Resize
// ---------------------------------------------------------------------------

#[test]
fn resize_end_edge_cascades_and_writes_plan() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(dir.path(), TIMELINE);

    let (code, json) = run_json(
        &plan,
        &["--granularity", "millis", "resize", "--id", "a", "--edge", "right", "--to", "23", "--write"],
    );
    assert_eq!(code, 0);
    assert_eq!(json["ok"], true);
    assert_eq!(json["shifted"], json!(["b"]));
    assert_eq!(span_of(&json["assignments"], "a"), (json!(10), json!(23)));
    assert_eq!(span_of(&json["assignments"], "b"), (json!(28), json!(33)));

    let written: Value = serde_json::from_str(&fs::read_to_string(&plan).unwrap()).unwrap();
    assert_eq!(span_of(&written["items"], "b"), (json!(28), json!(33)));
    assert_eq!(written["groups"][0]["id"], "g");
    // Timeline documents keep the timeline item names.
    let keys: Vec<&str> = written["items"][0]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["id", "group", "project", "start_time", "end_time"]);
}

#[test]
fn write_without_plan_file_fails() {
    planner_cmd()
        .args(["--granularity", "millis", "resize", "--id", "a", "--edge", "end", "--to", "23", "--write"])
        .write_stdin(TIMELINE)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--write needs --plan"));
}

#[test]
fn usage_error_is_distinct_from_rejection() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(dir.path(), TIMELINE);
    planner_cmd()
        .arg("--plan")
        .arg(&plan)
        .args(["resize", "--id", "a", "--edge", "middle", "--to", "23"])
        .assert()
        .code(2);
}

#[test]
fn resize_without_write_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(dir.path(), TIMELINE);

    let (code, _) = run_json(
        &plan,
        &["--granularity", "millis", "resize", "--id", "a", "--edge", "end", "--to", "23"],
    );
    assert_eq!(code, 0);
    assert_eq!(fs::read_to_string(&plan).unwrap(), TIMELINE);
}

#[test]
fn resize_collapsing_range_is_rejected() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(dir.path(), TIMELINE);

    let (code, json) = run_json(
        &plan,
        &["--granularity", "millis", "resize", "--id", "a", "--edge", "end", "--to", "5", "--write"],
    );
    assert_eq!(code, 3);
    assert_eq!(json["ok"], false);
    assert_eq!(json["reason"], "InvalidRange");
    assert_eq!(fs::read_to_string(&plan).unwrap(), TIMELINE);
}

#[test]
fn resize_under_refuse_policy_reports_conflict() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(dir.path(), TIMELINE);

    let (code, json) = run_json(
        &plan,
        &[
            "--granularity", "millis", "--policy", "refuse",
            "resize", "--id", "a", "--edge", "end", "--to", "25",
        ],
    );
    assert_eq!(code, 3);
    assert_eq!(json["reason"], "OverlapConflict");
}

#[test]
fn resize_unknown_assignment_is_not_found() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(dir.path(), TIMELINE);

    let (code, json) = run_json(
        &plan,
        &["--granularity", "millis", "resize", "--id", "zz", "--edge", "start", "--to", "0"],
    );
    assert_eq!(code, 3);
    assert_eq!(json["reason"], "NotFound");
}

// ---------------------------------------------------------------------------
// Add / remove / toggle / move
// ---------------------------------------------------------------------------

#[test]
fn add_refuses_overlap_then_accepts_free_range() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(dir.path(), CALENDAR);

    let (code, json) = run_json(
        &plan,
        &["add", "--member", "tm1", "--project", "proj1", "--start", "2024-08-07", "--end", "2024-08-09"],
    );
    assert_eq!(code, 3);
    assert_eq!(json["reason"], "OverlapConflict");

    let (code, json) = run_json(
        &plan,
        &[
            "add", "--member", "tm1", "--project", "proj1",
            "--start", "2024-08-08", "--end", "2024-08-09", "--write",
        ],
    );
    assert_eq!(code, 0);
    let id = json["id"].as_str().expect("new id").to_string();
    assert!(!id.is_empty());

    let written: Value = serde_json::from_str(&fs::read_to_string(&plan).unwrap()).unwrap();
    assert_eq!(written["items"].as_array().unwrap().len(), 2);
    assert_eq!(
        span_of(&written["items"], &id),
        (json!("2024-08-08"), json!("2024-08-09"))
    );
}

#[test]
fn toggle_creates_then_removes_day() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(dir.path(), CALENDAR);
    let toggle = [
        "toggle", "--member", "tm2", "--project", "proj1", "--day", "2024-08-06", "--write",
    ];

    let (code, json) = run_json(&plan, &toggle);
    assert_eq!(code, 0);
    let created = json["created"].as_str().expect("created id").to_string();
    assert_eq!(
        span_of(&json["assignments"], &created),
        (json!("2024-08-06"), json!("2024-08-06"))
    );

    let (code, json) = run_json(&plan, &toggle);
    assert_eq!(code, 0);
    assert_eq!(json["removed"], created.as_str());
    assert_eq!(json["assignments"].as_array().unwrap().len(), 1);
}

#[test]
fn remove_and_move_by_id() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(dir.path(), TIMELINE);

    let (code, json) = run_json(
        &plan,
        &["--granularity", "millis", "move", "--id", "b", "--member", "g", "--start", "40"],
    );
    assert_eq!(code, 0);
    assert_eq!(span_of(&json["assignments"], "b"), (json!(40), json!(45)));

    let (code, json) = run_json(&plan, &["--granularity", "millis", "remove", "--id", "a"]);
    assert_eq!(code, 0);
    assert_eq!(json["removed"], "a");
    assert_eq!(json["assignments"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Validation and input errors
// ---------------------------------------------------------------------------

#[test]
fn validate_reports_every_issue() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(
        dir.path(),
        r#"{
            "groups": [{"id": "g", "title": "Alice"}],
            "projects": [{"id": "p", "name": "Alpha"}],
            "items": [
                {"id": "a", "group": "g", "project": "p", "start_time": 10, "end_time": 20},
                {"id": "b", "group": "g", "project": "p", "start_time": 20, "end_time": 30},
                {"id": "c", "group": "ghost", "project": "p", "start_time": 0, "end_time": 1}
            ]
        }"#,
    );

    let (code, json) = run_json(&plan, &["--granularity", "millis", "validate"]);
    assert_eq!(code, 1);
    assert_eq!(json["valid"], false);
    let kinds: Vec<&str> = json["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["kind"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"UnknownTeamMember"));
    assert!(kinds.contains(&"Overlap"));
}

#[test]
fn validate_accepts_clean_plan() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(dir.path(), CALENDAR);
    let (code, json) = run_json(&plan, &["validate"]);
    assert_eq!(code, 0);
    assert_eq!(json["valid"], true);
}

#[test]
fn malformed_date_fails_with_message() {
    let dir = TempDir::new().unwrap();
    let plan = write_plan(dir.path(), CALENDAR);
    planner_cmd()
        .arg("--plan")
        .arg(&plan)
        .args(["check-date", "--member", "tm1", "--date", "08/06/2024"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: Invalid date"));
}

#[test]
fn missing_plan_file_fails() {
    let dir = TempDir::new().unwrap();
    planner_cmd()
        .arg("--plan")
        .arg(dir.path().join("nope.json"))
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read plan"));
}
