use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
    work: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");
        let work = base.join("work");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");
        fs::create_dir_all(&work).expect("failed to create work dir");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_config,
            xdg_state,
            work,
        }
    }

    fn write_snapshot(&self, contents: &str) -> PathBuf {
        let path = self.work.join("snapshot.json");
        fs::write(&path, contents).expect("failed to write snapshot fixture");
        path
    }

    fn write_prefs(&self, contents: &str) -> PathBuf {
        let path = self.work.join("prefs.toml");
        fs::write(&path, contents).expect("failed to write prefs fixture");
        path
    }
}

fn run_dayscope(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("dayscope"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute dayscope: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "dayscope {rendered_args} failed with status {:?}\nstdout:\n{stdout}\nstderr:\n{stderr}",
        output.status
    );
}

const SNAPSHOT: &str = r#"{
  "pull_requests": [
    {
      "id": "31",
      "title": "Fix pagination",
      "url": "https://github.com/acme/app/pull/31",
      "created_at": "2026-08-28T09:00:00Z",
      "additions": 40,
      "deletions": 5,
      "author": "dev"
    }
  ],
  "issues": [
    {
      "id": "uuid-ENG-9",
      "identifier": "ENG-9",
      "title": "Crash on empty input",
      "priority": 1,
      "state": { "name": "In Progress", "type": "started" }
    },
    {
      "id": "uuid-ENG-10",
      "identifier": "ENG-10",
      "title": "Improve docs",
      "priority": 4,
      "state": { "name": "Backlog", "type": "backlog" }
    }
  ],
  "events": [
    {
      "id": "evt-1",
      "summary": "Team standup",
      "start": "2026-08-28T09:00:00Z",
      "end": "2026-08-28T09:30:00Z",
      "duration_minutes": 30,
      "response_status": "accepted"
    }
  ],
  "errors": []
}"#;

#[test]
fn plans_a_snapshot_in_text_format() {
    let env = CliTestEnv::new();
    let snapshot = env.write_snapshot(SNAPSHOT);
    let snapshot = snapshot.to_str().unwrap();

    let args = ["--snapshot", snapshot, "--hours", "6", "--offline"];
    let output = run_dayscope(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Fix pagination"), "missing PR item:\n{stdout}");
    assert!(stdout.contains("Crash on empty input"), "missing issue:\n{stdout}");
    assert!(stdout.contains("Team standup"), "missing meeting:\n{stdout}");
    assert!(stdout.contains("available"), "missing budget line:\n{stdout}");
}

#[test]
fn json_output_is_a_valid_plan() {
    let env = CliTestEnv::new();
    let snapshot = env.write_snapshot(SNAPSHOT);
    let snapshot = snapshot.to_str().unwrap();

    let args = [
        "--snapshot",
        snapshot,
        "--hours",
        "6",
        "--format",
        "json",
        "--offline",
    ];
    let output = run_dayscope(&env, &args);
    assert_success(&args, &output);

    let plan: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is not valid JSON");
    assert_eq!(plan["requested_hours"], 6.0);
    assert_eq!(plan["meeting_hours"], 0.5);
    assert_eq!(plan["available_hours"], 5.5);
    let items = plan["items"].as_array().expect("items is not an array");
    assert_eq!(items.len(), 3);
    // in-progress urgent issue sorts before backlog
    assert_eq!(items[1]["id"], "ENG-9");
    for item in items {
        assert!(item["effort_hours"].is_number());
    }
}

#[test]
fn preferences_exclude_and_override() {
    let env = CliTestEnv::new();
    let snapshot = env.write_snapshot(SNAPSHOT);
    let snapshot = snapshot.to_str().unwrap();
    let prefs = env.write_prefs(
        r#"
excluded = ["ENG-10"]

[hour_overrides]
"ENG-9" = 3.0
"#,
    );
    let prefs = prefs.to_str().unwrap();

    let args = [
        "--snapshot",
        snapshot,
        "--prefs",
        prefs,
        "--format",
        "json",
        "--offline",
    ];
    let output = run_dayscope(&env, &args);
    assert_success(&args, &output);

    let plan: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is not valid JSON");
    let items = plan["items"].as_array().expect("items is not an array");
    assert!(items.iter().all(|i| i["id"] != "ENG-10"));

    let eng9 = items
        .iter()
        .find(|i| i["id"] == "ENG-9")
        .expect("ENG-9 missing from plan");
    assert_eq!(eng9["effort_hours"], 3.0);
    assert_eq!(eng9["effort_reasoning"], "Custom estimate: 3h");
}

#[test]
fn missing_snapshot_fails_with_context() {
    let env = CliTestEnv::new();
    let output = run_dayscope(&env, &["--snapshot", "/nonexistent/snapshot.json"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("snapshot"), "unexpected stderr:\n{stderr}");
}

#[test]
fn source_errors_surface_as_warnings() {
    let env = CliTestEnv::new();
    let snapshot = env.write_snapshot(
        r#"{
  "pull_requests": [],
  "issues": [],
  "events": [],
  "errors": ["calendar: events unavailable: auth expired"]
}"#,
    );
    let snapshot = snapshot.to_str().unwrap();

    let args = ["--snapshot", snapshot, "--offline"];
    let output = run_dayscope(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Nothing to plan"), "expected empty plan:\n{stdout}");
    assert!(
        stdout.contains("auth expired"),
        "missing surfaced source error:\n{stdout}"
    );
}
