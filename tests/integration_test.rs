use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn karros_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_karros"));
    cmd.current_dir(dir)
        .env_remove("KARROS_URL")
        .env_remove("KARROS_ANON_KEY")
        .env_remove("KARROS_ACCESS_TOKEN")
        .env_remove("KARROS_DEMO")
        .env_remove("KARROS_LOG");
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    karros_cmd(dir).args(args).output().unwrap()
}

fn run_ok(dir: &Path, args: &[&str]) -> String {
    let output = run(dir, args);
    assert!(
        output.status.success(),
        "karros {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    serde_json::from_str(&run_ok(dir, args)).unwrap()
}

fn init() -> TempDir {
    let tmp = TempDir::new().unwrap();
    run_ok(tmp.path(), &["init"]);
    tmp
}

#[test]
fn test_init_creates_karros_directory() {
    let tmp = init();
    assert!(tmp.path().join(".karros").exists());
    assert!(tmp.path().join(".karros/config.yaml").exists());
    assert!(tmp.path().join(".karros/store.db").exists());
}

#[test]
fn test_init_twice_fails() {
    let tmp = init();
    let output = run(tmp.path(), &["init"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Already initialized"));
}

#[test]
fn test_rest_init_requires_url() {
    let tmp = TempDir::new().unwrap();
    let output = run(tmp.path(), &["init", "--backend", "rest"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--url"));
}

#[test]
fn test_command_without_init_fails() {
    let tmp = TempDir::new().unwrap();
    let output = run(tmp.path(), &["goal", "list"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Not in a karros project"));
}

#[test]
fn test_goal_workflow() {
    let tmp = init();
    let dir = tmp.path();

    let goal = run_json(
        dir,
        &[
            "goal",
            "add",
            "Save for deposit",
            "-m",
            "Save $500",
            "-m",
            "Save $1000",
            "--json",
        ],
    );
    assert_eq!(goal["title"], "Save for deposit");
    assert_eq!(goal["category"], "personal");
    assert_eq!(goal["priority"], "mid");
    let milestones = goal["milestones"].as_array().unwrap();
    assert_eq!(milestones.len(), 2);
    assert!(milestones.iter().all(|m| m["is_completed"] == false));

    let first = milestones[0]["id"].as_str().unwrap().to_string();
    run_ok(dir, &["goal", "toggle", &first[..8]]);

    let goals = run_json(dir, &["goal", "list", "--json"]);
    let goals = goals.as_array().unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0]["title"], "Save for deposit");
    assert_eq!(goals[0]["milestones"][0]["is_completed"], true);
    assert_eq!(goals[0]["milestones"][1]["is_completed"], false);

    let id = goals[0]["id"].as_str().unwrap().to_string();
    let updated = run_json(dir, &["goal", "update", &id, "--status", "completed", "--json"]);
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["title"], "Save for deposit");

    let output = run(dir, &["goal", "delete", &id]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--force"));

    run_ok(dir, &["goal", "delete", &id, "--force"]);
    let goals = run_json(dir, &["goal", "list", "--json"]);
    assert!(goals.as_array().unwrap().is_empty());
}

#[test]
fn test_blank_title_rejected() {
    let tmp = init();
    let output = run(tmp.path(), &["goal", "add", "   "]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("title is required"));
}

#[test]
fn test_short_prefix_rejected() {
    let tmp = init();
    let output = run(tmp.path(), &["goal", "delete", "ab", "--force"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("too short"));
}

#[test]
fn test_project_matrix_workflow() {
    let tmp = init();
    let dir = tmp.path();

    let project = run_json(
        dir,
        &["project", "add", "Riverside Pavilion", "-m", "Brief", "--json"],
    );
    let id = project["id"].as_str().unwrap().to_string();

    let moved = run_json(dir, &["project", "move", &id, "50", "30", "--json"]);
    assert_eq!(moved["priority"], "high");
    assert_eq!(moved["ai_position_x"], 50.0);
    assert_eq!(moved["ai_position_y"], 30.0);
    assert!(moved["target_date"].is_string());

    let matrix = run_json(dir, &["project", "matrix", "--json"]);
    let entries = matrix.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["x"], 50.0);
    assert_eq!(entries[0]["y"], 30.0);

    let found = run_json(dir, &["project", "matrix", "--search", "riverside", "--json"]);
    assert_eq!(found.as_array().unwrap().len(), 1);
    let missing = run_json(dir, &["project", "matrix", "--search", "kiosk", "--json"]);
    assert!(missing.as_array().unwrap().is_empty());
    let other_type = run_json(
        dir,
        &["project", "matrix", "--type", "fashion", "--json"],
    );
    assert!(other_type.as_array().unwrap().is_empty());

    let shown = run_json(dir, &["project", "show", &id[..8], "--json"]);
    let milestones = shown["milestones"].as_array().unwrap();
    assert_eq!(milestones.len(), 1);
    assert_eq!(milestones[0]["status"], "pending");

    let milestone = milestones[0]["id"].as_str().unwrap().to_string();
    let done = run_json(dir, &["milestone", "complete", &milestone, "--json"]);
    assert_eq!(done["status"], "completed");
    assert!(done["completed_at"].is_string());
}

#[test]
fn test_press_requires_organization() {
    let tmp = init();
    let output = run(tmp.path(), &["press", "add", "Emerging Designers Award"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("organization"));

    run_ok(
        tmp.path(),
        &["press", "add", "Emerging Designers Award", "-o", "Design Council"],
    );
}

#[test]
fn test_vault_privacy_masks_list() {
    let tmp = init();
    let dir = tmp.path();

    run_ok(dir, &["secret", "add", "GitHub", "-u", "me", "-p", "hunter2"]);
    assert!(run_ok(dir, &["secret", "list"]).contains("hunter2"));

    assert!(run_ok(dir, &["vault", "privacy", "on"]).contains("on"));
    let listed = run_ok(dir, &["secret", "list"]);
    assert!(!listed.contains("hunter2"));
    assert!(listed.contains("GitHub"));

    run_ok(dir, &["vault", "privacy", "off"]);
    assert!(run_ok(dir, &["secret", "list"]).contains("hunter2"));
}

#[test]
fn test_clip_workflow() {
    let tmp = init();
    let dir = tmp.path();

    let output = run(dir, &["clip", "add", "  "]);
    assert!(!output.status.success());

    let clip = run_json(dir, &["clip", "add", "  Order more birch ply  ", "--json"]);
    assert_eq!(clip["content"], "Order more birch ply");

    let id = clip["id"].as_str().unwrap().to_string();
    run_ok(dir, &["clip", "delete", &id, "--force"]);
    let clips = run_json(dir, &["clip", "list", "--json"]);
    assert!(clips.as_array().unwrap().is_empty());
}

#[test]
fn test_demo_mode_without_project() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();

    let goals = run_json(dir, &["--demo", "goal", "list", "--json"]);
    assert_eq!(goals.as_array().unwrap().len(), 3);

    let output = run(dir, &["--demo", "goal", "add", "Learn to weld"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("demo mode"));

    let goals = run_json(dir, &["--demo", "goal", "list", "--json"]);
    assert_eq!(goals.as_array().unwrap().len(), 3);
    assert!(!dir.join(".karros").exists());
}

#[test]
fn test_demo_mode_leaves_project_untouched() {
    let tmp = init();
    let dir = tmp.path();

    run_ok(dir, &["--demo", "spark", "add", "Kinetic facade"]);
    let sparks = run_json(dir, &["spark", "list", "--json"]);
    assert!(sparks.as_array().unwrap().is_empty());

    let demo_sparks = run_json(dir, &["--demo", "spark", "list", "--json"]);
    assert_eq!(demo_sparks.as_array().unwrap().len(), 3);
}
