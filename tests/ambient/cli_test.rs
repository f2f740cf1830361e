//! CLI contract tests.

use assert_cmd::Command;

fn clicktoplay(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("clicktoplay").expect("binary should build");
    cmd.env("HOME", home)
        .env_remove("CLICKTOPLAY_CONFIG")
        .env_remove("CLICKTOPLAY_CLICK_TO_PLAY")
        .env_remove("CLICKTOPLAY_WAIT_TIMEOUT_MS")
        .env_remove("CLICKTOPLAY_LOG_LEVEL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn run_builtin_passes() {
    let home = tempfile::tempdir().expect("tempdir");
    let output = clicktoplay(home.path())
        .args(["run", "--builtin"])
        .output()
        .expect("run should execute");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("PASS "), "unexpected stdout: {stdout}");
}

#[test]
fn run_builtin_json_report() {
    let home = tempfile::tempdir().expect("tempdir");
    let output = clicktoplay(home.path())
        .args(["run", "--builtin", "--json"])
        .output()
        .expect("run should execute");

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["page"]["objects"].as_array().map(Vec::len), Some(1));
}

#[test]
fn run_failing_scenario_exits_non_zero() {
    let home = tempfile::tempdir().expect("tempdir");
    let scenario = home.path().join("fail.toml");
    std::fs::write(
        &scenario,
        r#"
name = "blocked plugin expected active"
click_to_play = true

[[steps]]
action = "new_page"
url = "http://a.test/"

[[steps]]
action = "add_object"
origin = "http://a.test"

[[steps]]
action = "expect_activated"
index = 0
"#,
    )
    .expect("write scenario");
    let config = home.path().join("config.toml");
    std::fs::write(&config, "[wait]\ntimeout_ms = 50\ninterval_ms = 10\n")
        .expect("write config");

    let output = clicktoplay(home.path())
        .arg("--config")
        .arg(&config)
        .arg("run")
        .arg(&scenario)
        .output()
        .expect("run should execute");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("waited too long for plugin 0 activation"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn check_config_prints_defaults() {
    let home = tempfile::tempdir().expect("tempdir");
    let output = clicktoplay(home.path())
        .arg("check-config")
        .output()
        .expect("check-config should execute");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("click_to_play = true"));
    assert!(stdout.contains("timeout_ms = 3000"));
}

#[test]
fn run_requires_scenario_or_builtin() {
    let home = tempfile::tempdir().expect("tempdir");
    clicktoplay(home.path()).arg("run").assert().failure();
}

#[test]
fn invalid_env_override_is_reported_on_stderr() {
    let home = tempfile::tempdir().expect("tempdir");
    let output = clicktoplay(home.path())
        .env("CLICKTOPLAY_WAIT_TIMEOUT_MS", "soon")
        .arg("check-config")
        .output()
        .expect("check-config should execute");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("ignoring invalid env override"),
        "unexpected stderr: {stderr}"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("timeout_ms = 3000"), "unexpected stdout: {stdout}");
}
