//! End-to-end tests of the `latz` binary.
//!
//! Each test runs in its own working directory with `LATZ_HOME` pointing at a
//! separate temporary home, so no real user configuration is read or written.

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;

struct Sandbox {
    home: TempDir,
    cwd: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
            cwd: TempDir::new().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("latz"));
        cmd.current_dir(self.cwd.path())
            .env("LATZ_HOME", self.home.path())
            .env_remove("LATZ_LOG");
        cmd
    }

    fn write_cwd_config(&self, content: &str) {
        fs::write(self.cwd.path().join(".latz.json"), content).unwrap();
    }

    fn read_cwd_config(&self) -> String {
        fs::read_to_string(self.cwd.path().join(".latz.json")).unwrap()
    }
}

#[test]
fn search_with_placeholder_backend() {
    let sandbox = Sandbox::new();
    sandbox.write_cwd_config(r#"{"search_backends": ["placeholder"]}"#);

    sandbox
        .cmd()
        .args(["search", "cats"])
        .assert()
        .success()
        .stdout(contains("| 1 | https://placekitten.com/200/300 | placeholder |"))
        .stdout(contains("| 2 | https://placekitten.com/600/500 | placeholder |"))
        .stdout(contains("| 3 | https://placekitten.com/1000/800 | placeholder |"));
}

#[test]
fn search_json_output() {
    let sandbox = Sandbox::new();
    sandbox.write_cwd_config(
        r#"{"search_backends": "placeholder",
            "search_backend_settings": {"placeholder": {"type": "bear"}}}"#,
    );

    let output = sandbox
        .cmd()
        .args(["search", "bears", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let sets: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(sets[0]["results"][0]["url"], "https://placebear.com/200/300");
}

#[test]
fn search_reports_failed_backend_and_exits_one() {
    let sandbox = Sandbox::new();
    sandbox.write_cwd_config(r#"{"search_backends": ["placeholder", "unsplash"]}"#);

    sandbox
        .cmd()
        .args(["--log", "0", "search", "cats"])
        .assert()
        .code(1)
        .stdout(contains("placekitten.com"))
        .stderr(contains("Error: backend 'unsplash' failed:"));
}

#[test]
fn search_without_query_is_usage_error() {
    let sandbox = Sandbox::new();
    sandbox.cmd().arg("search").assert().code(2);
}

#[test]
fn config_show_prints_composed_json() {
    let sandbox = Sandbox::new();
    fs::write(
        sandbox.home.path().join(".latz.json"),
        r#"{"search_backend_settings": {"placeholder": {"type": "bear"}}}"#,
    )
    .unwrap();
    sandbox.write_cwd_config(r#"{"search_backends": ["placeholder"]}"#);

    let output = sandbox
        .cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    assert!(text.ends_with("}\n"));

    let shown: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        shown,
        json!({
            "results_per_page": 10,
            "search_backend_settings": {
                "placeholder": {"type": "bear"},
                "unsplash": {"access_key": "", "secret_key": ""}
            },
            "search_backends": ["placeholder"]
        })
    );
}

#[test]
fn config_set_persists_to_cwd() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["config", "set", "search_backends=placeholder"])
        .assert()
        .success();

    let saved: Value = serde_json::from_str(&sandbox.read_cwd_config()).unwrap();
    assert_eq!(saved, json!({"search_backends": ["placeholder"]}));

    sandbox
        .cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("\"placeholder\""));
}

#[test]
fn config_set_home_flag_writes_home_file() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["config", "set", "--home", "results_per_page=25"])
        .assert()
        .success();

    let saved = fs::read_to_string(sandbox.home.path().join(".latz.json")).unwrap();
    assert_eq!(serde_json::from_str::<Value>(&saved).unwrap(), json!({"results_per_page": 25}));
    assert!(!sandbox.cwd.path().join(".latz.json").exists());
}

#[test]
fn config_set_unregistered_backend_leaves_file_unchanged() {
    let sandbox = Sandbox::new();
    sandbox.write_cwd_config(r#"{"search_backends": ["placeholder"]}"#);
    let before = sandbox.read_cwd_config();

    sandbox
        .cmd()
        .args(["config", "set", "search_backends=doesnotexist"])
        .assert()
        .code(1)
        .stderr(contains("'doesnotexist' is not a valid choice"));

    assert_eq!(sandbox.read_cwd_config(), before);
}

#[test]
fn config_set_malformed_token_exits_two() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["config", "set", "search_backends"])
        .assert()
        .code(2)
        .stderr(contains("does not conform to the correct format"));

    assert!(!sandbox.cwd.path().join(".latz.json").exists());
}

#[test]
fn malformed_config_file_fails_any_command() {
    let sandbox = Sandbox::new();
    sandbox.write_cwd_config("bad val");

    sandbox
        .cmd()
        .args(["config", "show"])
        .assert()
        .code(1)
        .stderr(contains("Unable to parse"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn environment_overrides_config_files() {
    let sandbox = Sandbox::new();
    sandbox.write_cwd_config(r#"{"search_backends": ["unsplash"]}"#);

    let output = sandbox
        .cmd()
        .env("LATZ_SEARCH_BACKENDS", "placeholder")
        .env("LATZ_SEARCH_BACKEND_SETTINGS__PLACEHOLDER__TYPE", "bear")
        .args(["config", "show"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let shown: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(shown["search_backends"], json!(["placeholder"]));
    assert_eq!(shown["search_backend_settings"]["placeholder"]["type"], json!("bear"));

    sandbox
        .cmd()
        .env("LATZ_RESULTS_PER_PAGE", "0")
        .args(["config", "show"])
        .assert()
        .code(1)
        .stderr(contains("Unable to parse configuration file: environment"));
}

#[test]
fn config_set_changes_only_the_edited_path() {
    let sandbox = Sandbox::new();
    fs::write(
        sandbox.home.path().join(".latz.json"),
        r#"{"search_backend_settings": {"unsplash": {"access_key": "k"}}}"#,
    )
    .unwrap();
    sandbox.write_cwd_config(r#"{"search_backends": "placeholder", "results_per_page": "4"}"#);

    let show = || {
        let output = sandbox
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        String::from_utf8(output).unwrap()
    };

    let before = show();
    sandbox
        .cmd()
        .args(["config", "set", "search_backend_settings.placeholder.type=bear"])
        .assert()
        .success();
    let after = show();

    let before_lines: Vec<&str> = before.lines().collect();
    let after_lines: Vec<&str> = after.lines().collect();
    assert_eq!(before_lines.len(), after_lines.len());
    let changed: Vec<(&str, &str)> = before_lines
        .into_iter()
        .zip(after_lines)
        .filter(|(b, a)| b != a)
        .collect();
    assert_eq!(changed.len(), 1);
    assert!(changed[0].0.contains("\"type\": \"kitten\""));
    assert!(changed[0].1.contains("\"type\": \"bear\""));

    let mut expected: Value = serde_json::from_str(&before).unwrap();
    expected["search_backend_settings"]["placeholder"]["type"] = json!("bear");
    assert_eq!(serde_json::from_str::<Value>(&after).unwrap(), expected);

    // the working-directory file is stored normalized
    let saved: Value = serde_json::from_str(&sandbox.read_cwd_config()).unwrap();
    assert_eq!(
        saved,
        json!({
            "search_backends": ["placeholder"],
            "results_per_page": 4,
            "search_backend_settings": {"placeholder": {"type": "bear"}}
        })
    );
}

#[test]
fn search_without_backends_warns() {
    let sandbox = Sandbox::new();
    sandbox.write_cwd_config(r#"{"search_backends": []}"#);

    sandbox
        .cmd()
        .args(["search", "cats"])
        .assert()
        .success()
        .stderr(contains("No search backends configured"));
}
