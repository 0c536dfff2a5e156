//! Multiple `jsonfile` processes updating one file

use std::path::Path;
use std::process::{Command, Output};
use std::time::{Duration, Instant};

use serde_json::{json, Map, Value};
use tempfile::TempDir;

const PROCESSES: usize = 12;

fn jsonfile(file: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_jsonfile"));
    cmd.env_remove("JSONFILE_LOG")
        .env_remove("JSONFILE_INDENT")
        .env_remove("JSONFILE_DIALECT")
        .env("JSONFILE_CONFIG", file.with_extension("no-config.toml"))
        .arg(file)
        .args(args);
    cmd
}

fn run(file: &Path, args: &[&str]) -> Output {
    jsonfile(file, args).output().expect("failed to run jsonfile")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn updates_from_separate_processes_are_not_lost() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("atomic-test.json");
    assert!(run(&file, &["write", "{}"]).status.success());

    let children: Vec<_> = (0..PROCESSES)
        .map(|i| {
            let key = format!("k{}", i);
            let value = i.to_string();
            let args = [
                "--quiet",
                "--poll-ms",
                "5",
                "--lock-wait-ms",
                "30000",
                "set",
                key.as_str(),
                value.as_str(),
            ];
            jsonfile(&file, &args)
                .spawn()
                .expect("failed to spawn jsonfile")
        })
        .collect();

    for mut child in children {
        assert!(child.wait().unwrap().success());
    }

    let expected: Map<String, Value> = (0..PROCESSES)
        .map(|i| (format!("k{}", i), json!(i)))
        .collect();
    let output = run(&file, &["read"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output), Value::Object(expected));
    assert!(!file.with_extension("json.lock").exists());
}

#[test]
fn missing_key_fails_and_default_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("doc.json");
    assert!(run(&file, &["write", "{}"]).status.success());

    let missing = run(&file, &["get", "a.b"]);
    assert!(!missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stderr).contains("a.b"));

    let fallback = run(&file, &["--compact", "get", "a.b", "--or", "7"]);
    assert!(fallback.status.success());
    assert_eq!(stdout_json(&fallback), json!(7));
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "{}");
}

#[test]
fn held_lock_times_out_with_hint() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("doc.json");
    std::fs::write(&file, "{}").unwrap();
    std::fs::write(file.with_extension("json.lock"), "").unwrap();

    let output = run(&file, &["--lock-wait-ms", "100", "--poll-ms", "10", "read"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Timed out acquiring lock"));
    assert!(stderr.contains("hint:"));
}

#[test]
fn lock_wait_flag_sets_the_budget() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("doc.json");
    std::fs::write(&file, "{}").unwrap();
    std::fs::write(file.with_extension("json.lock"), "").unwrap();

    // 1500 polls at 1ms would outlast the default retry count
    let started = Instant::now();
    let output = run(&file, &["--lock-wait-ms", "1500", "--poll-ms", "1", "read"]);
    assert!(!output.status.success());
    assert!(started.elapsed() >= Duration::from_millis(1500));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Timed out acquiring lock"));
}

#[test]
fn flags_override_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("doc.json");
    let config = temp_dir.path().join("config.toml");
    std::fs::write(&config, "indent = 4\ncant_read_file_default = {}\n").unwrap();
    let config_arg = config.to_str().unwrap();

    let output = run(&file, &["--config", config_arg, "set", "x", "1"]);
    assert!(output.status.success());
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "{\n    \"x\": 1\n}");

    let output = run(&file, &["--config", config_arg, "--indent", "0", "rewrite"]);
    assert!(output.status.success());
    assert_eq!(std::fs::read_to_string(&file).unwrap(), r#"{"x":1}"#);
}
