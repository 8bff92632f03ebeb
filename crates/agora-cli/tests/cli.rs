//! End-to-end runs of the `agora` binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn agora(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_agora"))
        .args(args)
        .current_dir(cwd)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("agora binary runs")
}

#[test]
fn test_generate_then_replay() {
    let work = TempDir::new().unwrap();
    let out = work.path().join("runs");

    let generated = agora(
        &["generate", "--agents", "3", "--seed", "4", "--out", out.to_str().unwrap()],
        work.path(),
    );
    assert!(generated.status.success(), "{}", String::from_utf8_lossy(&generated.stderr));

    let folder = out.join("debate_1");
    for file in ["universe_graph.apx", "agent_0.apx", "agent_1.apx", "agent_2.apx", "orderings.csv", "turns.csv", "summary.json"] {
        assert!(folder.join(file).exists(), "missing {file}");
    }
    let orderings = fs::read_to_string(folder.join("orderings.csv")).unwrap();
    assert_eq!(orderings.lines().count(), 1 + 6);

    // reports exist, so replay prints them and leaves the files alone
    let replayed = agora(&["replay", "--dir", folder.to_str().unwrap()], work.path());
    assert!(replayed.status.success(), "{}", String::from_utf8_lossy(&replayed.stderr));
    let stdout = String::from_utf8_lossy(&replayed.stdout);
    assert!(stdout.contains("ordering,final_valuation,turns,public_size,arguments"));
    assert_eq!(fs::read_to_string(folder.join("orderings.csv")).unwrap(), orderings);
}

#[test]
fn test_replay_writes_missing_reports() {
    let work = TempDir::new().unwrap();
    let folder = work.path().join("debate_1");
    fs::create_dir(&folder).unwrap();
    fs::write(folder.join("universe_graph.apx"), "arg(0).\narg(1).\narg(2).\natt(1,0).\natt(2,1).\n").unwrap();
    fs::write(folder.join("agent_0.apx"), "arg(0).\narg(1).\natt(1,0).\n").unwrap();
    fs::write(folder.join("agent_1.apx"), "arg(0).\narg(2).\n").unwrap();

    let replayed = agora(&["replay", "--dir", folder.to_str().unwrap()], work.path());
    assert!(replayed.status.success(), "{}", String::from_utf8_lossy(&replayed.stderr));

    let turns = fs::read_to_string(folder.join("turns.csv")).unwrap();
    assert!(turns.starts_with("ordering,turn,agent,move"));
    assert!(folder.join("orderings.csv").exists());
}

#[test]
fn test_value_of_issue() {
    let work = TempDir::new().unwrap();
    let file = work.path().join("path.apx");
    fs::write(&file, "arg(0).\narg(a).\narg(d).\natt(a,0).\natt(d,a).\n").unwrap();

    let output = agora(&["value", "--file", file.to_str().unwrap()], work.path());
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("0.666667"));

    let output = agora(
        &["value", "--file", file.to_str().unwrap(), "--argument", "a", "--strategy", "recursive"],
        work.path(),
    );
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("0.500000"));
}

#[test]
fn test_value_rejects_malformed_file() {
    let work = TempDir::new().unwrap();
    let file = work.path().join("bad.apx");
    fs::write(&file, "arg(0).\natt(x,0).\n").unwrap();

    let output = agora(&["value", "--file", file.to_str().unwrap()], work.path());
    assert!(!output.status.success());
}

#[test]
fn test_config_file_is_applied() {
    let work = TempDir::new().unwrap();
    let config = work.path().join("agora.toml");
    fs::write(&config, "[debate]\ncomfort = 0.25\n").unwrap();

    let output = agora(&["--config", config.to_str().unwrap(), "info", "--json"], work.path());
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["debate"]["comfort"], 0.25);
}

#[test]
fn test_environment_overrides_use_double_underscores() {
    let work = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_agora"))
        .args(["info", "--json"])
        .current_dir(work.path())
        .env("NO_COLOR", "1")
        .env("AGORA__DEBATE__COMFORT", "0.4")
        .env("AGORA_ISSUE", "ignored")
        .output()
        .expect("agora binary runs");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["debate"]["comfort"], 0.4);
    assert_eq!(settings["debate"]["issue"], "0");
}
