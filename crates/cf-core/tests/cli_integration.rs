//! Integration tests that run the `cmdfuscator` binary.
//!
//! Every run gets its own config and data directories so a user's
//! config file cannot leak into the results.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const ALL_MODIFIERS: &str = r#"["ReorderArgs", "Shorthands", "UrlTransformer", "FilePathTransformer",
    "Regex", "Sed", "OptionCharSubstitution", "RandomCase", "QuoteInsertion", "CharacterInsertion"]"#;

fn cmdfuscator(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cmdfuscator"));
    cmd.env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1");
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    cmdfuscator(home).args(args).output().expect("failed to run cmdfuscator")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}

fn write_config(home: &Path, toml: &str) {
    let dir = home.join("config").join("cmdfuscator");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), toml).unwrap();
}

#[test]
fn version_and_help() {
    let home = TempDir::new().unwrap();
    let out = run(home.path(), &["--version"]);
    assert!(out.status.success());
    assert!(stdout(&out).starts_with("cmdfuscator "));

    let out = run(home.path(), &["--help"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("--seed"));
}

#[test]
fn usage_error_exits_2() {
    let home = TempDir::new().unwrap();
    let out = run(home.path(), &["--frobnicate"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("unknown option --frobnicate"));
}

#[test]
fn no_arguments_without_terminal_exits_2() {
    let home = TempDir::new().unwrap();
    let out = run(home.path(), &[]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn seeded_batch_is_reproducible() {
    let home = TempDir::new().unwrap();
    let args = [
        "certutil",
        "certutil -urlcache -split -f http://127.0.0.1/payload.txt C:\\Users\\Public\\p.txt",
        "--seed",
        "1337",
        "--count",
        "3",
    ];
    let a = run(home.path(), &args);
    let b = run(home.path(), &args);
    assert!(a.status.success(), "{}", stderr(&a));
    assert_eq!(stdout(&a), stdout(&b));
    assert_eq!(stdout(&a).lines().count(), 3);
    assert!(stderr(&a).contains("[cf:batch] certutil"));
    assert!(stderr(&a).contains("seed 1337"));
}

#[test]
fn template_used_when_no_command() {
    let home = TempDir::new().unwrap();
    let out = run(home.path(), &["powershell", "--seed", "1", "--platform", "linux"]);
    assert!(out.status.success());
    let line = stdout(&out);
    assert!(line.to_lowercase().contains("get-process"), "{line}");
}

#[test]
fn json_output_lines() {
    let home = TempDir::new().unwrap();
    let out = run(home.path(), &["curl", "curl -s http://10.0.0.5/x", "--json", "-n", "2", "--seed", "9"]);
    assert!(out.status.success());
    let text = stdout(&out);
    let lines: Vec<serde_json::Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["executable"], "curl");
    assert_eq!(lines[0]["seed"], 9);
}

#[test]
fn disable_flags_turn_modifiers_off() {
    let home = TempDir::new().unwrap();
    let all: Vec<String> = serde_json::from_str(ALL_MODIFIERS).unwrap();
    let mut args = vec!["certutil".to_string(), "--".to_string()];
    args.extend(["certutil", "-urlcache", "-f", "x"].map(String::from));
    for name in &all {
        args.insert(0, name.clone());
        args.insert(0, "--disable".to_string());
    }
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let out = run(home.path(), &args);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "certutil -urlcache -f x\n");
}

#[test]
fn config_file_disables_and_audits() {
    let home = TempDir::new().unwrap();
    let audit = home.path().join("audit.jsonl");
    write_config(
        home.path(),
        &format!(
            "[modifiers]\ndisabled = {ALL_MODIFIERS}\n\n[audit]\nenabled = true\npath = {:?}\n",
            audit.display().to_string()
        ),
    );
    let out = run(home.path(), &["certutil", "certutil -f x", "--seed", "5"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "certutil -f x\n");

    let log = std::fs::read_to_string(&audit).unwrap();
    let rec: serde_json::Value = serde_json::from_str(log.lines().next().unwrap()).unwrap();
    assert_eq!(rec["type"], "obfuscated");
    assert_eq!(rec["input"], "certutil -f x");
    assert_eq!(rec["seed"], 5);
}

#[test]
fn unknown_executable_exits_1() {
    let home = TempDir::new().unwrap();
    let out = run(home.path(), &["notepad", "notepad x"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("unknown executable"));
}

#[test]
fn list_and_modifiers() {
    let home = TempDir::new().unwrap();
    let out = run(home.path(), &["--list", "windows"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("certutil"));
    assert!(!stdout(&out).contains("curl"));

    let out = run(home.path(), &["--modifiers", "certutil.exe"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out).lines().count(), 10);
    assert!(stdout(&out).contains("Shorthands"));

    let out = run(home.path(), &["--list", "plan9"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn custom_profile_directory() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("profiles");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("tool.json"),
        r#"{"profiles": [{"platform": "linux", "parameters": {
            "command": [{"command": "tool"}, {"argument": "--go"}],
            "arguments": [{"flags": ["--go"], "valueCount": 0}],
            "modifiers": {"RandomCase": {"AppliesTo": ["argument"], "Probability": "1"}}
        }}]}"#,
    )
    .unwrap();
    std::fs::write(dir.join("bad.json"), "{").unwrap();

    let out = run(home.path(), &["--profiles", dir.to_str().unwrap(), "tool"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(stdout(&out), "tool --GO\n");
    assert!(stderr(&out).contains("[cf:load] warning"));
}

#[test]
fn commands_from_stdin() {
    let home = TempDir::new().unwrap();
    let mut child = cmdfuscator(home.path())
        .args(["certutil", "--seed", "3"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"certutil -f a\n\ncertutil -split b\n")
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    assert_eq!(stdout(&out).lines().count(), 2);
}

#[test]
fn invalid_utf8_on_stdin_fails() {
    let home = TempDir::new().unwrap();
    let mut child = cmdfuscator(home.path())
        .args(["certutil", "--seed", "3"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"certutil -f a\n\xff\xfe\n")
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).is_empty());
    assert!(stderr(&out).contains("error: reading stdin"));
}
