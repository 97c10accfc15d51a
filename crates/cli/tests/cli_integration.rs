use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn make_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before UNIX_EPOCH")
        .as_nanos();
    let pid = std::process::id();
    let dir = std::env::temp_dir().join(format!("optscan-integ-{prefix}-{pid}-{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn optscan() -> Command {
    Command::new(env!("CARGO_BIN_EXE_optscan"))
}

const OPTION_FILE: &str = r#"{
  "schemaVersion": 1,
  "program": "demo",
  "options": [
    { "short": "f", "long": "file", "kind": "required", "description": "Input file" },
    { "short": "n", "long": "count", "kind": "optional", "default": "2", "validate": "int",
      "description": "Repetitions" },
    { "short": "d", "long": "debug", "kind": "flag", "description": "Debug output" }
  ],
  "remainder": { "max": 2 }
}"#;

fn write_option_file(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("optscan.json");
    fs::write(&path, contents).expect("failed to write option file");
    path
}

fn assert_success(out: &Output, what: &str) {
    assert!(
        out.status.success(),
        "{what} failed:\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr),
    );
}

#[test]
fn help_works() {
    let out = optscan()
        .arg("--help")
        .output()
        .expect("failed to run optscan --help");
    assert_success(&out, "optscan --help");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("optscan") && stdout.contains("parse") && stdout.contains("usage"),
        "unexpected help output:\n{stdout}"
    );
}

#[test]
fn init_writes_a_usable_option_file() {
    let dir = make_temp_dir("init");

    let out = optscan()
        .arg("init")
        .arg(&dir)
        .output()
        .expect("failed to run optscan init");
    assert_success(&out, "optscan init");
    assert!(dir.join("optscan.json").is_file(), "optscan.json not created");

    let out = optscan()
        .arg("check")
        .arg("--spec")
        .arg(dir.join("optscan.json"))
        .output()
        .expect("failed to run optscan check");
    assert_success(&out, "optscan check");

    // A second init must not clobber the file.
    let out = optscan()
        .arg("init")
        .arg(&dir)
        .output()
        .expect("failed to run optscan init");
    assert!(!out.status.success());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_prints_parameters_and_remainder_as_json() {
    let dir = make_temp_dir("parse-json");
    let spec = write_option_file(&dir, OPTION_FILE);

    let out = optscan()
        .arg("parse")
        .arg("--spec")
        .arg(&spec)
        .arg("--json")
        .args(["--", "--debug", "-f", "in.txt", "--", "a", "b"])
        .output()
        .expect("failed to run optscan parse");
    assert_success(&out, "optscan parse");

    let json: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("parse output is not JSON");
    let params = &json["parameters"];
    assert_eq!(params["f"], "in.txt");
    assert_eq!(params["file"], "in.txt");
    assert_eq!(params["n"], 2);
    assert_eq!(params["count"], 2);
    assert_eq!(params["d"], true);
    assert_eq!(params["debug"], true);
    assert_eq!(json["remainder"], serde_json::json!(["a", "b"]));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_failure_reports_every_problem_in_usage() {
    let dir = make_temp_dir("parse-fail");
    let spec = write_option_file(&dir, OPTION_FILE);

    let out = optscan()
        .arg("parse")
        .arg("--spec")
        .arg(&spec)
        .args(["--", "-n", "many"])
        .output()
        .expect("failed to run optscan parse");
    assert!(!out.status.success(), "parse unexpectedly succeeded");

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Usage: demo"), "stderr:\n{stderr}");
    assert!(
        stderr.contains("Missing required options:\n  -f, --file"),
        "stderr:\n{stderr}"
    );
    assert!(
        stderr.contains("Validation errors:\n  -n, --count: expected an integer"),
        "stderr:\n{stderr}"
    );
    assert!(stderr.contains("missing required options: -f"), "stderr:\n{stderr}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_rejects_malformed_and_unknown_options() {
    let dir = make_temp_dir("parse-bad-token");
    let spec = write_option_file(&dir, OPTION_FILE);

    for (token, message) in [("-foo", "malformed option '-foo'"), ("-z", "unknown option '-z'")] {
        let out = optscan()
            .arg("parse")
            .arg("--spec")
            .arg(&spec)
            .args(["--", "-f", "x", token])
            .output()
            .expect("failed to run optscan parse");
        assert!(!out.status.success());
        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(stderr.contains(message), "stderr:\n{stderr}");
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn check_rejects_required_option_with_default() {
    let dir = make_temp_dir("check-invalid");
    let spec = write_option_file(
        &dir,
        r#"{ "options": [ { "short": "f", "kind": "required", "default": "x" } ] }"#,
    );

    let out = optscan()
        .arg("check")
        .arg("--spec")
        .arg(&spec)
        .output()
        .expect("failed to run optscan check");
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("required options cannot have a default value"),
        "stderr:\n{stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn usage_groups_options() {
    let dir = make_temp_dir("usage");
    let spec = write_option_file(&dir, OPTION_FILE);

    let out = optscan()
        .arg("usage")
        .arg("--spec")
        .arg(&spec)
        .output()
        .expect("failed to run optscan usage");
    assert_success(&out, "optscan usage");

    let stdout = String::from_utf8_lossy(&out.stdout);
    let required = stdout.find("Required:").expect("no Required group");
    let optional = stdout.find("Optional:").expect("no Optional group");
    let flags = stdout.find("Flags:").expect("no Flags group");
    assert!(required < optional && optional < flags, "stdout:\n{stdout}");
    assert!(!stdout.contains("Missing required options"));

    let _ = fs::remove_dir_all(&dir);
}
