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
    let dir = std::env::temp_dir().join(format!("clarg-integ-{prefix}-{pid}-{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn clarg() -> Command {
    Command::new(env!("CARGO_BIN_EXE_clarg"))
}

fn write_manifest(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("clarg.json");
    fs::write(&path, json).expect("failed to write manifest");
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

const COPY_MANIFEST: &str = r#"{
  "name": "copy",
  "version": "1.0.0",
  "arguments": [
    { "spec": "<from>" },
    { "spec": "<to...>" }
  ],
  "options": [
    { "spec": "-f|--force", "description": "Overwrite" },
    { "spec": "-j --jobs [n]", "default": 1, "filter": "int" }
  ]
}"#;

#[test]
fn help_works() {
    let out = clarg()
        .arg("--help")
        .output()
        .expect("failed to run clarg --help");
    assert_success(&out, "clarg --help");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("clarg") && stdout.contains("init") && stdout.contains("parse"),
        "unexpected help output:\n{stdout}"
    );
}

#[test]
fn init_creates_manifest_and_refuses_to_overwrite() {
    let dir = make_temp_dir("init");

    let out = clarg()
        .arg("init")
        .arg(&dir)
        .arg("--name")
        .arg("demo")
        .output()
        .expect("failed to run clarg init");
    assert_success(&out, "clarg init");

    let contents = fs::read_to_string(dir.join("clarg.json")).expect("clarg.json not created");
    let json: serde_json::Value = serde_json::from_str(&contents).expect("invalid manifest JSON");
    assert_eq!(json["name"], "demo");

    let out = clarg()
        .arg("init")
        .arg(&dir)
        .output()
        .expect("failed to run clarg init");
    assert!(!out.status.success(), "second init should fail");
    assert!(String::from_utf8_lossy(&out.stderr).contains("already exists"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn tokens_reports_groups_and_options() {
    let out = clarg()
        .args(["tokens", "--json", "--", "-ra", "--out=x", "[a", "b]", "-10"])
        .output()
        .expect("failed to run clarg tokens");
    assert_success(&out, "clarg tokens");

    let tokens: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("tokens output is not JSON");
    let kinds: Vec<&str> = tokens
        .as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|t| t["kind"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "short-option",
            "short-option",
            "long-option",
            "constant",
            "variadic-open",
            "constant",
        ]
    );
    assert_eq!(tokens[4]["nested"][1]["raw"], "b");
}

#[test]
fn check_accepts_valid_manifest_and_rejects_duplicates() {
    let dir = make_temp_dir("check");
    let manifest = write_manifest(&dir, COPY_MANIFEST);

    let out = clarg()
        .arg("check")
        .arg("-m")
        .arg(&manifest)
        .output()
        .expect("failed to run clarg check");
    assert_success(&out, "clarg check");

    let manifest = write_manifest(
        &dir,
        r#"{ "name": "x", "options": [{ "spec": "--dry-run" }, { "spec": "-d --dry_run" }] }"#,
    );
    let out = clarg()
        .arg("check")
        .arg("-m")
        .arg(&manifest)
        .output()
        .expect("failed to run clarg check");
    assert!(!out.status.success(), "duplicate options should fail");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("\"dryRun\" is already registered"),
        "unexpected stderr:\n{stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_prints_values_as_json() {
    let dir = make_temp_dir("parse-json");
    let manifest = write_manifest(&dir, COPY_MANIFEST);

    let out = clarg()
        .arg("parse")
        .arg("-m")
        .arg(&manifest)
        .arg("--json")
        .args(["--", "src", "[a", "b]", "-f", "--jobs", "4"])
        .output()
        .expect("failed to run clarg parse");
    assert_success(&out, "clarg parse");

    let values: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("parse output is not JSON");
    assert_eq!(values["from"], "src");
    assert_eq!(values["to"], serde_json::json!(["a", "b"]));
    assert_eq!(values["force"], true);
    assert_eq!(values["jobs"], 4);
    assert!(values.get("verbosity").is_none());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_errors_exit_with_code_two() {
    let dir = make_temp_dir("parse-error");
    let manifest = write_manifest(&dir, COPY_MANIFEST);

    let out = clarg()
        .arg("parse")
        .arg("-m")
        .arg(&manifest)
        .args(["--", "src"])
        .output()
        .expect("failed to run clarg parse");
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("Argument \"to\" is required"),
        "unexpected stderr:\n{stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_help_prints_generated_usage() {
    let dir = make_temp_dir("parse-help");
    let manifest = write_manifest(&dir, COPY_MANIFEST);

    let out = clarg()
        .arg("parse")
        .arg("-m")
        .arg(&manifest)
        .args(["--", "--help"])
        .output()
        .expect("failed to run clarg parse");
    assert_success(&out, "clarg parse -- --help");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("copy 1.0.0"), "unexpected help:\n{stdout}");
    assert!(stdout.contains("Usage: copy [OPTIONS] <from> <to...>"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_allow_unknown_keeps_extra_options() {
    let dir = make_temp_dir("parse-unknown");
    let manifest = write_manifest(&dir, COPY_MANIFEST);

    let out = clarg()
        .arg("parse")
        .arg("-m")
        .arg(&manifest)
        .arg("--json")
        .arg("--allow-unknown")
        .args(["--", "src", "dst", "--dry-run"])
        .output()
        .expect("failed to run clarg parse");
    assert_success(&out, "clarg parse --allow-unknown");
    let values: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("parse output is not JSON");
    assert!(values["dryRun"].is_null());
    assert!(values.get("dryRun").is_some());

    let _ = fs::remove_dir_all(&dir);
}
