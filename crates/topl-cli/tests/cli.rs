//! End-to-end tests driving the `topl` binary

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn topl(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_topl"))
        .args(args)
        .env_remove("TOPL_LOG")
        .output()
        .expect("failed to run topl")
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_resolve_prints_resolved_values() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "app.toml",
        "name = \"world\"\ngreeting = \"Hello {{name}}!\"\n",
    );

    let output = topl(&["resolve", arg(&file)]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("greeting = \"Hello world!\""));
}

#[test]
fn test_resolve_with_params() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "app.toml", "message = \"Hello {{name}}!\"\n");

    let output = topl(&["resolve", arg(&file), "-p", "name=Alice"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Hello Alice!"));
}

#[test]
fn test_resolve_json_output() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "app.toml",
        "base = \"/opt\"\n\n[paths]\nbin = \"{{base}}/bin\"\n",
    );

    let output = topl(&["resolve", arg(&file), "--format", "json"]);
    assert_eq!(output.status.code(), Some(0));

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["paths"]["bin"], "/opt/bin");
}

#[test]
fn test_resolve_unresolved_exits_one() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "app.toml", "message = \"Hello {{missing}}!\"\n");

    let output = topl(&["resolve", arg(&file)]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Hello {{missing}}!"));
    assert!(stderr(&output).contains("{{missing}}"));
}

#[test]
fn test_get_unresolved_value_exits_one() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "app.toml",
        "a = \"{{missing}}\"\nb = \"plain\"\n",
    );

    let output = topl(&["get", arg(&file), "a"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "{{missing}}\n");
    assert!(stderr(&output).contains("{{missing}}"));

    // Placeholders elsewhere in the file do not affect a clean value
    let output = topl(&["get", arg(&file), "b"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "plain\n");
}

#[test]
fn test_get_unresolved_inside_table_exits_one() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "app.toml", "[db]\nhost = \"{{host}}\"\nport = 5432\n");

    let output = topl(&["get", arg(&file), "db", "-f", "json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("{{host}}"));

    let output = topl(&["get", arg(&file), "db", "-p", "host=h"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_get_honours_max_passes() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "chain.toml",
        "a = \"{{b}}\"\nb = \"{{c}}\"\nc = \"{{d}}\"\nd = \"done\"\n",
    );

    let output = topl(&["get", arg(&file), "a", "--max-passes", "2"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Circular reference detected"));

    let output = topl(&["get", arg(&file), "a", "--max-passes", "4"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "done\n");
}

#[test]
fn test_missing_file_is_file_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let output = topl(&["resolve", arg(&missing)]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("File error"));
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "bad.toml", "name = \n");

    let output = topl(&["resolve", arg(&file)]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Parse error"));
}

#[test]
fn test_circular_reference_exits_two() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "loop.toml", "a = \"{{b}}\"\nb = \"{{a}}\"\n");

    let output = topl(&["resolve", arg(&file)]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Circular reference detected"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_max_passes_flag() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "chain.toml",
        "a = \"{{b}}\"\nb = \"{{c}}\"\nc = \"{{d}}\"\nd = \"done\"\n",
    );

    let output = topl(&["resolve", arg(&file), "--max-passes", "2"]);
    assert_eq!(output.status.code(), Some(2));

    let output = topl(&["resolve", arg(&file), "--max-passes", "4"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_resolve_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "app.toml", "name = \"x\"\ncopy = \"{{name}}\"\n");
    let out = dir.path().join("out.yaml");

    let output = topl(&["resolve", arg(&file), "-f", "yaml", "-o", arg(&out)]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).is_empty());
    assert!(fs::read_to_string(&out).unwrap().contains("copy: x"));
}

#[test]
fn test_get_value() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "app.toml",
        "host = \"db.local\"\n\n[database]\nurl = \"postgres://{{host}}:{{port}}\"\n",
    );

    let output = topl(&["get", arg(&file), "database.url", "-p", "port=5432"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "postgres://db.local:5432\n");
}

#[test]
fn test_get_missing_path_exits_one() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "app.toml", "name = \"x\"\n");

    let output = topl(&["get", arg(&file), "nothing.here"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("nothing.here"));
}

#[test]
fn test_check_reports_each_file() {
    let dir = TempDir::new().unwrap();
    let good = write(&dir, "good.toml", "a = 1\n");
    let also_good = write(&dir, "good.json", "{\"a\": 1}");
    let bad = write(&dir, "bad.toml", "a = [\n");

    let output = topl(&["check", arg(&good), arg(&also_good)]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("valid TOML"));
    assert!(stdout(&output).contains("valid JSON"));

    let output = topl(&["check", arg(&good), arg(&bad)]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("bad.toml"));
}

#[test]
fn test_bad_param_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "app.toml", "a = 1\n");

    let output = topl(&["resolve", arg(&file), "-p", "novalue"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("KEY=VALUE"));
}
