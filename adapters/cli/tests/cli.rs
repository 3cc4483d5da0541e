use std::{
    fs,
    io::Write,
    path::Path,
    process::{Command, Output, Stdio},
};

use tempfile::TempDir;

fn huarongdao(workdir: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_huarongdao"))
        .current_dir(workdir)
        .args(args)
        .arg("--data-dir")
        .arg(workdir.join("data"))
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("binary starts");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("stdin accepts input");
    child.wait_with_output().expect("binary finishes")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

const LAYOUT: &str = r#"{
  "id": "1717234200000_k2j4h5g6f",
  "name": "Gate",
  "description": "Two soldiers in the way",
  "pieces": [
    {"id": "C", "type": "caocao", "x": 1, "y": 0, "width": 2, "height": 2},
    {"id": "P1", "type": "soldier", "x": 1, "y": 2, "width": 1, "height": 1},
    {"id": "P2", "type": "soldier", "x": 2, "y": 2, "width": 1, "height": 1}
  ]
}"#;

#[test]
fn levels_lists_the_builtin_catalog() {
    let dir = TempDir::new().expect("temp dir");
    let output = huarongdao(dir.path(), &["levels"], "");

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("横刀立马"));
    assert!(text.contains("(par 5)"));
    assert!(text.contains("no custom levels"));
}

#[test]
fn replay_reaches_the_exit() {
    let dir = TempDir::new().expect("temp dir");
    let output = huarongdao(dir.path(), &["replay", "2"], "");

    assert!(output.status.success());
    assert!(stdout(&output).contains("solved in 17 moves"));
}

#[test]
fn playing_a_level_stores_the_best_record() {
    let dir = TempDir::new().expect("temp dir");
    let output = huarongdao(
        dir.path(),
        &["play", "1"],
        "C down\nS3 left\nS4 right\nC down\nC down\nquit\n",
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("New best record!"));

    let records = huarongdao(dir.path(), &["records"], "");
    assert!(stdout(&records).contains("level1  5 moves"));
}

#[test]
fn validate_fails_on_overlapping_pieces() {
    let dir = TempDir::new().expect("temp dir");
    let layout = dir.path().join("bad.json");
    fs::write(
        &layout,
        r#"{"pieces":[
            {"id":"C","type":"caocao","x":1,"y":0,"width":2,"height":2},
            {"id":"S","type":"soldier","x":2,"y":1,"width":1,"height":1}
        ]}"#,
    )
    .expect("layout written");

    let output = huarongdao(dir.path(), &["validate", "bad.json", "--json"], "");
    assert!(!output.status.success());
    assert!(stdout(&output).contains("\"valid\": false"));
}

#[test]
fn imported_layouts_can_be_exported_and_shared() {
    let dir = TempDir::new().expect("temp dir");
    let imported = huarongdao(dir.path(), &["import", "-"], LAYOUT);
    assert!(imported.status.success());
    let text = stdout(&imported);
    assert!(text.contains("source id 1717234200000_k2j4h5g6f"));

    let id = text
        .lines()
        .find_map(|line| line.strip_prefix("imported 'Gate' as "))
        .expect("import reports the new id")
        .trim()
        .to_owned();
    assert_ne!(id, "1717234200000_k2j4h5g6f");

    let exported = huarongdao(dir.path(), &["export", &id], "");
    assert!(exported.status.success());
    assert!(stdout(&exported).contains("\"name\": \"Gate\""));

    let shared = huarongdao(dir.path(), &["share", &id], "");
    let code = stdout(&shared);
    assert!(code.starts_with("hrd:v1:"));

    let reimported = huarongdao(dir.path(), &["import", "-"], &code);
    assert!(reimported.status.success());

    let deleted = huarongdao(dir.path(), &["delete", &id], "");
    assert!(deleted.status.success());
    let missing = huarongdao(dir.path(), &["export", &id], "");
    assert!(!missing.status.success());
}

#[test]
fn invalid_layouts_are_not_imported() {
    let dir = TempDir::new().expect("temp dir");
    let output = huarongdao(
        dir.path(),
        &["import", "-"],
        r#"{"pieces":[{"id":"S","type":"soldier","x":0,"y":0,"width":1,"height":1}]}"#,
    );

    assert!(!output.status.success());
    let levels = huarongdao(dir.path(), &["levels"], "");
    assert!(stdout(&levels).contains("no custom levels"));
}
