//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("wp-import")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

#[test]
fn test_cli_convert_file() {
    cmd()
        .args(["convert", "-f", &get_fixture_path("export.xml")])
        .assert()
        .success()
        .stdout(predicate::str::contains("First Walk"))
        .stdout(predicate::str::contains("#walks #birds"))
        .stdout(predicate::str::contains("This is a page").not());
}

#[test]
fn test_cli_convert_json_shape() {
    let output = cmd()
        .args(["convert", "-f", &get_fixture_path("export.xml")])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let channel = &json[0];
    assert_eq!(channel["title"], "Field Notes");

    let posts = channel["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 3);
    assert_eq!(posts[0]["lang"], "en");
    assert_eq!(posts[0]["font"], "norm");
    assert_eq!(posts[0]["created"], "2020-06-01T08:30:00Z");
    assert!(posts[2].get("slug").is_none());
}

#[test]
fn test_cli_convert_stdin() {
    let xml = std::fs::read_to_string(get_fixture_path("export.xml")).unwrap();
    cmd()
        .args(["convert", "-f", "-"])
        .write_stdin(xml)
        .assert()
        .success()
        .stdout(predicate::str::contains("Lemon Bars"));
}

#[test]
fn test_cli_convert_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("posts.json");

    cmd()
        .args(["convert", "-f", &get_fixture_path("export.xml")])
        .args(["-o", output.to_str().unwrap()])
        .assert()
        .success();

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("Half Finished"));
}

#[test]
fn test_cli_convert_malformed() {
    cmd()
        .args(["convert", "-f", &get_fixture_path("malformed.xml")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse"));
}

#[test]
fn test_cli_convert_not_wordpress() {
    cmd()
        .args(["convert", "-f", &get_fixture_path("not_wordpress.xml")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a WordPress export"));
}

#[test]
fn test_cli_missing_file() {
    cmd()
        .args(["convert", "-f", "nonexistent-export.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nonexistent-export.xml"));
}

#[test]
fn test_cli_import_dry_run() {
    cmd()
        .args(["import", "--dry-run", "-b", "field-notes", "-f", &get_fixture_path("export.xml")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 3 posts."));
}

#[test]
fn test_cli_import_dry_run_new_blogs() {
    cmd()
        .args(["import", "-d", "--new-blogs", "-f", &get_fixture_path("export.xml")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 3 posts."))
        .stderr(predicate::str::contains("Import summary"))
        .stderr(predicate::str::contains("new blog"));
}

#[test]
fn test_cli_import_malformed_is_fatal() {
    cmd()
        .args(["import", "--dry-run", "-b", "x", "-f", &get_fixture_path("malformed.xml")])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Created").not());
}

#[test]
fn test_cli_import_requires_destination() {
    cmd()
        .args(["import", "--dry-run", "-f", &get_fixture_path("export.xml")])
        .assert()
        .failure();
}

#[test]
fn test_cli_import_destinations_conflict() {
    cmd()
        .args(["import", "--dry-run", "-b", "x", "--new-blogs", "-f", &get_fixture_path("export.xml")])
        .assert()
        .failure();
}

#[test]
fn test_cli_import_requires_user() {
    let tmp = TempDir::new().unwrap();
    let instances = tmp.path().join("instances.ini");

    cmd()
        .args(["import", "-b", "x", "-f", &get_fixture_path("export.xml")])
        .args(["--instances", instances.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("username is required"));
}

#[test]
fn test_cli_completions() {
    cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wp-import"));
}

#[test]
fn test_cli_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("convert"));
}
