//! Integration tests for the Bindery CLI
//!
//! These tests run the actual CLI binary against component folders in a
//! temporary directory and verify its output.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get the binary to test
fn bindery_cmd() -> Command {
    let mut cmd = Command::cargo_bin("bindery").unwrap();
    cmd.env_remove("BINDERY_PREFIX")
        .env_remove("BINDERY_COMPONENTS")
        .env_remove("RUST_LOG");
    cmd
}

fn write_component(root: &Path, id: &str, html: &str, json: Option<&str>) {
    let dir = root.join(id);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("index.html"), html).unwrap();
    if let Some(json) = json {
        fs::write(dir.join("index.json"), json).unwrap();
    }
}

fn counter_root() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write_component(
        temp_dir.path(),
        "counter",
        r#"<!-- namespace: counter --><span data-tpl-value="{{input.value}}"></span><p>{{label}}</p>"#,
        Some(r#"{"data": {"counter": {"input": {"value": 5}, "label": "Clicks"}}}"#),
    );
    temp_dir
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn test_help_flag() {
    bindery_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("reactive data binding"));
}

#[test]
fn test_render_help() {
    bindery_cmd()
        .args(["render", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--set"))
        .stdout(predicate::str::contains("--dump-store"));
}

// ============================================================================
// render
// ============================================================================

#[test]
fn test_render_component_binds_data() {
    let root = counter_root();

    bindery_cmd()
        .args(["render", "counter", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"value="5""#))
        .stdout(predicate::str::contains(r#"data-tpl-value="counter.input.value""#))
        .stdout(predicate::str::contains(">Clicks</p>"))
        .stdout(predicate::str::contains("counter&#x2f;index.css"));
}

#[test]
fn test_render_set_updates_bound_markup() {
    let root = counter_root();

    bindery_cmd()
        .args(["render", "counter", "--set", "counter.label=Taps", "--set"])
        .arg("counter.input.value=9")
        .arg("--root")
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(">Taps</p>"))
        .stdout(predicate::str::contains(r#"value="9""#));
}

#[test]
fn test_render_dump_store() {
    let root = counter_root();

    bindery_cmd()
        .args(["render", "counter", "--dump-store", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""label": "Clicks""#));
}

#[test]
fn test_render_seed_yaml() {
    let root = TempDir::new().unwrap();
    write_component(root.path(), "hello", "<h1>{{greeting.text}}</h1>", None);
    let seed = root.path().join("seed.yaml");
    fs::write(&seed, "greeting:\n  text: Bonjour\n").unwrap();

    bindery_cmd()
        .args(["render", "hello", "--seed"])
        .arg(&seed)
        .arg("--root")
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(">Bonjour</h1>"));
}

#[test]
fn test_render_missing_component_fails() {
    let root = TempDir::new().unwrap();

    bindery_cmd()
        .args(["render", "ghost", "--root"])
        .arg(root.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("BIND-031"));
}

#[test]
fn test_render_rejects_malformed_set() {
    bindery_cmd()
        .args(["render", "counter", "--set", "novalue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn test_render_set_conflict_reports_code() {
    let root = counter_root();

    bindery_cmd()
        .args(["render", "counter", "--set", "counter.label.x=1", "--root"])
        .arg(root.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("BIND-010"));
}

// ============================================================================
// page
// ============================================================================

#[test]
fn test_page_renders_placeholders() {
    let root = counter_root();
    let page = root.path().join("page.html");
    fs::write(
        &page,
        r#"<main><tpl id="counter"></tpl><tpl id="missing"></tpl></main>"#,
    )
    .unwrap();

    bindery_cmd()
        .arg("page")
        .arg(&page)
        .arg("--root")
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(">Clicks</p>"))
        .stdout(predicate::str::contains(r#"<tpl id="missing"></tpl>"#))
        .stderr(predicate::str::contains("missing"));
}

// ============================================================================
// bindings / components
// ============================================================================

#[test]
fn test_bindings_json() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("form.html");
    fs::write(
        &template,
        r#"<input value="{{form.email}}" class="{{form.style}}"><input type="checkbox" checked="{{form.agree}}">"#,
    )
    .unwrap();

    bindery_cmd()
        .args(["bindings", "--json"])
        .arg(&template)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""family": "class""#))
        .stdout(predicate::str::contains(r#""key": "form.agree""#));
}

#[test]
fn test_bindings_none_found() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("static.html");
    fs::write(&template, "<p>static</p>").unwrap();

    bindery_cmd()
        .arg("bindings")
        .arg(&template)
        .assert()
        .success()
        .stdout(predicate::str::contains("No bindings found"));
}

#[test]
fn test_components_lists_folders_with_views() {
    let root = counter_root();
    fs::create_dir_all(root.path().join("empty")).unwrap();
    write_component(root.path(), "nav", "<nav></nav>", None);

    bindery_cmd()
        .args(["components", "--root"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("counter"))
        .stdout(predicate::str::contains("nav"))
        .stdout(predicate::str::contains("empty").not());
}

#[test]
fn test_config_file_changes_prefix() {
    let root = TempDir::new().unwrap();
    write_component(root.path(), "hello", "<h1>{{title}}</h1>", None);
    let config = root.path().join("bindery.toml");
    fs::write(&config, "prefix = \"data-x-\"\n").unwrap();

    bindery_cmd()
        .args(["render", "hello", "--config"])
        .arg(&config)
        .arg("--root")
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"data-x-text="title""#));
}
