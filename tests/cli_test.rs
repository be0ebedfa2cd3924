//! CLI integration tests for the chapter-xref binary.

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cli_cmd() -> assert_cmd::Command {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("chapter-xref"))
}

const DOC: &str = r##"<h1 id="intro" class="chapter">Intro</h1><h1 id="app" class="chapter appendix">Tables</h1><p><a href="#intro"></a> <a href="#app"></a> <a href="#gone"></a></p>"##;

fn write_doc(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("doc.html");
    fs::write(&path, DOC).unwrap();
    path
}

#[test]
fn test_stdout_output() {
    let dir = TempDir::new().unwrap();
    let input = write_doc(&dir);

    cli_cmd()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"<h1 id="intro" class="chapter"><span>1</span>Intro</h1>"#,
        ))
        .stdout(predicate::str::contains(r##"<a href="#intro">1</a>"##))
        .stdout(predicate::str::contains(r##"<a href="#app">A</a>"##))
        .stdout(predicate::str::contains(r##"<a href="#gone"></a>"##));
}

#[test]
fn test_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_doc(&dir);
    let output = dir.path().join("out.html");

    cli_cmd()
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains(r##"<a href="#intro">1</a>"##));
}

#[test]
fn test_stdin_input() {
    cli_cmd()
        .arg("-")
        .write_stdin(DOC)
        .assert()
        .success()
        .stdout(predicate::str::contains(r##"<a href="#app">A</a>"##));
}

#[test]
fn test_flags_override_config() {
    let dir = TempDir::new().unwrap();
    let input = write_doc(&dir);
    let config = dir.path().join("options.toml");
    fs::write(
        &config,
        "marker-format = \"numbered-with-period\"\nmarker-class = \"chapter-number\"\n",
    )
    .unwrap();

    cli_cmd()
        .arg("--config")
        .arg(&config)
        .arg("--no-appendix")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"<span class="chapter-number">2. </span>Tables"#,
        ))
        .stdout(predicate::str::contains(r##"<a href="#app">2</a>"##));
}

#[test]
fn test_only_numbers() {
    let dir = TempDir::new().unwrap();
    let input = write_doc(&dir);

    cli_cmd()
        .args(["--only", "numbers"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("<span>1</span>Intro"))
        .stdout(predicate::str::contains(r##"<a href="#intro"></a>"##));
}

#[test]
fn test_report_on_stderr() {
    let dir = TempDir::new().unwrap();
    let input = write_doc(&dir);

    cli_cmd()
        .arg("--report")
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains(r#""resolved":2"#))
        .stderr(predicate::str::contains(r#""unresolved":1"#));
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();

    cli_cmd()
        .arg(dir.path().join("absent.html"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: I/O error"));
}

#[test]
fn test_bad_marker_format_rejected() {
    cli_cmd()
        .args(["--marker-format", "roman", "-"])
        .write_stdin(DOC)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown marker format"));
}

#[test]
fn test_bad_config_extension() {
    let dir = TempDir::new().unwrap();
    let input = write_doc(&dir);
    let config = dir.path().join("options.ini");
    fs::write(&config, "").unwrap();

    cli_cmd()
        .arg("--config")
        .arg(&config)
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_marker_class_flag_is_validated() {
    cli_cmd()
        .args(["--marker-class", "a b", "-"])
        .write_stdin(DOC)
        .assert()
        .failure()
        .stderr(predicate::str::contains("single class token"));
}
