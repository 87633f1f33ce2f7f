//! Integration tests for the command-line binary.

use assert_cmd::Command;
use predicates::prelude::*;

use crate::common::{Workspace, load_pages};

fn pagecat() -> Command {
    let mut cmd = Command::cargo_bin("pagecat").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("PAGECAT_JOBS")
        .env_remove("PAGECAT_IMAGE_FIT")
        .env_remove("PAGECAT_CONVERTER_TIMEOUT");
    cmd
}

#[test]
fn test_no_inputs_prints_help() {
    pagecat()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No input files were specified!"))
        .stderr(predicate::str::contains("--image-fit"));
}

#[test]
fn test_conflicting_sort_flags() {
    pagecat().args(["-a", "-d", "x.pdf"]).assert().code(2);
}

#[test]
fn test_version_flag() {
    pagecat()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_merge_to_file() {
    let ws = Workspace::new();
    let a = ws.pdf("a.pdf", 1, "a");
    let b = ws.pdf("b.pdf", 2, "b");
    let output = ws.path("merged.pdf");

    pagecat()
        .arg(&a)
        .arg(&b)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(load_pages(&output).1.len(), 3);
}

#[test]
fn test_merge_to_stdout() {
    let ws = Workspace::new();
    let a = ws.pdf("a.pdf", 1, "a");

    let output = pagecat().arg(&a).assert().success().get_output().stdout.clone();

    assert!(output.starts_with(b"%PDF"));
    let doc = lopdf::Document::load_mem(&output).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn test_missing_input_exits_with_error() {
    let ws = Workspace::new();

    pagecat()
        .arg(ws.path("missing.pdf"))
        .arg("-o")
        .arg(ws.path("out.pdf"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("missing.pdf"));

    assert!(!ws.path("out.pdf").exists());
}

#[test]
fn test_unknown_file_is_reported() {
    let ws = Workspace::new();
    let junk = ws.text("junk.bin", "\u{1}\u{2} nothing recognisable");
    let doc = ws.pdf("doc.pdf", 1, "doc");

    pagecat()
        .arg(&junk)
        .arg(&doc)
        .arg("-o")
        .arg(ws.path("out.pdf"))
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown file type. Skipping..."));
}

#[test]
fn test_zero_jobs_is_usage_error() {
    let ws = Workspace::new();
    let doc = ws.pdf("doc.pdf", 1, "doc");

    pagecat()
        .arg(&doc)
        .args(["-j", "0", "-o"])
        .arg(ws.path("out.pdf"))
        .assert()
        .code(2);
}

#[test]
fn test_malformed_pattern_is_a_usage_error() {
    let ws = Workspace::new();
    let a = ws.pdf("a.pdf", 1, "a");
    let output = ws.path("merged.pdf");

    pagecat()
        .arg(&a)
        .arg(ws.path("scan[.png"))
        .arg("-o")
        .arg(&output)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid pattern"));

    assert!(!output.exists());
}
