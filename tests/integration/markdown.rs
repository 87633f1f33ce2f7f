//! Integration tests for Markdown inputs.

use pagecat::order::TerminalPrompt;
use pagecat::output::OutputFormatter;
use pagecat::pipeline;

use crate::common::{Workspace, load_pages, page_text};

#[tokio::test]
async fn test_markdown_between_documents() {
    let ws = Workspace::new();
    let intro = ws.pdf("intro.pdf", 1, "intro");
    let notes = ws.text(
        "notes.md",
        "# Release Notes\n\n- faster merging\n- *Markdown* support\n",
    );
    let outro = ws.pdf("outro.pdf", 1, "outro");

    let report = pipeline::run(
        &ws.config(vec![intro, notes.clone(), outro]),
        &OutputFormatter::quiet(),
        &TerminalPrompt,
    )
    .await
    .unwrap();

    assert_eq!(report.statistics.files_merged, 3);

    let (doc, pages) = load_pages(&ws.path("out.pdf"));
    assert_eq!(pages.len(), 3);
    assert_eq!(page_text(&doc, pages[0]), "intro 1");
    assert!(page_text(&doc, pages[1]).contains("Release Notes"));
    assert_eq!(page_text(&doc, pages[2]), "outro 1");

    // Rendered in memory; the source stays and nothing else is left behind.
    assert!(notes.exists());
    let mut names: Vec<String> = std::fs::read_dir(ws.dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, ["intro.pdf", "notes.md", "out.pdf", "outro.pdf"]);
}

#[tokio::test]
async fn test_long_markdown_spans_pages() {
    let ws = Workspace::new();
    let body: String = (1..=40)
        .map(|n| format!("## Section {n}\n\nSome prose for section {n}, long enough to wrap a little on an A4 page.\n\n"))
        .collect();
    let notes = ws.text("long.markdown", &body);

    let report = pipeline::run(
        &ws.config(vec![notes]),
        &OutputFormatter::quiet(),
        &TerminalPrompt,
    )
    .await
    .unwrap();

    assert!(report.statistics.total_pages > 1);
}

#[tokio::test]
async fn test_uppercase_extension_is_markdown() {
    let ws = Workspace::new();
    let notes = ws.text("README.MD", "Plain paragraph.");

    let report = pipeline::run(
        &ws.config(vec![notes]),
        &OutputFormatter::quiet(),
        &TerminalPrompt,
    )
    .await
    .unwrap();

    assert_eq!(report.statistics.total_pages, 1);
}
