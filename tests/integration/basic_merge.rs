//! Integration tests for merging PDF documents.

use pagecat::config::Config;
use pagecat::order::TerminalPrompt;
use pagecat::output::OutputFormatter;
use pagecat::pipeline;

use crate::common::{Workspace, load_pages, media_box, page_text};

async fn run(config: &Config) -> pagecat::Result<pipeline::RunReport> {
    pipeline::run(config, &OutputFormatter::quiet(), &TerminalPrompt).await
}

#[tokio::test]
async fn test_merge_two_pdfs() {
    let ws = Workspace::new();
    let first = ws.pdf("first.pdf", 1, "first");
    let second = ws.pdf("second.pdf", 1, "second");

    let report = run(&ws.config(vec![first, second])).await.unwrap();

    assert_eq!(report.statistics.files_merged, 2);
    assert_eq!(report.statistics.documents_copied, 2);
    assert_eq!(report.statistics.total_pages, 2);

    let (doc, pages) = load_pages(&ws.path("out.pdf"));
    assert_eq!(pages.len(), 2);
    assert_eq!(page_text(&doc, pages[0]), "first 1");
    assert_eq!(page_text(&doc, pages[1]), "second 1");
}

#[tokio::test]
async fn test_multi_page_documents_keep_page_order() {
    let ws = Workspace::new();
    let a = ws.pdf("a.pdf", 3, "a");
    let b = ws.pdf("b.pdf", 2, "b");

    run(&ws.config(vec![a, b])).await.unwrap();

    let (doc, pages) = load_pages(&ws.path("out.pdf"));
    let texts: Vec<String> = pages.iter().map(|&p| page_text(&doc, p)).collect();
    assert_eq!(texts, vec!["a 1", "a 2", "a 3", "b 1", "b 2"]);
}

#[tokio::test]
async fn test_same_file_twice() {
    let ws = Workspace::new();
    let doc = ws.pdf("doc.pdf", 2, "doc");

    let report = run(&ws.config(vec![doc.clone(), doc])).await.unwrap();

    assert_eq!(report.statistics.files_merged, 2);
    assert_eq!(load_pages(&ws.path("out.pdf")).1.len(), 4);
}

#[tokio::test]
async fn test_inherited_media_box_survives() {
    let ws = Workspace::new();
    let plain = ws.pdf("plain.pdf", 1, "plain");
    let inherited = ws.pdf_with_inherited_media_box("inherited.pdf", 2);

    run(&ws.config(vec![plain, inherited])).await.unwrap();

    let (doc, pages) = load_pages(&ws.path("out.pdf"));
    assert_eq!(pages.len(), 3);
    assert_eq!(media_box(&doc, pages[0]), vec![0.0, 0.0, 300.0, 400.0]);
    assert_eq!(media_box(&doc, pages[1]), vec![0.0, 0.0, 500.0, 700.0]);
    assert_eq!(media_box(&doc, pages[2]), vec![0.0, 0.0, 500.0, 700.0]);
}

#[tokio::test]
async fn test_output_directories_are_created() {
    let ws = Workspace::new();
    let doc = ws.pdf("doc.pdf", 1, "doc");
    let output = ws.path("nested/deeper/out.pdf");

    let config = Config {
        output: Some(output.clone()),
        ..ws.config(vec![doc])
    };
    run(&config).await.unwrap();

    assert_eq!(load_pages(&output).1.len(), 1);
}

#[tokio::test]
async fn test_glob_pattern_is_expanded() {
    let ws = Workspace::new();
    ws.pdf("part1.pdf", 1, "one");
    ws.pdf("part2.pdf", 1, "two");
    let pattern = ws.path("part*.pdf");

    let report = run(&ws.config(vec![pattern])).await.unwrap();

    assert_eq!(report.statistics.files_merged, 2);
    let (doc, pages) = load_pages(&ws.path("out.pdf"));
    assert_eq!(page_text(&doc, pages[0]), "one 1");
    assert_eq!(page_text(&doc, pages[1]), "two 1");
}
