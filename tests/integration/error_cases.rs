//! Integration tests for error handling and edge cases.

use pagecat::error::PageCatError;
use pagecat::order::TerminalPrompt;
use pagecat::output::OutputFormatter;
use pagecat::pipeline;

use crate::common::Workspace;

#[tokio::test]
async fn test_error_nonexistent_input() {
    let ws = Workspace::new();
    let config = ws.config(vec![ws.path("missing.pdf")]);

    let err = pipeline::run(&config, &OutputFormatter::quiet(), &TerminalPrompt)
        .await
        .unwrap_err();

    assert!(matches!(err, PageCatError::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_error_directory_input() {
    let ws = Workspace::new();
    let config = ws.config(vec![ws.dir.path().to_path_buf()]);

    let err = pipeline::run(&config, &OutputFormatter::quiet(), &TerminalPrompt)
        .await
        .unwrap_err();

    assert!(matches!(err, PageCatError::NotAFile { .. }));
}

#[tokio::test]
async fn test_error_corrupt_pdf() {
    let ws = Workspace::new();
    let good = ws.pdf("good.pdf", 1, "good");
    let bad = ws.text("bad.pdf", "%PDF-1.4\nthis is not really a pdf\n");
    let output = ws.path("out.pdf");

    let err = pipeline::run(
        &ws.config(vec![good, bad]),
        &OutputFormatter::quiet(),
        &TerminalPrompt,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PageCatError::FailedToLoadPdf { .. }));
    assert!(err.to_string().contains("bad.pdf"));
    assert!(!output.exists(), "no partial output on failure");
}

#[tokio::test]
async fn test_error_corrupt_image() {
    let ws = Workspace::new();
    let bad = ws.path("broken.png");
    std::fs::write(&bad, b"\x89PNG\r\n\x1a\n\x00\x00").unwrap();

    let err = pipeline::run(
        &ws.config(vec![bad]),
        &OutputFormatter::quiet(),
        &TerminalPrompt,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PageCatError::ImageDecode { .. }));
}

#[tokio::test]
async fn test_error_nothing_to_merge() {
    let ws = Workspace::new();
    let junk = ws.text("data.bin", "\u{1}\u{2}\u{3} opaque");

    let err = pipeline::run(
        &ws.config(vec![junk]),
        &OutputFormatter::quiet(),
        &TerminalPrompt,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PageCatError::NoFilesToMerge));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_failed_run_keeps_existing_output() {
    let ws = Workspace::new();
    let output = ws.path("out.pdf");
    std::fs::write(&output, b"previous contents").unwrap();

    let result = pipeline::run(
        &ws.config(vec![ws.path("missing.pdf")]),
        &OutputFormatter::quiet(),
        &TerminalPrompt,
    )
    .await;

    assert!(result.is_err());
    assert_eq!(std::fs::read(&output).unwrap(), b"previous contents");
}

#[cfg(not(windows))]
#[tokio::test]
async fn test_word_document_is_skipped_off_windows() {
    let ws = Workspace::new();
    let mut docx = b"PK\x03\x04".to_vec();
    docx.extend_from_slice(&[0; 26]);
    docx.extend_from_slice(b"word/document.xml");
    let report_path = ws.path("report.docx");
    std::fs::write(&report_path, docx).unwrap();
    let pdf = ws.pdf("doc.pdf", 1, "doc");

    let report = pipeline::run(
        &ws.config(vec![report_path, pdf]),
        &OutputFormatter::quiet(),
        &TerminalPrompt,
    )
    .await
    .unwrap();

    assert_eq!(report.statistics.files_merged, 1);
    assert_eq!(report.statistics.files_skipped, 1);
}
