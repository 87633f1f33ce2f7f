//! Integration tests for input ordering.

use pagecat::config::SortOrder;
use pagecat::error::PageCatError;
use pagecat::order::{ReorderPrompt, TerminalPrompt};
use pagecat::output::OutputFormatter;
use pagecat::pipeline;
use rstest::rstest;
use std::path::PathBuf;

use crate::common::{Workspace, load_pages, page_text};

/// Prompt answering with a fixed order, or aborting.
struct ScriptedPrompt(Option<Vec<usize>>);

impl ReorderPrompt for ScriptedPrompt {
    fn reorder(&self, _message: &str, _items: &[String]) -> std::io::Result<Option<Vec<usize>>> {
        Ok(self.0.clone())
    }
}

fn numbered_inputs(ws: &Workspace) -> Vec<PathBuf> {
    ["page10.pdf", "page2.pdf", "page1.pdf"]
        .iter()
        .map(|name| ws.pdf(name, 1, name.trim_end_matches(".pdf")))
        .collect()
}

fn merged_labels(ws: &Workspace) -> Vec<String> {
    let (doc, pages) = load_pages(&ws.path("out.pdf"));
    pages
        .iter()
        .map(|&p| page_text(&doc, p).trim_end_matches(" 1").to_string())
        .collect()
}

#[rstest]
#[case(SortOrder::Unsorted, false, ["page10", "page2", "page1"])]
#[case(SortOrder::Ascending, false, ["page1", "page10", "page2"])]
#[case(SortOrder::Descending, false, ["page2", "page10", "page1"])]
#[case(SortOrder::Ascending, true, ["page1", "page2", "page10"])]
#[case(SortOrder::Descending, true, ["page10", "page2", "page1"])]
#[tokio::test]
async fn test_sort_orders(
    #[case] sort: SortOrder,
    #[case] ignore_text: bool,
    #[case] expected: [&str; 3],
) {
    let ws = Workspace::new();
    let mut config = ws.config(numbered_inputs(&ws));
    config.sort = sort;
    config.ignore_text = ignore_text;

    pipeline::run(&config, &OutputFormatter::quiet(), &TerminalPrompt)
        .await
        .unwrap();

    assert_eq!(merged_labels(&ws), expected);
}

#[tokio::test]
async fn test_interactive_reorder_applies_confirmed_order() {
    let ws = Workspace::new();
    let mut config = ws.config(numbered_inputs(&ws));
    config.interactive = true;

    pipeline::run(
        &config,
        &OutputFormatter::quiet(),
        &ScriptedPrompt(Some(vec![2, 0, 1])),
    )
    .await
    .unwrap();

    assert_eq!(merged_labels(&ws), ["page1", "page10", "page2"]);
}

#[tokio::test]
async fn test_interactive_abort_cancels_run() {
    let ws = Workspace::new();
    let mut config = ws.config(numbered_inputs(&ws));
    config.interactive = true;

    let err = pipeline::run(&config, &OutputFormatter::quiet(), &ScriptedPrompt(None))
        .await
        .unwrap_err();

    assert!(matches!(err, PageCatError::Cancelled));
    assert_eq!(err.exit_code(), 130);
    assert!(!ws.path("out.pdf").exists());
}
