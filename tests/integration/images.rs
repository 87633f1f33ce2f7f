//! Integration tests for placing images on pages.

use image::ImageFormat;
use pagecat::config::FitMode;
use pagecat::merge::{A4_HEIGHT, A4_WIDTH};
use pagecat::order::TerminalPrompt;
use pagecat::output::OutputFormatter;
use pagecat::pipeline;

use crate::common::{Workspace, image_placement, load_pages, media_box};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.01
}

fn assert_a4(media_box: &[f32]) {
    assert_eq!(media_box.len(), 4);
    assert!(approx(media_box[2], A4_WIDTH), "width {}", media_box[2]);
    assert!(approx(media_box[3], A4_HEIGHT), "height {}", media_box[3]);
}

/// Draw the single image at `path` with `fit` and return its placement as
/// `(x, y, width, height)`.
async fn placement(ws: &Workspace, path: std::path::PathBuf, fit: FitMode) -> [f32; 4] {
    let mut config = ws.config(vec![path]);
    config.image_fit = fit;
    pipeline::run(&config, &OutputFormatter::quiet(), &TerminalPrompt)
        .await
        .unwrap();

    let (doc, pages) = load_pages(&ws.path("out.pdf"));
    assert_eq!(pages.len(), 1);
    assert_a4(&media_box(&doc, pages[0]));

    let cm = image_placement(&doc, pages[0]);
    assert_eq!(cm.len(), 6);
    assert_eq!((cm[1], cm[2]), (0.0, 0.0));
    [cm[4], cm[5], cm[0], cm[3]]
}

#[tokio::test]
async fn test_images_and_pdfs_interleave() {
    let ws = Workspace::new();
    let cover = ws.image("cover.png", 60, 80, ImageFormat::Png);
    let body = ws.pdf("body.pdf", 2, "body");
    let photo = ws.image("photo.jpg", 120, 40, ImageFormat::Jpeg);

    let report = pipeline::run(
        &ws.config(vec![cover, body, photo]),
        &OutputFormatter::quiet(),
        &TerminalPrompt,
    )
    .await
    .unwrap();

    assert_eq!(report.statistics.images_embedded, 2);
    assert_eq!(report.statistics.documents_copied, 1);
    assert_eq!(report.statistics.total_pages, 4);

    let (doc, pages) = load_pages(&ws.path("out.pdf"));
    assert_eq!(pages.len(), 4);
    assert_a4(&media_box(&doc, pages[0]));
    assert_eq!(media_box(&doc, pages[1]), vec![0.0, 0.0, 300.0, 400.0]);
    assert_a4(&media_box(&doc, pages[3]));
}

#[tokio::test]
async fn test_stretch_covers_the_page() {
    let ws = Workspace::new();
    let image = ws.image("wide.png", 200, 50, ImageFormat::Png);

    let [x, y, width, height] = placement(&ws, image, FitMode::Stretch).await;

    assert_eq!((x, y), (0.0, 0.0));
    assert!(approx(width, A4_WIDTH), "width {width}");
    assert!(approx(height, A4_HEIGHT), "height {height}");
}

#[tokio::test]
async fn test_fit_height_fills_height_and_centres_horizontally() {
    let ws = Workspace::new();
    let image = ws.image("tall.png", 100, 200, ImageFormat::Png);

    let [x, y, width, height] = placement(&ws, image, FitMode::FitHeight).await;

    assert_eq!(y, 0.0);
    assert!(approx(height, A4_HEIGHT), "height {height}");
    // Aspect ratio is kept: 100x200 scaled to the page height.
    assert!(approx(width, A4_HEIGHT / 2.0), "width {width}");
    assert!(approx(x + width / 2.0, A4_WIDTH / 2.0), "x {x}");
}

#[tokio::test]
async fn test_fit_width_fills_width_and_centres_vertically() {
    let ws = Workspace::new();
    let image = ws.image("wide.png", 200, 50, ImageFormat::Png);

    let [x, y, width, height] = placement(&ws, image, FitMode::FitWidth).await;

    assert_eq!(x, 0.0);
    assert!(approx(width, A4_WIDTH), "width {width}");
    assert!(approx(height, A4_WIDTH / 4.0), "height {height}");
    assert!(approx(y + height / 2.0, A4_HEIGHT / 2.0), "y {y}");
}

#[tokio::test]
async fn test_center_keeps_native_size() {
    let ws = Workspace::new();
    let image = ws.image("small.jpg", 120, 40, ImageFormat::Jpeg);

    let [x, y, width, height] = placement(&ws, image, FitMode::Center).await;

    assert_eq!((width, height), (120.0, 40.0));
    assert!(approx(x, A4_WIDTH / 2.0 - 60.0), "x {x}");
    assert!(approx(y, A4_HEIGHT / 2.0 - 20.0), "y {y}");
}

#[tokio::test]
async fn test_unsupported_image_is_skipped() {
    let ws = Workspace::new();
    let gif = ws.path("anim.gif");
    std::fs::write(&gif, b"GIF89a\x04\x00\x04\x00\x00\x00\x00;").unwrap();
    let doc = ws.pdf("doc.pdf", 1, "doc");

    let report = pipeline::run(
        &ws.config(vec![gif, doc]),
        &OutputFormatter::quiet(),
        &TerminalPrompt,
    )
    .await
    .unwrap();

    assert_eq!(report.statistics.files_merged, 1);
    assert_eq!(report.statistics.files_skipped, 1);
}
