//! Shared helpers for the integration tests.
//!
//! Fixtures are generated on the fly inside temporary directories.

#![allow(dead_code)]

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use pagecat::config::Config;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch directory holding generated inputs and the output.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a PDF with `pages` pages, each showing `label` and its number.
    pub fn pdf(&self, name: &str, pages: usize, label: &str) -> PathBuf {
        let path = self.path(name);
        build_pdf(pages, label, [0, 0, 300, 400])
            .save(&path)
            .expect("save fixture pdf");
        path
    }

    /// Write a PDF whose pages inherit their MediaBox from the page tree.
    pub fn pdf_with_inherited_media_box(&self, name: &str, pages: usize) -> PathBuf {
        let path = self.path(name);
        let mut doc = build_pdf(pages, name, [0, 0, 300, 400]);

        let page_ids: Vec<_> = doc.get_pages().values().copied().collect();
        for id in page_ids {
            if let Ok(page) = doc.get_object_mut(id).and_then(Object::as_dict_mut) {
                page.remove(b"MediaBox");
            }
        }
        let pages_id = doc
            .catalog()
            .and_then(|c| c.get(b"Pages"))
            .and_then(Object::as_reference)
            .expect("pages reference");
        if let Ok(pages) = doc.get_object_mut(pages_id).and_then(Object::as_dict_mut) {
            pages.set(
                "MediaBox",
                vec![0.into(), 0.into(), 500.into(), 700.into()],
            );
        }

        doc.save(&path).expect("save fixture pdf");
        path
    }

    /// Write an RGB image of `width` x `height` in `format`.
    pub fn image(&self, name: &str, width: u32, height: u32, format: ImageFormat) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, encode_image(width, height, format)).expect("write image");
        path
    }

    pub fn text(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).expect("write text");
        path
    }

    /// Configuration writing to `out.pdf` in this workspace.
    pub fn config(&self, inputs: Vec<PathBuf>) -> Config {
        Config {
            inputs,
            output: Some(self.path("out.pdf")),
            quiet: true,
            jobs: Some(2),
            ..Default::default()
        }
    }
}

pub fn encode_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img: RgbImage = ImageBuffer::from_pixel(width, height, Rgb([40, 90, 160]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("encode image");
    bytes
}

/// Build a document with one text line per page.
pub fn build_pdf(pages: usize, label: &str, media_box: [i64; 4]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = (1..=pages)
        .map(|n| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![20.into(), 300.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::string_literal(format!("{label} {n}"))],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().expect("encode")));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.iter().map(|&v| v.into()).collect::<Vec<Object>>(),
                "Contents" => content_id,
                "Resources" => resources_id,
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Pages of the document at `path`, in order.
pub fn load_pages(path: &Path) -> (Document, Vec<lopdf::ObjectId>) {
    let doc = Document::load(path).expect("load output");
    let pages = doc.get_pages().values().copied().collect();
    (doc, pages)
}

/// Text shown on a page, decoded as Latin-1.
pub fn page_text(doc: &Document, page: lopdf::ObjectId) -> String {
    let content = Content::decode(&doc.get_page_content(page).expect("page content"))
        .expect("decode content");
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| op.operands.first())
        .filter_map(|obj| obj.as_str().ok())
        .map(|s| s.iter().map(|&b| b as char).collect::<String>())
        .collect()
}

/// MediaBox of a page as floats, following inheritance.
pub fn media_box(doc: &Document, page: lopdf::ObjectId) -> Vec<f32> {
    let mut current = doc.get_dictionary(page).expect("page dict");
    loop {
        if let Ok(values) = current.get(b"MediaBox").and_then(Object::as_array) {
            return values
                .iter()
                .map(|v| v.as_float().expect("number"))
                .collect();
        }
        let parent = current
            .get(b"Parent")
            .and_then(Object::as_reference)
            .expect("parent");
        current = doc.get_dictionary(parent).expect("parent dict");
    }
}

/// Operands of the first `cm` on a page: `[width, 0, 0, height, x, y]` for
/// an image page.
pub fn image_placement(doc: &Document, page: lopdf::ObjectId) -> Vec<f32> {
    let content = Content::decode(&doc.get_page_content(page).expect("page content"))
        .expect("decode content");
    let cm = content
        .operations
        .iter()
        .find(|op| op.operator == "cm")
        .expect("cm operator");
    cm.operands
        .iter()
        .map(|v| v.as_float().expect("number"))
        .collect()
}
