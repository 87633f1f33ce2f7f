//! Markdown to PDF rendering.
//!
//! Markdown is parsed with `pulldown-cmark` and set with a fixed style on A4
//! pages: Helvetica body text, scaled bold headings, Courier code on a grey
//! panel. Images are rendered as their alt text. Characters the standard
//! fonts cannot show are drawn as `?` and reported with a warning.

use futures::future::try_join_all;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use tokio::task;
use tracing::{debug, instrument, warn};

use crate::descriptor::FileDescriptor;
use crate::error::{PageCatError, Result};
use crate::filetype::FileKind;
use crate::io::read_to_buffer;
use crate::preprocess::layout::{Font, Layout, Span};

/// Body text size in points.
pub const BODY_SIZE: f32 = 11.0;

/// Code text size in points.
pub const CODE_SIZE: f32 = 9.5;

const LIST_INDENT: f32 = 18.0;

fn heading_size(level: HeadingLevel) -> f32 {
    match level {
        HeadingLevel::H1 => 24.0,
        HeadingLevel::H2 => 20.0,
        HeadingLevel::H3 => 16.0,
        HeadingLevel::H4 => 14.0,
        HeadingLevel::H5 => 12.0,
        HeadingLevel::H6 => 11.0,
    }
}

/// Renders Markdown files into in-memory PDF documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    /// Create a renderer.
    pub fn new() -> Self {
        Self
    }

    /// Render every descriptor of the batch.
    ///
    /// Replacements carry the rendered PDF as content and no path.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or rendered.
    #[instrument(skip_all, fields(files = batch.len()))]
    pub async fn apply(&self, batch: Vec<FileDescriptor>) -> Result<Vec<FileDescriptor>> {
        try_join_all(batch.into_iter().map(render_descriptor)).await
    }
}

async fn render_descriptor(descriptor: FileDescriptor) -> Result<FileDescriptor> {
    let bytes = match &descriptor.content {
        Some(content) => content.clone(),
        None => read_to_buffer(descriptor.source_path()).await?,
    };

    let origin = descriptor.origin.clone();
    let rendered = task::spawn_blocking(move || {
        let text = String::from_utf8_lossy(&bytes);
        render_markdown(&text)
            .map_err(|err| PageCatError::markdown_render(origin, err.to_string()))
    })
    .await
    .map_err(|e| PageCatError::other(format!("Render task failed: {e}")))??;

    if !rendered.substituted.is_empty() {
        let characters: String = rendered.substituted.iter().collect();
        warn!(
            path = %descriptor.origin.display(),
            %characters,
            "characters not available in the standard fonts were replaced with '?'"
        );
    }

    debug!(
        path = %descriptor.origin.display(),
        bytes = rendered.pdf.len(),
        "rendered markdown"
    );
    Ok(descriptor.replaced_by_content(rendered.pdf, FileKind::Pdf))
}

/// A rendered Markdown document.
#[derive(Debug, Clone)]
pub struct RenderedMarkdown {
    /// The PDF bytes.
    pub pdf: Vec<u8>,
    /// Characters that were drawn as `?`, in code point order.
    pub substituted: Vec<char>,
}

/// Render Markdown source into a PDF document.
///
/// # Errors
///
/// Returns an error if the resulting document cannot be encoded.
pub fn render_markdown(source: &str) -> Result<RenderedMarkdown> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut writer = MarkdownWriter::default();
    for event in Parser::new_ext(source, options) {
        writer.handle(event);
    }
    writer.finish()
}

/// Walks parser events and feeds the layout.
#[derive(Default)]
struct MarkdownWriter {
    layout: Layout,
    spans: Vec<Span>,
    bold: usize,
    italic: usize,
    link: usize,
    heading: Option<f32>,
    quote_depth: usize,
    /// Open lists with their next item number (`None` for bullets).
    lists: Vec<Option<u64>>,
    marker: Option<String>,
    code: Option<String>,
    table_cell: Option<String>,
    table_row: Vec<String>,
}

impl MarkdownWriter {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push_span(&code, Font::Mono),
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.text("\n"),
            Event::Rule => {
                self.flush();
                self.layout.rule(self.indent());
                self.layout.space(BODY_SIZE * 0.5);
            }
            Event::TaskListMarker(checked) => {
                self.text(if checked { "[x] " } else { "[ ] " });
            }
            Event::FootnoteReference(label) => self.text(&format!("[{label}]")),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.heading = Some(heading_size(level));
            }
            Tag::BlockQuote { .. } => {
                self.flush();
                self.quote_depth += 1;
                self.layout.set_quote_depth(self.quote_depth);
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.code = Some(String::new());
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}.");
                        *n += 1;
                        marker
                    }
                    _ => "•".to_string(),
                };
                self.marker = Some(marker);
            }
            Tag::Emphasis | Tag::Image { .. } => self.italic += 1,
            Tag::Strong => self.bold += 1,
            Tag::Link { .. } => self.link += 1,
            Tag::Table(_) => self.flush(),
            Tag::TableCell => self.table_cell = Some(String::new()),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.layout.space(BODY_SIZE * 0.5);
                }
            }
            TagEnd::Heading { .. } => {
                let size = self.heading.unwrap_or(BODY_SIZE);
                self.flush();
                self.heading = None;
                self.layout.space(size * 0.4);
            }
            TagEnd::BlockQuote { .. } => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.layout.set_quote_depth(self.quote_depth);
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    self.layout.code_block(&code, CODE_SIZE, self.indent());
                    self.layout.space(BODY_SIZE * 0.5);
                }
            }
            TagEnd::List { .. } => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.layout.space(BODY_SIZE * 0.5);
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis | TagEnd::Image => self.italic = self.italic.saturating_sub(1),
            TagEnd::Strong => self.bold = self.bold.saturating_sub(1),
            TagEnd::Link => self.link = self.link.saturating_sub(1),
            TagEnd::TableCell => {
                if let Some(cell) = self.table_cell.take() {
                    self.table_row.push(cell.trim().to_string());
                }
            }
            TagEnd::TableHead => self.table_row_done(true),
            TagEnd::TableRow => self.table_row_done(false),
            TagEnd::Table => self.layout.space(BODY_SIZE * 0.5),
            _ => {}
        }
    }

    fn indent(&self) -> f32 {
        self.lists.len() as f32 * LIST_INDENT
    }

    fn current_font(&self) -> Font {
        Font::styled(self.bold > 0 || self.heading.is_some(), self.italic > 0)
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = self.code.as_mut() {
            code.push_str(text);
        } else if let Some(cell) = self.table_cell.as_mut() {
            cell.push_str(text);
        } else {
            self.push_span(text, self.current_font());
        }
    }

    fn push_span(&mut self, text: &str, font: Font) {
        if let Some(cell) = self.table_cell.as_mut() {
            cell.push_str(text);
            return;
        }

        let link = self.link > 0;
        match self.spans.last_mut() {
            Some(last) if last.font == font && last.link == link => last.text.push_str(text),
            _ => self.spans.push(Span {
                text: text.to_string(),
                font,
                link,
            }),
        }
    }

    fn table_row_done(&mut self, header: bool) {
        let row = std::mem::take(&mut self.table_row).join(" | ");
        let font = if header { Font::Bold } else { Font::Regular };
        self.layout
            .text_block(&[Span::new(row, font)], BODY_SIZE, self.indent(), None);
        if header {
            self.layout.rule(self.indent());
        }
    }

    /// Lay out the pending inline text as one block.
    fn flush(&mut self) {
        if self.spans.is_empty() {
            return;
        }

        let spans = std::mem::take(&mut self.spans);
        let size = self.heading.unwrap_or(BODY_SIZE);
        let marker = self.marker.take();
        self.layout
            .text_block(&spans, size, self.indent(), marker.as_deref());
    }

    fn finish(mut self) -> Result<RenderedMarkdown> {
        self.flush();
        let substituted = self.layout.substituted().iter().copied().collect();
        Ok(RenderedMarkdown {
            pdf: self.layout.finish()?,
            substituted,
        })
    }
}
