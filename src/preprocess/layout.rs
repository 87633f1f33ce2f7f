//! Minimal text layout on A4 pages with the standard PDF fonts.
//!
//! Text is set in the built-in Helvetica and Courier faces, WinAnsi encoded,
//! so no font data is embedded. Line breaking uses approximate glyph widths.
//! Characters outside WinAnsi are drawn as `?` and recorded, so callers can
//! report the loss.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, StringFormat, dictionary};
use std::collections::BTreeSet;
use std::mem;

use crate::error::Result;
use crate::merge::{A4_HEIGHT, A4_WIDTH};

const CM: f32 = 28.3465;

/// Top page margin.
pub const MARGIN_TOP: f32 = 1.5 * CM;
/// Right, bottom and left page margins.
pub const MARGIN: f32 = 1.0 * CM;

const LINE_SPACING: f32 = 1.35;
const CODE_PADDING: f32 = 6.0;
const QUOTE_STEP: f32 = 12.0;

/// Built-in font faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// Helvetica.
    Regular,
    /// Helvetica-Bold.
    Bold,
    /// Helvetica-Oblique.
    Italic,
    /// Helvetica-BoldOblique.
    BoldItalic,
    /// Courier.
    Mono,
}

impl Font {
    const ALL: [Font; 5] = [
        Font::Regular,
        Font::Bold,
        Font::Italic,
        Font::BoldItalic,
        Font::Mono,
    ];

    /// Face for the given emphasis.
    pub fn styled(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => Self::Regular,
            (true, false) => Self::Bold,
            (false, true) => Self::Italic,
            (true, true) => Self::BoldItalic,
        }
    }

    fn resource_name(self) -> &'static [u8] {
        match self {
            Self::Regular => b"F1",
            Self::Bold => b"F2",
            Self::Italic => b"F3",
            Self::BoldItalic => b"F4",
            Self::Mono => b"F5",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
            Self::Italic => "Helvetica-Oblique",
            Self::BoldItalic => "Helvetica-BoldOblique",
            Self::Mono => "Courier",
        }
    }

    /// Advance width of `c` in thousandths of the font size.
    fn char_width(self, c: char) -> f32 {
        match self {
            Self::Mono => 600.0,
            Self::Regular | Self::Italic => helvetica_width(c),
            Self::Bold | Self::BoldItalic => helvetica_width(c) * 1.08,
        }
    }

    /// Width of `text` set at `size` points.
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        text.chars().map(|c| self.char_width(c)).sum::<f32>() * size / 1000.0
    }
}

/// Helvetica advance widths for printable ASCII, from the standard metrics.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

fn helvetica_width(c: char) -> f32 {
    match c {
        ' '..='~' => f32::from(HELVETICA_WIDTHS[c as usize - 0x20]),
        '•' => 350.0,
        '–' => 556.0,
        '—' => 1000.0,
        _ => 556.0,
    }
}

/// Encode `text` as WinAnsi bytes; unsupported characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| win_ansi_byte(c).unwrap_or(b'?'))
        .collect()
}

/// The WinAnsi code of `c`, if it has one.
pub fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        ' '..='~' => c as u8,
        '\t' => b' ',
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// A run of text in one face.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    /// The text. A `'\n'` forces a line break.
    pub text: String,
    /// Face the text is set in.
    pub font: Font,
    /// Draw in link colour.
    pub link: bool,
}

impl Span {
    /// Plain span in `font`.
    pub fn new(text: impl Into<String>, font: Font) -> Self {
        Self {
            text: text.into(),
            font,
            link: false,
        }
    }
}

/// One piece of a line: a word or the spaces before it.
#[derive(Debug, Clone)]
struct Piece {
    text: String,
    font: Font,
    link: bool,
}

/// Accumulates positioned text and graphics into pages.
#[derive(Debug)]
pub struct Layout {
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    cursor: f32,
    quote_depth: usize,
    substituted: BTreeSet<char>,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout {
    /// Start an empty layout on the first page.
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            ops: Vec::new(),
            cursor: A4_HEIGHT - MARGIN_TOP,
            quote_depth: 0,
            substituted: BTreeSet::new(),
        }
    }

    /// Characters drawn so far that WinAnsi cannot encode.
    pub fn substituted(&self) -> &BTreeSet<char> {
        &self.substituted
    }

    /// Set the block quote nesting for the following lines.
    pub fn set_quote_depth(&mut self, depth: usize) {
        self.quote_depth = depth;
    }

    fn left(&self) -> f32 {
        MARGIN + self.quote_depth as f32 * QUOTE_STEP
    }

    fn right(&self) -> f32 {
        A4_WIDTH - MARGIN
    }

    fn at_page_top(&self) -> bool {
        self.cursor >= A4_HEIGHT - MARGIN_TOP
    }

    fn new_page(&mut self) {
        self.pages.push(mem::take(&mut self.ops));
        self.cursor = A4_HEIGHT - MARGIN_TOP;
    }

    /// Make room for `height` points, breaking the page if needed.
    fn reserve(&mut self, height: f32) {
        if self.cursor - height < MARGIN && !self.at_page_top() {
            self.new_page();
        }
    }

    /// Add vertical space. Space at the top of a page is dropped.
    pub fn space(&mut self, height: f32) {
        if self.at_page_top() {
            return;
        }
        self.cursor -= height;
        if self.cursor < MARGIN {
            self.new_page();
        }
    }

    /// Lay out a block of wrapped text.
    ///
    /// `indent` is added to the left margin; `marker` (a bullet or list
    /// number) is drawn left of the indent on the first line.
    pub fn text_block(&mut self, spans: &[Span], size: f32, indent: f32, marker: Option<&str>) {
        let x = self.left() + indent;
        let max_width = (self.right() - x).max(size);
        let mut marker = marker;

        for line in wrap(spans, size, max_width) {
            let height = size * LINE_SPACING;
            self.reserve(height);
            self.draw_quote_bars(height);

            let baseline = self.cursor - size;
            if let Some(text) = marker.take() {
                let width = Font::Regular.text_width(text, size);
                self.show_text(
                    x - width - size * 0.4,
                    baseline,
                    size,
                    &[Piece {
                        text: text.to_string(),
                        font: Font::Regular,
                        link: false,
                    }],
                );
            }
            self.show_text(x, baseline, size, &line);
            self.cursor -= height;
        }
    }

    /// Lay out preformatted lines on a grey panel.
    pub fn code_block(&mut self, code: &str, size: f32, indent: f32) {
        let x = self.left() + indent;
        let width = self.right() - x;
        let max_chars = (((width - 2.0 * CODE_PADDING) / (size * 0.6)) as usize).max(1);
        let height = size * 1.3;

        self.space(CODE_PADDING / 2.0);
        for raw in code.trim_end_matches('\n').split('\n') {
            let chars: Vec<char> = raw.replace('\t', "    ").chars().collect();
            let chunks: Vec<String> = if chars.is_empty() {
                vec![String::new()]
            } else {
                chars.chunks(max_chars).map(|c| c.iter().collect()).collect()
            };

            for chunk in chunks {
                self.reserve(height);
                self.draw_quote_bars(height);
                self.fill_rect(x, self.cursor - height, width, height, 0.94);

                let piece = Piece {
                    text: chunk,
                    font: Font::Mono,
                    link: false,
                };
                let baseline = self.cursor - size;
                self.show_text(x + CODE_PADDING, baseline, size, &[piece]);
                self.cursor -= height;
            }
        }
        self.space(CODE_PADDING / 2.0);
    }

    /// Draw a horizontal rule across the text column.
    pub fn rule(&mut self, indent: f32) {
        self.reserve(12.0);
        let y = self.cursor - 6.0;
        let x = self.left() + indent;
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new("RG", vec![0.7_f32.into(), 0.7_f32.into(), 0.7_f32.into()]),
            Operation::new("w", vec![0.8_f32.into()]),
            Operation::new("m", vec![x.into(), y.into()]),
            Operation::new("l", vec![self.right().into(), y.into()]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
        self.cursor -= 12.0;
    }

    fn draw_quote_bars(&mut self, height: f32) {
        for depth in 0..self.quote_depth {
            let x = MARGIN + depth as f32 * QUOTE_STEP + 3.0;
            self.fill_rect(x, self.cursor - height, 2.0, height, 0.75);
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, gray: f32) {
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new("g", vec![gray.into()]),
            Operation::new("re", vec![x.into(), y.into(), width.into(), height.into()]),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    fn show_text(&mut self, x: f32, y: f32, size: f32, pieces: &[Piece]) {
        if pieces.is_empty() {
            return;
        }

        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new("Td", vec![x.into(), y.into()]));

        let mut current: Option<(Font, bool)> = None;
        for piece in pieces {
            if current != Some((piece.font, piece.link)) {
                self.ops.push(Operation::new(
                    "Tf",
                    vec![
                        Object::Name(piece.font.resource_name().to_vec()),
                        size.into(),
                    ],
                ));
                let color: [f32; 3] = if piece.link {
                    [0.0, 0.2, 0.6]
                } else {
                    [0.0, 0.0, 0.0]
                };
                self.ops.push(Operation::new(
                    "rg",
                    color.iter().map(|c| (*c).into()).collect(),
                ));
                current = Some((piece.font, piece.link));
            }
            self.substituted.extend(
                piece
                    .text
                    .chars()
                    .filter(|c| win_ansi_byte(*c).is_none()),
            );
            self.ops.push(Operation::new(
                "Tj",
                vec![Object::String(
                    encode_win_ansi(&piece.text),
                    StringFormat::Literal,
                )],
            ));
        }

        self.ops.push(Operation::new("ET", vec![]));
    }

    /// Build the PDF document and serialize it.
    ///
    /// # Errors
    ///
    /// Returns an error if a content stream cannot be encoded or the
    /// document cannot be serialized.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.pages.push(mem::take(&mut self.ops));

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = lopdf::Dictionary::new();
        for font in Font::ALL {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource_name(), font_id);
        }
        let resources_id = doc.add_object(dictionary! {
            "Font" => fonts,
        });

        let mut kids = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations }.encode()?;
            let content_id = doc.add_object(lopdf::Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), A4_WIDTH.into(), A4_HEIGHT.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(std::io::Error::other)?;
        Ok(bytes)
    }
}

/// Break spans into lines no wider than `max_width`.
fn wrap(spans: &[Span], size: f32, max_width: f32) -> Vec<Vec<Piece>> {
    let mut lines = Vec::new();
    let mut line: Vec<Piece> = Vec::new();
    let mut width = 0.0;

    let mut flush = |line: &mut Vec<Piece>, width: &mut f32| {
        while line.last().is_some_and(|p| p.text.trim().is_empty()) {
            line.pop();
        }
        lines.push(mem::take(line));
        *width = 0.0;
    };

    for span in spans {
        for (i, segment) in span.text.split('\n').enumerate() {
            if i > 0 {
                flush(&mut line, &mut width);
            }

            for token in split_keep_spaces(segment) {
                let is_space = token.trim().is_empty();
                if is_space && line.is_empty() {
                    continue;
                }

                let token_width = span.font.text_width(token, size);
                if !is_space && width + token_width > max_width && !line.is_empty() {
                    flush(&mut line, &mut width);
                }

                if token_width > max_width {
                    // A single word wider than the column is broken anywhere.
                    for chunk in break_word(token, span.font, size, max_width) {
                        let chunk_width = span.font.text_width(&chunk, size);
                        if !line.is_empty() {
                            flush(&mut line, &mut width);
                        }
                        line.push(Piece {
                            text: chunk,
                            font: span.font,
                            link: span.link,
                        });
                        width += chunk_width;
                    }
                    continue;
                }

                line.push(Piece {
                    text: token.to_string(),
                    font: span.font,
                    link: span.link,
                });
                width += token_width;
            }
        }
    }

    if !line.is_empty() {
        flush(&mut line, &mut width);
    }

    lines.retain(|l| !l.is_empty());
    lines
}

/// Split into alternating runs of spaces and non-spaces.
fn split_keep_spaces(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (i, c) in text.char_indices() {
        let space = c == ' ';
        if in_space.is_some_and(|s| s != space) {
            tokens.push(&text[start..i]);
            start = i;
        }
        in_space = Some(space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }

    tokens
}

fn break_word(word: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for c in word.chars() {
        let candidate = font.text_width(&current, size) + font.char_width(c) * size / 1000.0;
        if candidate > max_width && !current.is_empty() {
            chunks.push(mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
