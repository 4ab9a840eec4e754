use std::io::Write;

use chrono::Utc;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::error::InsightError;
use crate::graph::Raster;
use crate::report::{Block, ImageBlock, REPORT_TITLE, ReportDocument};

// A4 in points
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 72.0;
const FRAME_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

/// Average Helvetica glyph width as a fraction of the font size.
const AVG_CHAR_EM: f32 = 0.55;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

struct TextStyle {
    font: &'static str,
    size: f32,
    leading: f32,
    space_before: f32,
    space_after: f32,
    centered: bool,
}

const TITLE: TextStyle = TextStyle {
    font: BOLD,
    size: 18.0,
    leading: 22.0,
    space_before: 0.0,
    space_after: 6.0,
    centered: true,
};

const HEADING: TextStyle = TextStyle {
    font: BOLD,
    size: 12.0,
    leading: 14.0,
    space_before: 12.0,
    space_after: 6.0,
    centered: false,
};

const NORMAL: TextStyle = TextStyle {
    font: REGULAR,
    size: 10.0,
    leading: 12.0,
    space_before: 0.0,
    space_after: 0.0,
    centered: false,
};

#[derive(Default)]
struct Page {
    operations: Vec<Operation>,
    images: Vec<(String, ObjectId)>,
}

impl Page {
    fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Flows blocks down the page, starting a new one whenever the next block
/// does not fit above the bottom margin.
struct Layout {
    doc: Document,
    pages: Vec<Page>,
    current: Page,
    cursor: f32,
    image_count: usize,
}

impl Layout {
    fn new() -> Self {
        Self {
            doc: Document::with_version("1.5"),
            pages: Vec::new(),
            current: Page::default(),
            cursor: PAGE_HEIGHT - MARGIN,
            image_count: 0,
        }
    }

    fn break_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.pages.push(page);
        self.cursor = PAGE_HEIGHT - MARGIN;
    }

    /// Make room for `height` points, breaking the page unless it is still blank.
    fn reserve(&mut self, height: f32) {
        if self.cursor - height < MARGIN && !self.current.is_empty() {
            self.break_page();
        }
    }

    fn space(&mut self, points: f32) {
        if self.current.is_empty() {
            return;
        }
        if self.cursor - points < MARGIN {
            self.break_page();
        } else {
            self.cursor -= points;
        }
    }

    fn text(&mut self, style: &TextStyle, text: &str) {
        self.space(style.space_before);
        for line in wrap(text, style.size, FRAME_WIDTH) {
            self.reserve(style.leading);
            let x = if style.centered {
                MARGIN + (FRAME_WIDTH - text_width(&line, style.size)).max(0.0) / 2.0
            } else {
                MARGIN
            };
            let baseline = self.cursor - style.size;
            self.current.operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![style.font.into(), style.size.into()]),
                Operation::new("Td", vec![x.into(), baseline.into()]),
                Operation::new("Tj", vec![Object::string_literal(encode_text(&line))]),
                Operation::new("ET", vec![]),
            ]);
            self.cursor -= style.leading;
        }
        self.space(style.space_after);
    }

    fn image(&mut self, block: &ImageBlock) -> Result<(), InsightError> {
        let (name, id) = self.embed(&block.raster)?;
        self.reserve(block.height);

        let x = MARGIN + (FRAME_WIDTH - block.width).max(0.0) / 2.0;
        let y = self.cursor - block.height;
        self.current.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    block.width.into(),
                    0.into(),
                    0.into(),
                    block.height.into(),
                    x.into(),
                    y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.clone().into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        self.current.images.push((name, id));
        self.cursor = y;
        Ok(())
    }

    /// Store the raster as a Flate-compressed RGB image XObject.
    fn embed(&mut self, raster: &Raster) -> Result<(String, ObjectId), InsightError> {
        let expected = raster.width as usize * raster.height as usize * 3;
        if raster.pixels.len() != expected {
            return Err(InsightError::Render(format!(
                "raster has {} bytes, expected {expected}",
                raster.pixels.len()
            )));
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raster.pixels)?;
        let data = encoder.finish()?;

        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => raster.width as i64,
                "Height" => raster.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8i64,
                "Filter" => "FlateDecode",
            },
            data,
        )
        .with_compression(false);

        let id = self.doc.add_object(stream);
        self.image_count += 1;
        Ok((format!("Im{}", self.image_count), id))
    }

    fn finish(mut self) -> Result<Vec<u8>, InsightError> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.break_page();
        }

        let doc = &mut self.doc;
        let pages_id = doc.new_object_id();
        let regular_id = doc.add_object(font("Helvetica"));
        let bold_id = doc.add_object(font("Helvetica-Bold"));

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for page in self.pages {
            let content = Content {
                operations: page.operations,
            };
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

            let mut xobjects = Dictionary::new();
            for (name, id) in page.images {
                xobjects.set(name, id);
            }

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! {
                        REGULAR => regular_id,
                        BOLD => bold_id,
                    },
                    "XObject" => xobjects,
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(REPORT_TITLE),
            "Producer" => Object::string_literal("csv-insight"),
            "CreationDate" => Object::string_literal(
                Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()
            ),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

fn font(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Text for the standard fonts' WinAnsi encoding.
fn encode_text(text: &str) -> Vec<u8> {
    let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(text);
    bytes.into_owned()
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_CHAR_EM
}

/// Greedy word wrap; words wider than a line are split.
fn wrap(text: &str, size: f32, width: f32) -> Vec<String> {
    let max_chars = ((width / (size * AVG_CHAR_EM)) as usize).max(1);
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let line_len = line.chars().count();
        if line_len > 0 && line_len + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.extend(word);
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Paginate a report into a PDF file.
pub fn render(report: &ReportDocument) -> Result<Vec<u8>, InsightError> {
    let mut layout = Layout::new();
    for block in &report.blocks {
        match block {
            Block::Title(text) => layout.text(&TITLE, text),
            Block::Heading(text) => layout.text(&HEADING, text),
            Block::Paragraph(text) => layout.text(&NORMAL, text),
            Block::Spacer(points) => layout.space(*points),
            Block::Image(image) => layout.image(image)?,
        }
    }
    layout.finish()
}
