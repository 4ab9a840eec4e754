use log::debug;

use crate::error::InsightError;
use crate::graph::{ChartRenderer, PlottersRenderer, Raster};
use crate::stats::{distinct_values, fmt2, missingness, numeric_stats, value_counts};
use crate::table::Table;

pub const REPORT_TITLE: &str = "CSV Insight Report";

/// File name the finished PDF is delivered under.
pub const REPORT_FILE_NAME: &str = "csv_insight_report.pdf";

/// Display size of every chart in the document, in points.
pub const IMAGE_WIDTH: f32 = 400.0;
pub const IMAGE_HEIGHT: f32 = 250.0;

/// An image placed in the document at a fixed display size.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock {
    pub raster: Raster,
    pub width: f32,
    pub height: f32,
}

/// One element of the report, laid out top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    Paragraph(String),
    /// Vertical gap in points.
    Spacer(f32),
    Image(ImageBlock),
}

/// Ordered blocks making up one report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportDocument {
    pub blocks: Vec<Block>,
}

impl ReportDocument {
    fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    fn heading(&mut self, text: &str) {
        self.push(Block::Heading(text.to_string()));
    }

    fn paragraph(&mut self, text: impl Into<String>) {
        self.push(Block::Paragraph(text.into()));
    }

    fn spacer(&mut self, points: f32) {
        self.push(Block::Spacer(points));
    }

    fn image(&mut self, raster: Raster) {
        self.push(Block::Image(ImageBlock {
            raster,
            width: IMAGE_WIDTH,
            height: IMAGE_HEIGHT,
        }));
    }

    /// Section headings in document order.
    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Heading(h) => Some(h.as_str()),
            _ => None,
        })
    }

    /// Body paragraphs in document order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p.as_str()),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageBlock> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Image(img) => Some(img),
            _ => None,
        })
    }

    /// Paginate into PDF bytes.
    pub fn to_pdf(&self) -> Result<Vec<u8>, InsightError> {
        crate::pdf::render(self)
    }
}

/// Build the report for `table` with the default plotters renderer.
pub fn assemble(table: &Table, display_name: &str) -> Result<ReportDocument, InsightError> {
    assemble_with(table, display_name, &PlottersRenderer::default())
}

/// Build the report for `table`, drawing charts with `renderer`.
///
/// Sections with no matching columns are left out entirely. Any chart failure
/// aborts the whole report.
///
/// # Arguments
/// * `table` - The loaded table
/// * `display_name` - File name shown on the `Filename:` line
/// * `renderer` - Draws one histogram per numeric column and one bar chart per
///   textual column
///
/// # Returns
/// * `Result<ReportDocument, InsightError>` - The ordered blocks, or the first
///   chart error
///
/// # Example
/// ```ignore
/// let table = csv_insight::load(b"id,name\n1,a\n2,b\n").unwrap();
/// let doc = assemble_with(&table, "people.csv", &PlottersRenderer::default())?;
/// let pdf = doc.to_pdf()?;
/// ```
pub fn assemble_with(
    table: &Table,
    display_name: &str,
    renderer: &dyn ChartRenderer,
) -> Result<ReportDocument, InsightError> {
    let mut doc = ReportDocument::default();

    doc.push(Block::Title(REPORT_TITLE.to_string()));
    doc.spacer(12.0);
    doc.paragraph(format!("Filename: {display_name}"));
    doc.paragraph(format!(
        "Rows: {}, Columns: {}",
        table.n_rows(),
        table.n_cols()
    ));
    doc.spacer(12.0);

    doc.heading("Column Data Types");
    for col in table.columns() {
        doc.paragraph(format!("{}: {}", col.name(), col.kind()));
    }
    doc.spacer(12.0);

    doc.heading("Missing Values");
    for col in table.columns() {
        let m = missingness(col, table.n_rows());
        doc.paragraph(format!(
            "{}: {} missing ({}%)",
            m.column,
            m.null_count,
            fmt2(m.null_percent)
        ));
    }
    doc.spacer(12.0);

    let stats = numeric_stats(table);
    if !stats.is_empty() {
        doc.heading("Numeric Column Stats");
        for s in &stats {
            doc.paragraph(format!(
                "{} -> Mean: {}, Median: {}, Std: {}, Min: {}, Max: {}",
                s.column,
                fmt2(s.mean),
                fmt2(s.median),
                fmt2(s.std),
                fmt2(s.min),
                fmt2(s.max)
            ));
        }
    }
    doc.spacer(12.0);

    if table.textual_columns().next().is_some() {
        doc.heading("Categorical Column Unique Values");
        for col in table.textual_columns() {
            let uniques = distinct_values(col);
            doc.paragraph(format!("{} -> {} unique values", col.name(), uniques.len()));
            doc.paragraph(list_literal(&uniques));
        }
    }

    doc.spacer(20.0);
    doc.heading("Charts & Visualizations");

    for col in table.numeric_columns() {
        debug!("rendering histogram for '{}'", col.name());
        let raster = renderer.histogram(
            &format!("Histogram: {}", col.name()),
            col.name(),
            &col.numbers(),
        )?;
        doc.image(raster);
        doc.spacer(12.0);
    }

    for col in table.textual_columns() {
        debug!("rendering bar chart for '{}'", col.name());
        let raster = renderer.bar_chart(
            &format!("Bar Chart: {}", col.name()),
            col.name(),
            &value_counts(col),
        )?;
        doc.image(raster);
        doc.spacer(12.0);
    }

    Ok(doc)
}

/// Quoted list form of `values`, e.g. `['a', "it's"]`.
///
/// Each item is single-quoted unless it holds a `'` and no `"`. Backslashes,
/// the chosen quote and control characters are escaped.
fn list_literal(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| quote(v)).collect();
    format!("[{}]", items.join(", "))
}

fn quote(value: &str) -> String {
    let delim = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(value.len() + 2);
    out.push(delim);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}

/// Assemble and paginate in one step.
pub fn generate_pdf_report(table: &Table, display_name: &str) -> Result<Vec<u8>, InsightError> {
    assemble(table, display_name)?.to_pdf()
}
