use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, RgbImage};
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;

use crate::error::InsightError;
use crate::stats::{density_curve, histogram, value_counts};
use crate::table::{ColumnKind, Table};

/// Raster size of every chart, in pixels.
pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 500;

/// Number of points sampled along the density curve.
const DENSITY_POINTS: usize = 200;

/// An in-memory RGB8 image.
#[derive(Clone, PartialEq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

impl Raster {
    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, InsightError> {
        let img = RgbImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or_else(
            || InsightError::Render("pixel buffer does not match raster size".to_string()),
        )?;
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;
        Ok(png)
    }
}

/// Draws the charts that go into reports and the interactive chart panel.
pub trait ChartRenderer {
    /// Histogram of `values` with a density curve over it.
    ///
    /// # Arguments
    /// * `title` - Caption drawn above the chart
    /// * `column` - Column name used as the x-axis label
    /// * `values` - Non-null values of the column
    ///
    /// # Returns
    /// * `Result<Raster, InsightError>` - The chart, or a `Render` error
    fn histogram(&self, title: &str, column: &str, values: &[f64]) -> Result<Raster, InsightError>;

    /// One bar per `(label, count)` pair, in the order given.
    fn bar_chart(
        &self,
        title: &str,
        x_label: &str,
        counts: &[(String, usize)],
    ) -> Result<Raster, InsightError>;
}

/// Renders charts with plotters into a fresh in-memory bitmap per call.
#[derive(Clone, Debug)]
pub struct PlottersRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for PlottersRenderer {
    fn default() -> Self {
        Self {
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
        }
    }
}

impl PlottersRenderer {
    fn blank_buffer(&self) -> Vec<u8> {
        vec![0u8; (self.width * self.height * 3) as usize]
    }

    fn finish(&self, pixels: Vec<u8>) -> Raster {
        Raster {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

impl ChartRenderer for PlottersRenderer {
    fn histogram(&self, title: &str, column: &str, values: &[f64]) -> Result<Raster, InsightError> {
        let bins = histogram(values);
        let curve = density_curve(values, &bins, DENSITY_POINTS);

        let (x_lo, x_hi) = match (bins.first(), bins.last()) {
            (Some(first), Some(last)) => (first.start, last.end),
            _ => (0.0, 1.0),
        };
        // plotters never returns from a mesh over a non-finite span.
        if !(x_hi - x_lo).is_finite() {
            return Err(InsightError::Render(format!(
                "value range of '{column}' is too wide to plot"
            )));
        }
        let top = bins
            .iter()
            .map(|b| b.count as f64)
            .chain(curve.iter().map(|&(_, y)| y))
            .fold(1.0, f64::max);

        let mut pixels = self.blank_buffer();
        {
            let root =
                BitMapBackend::with_buffer(&mut pixels, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 30).into_font())
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(50)
                .build_cartesian_2d(x_lo..x_hi, 0.0..top * 1.05)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc(column)
                .y_desc("Count")
                .draw()?;

            chart.draw_series(bins.iter().map(|b| {
                Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], BLUE.mix(0.5).filled())
            }))?;

            if !curve.is_empty() {
                chart.draw_series(LineSeries::new(curve, BLUE.stroke_width(2)))?;
            }

            root.present()?;
        }

        Ok(self.finish(pixels))
    }

    fn bar_chart(
        &self,
        title: &str,
        x_label: &str,
        counts: &[(String, usize)],
    ) -> Result<Raster, InsightError> {
        let n = counts.len().max(1) as u32;
        let top = counts.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1) as u32;

        let mut pixels = self.blank_buffer();
        {
            let root =
                BitMapBackend::with_buffer(&mut pixels, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 30).into_font())
                .margin(10)
                .x_label_area_size(60)
                .y_label_area_size(50)
                .build_cartesian_2d((0u32..n).into_segmented(), 0u32..top + top / 10 + 1)?;

            let label_for = |v: &SegmentValue<u32>| match v {
                SegmentValue::CenterOf(i) => counts
                    .get(*i as usize)
                    .map(|(label, _)| label.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            };

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(counts.len().max(1))
                .x_label_formatter(&label_for)
                .x_desc(x_label)
                .y_desc("Count")
                .draw()?;

            chart.draw_series(
                Histogram::vertical(&chart)
                    .style(BLUE.filled())
                    .margin(5)
                    .data(counts.iter().enumerate().map(|(i, (_, c))| (i as u32, *c as u32))),
            )?;

            root.present()?;
        }

        Ok(self.finish(pixels))
    }
}

/// Render the interactive chart for one column as PNG.
///
/// Numeric columns get a distribution histogram, textual ones a bar chart of
/// value counts.
///
/// # Arguments
/// * `renderer` - Chart backend
/// * `table` - The loaded table
/// * `column` - Name of the column to chart
///
/// # Returns
/// * `Result<Vec<u8>, InsightError>` - PNG bytes
///
/// # Errors
/// * `UnknownColumn` when `table` has no column named `column`
/// * `Render` / `Image` when drawing or encoding fails
pub fn chart_png(
    renderer: &dyn ChartRenderer,
    table: &Table,
    column: &str,
) -> Result<Vec<u8>, InsightError> {
    let col = table
        .column(column)
        .ok_or_else(|| InsightError::UnknownColumn(column.to_string()))?;

    let raster = match col.kind() {
        ColumnKind::Numeric => renderer.histogram(
            &format!("Distribution of {column}"),
            column,
            &col.numbers(),
        )?,
        ColumnKind::Textual => renderer.bar_chart(
            &format!("Value Counts of {column}"),
            column,
            &value_counts(col),
        )?,
    };
    raster.to_png()
}
