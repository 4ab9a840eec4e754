#![allow(dead_code)]

use std::sync::Mutex;

use csv_insight::error::InsightError;
use csv_insight::graph::{ChartRenderer, Raster};
use csv_insight::table::{Column, Table};

/// One chart request seen by [`StubRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum ChartCall {
    Histogram { title: String, column: String, values: Vec<f64> },
    Bar { title: String, x_label: String, counts: Vec<(String, usize)> },
}

/// Renderer that records each call and returns a tiny solid-colour raster,
/// so tests do not depend on system fonts.
#[derive(Default)]
pub struct StubRenderer {
    pub calls: Mutex<Vec<ChartCall>>,
}

impl StubRenderer {
    pub fn calls(&self) -> Vec<ChartCall> {
        self.calls.lock().unwrap().clone()
    }

    fn raster(seed: usize) -> Raster {
        let shade = (seed % 256) as u8;
        Raster {
            width: 4,
            height: 2,
            pixels: vec![shade; 4 * 2 * 3],
        }
    }
}

impl ChartRenderer for StubRenderer {
    fn histogram(&self, title: &str, column: &str, values: &[f64]) -> Result<Raster, InsightError> {
        self.calls.lock().unwrap().push(ChartCall::Histogram {
            title: title.to_string(),
            column: column.to_string(),
            values: values.to_vec(),
        });
        Ok(Self::raster(title.len()))
    }

    fn bar_chart(
        &self,
        title: &str,
        x_label: &str,
        counts: &[(String, usize)],
    ) -> Result<Raster, InsightError> {
        self.calls.lock().unwrap().push(ChartCall::Bar {
            title: title.to_string(),
            x_label: x_label.to_string(),
            counts: counts.to_vec(),
        });
        Ok(Self::raster(title.len()))
    }
}

/// Renderer whose every chart fails.
pub struct FailingRenderer;

impl ChartRenderer for FailingRenderer {
    fn histogram(&self, _: &str, _: &str, _: &[f64]) -> Result<Raster, InsightError> {
        Err(InsightError::Render("backend unavailable".to_string()))
    }

    fn bar_chart(&self, _: &str, _: &str, _: &[(String, usize)]) -> Result<Raster, InsightError> {
        Err(InsightError::Render("backend unavailable".to_string()))
    }
}

/// `{id: [1, 2, null], name: ["a", "b", "c"]}`
pub fn id_name_table() -> Table {
    Table::from_columns(vec![
        Column::numeric("id", vec![Some(1.0), Some(2.0), None]),
        Column::textual("name", vec![Some("a"), Some("b"), Some("c")]),
    ])
    .unwrap()
}

pub fn numeric_only_table() -> Table {
    Table::from_columns(vec![
        Column::numeric("x", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
        Column::numeric("y", vec![Some(10.0), None, Some(30.0), Some(40.0)]),
    ])
    .unwrap()
}

pub fn textual_only_table() -> Table {
    Table::from_columns(vec![
        Column::textual("city", vec![Some("Oslo"), Some("Rome"), Some("Oslo"), None]),
        Column::textual("team", vec![Some("red"), Some("blue"), Some("blue"), Some("blue")]),
    ])
    .unwrap()
}
