use serde::Serialize;

use crate::stats::{ColumnStat, MissingnessRecord, distinct_values, missingness_table, numeric_stats};
use crate::table::{ColumnData, ColumnKind, Table};

/// Rows shown in the on-screen preview.
pub const PREVIEW_ROWS: usize = 5;

/// Approximate per-cell overhead of a text value, in bytes.
const TEXT_CELL_OVERHEAD: usize = 24;

#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DtypeEntry {
    pub column: String,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub unique_count: usize,
    pub values: Vec<String>,
}

/// Everything the upload page shows about a table, as plain data.
#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub filename: String,
    pub rows: usize,
    pub columns: usize,
    pub preview: Preview,
    pub dtypes: Vec<DtypeEntry>,
    pub missing: Vec<MissingnessRecord>,
    pub approx_memory_kb: f64,
    pub numeric_stats: Vec<ColumnStat>,
    pub categorical: Vec<CategoricalSummary>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
}

impl Insights {
    /// Gather everything the upload page shows for `table`.
    ///
    /// # Arguments
    /// * `table` - The loaded table
    /// * `display_name` - Name of the uploaded file
    ///
    /// # Returns
    /// * `Insights` - Ready to serialise as the `/api/analyze` response
    pub fn from_table(table: &Table, display_name: &str) -> Self {
        let headers = table.column_names().into_iter().map(String::from).collect();
        let rows = (0..table.n_rows().min(PREVIEW_ROWS))
            .map(|row| table.columns().iter().map(|c| c.display_cell(row)).collect())
            .collect();

        let dtypes = table
            .columns()
            .iter()
            .map(|c| DtypeEntry {
                column: c.name().to_string(),
                kind: c.kind(),
            })
            .collect();

        let categorical = table
            .textual_columns()
            .map(|c| {
                let values = distinct_values(c);
                CategoricalSummary {
                    column: c.name().to_string(),
                    unique_count: values.len(),
                    values,
                }
            })
            .collect();

        Insights {
            filename: display_name.to_string(),
            rows: table.n_rows(),
            columns: table.n_cols(),
            preview: Preview { headers, rows },
            dtypes,
            missing: missingness_table(table),
            approx_memory_kb: approx_memory_bytes(table) as f64 / 1024.0,
            numeric_stats: numeric_stats(table),
            categorical,
            numeric_columns: table.numeric_columns().map(|c| c.name().to_string()).collect(),
            categorical_columns: table.textual_columns().map(|c| c.name().to_string()).collect(),
        }
    }
}

/// Rough in-memory footprint: 8 bytes per numeric cell, text length plus a
/// fixed overhead per text cell.
pub fn approx_memory_bytes(table: &Table) -> usize {
    table
        .columns()
        .iter()
        .map(|c| match c.data() {
            ColumnData::Numeric(v) => v.len() * std::mem::size_of::<f64>(),
            ColumnData::Textual(v) => v
                .iter()
                .map(|cell| cell.as_ref().map_or(0, String::len) + TEXT_CELL_OVERHEAD)
                .sum(),
        })
        .sum()
}
