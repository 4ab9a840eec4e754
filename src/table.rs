use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::error::TableError;

/// An uploaded file: the raw bytes plus the name the user gave it.
#[derive(Debug, Clone)]
pub struct RawUpload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl RawUpload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Scalar kind of a column, fixed once the table is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Textual,
}

impl ColumnKind {
    pub fn label(self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Textual => "text",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cell storage for one column. The variant is the column's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Textual(Vec<Option<String>>),
}

/// A named column of cells, any of which may be null.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Numeric column from optional values, `None` being null.
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(name, ColumnData::Numeric(values))
    }

    pub fn textual<S: Into<String>>(name: impl Into<String>, values: Vec<Option<S>>) -> Self {
        let values = values.into_iter().map(|v| v.map(Into::into)).collect();
        Self::new(name, ColumnData::Textual(values))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// The kind follows the storage variant and never changes.
    pub fn kind(&self) -> ColumnKind {
        match self.data {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Textual(_) => ColumnKind::Textual,
        }
    }

    /// Number of cells, nulls included.
    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Textual(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of null cells.
    pub fn null_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Textual(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    /// Non-null numeric values in row order. Empty for textual columns.
    pub fn numbers(&self) -> Vec<f64> {
        match &self.data {
            ColumnData::Numeric(v) => v.iter().flatten().copied().collect(),
            ColumnData::Textual(_) => Vec::new(),
        }
    }

    /// Non-null text values in row order. Empty for numeric columns.
    pub fn texts(&self) -> Vec<&str> {
        match &self.data {
            ColumnData::Textual(v) => v.iter().flatten().map(String::as_str).collect(),
            ColumnData::Numeric(_) => Vec::new(),
        }
    }

    /// Display form of the cell at `row`, `None` for null or out of range.
    pub fn display_cell(&self, row: usize) -> Option<String> {
        match &self.data {
            ColumnData::Numeric(v) => v.get(row).copied().flatten().map(|n| n.to_string()),
            ColumnData::Textual(v) => v.get(row).cloned().flatten(),
        }
    }
}

/// The loaded dataset: ordered, uniquely named columns of equal length.
///
/// A `Table` is read-only once built. Construction rejects fewer than two
/// columns, since a one-column parse almost always means the wrong delimiter
/// was guessed.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Build a table from its columns, in display order.
    ///
    /// # Arguments
    /// * `columns` - The columns, each already holding its cells
    ///
    /// # Returns
    /// * `Result<Table, TableError>` - The table, or why the columns cannot form one
    ///
    /// # Errors
    /// * `TooFewColumns` when fewer than two columns are given
    /// * `DuplicateColumn` when two columns share a name
    /// * `LengthMismatch` when a column's length differs from the first column's
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, TableError> {
        if columns.len() < 2 {
            return Err(TableError::TooFewColumns(columns.len()));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(col.name()) {
                return Err(TableError::DuplicateColumn(col.name().to_string()));
            }
        }

        let rows = columns[0].len();
        if let Some(col) = columns.iter().find(|c| c.len() != rows) {
            return Err(TableError::LengthMismatch {
                column: col.name().to_string(),
                expected: rows,
                found: col.len(),
            });
        }

        Ok(Self { columns, rows })
    }

    /// Number of data rows, the header excluded.
    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Numeric columns in table order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns_of(ColumnKind::Numeric)
    }

    /// Textual columns in table order.
    pub fn textual_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns_of(ColumnKind::Textual)
    }

    fn columns_of(&self, kind: ColumnKind) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(move |c| c.kind() == kind)
    }
}
