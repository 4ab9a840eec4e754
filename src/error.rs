use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

/// Reasons a set of columns cannot form a [`Table`](crate::table::Table).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("a table needs at least 2 columns, found {0}")]
    TooFewColumns(usize),

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// Crate-level error type.
///
/// Everything past the loader is a render fault: nothing is retried and the
/// request that triggered it is aborted.
#[derive(Debug, Error)]
pub enum InsightError {
    /// No encoding/delimiter combination produced a table with 2+ columns.
    #[error("Could not read the file. Please make sure it's a valid CSV or TSV file.")]
    UnreadableFormat,

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("no column named '{0}'")]
    UnknownColumn(String),

    #[error("chart rendering failed: {0}")]
    Render(String),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF generation failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl<E> From<DrawingAreaErrorKind<E>> for InsightError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        InsightError::Render(err.to_string())
    }
}
