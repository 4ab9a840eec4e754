use crate::stats::{fmt2, missingness_table, numeric_stats};
use crate::table::Table;

/// File name the plain-text summary is delivered under.
pub const SUMMARY_FILE_NAME: &str = "csv_insight_summary.txt";

/// Plain-text overview of a table: shape, column kinds, missing values and
/// mean/median of numeric columns.
///
/// Built straight from the table, independently of the PDF report.
pub fn plain_text(table: &Table, display_name: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("=== CSV Insight Summary ===\n".to_string());
    lines.push(format!("Filename: {display_name}"));
    lines.push(format!(
        "Rows: {}, Columns: {}\n",
        table.n_rows(),
        table.n_cols()
    ));

    lines.push("== Column Data Types ==\n".to_string());
    for col in table.columns() {
        lines.push(format!("{}: {}", col.name(), col.kind()));
    }

    lines.push("\n== Missing Values ==\n".to_string());
    for m in missingness_table(table) {
        lines.push(format!(
            "{}: {} missing ({}%)",
            m.column,
            m.null_count,
            fmt2(m.null_percent)
        ));
    }

    let stats = numeric_stats(table);
    if !stats.is_empty() {
        lines.push("\n== Numeric Stats ==\n".to_string());
        for s in stats {
            lines.push(format!(
                "{}: Mean = {}, Median = {}",
                s.column,
                fmt2(s.mean),
                fmt2(s.median)
            ));
        }
    }

    lines.join("\n")
}
