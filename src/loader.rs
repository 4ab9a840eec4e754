use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use thiserror::Error;

use crate::error::TableError;
use crate::table::{Column, ColumnData, Table};

/// Text encodings tried, in order. UTF-8 must fail before Latin-1 is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

pub const ENCODINGS: [TextEncoding; 2] = [TextEncoding::Utf8, TextEncoding::Latin1];

pub const DELIMITERS: [u8; 4] = [b',', b'\t', b';', b'|'];

lazy_static! {
    /// ASCII only; `\d` would also accept digits `f64::from_str` rejects.
    static ref NUMBER: Regex = Regex::new(r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?$")
        .expect("valid number pattern");

    /// Cell contents read as missing values.
    static ref NULL_TOKENS: HashSet<&'static str> = [
        "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None",
        "<NA>", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "1.#IND", "1.#QNAN",
    ]
    .into_iter()
    .collect();
}

/// Why one (encoding, delimiter) attempt was rejected.
#[derive(Debug, Error)]
pub enum AttemptFailure {
    #[error("bytes are not valid {0:?}")]
    Decode(TextEncoding),

    #[error("no header row")]
    Empty,

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("row {row} has {found} fields, header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Turn uploaded bytes into a [`Table`], guessing encoding and delimiter.
///
/// Every (encoding, delimiter) pair is tried in order and the first parse
/// yielding more than one column wins. Returns `None` when all of them fail.
///
/// Data that genuinely has a single column cannot be told apart from a wrong
/// delimiter guess and is always rejected.
///
/// # Arguments
/// * `bytes` - The uploaded file, unmodified
///
/// # Returns
/// * `Option<Table>` - The first table that parsed, or `None` for an unreadable
///   upload
///
/// # Example
/// ```
/// let table = csv_insight::load(b"a;b\n1;x\n2;y\n").unwrap();
/// assert_eq!(table.column_names(), vec!["a", "b"]);
/// ```
pub fn load(bytes: &[u8]) -> Option<Table> {
    for encoding in ENCODINGS {
        let text = match decode(bytes, encoding) {
            Ok(text) => text,
            Err(err) => {
                debug!("skipping {encoding:?}: {err}");
                continue;
            }
        };

        for delimiter in DELIMITERS {
            match parse_delimited(&text, delimiter) {
                Ok(table) => {
                    info!(
                        "parsed upload as {encoding:?} with delimiter {:?}: {} rows x {} columns",
                        delimiter as char,
                        table.n_rows(),
                        table.n_cols()
                    );
                    return Some(table);
                }
                Err(err) => debug!(
                    "attempt {encoding:?}/{:?} rejected: {err}",
                    delimiter as char
                ),
            }
        }
    }

    info!("no encoding/delimiter combination produced a table");
    None
}

/// Decode `bytes` with the given encoding. Latin-1 never fails.
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<Cow<'_, str>, AttemptFailure> {
    match encoding {
        TextEncoding::Utf8 => {
            let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
            encoding_rs::UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .ok_or(AttemptFailure::Decode(encoding))
        }
        TextEncoding::Latin1 => Ok(encoding_rs::mem::decode_latin1(bytes)),
    }
}

/// Parse decoded text as delimited rows with a header line.
///
/// Rows shorter than the header are padded with nulls; longer rows fail the
/// attempt.
pub fn parse_delimited(text: &str, delimiter: u8) -> Result<Table, AttemptFailure> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = normalise_headers(reader.headers()?.iter());
    if headers.is_empty() {
        return Err(AttemptFailure::Empty);
    }

    let width = headers.len();
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); width];

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > width {
            return Err(AttemptFailure::RaggedRow {
                row: row + 1,
                expected: width,
                found: record.len(),
            });
        }
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(record.get(idx).filter(|c| !is_null(c)).map(str::to_string));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| infer_column(name, values))
        .collect();

    Ok(Table::from_columns(columns)?)
}

/// Build a column, choosing numeric when every non-null cell is a number.
///
/// A column with no rows at all stays textual.
pub fn infer_column(name: String, values: Vec<Option<String>>) -> Column {
    let numeric = !values.is_empty()
        && values
            .iter()
            .flatten()
            .all(|cell| is_number(cell));

    if numeric {
        let numbers = values
            .iter()
            .map(|cell| cell.as_deref().and_then(|c| c.trim().parse::<f64>().ok()))
            .collect();
        Column::new(name, ColumnData::Numeric(numbers))
    } else {
        Column::new(name, ColumnData::Textual(values))
    }
}

/// ASCII decimal or exponent literal that parses to an `f64`.
pub fn is_number(cell: &str) -> bool {
    let cell = cell.trim();
    NUMBER.is_match(cell) && cell.parse::<f64>().is_ok()
}

pub fn is_null(cell: &str) -> bool {
    NULL_TOKENS.contains(cell)
}

/// Fill blank header names and de-duplicate repeats with `.1`, `.2`, ...
fn normalise_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut names = Vec::new();

    for (idx, header) in raw.enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            header.to_string()
        };

        let mut name = base.clone();
        while taken.contains(&name) {
            let n = counts.entry(base.clone()).or_insert(0);
            *n += 1;
            name = format!("{base}.{n}");
        }
        taken.insert(name.clone());
        names.push(name);
    }

    names
}
