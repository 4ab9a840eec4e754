use std::collections::HashMap;

use serde::Serialize;

use crate::table::{Column, Table};

/// Descriptive statistics for one numeric column. NaN marks "undefined".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStat {
    pub column: String,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingnessRecord {
    pub column: String,
    pub null_count: usize,
    pub null_percent: f64,
}

/// One histogram bin, `[start, end)` except the last which is closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl Bin {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Format to exactly two decimals; NaN prints as `nan`.
pub fn fmt2(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{value:.2}")
    }
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean
///
/// # Arguments
/// * `values` - Non-null values of one column
///
/// # Returns
/// * `f64` - The mean, or NaN when `values` is empty
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Middle value after sorting; the average of the two middle values for an
/// even count. NaN when `values` is empty.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation (n - 1 denominator).
///
/// # Returns
/// * `f64` - NaN for fewer than two values
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

fn min_max(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Stats for a numeric column, `None` for a textual one.
///
/// # Arguments
/// * `column` - Any column; nulls are skipped
///
/// # Returns
/// * `Option<ColumnStat>` - Mean, median, sample std, min and max. Each is NaN
///   when the column has too few non-null values to define it
pub fn column_stat(column: &Column) -> Option<ColumnStat> {
    if column.kind() != crate::table::ColumnKind::Numeric {
        return None;
    }
    let values = column.numbers();
    let (min, max) = min_max(&values);
    Some(ColumnStat {
        column: column.name().to_string(),
        mean: mean(&values),
        median: median(&values),
        std: std_dev(&values),
        min,
        max,
    })
}

/// [`column_stat`] for every numeric column, in column order.
pub fn numeric_stats(table: &Table) -> Vec<ColumnStat> {
    table.numeric_columns().filter_map(column_stat).collect()
}

/// Null count and percentage of `rows`. Zero rows reports 0%.
pub fn missingness(column: &Column, rows: usize) -> MissingnessRecord {
    let null_count = column.null_count();
    let null_percent = if rows == 0 {
        0.0
    } else {
        round2(null_count as f64 / rows as f64 * 100.0)
    };
    MissingnessRecord {
        column: column.name().to_string(),
        null_count,
        null_percent,
    }
}

/// [`missingness`] for every column, in column order.
pub fn missingness_table(table: &Table) -> Vec<MissingnessRecord> {
    table
        .columns()
        .iter()
        .map(|c| missingness(c, table.n_rows()))
        .collect()
}

/// Distinct non-null text values in order of first appearance.
pub fn distinct_values(column: &Column) -> Vec<String> {
    value_counts_unsorted(column)
        .into_iter()
        .map(|(value, _)| value)
        .collect()
}

/// Frequency of each distinct value, most frequent first.
///
/// Ties keep first-appearance order.
pub fn value_counts(column: &Column) -> Vec<(String, usize)> {
    let mut counts = value_counts_unsorted(column);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn value_counts_unsorted(column: &Column) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in column.texts() {
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }
    counts
}

/// Equal-width bins over `[min, max]` of the finite values.
///
/// # Arguments
/// * `values` - Non-null cells of a numeric column. Infinite values are skipped
///
/// # Returns
/// * `Vec<Bin>` - Sturges' rule bins (`ceil(log2 n) + 1`), empty when no finite
///   value remains. A range too wide for `f64` collapses to a single bin
pub fn histogram(values: &[f64]) -> Vec<Bin> {
    let values = finite(values);
    if values.is_empty() {
        return Vec::new();
    }
    let (mut lo, mut hi) = min_max(&values);
    if hi - lo == 0.0 {
        let pad = (lo.abs() * 0.05).max(0.5);
        lo -= pad;
        hi += pad;
    }
    if !(hi - lo).is_finite() {
        return vec![Bin {
            start: lo,
            end: hi,
            count: values.len(),
        }];
    }

    let n_bins = ((values.len() as f64).log2().ceil() as usize + 1).max(1);
    let width = (hi - lo) / n_bins as f64;
    let mut bins: Vec<Bin> = (0..n_bins)
        .map(|i| Bin {
            start: lo + width * i as f64,
            end: lo + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for &v in &values {
        let idx = (((v - lo) / width) as usize).min(n_bins - 1);
        bins[idx].count += 1;
    }
    bins
}

/// Gaussian kernel density estimate scaled to the histogram's counts.
///
/// Bandwidth follows Scott's rule. Empty when there are fewer than two
/// finite values or no spread.
pub fn density_curve(values: &[f64], bins: &[Bin], points: usize) -> Vec<(f64, f64)> {
    let values = finite(values);
    let sd = std_dev(&values);
    if values.len() < 2 || !(sd > 0.0 && sd.is_finite()) || bins.is_empty() || points < 2 {
        return Vec::new();
    }

    let n = values.len() as f64;
    let bandwidth = sd * n.powf(-0.2);
    let scale = n * bins[0].width();
    let lo = bins[0].start;
    let hi = bins[bins.len() - 1].end;
    let step = (hi - lo) / (points - 1) as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    (0..points)
        .map(|i| {
            let x = lo + step * i as f64;
            let density: f64 = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            (x, density * scale)
        })
        .collect()
}
