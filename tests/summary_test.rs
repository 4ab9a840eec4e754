mod common;

use csv_insight::summary::plain_text;

#[test]
fn plain_text_summary_lists_shape_kinds_missingness_and_means() {
    let table = common::id_name_table();
    let text = plain_text(&table, "people.csv");

    let expected = "\
=== CSV Insight Summary ===

Filename: people.csv
Rows: 3, Columns: 2

== Column Data Types ==

id: numeric
name: text

== Missing Values ==

id: 1 missing (33.33%)
name: 0 missing (0.00%)

== Numeric Stats ==

id: Mean = 1.50, Median = 1.50";
    assert_eq!(text, expected);
}

#[test]
fn plain_text_summary_omits_numeric_section_without_numeric_columns() {
    let text = plain_text(&common::textual_only_table(), "t.csv");
    assert!(!text.contains("== Numeric Stats =="));
    assert!(text.contains("team: 0 missing (0.00%)"));
}

#[test]
fn plain_text_means_use_two_decimals() {
    let text = plain_text(&common::numeric_only_table(), "n.csv");
    assert!(text.contains("x: Mean = 2.50, Median = 2.50"));
    assert!(text.contains("y: Mean = 26.67, Median = 30.00"));
}
