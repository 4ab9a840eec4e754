mod common;

use common::{ChartCall, StubRenderer};
use csv_insight::InsightError;
use csv_insight::graph::{ChartRenderer, PlottersRenderer, Raster, chart_png};

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

#[test]
fn raster_encodes_to_png_of_same_size() {
    let raster = Raster {
        width: 3,
        height: 2,
        pixels: vec![200; 3 * 2 * 3],
    };
    let png = raster.to_png().unwrap();
    assert!(png.starts_with(PNG_MAGIC));

    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (3, 2));
}

#[test]
fn raster_with_wrong_buffer_length_is_rejected() {
    let raster = Raster {
        width: 3,
        height: 2,
        pixels: vec![0; 4],
    };
    assert!(matches!(raster.to_png(), Err(InsightError::Render(_))));
}

#[test]
fn interactive_chart_picks_chart_type_from_column_kind() {
    let table = common::id_name_table();
    let renderer = StubRenderer::default();

    assert!(chart_png(&renderer, &table, "id").unwrap().starts_with(PNG_MAGIC));
    assert!(chart_png(&renderer, &table, "name").unwrap().starts_with(PNG_MAGIC));

    let calls = renderer.calls();
    assert!(matches!(&calls[0], ChartCall::Histogram { title, .. } if title == "Distribution of id"));
    assert!(matches!(&calls[1], ChartCall::Bar { title, x_label, .. }
        if title == "Value Counts of name" && x_label == "name"));
}

#[test]
fn interactive_chart_for_unknown_column_fails() {
    let table = common::id_name_table();
    let result = chart_png(&StubRenderer::default(), &table, "missing");
    assert!(matches!(result, Err(InsightError::UnknownColumn(c)) if c == "missing"));
}

#[test]
fn plotters_histogram_rejects_a_range_wider_than_f64() {
    let renderer = PlottersRenderer::default();
    let result = renderer.histogram("Histogram: v", "v", &[-1e308, 1e308]);
    assert!(matches!(result, Err(InsightError::Render(msg)) if msg.contains("'v'")));
}

#[test]
#[ignore = "needs a system sans-serif font"]
fn plotters_histogram_draws_columns_holding_infinity() {
    let table = csv_insight::load(b"a,b\n1,x\n1e999,y\n2,z\n").unwrap();
    let values = table.column("a").unwrap().numbers();
    let raster = PlottersRenderer::default()
        .histogram("Histogram: a", "a", &values)
        .unwrap();
    assert_eq!(raster.pixels.len(), (raster.width * raster.height * 3) as usize);
}

#[test]
#[ignore = "needs a system sans-serif font"]
fn plotters_renderer_fills_a_buffer_of_the_configured_size() {
    let renderer = PlottersRenderer::default();

    let hist = renderer
        .histogram("Histogram: v", "v", &[1.0, 2.0, 2.0, 3.0, 5.0])
        .unwrap();
    assert_eq!(hist.pixels.len(), (hist.width * hist.height * 3) as usize);

    let counts = vec![("a".to_string(), 3), ("b".to_string(), 1)];
    let bars = renderer.bar_chart("Bar Chart: c", "c", &counts).unwrap();
    assert_eq!((bars.width, bars.height), (renderer.width, renderer.height));
    // Something other than the white background was drawn.
    assert!(bars.pixels.iter().any(|&p| p != 255));
}
