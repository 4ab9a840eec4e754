/*!
# CSV Insight

A browser-based tool for a quick first look at an unfamiliar tabular file,
built in Rust.

## Overview

An analyst uploads a CSV/TSV-like file. The server guesses its text encoding
and delimiter, infers which columns are numeric and which are text, computes
descriptive statistics, draws charts, and hands back a PDF report plus a
plain-text summary. Each upload is processed start to finish on its own;
nothing is stored between requests.

## Architecture

```text
 bytes ──► loader::load ──► Table ──┬──► insights::Insights   (JSON for the page)
                                    ├──► graph::chart_png      (one chart, PNG)
                                    ├──► summary::plain_text   (text download)
                                    └──► report::assemble ──► pdf::render (PDF download)
```

### Loader
- Tries UTF-8 then Latin-1, and for each `,` `\t` `;` `|` in that order
- The first parse with more than one column wins; no scoring
- Single-column input is always rejected as a likely wrong delimiter

### Report
- Ordered blocks: title, shape, column kinds, missing values, numeric stats,
  categorical unique values, then one chart per column
- Charts come from a [`graph::ChartRenderer`]; [`graph::PlottersRenderer`]
  draws each one into its own in-memory bitmap
- [`pdf`] paginates the blocks onto A4 pages with `lopdf`

## Modules

- **table**: Table, Column and upload types
- **loader**: encoding/delimiter guessing and column kind inference
- **stats**: per-column statistics, missingness, value counts, histogram bins
- **graph**: chart rendering
- **report**: report assembly
- **pdf**: PDF layout
- **summary**: plain-text summary
- **insights**: data behind the on-screen tables
- **config**: server settings
- **app**: HTTP routes (feature `web`)

## REST API Endpoints

All endpoints take the upload as multipart field `file`.

- `POST /api/analyze` - insights as JSON
- `POST /api/chart?column={name}` - chart for one column as PNG
- `POST /api/report` - `csv_insight_report.pdf`
- `POST /api/summary` - `csv_insight_summary.txt`
*/

pub mod config;
pub mod error;
pub mod graph;
pub mod insights;
pub mod loader;
pub mod pdf;
pub mod report;
pub mod stats;
pub mod summary;
pub mod table;

#[cfg(feature = "web")]
pub mod app;

/// Re-export the main entry points to make them easier to use
pub use error::{InsightError, TableError};
pub use graph::{ChartRenderer, PlottersRenderer, Raster};
pub use insights::Insights;
pub use loader::load;
pub use report::{Block, ReportDocument, assemble, assemble_with, generate_pdf_report};
pub use summary::plain_text;
pub use table::{Column, ColumnData, ColumnKind, RawUpload, Table};
