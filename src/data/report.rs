use super::distribution::{DistributionPlot, PlotStyle};
use super::filter::{run_pipeline, FilterControl, FilterState};
use super::loader::{load_upload, LoadError};
use super::model::RecordTable;
use super::schema::Schema;
use super::summary::Summary;

/// Shown instead of the dashboard until a file is uploaded.
pub const PLACEHOLDER: &str = "Please upload a CSV file to begin.";

// ---------------------------------------------------------------------------
// Report – everything derived from one (table, selections) pair
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Report {
    pub schema: Schema,
    /// Filter controls in stage order, with options for this pass.
    pub controls: Vec<FilterControl>,
    /// Indices of rows passing every filter, in file order.
    pub rows: Vec<usize>,
    pub summary: Option<Summary>,
    pub plot: Option<DistributionPlot>,
}

/// Probe, filter, summarise and lay out the plot.
pub fn build_report(table: &RecordTable, filters: &FilterState, style: &PlotStyle) -> Report {
    let schema = Schema::probe(table);
    let outcome = run_pipeline(table, &schema, filters);
    let summary = Summary::compute(table, &schema, &outcome.rows);
    let plot = summary
        .as_ref()
        .and_then(Summary::axis_max)
        .and_then(|y_max| DistributionPlot::build(table, &schema, &outcome.rows, style, y_max));

    log::debug!(
        "report: {} of {} rows pass, {} controls, plot: {}",
        outcome.rows.len(),
        table.len(),
        outcome.controls.len(),
        plot.is_some()
    );

    Report {
        schema,
        controls: outcome.controls,
        rows: outcome.rows,
        summary,
        plot,
    }
}

/// What the window should show for the current upload and selections.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Placeholder,
    Dashboard { table: RecordTable, report: Report },
}

/// Pure entry point: same upload and selections, same output.
pub fn render(upload: Option<&[u8]>, filters: &FilterState) -> Result<Rendered, LoadError> {
    let Some(table) = load_upload(upload)? else {
        return Ok(Rendered::Placeholder);
    };
    let report = build_report(&table, filters, &PlotStyle::default());
    Ok(Rendered::Dashboard { table, report })
}
