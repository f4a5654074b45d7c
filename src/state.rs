use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::color::ColorMap;
use crate::data::distribution::PlotStyle;
use crate::data::filter::{FilterOption, FilterState};
use crate::data::model::RecordTable;
use crate::data::report::{build_report, render, Rendered, Report};
use crate::data::schema::KnownColumn;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The raw upload, held until a new one replaces it.
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Current upload (None until the user picks a file).
    pub upload: Option<Upload>,

    /// Table parsed from `upload`; None when nothing is loaded or parsing failed.
    pub table: Option<RecordTable>,

    /// Per-column filter selections.
    pub filters: FilterState,

    /// Controls, surviving rows, summary and plot for the current selections (cached).
    pub report: Report,

    /// Colony colours for the current plot.
    pub color_map: Option<ColorMap>,

    pub style: PlotStyle,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Where to write the next plot screenshot, once it arrives.
    pub pending_png: Option<PathBuf>,

    /// Screen area of the plot in the last frame, used to crop screenshots.
    pub plot_rect: Option<eframe::egui::Rect>,
}

impl AppState {
    /// Replace the upload, parse it and rebuild everything.
    /// A parse failure clears the dashboard instead of showing stale results.
    pub fn set_upload(&mut self, name: String, bytes: Vec<u8>) {
        self.filters.clear();
        match render(Some(bytes.as_slice()), &self.filters) {
            Ok(Rendered::Dashboard { table, report }) => {
                log::info!(
                    "Loaded {name}: {} rows, {} columns, recognised {:?}",
                    table.len(),
                    table.headers.len(),
                    report.schema.present().collect::<Vec<_>>()
                );
                self.table = Some(table);
                self.report = report;
                self.status_message = None;
            }
            Ok(Rendered::Placeholder) => {
                self.table = None;
                self.report = Report::default();
            }
            Err(e) => {
                log::error!("Failed to load {name}: {e:#}");
                self.status_message = Some(format!("Error: {e}"));
                self.table = None;
                self.report = Report::default();
            }
        }
        self.upload = Some(Upload { name, bytes });
        self.rebuild_color_map();
    }

    /// Read a file from disk and treat it as the new upload.
    pub fn open_path(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match std::fs::read(path).with_context(|| format!("reading {}", path.display())) {
            Ok(bytes) => self.set_upload(name, bytes),
            Err(e) => {
                log::error!("{e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Recompute the report after an upload or filter change.
    ///
    /// Selections the refreshed controls no longer offer are dropped, and the
    /// report is rebuilt once more if that changed anything.
    pub fn refilter(&mut self) {
        let Some(table) = &self.table else {
            self.report = Report::default();
            self.color_map = None;
            return;
        };

        self.report = build_report(table, &self.filters, &self.style);
        if prune_unavailable(&mut self.filters, &self.report) {
            self.report = build_report(table, &self.filters, &self.style);
        }
        self.rebuild_color_map();
    }

    /// Colours follow the colonies currently plotted.
    fn rebuild_color_map(&mut self) {
        self.color_map = self
            .report
            .plot
            .as_ref()
            .map(|p| ColorMap::new(p.groups.iter().map(|g| &g.colony)));
    }

    /// Toggle a single option in a column's filter.
    pub fn toggle_filter_value(&mut self, column: KnownColumn, option: &FilterOption) {
        let selected = self.filters.entry(column).or_default();
        if !selected.remove(option) {
            selected.insert(option.clone());
        }
        self.refilter();
    }

    /// Select every option the column's control currently offers.
    pub fn select_all(&mut self, column: KnownColumn) {
        if let Some(control) = self.report.controls.iter().find(|c| c.column == column) {
            self.filters
                .insert(column, control.options.iter().cloned().collect());
            self.refilter();
        }
    }

    /// Clear a column's selection (no restriction).
    pub fn select_none(&mut self, column: KnownColumn) {
        self.filters.remove(&column);
        self.refilter();
    }

    pub fn is_selected(&self, column: KnownColumn, option: &FilterOption) -> bool {
        self.filters
            .get(&column)
            .is_some_and(|s| s.contains(option))
    }

    /// Number of rows shown / number of rows uploaded.
    pub fn row_counts(&self) -> Option<(usize, usize)> {
        self.table
            .as_ref()
            .map(|t| (self.report.rows.len(), t.len()))
    }
}

/// Drop selected options that no control offers any more.
fn prune_unavailable(filters: &mut FilterState, report: &Report) -> bool {
    let mut changed = false;
    for control in &report.controls {
        if let Some(selected) = filters.get_mut(&control.column) {
            let before = selected.len();
            selected.retain(|o| control.options.contains(o));
            changed |= selected.len() != before;
        }
    }
    changed
}
