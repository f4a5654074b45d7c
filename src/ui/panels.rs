use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::FilterOption;
use crate::data::report::PLACEHOLDER;
use crate::data::schema::KnownColumn;
use crate::export;
use crate::state::AppState;
use crate::ui::{plot, table};

// ---------------------------------------------------------------------------
// Left side panel – upload and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: upload control, then one multi-select per filter
/// stage, in stage order.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Upload CSV File");
    if ui.button("Choose a CSV file…").clicked() {
        open_file_dialog(state);
    }
    match &state.upload {
        Some(upload) => ui.label(
            RichText::new(format!("{} ({} bytes)", upload.name, upload.bytes.len())).weak(),
        ),
        None => ui.label(RichText::new("…or drop a .csv file on the window").weak()),
    };
    ui.separator();

    if state.table.is_none() {
        return;
    }

    ui.heading("Filters");
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let controls = state.report.controls.clone();
    let mut action: Option<FilterAction> = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for control in &controls {
                let n_selected = state
                    .filters
                    .get(&control.column)
                    .map_or(0, |s| s.len());
                let header_text = format!("{}  ({n_selected}/{})", control.label(), control.options.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(control.column)
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                action = Some(FilterAction::All(control.column));
                            }
                            if ui.small_button("None").clicked() {
                                action = Some(FilterAction::None(control.column));
                            }
                        });

                        for option in &control.options {
                            let mut checked = state.is_selected(control.column, option);
                            let mut text = RichText::new(option.to_string());
                            if control.column == KnownColumn::ColonyName {
                                if let (Some(cm), FilterOption::Value(v)) = (&state.color_map, option) {
                                    text = text.color(cm.color_for(v));
                                }
                            }
                            if ui.checkbox(&mut checked, text).changed() {
                                action = Some(FilterAction::Toggle(control.column, option.clone()));
                            }
                        }
                    });
            }
        });

    match action {
        Some(FilterAction::Toggle(column, option)) => state.toggle_filter_value(column, &option),
        Some(FilterAction::All(column)) => state.select_all(column),
        Some(FilterAction::None(column)) => state.select_none(column),
        None => {}
    }
}

enum FilterAction {
    Toggle(KnownColumn, FilterOption),
    All(KnownColumn),
    None(KnownColumn),
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Filtered table, summary sentence and plot; or the placeholder.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    if state.upload.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(PLACEHOLDER);
        });
        return;
    }
    let Some(data) = &state.table else {
        if let Some(msg) = &state.status_message {
            ui.colored_label(Color32::RED, msg.as_str());
        }
        return;
    };

    let report = &state.report;
    let mut plot_rect = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Filtered Data");
            table::filtered_table(ui, data, &report.rows, 300.0);
            ui.add_space(12.0);

            ui.heading("Violin Plot");
            let Some(summary) = &report.summary else {
                return;
            };
            ui.label(summary.sentence());
            match &report.plot {
                Some(scene) => {
                    plot_rect = Some(plot::distribution_plot(ui, scene, state.color_map.as_ref()));
                }
                None => plot::empty_plot(ui),
            }
        });

    state.plot_rect = plot_rect;
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open CSV…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui
                .add_enabled(state.table.is_some(), egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                export_csv_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.report.summary.is_some(), egui::Button::new("Export summary…"))
                .clicked()
            {
                export_summary_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.report.plot.is_some(), egui::Button::new("Save plot as PNG…"))
                .clicked()
            {
                if let Some(path) = save_dialog("Save plot", "plot.png", "PNG", &["png"]) {
                    state.pending_png = Some(path);
                    ui.ctx()
                        .send_viewport_cmd(egui::ViewportCommand::Screenshot(Default::default()));
                }
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some((shown, total)) = state.row_counts() {
            ui.label(format!("{total} mice loaded, {shown} shown"));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Choose a CSV file")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

fn save_dialog(title: &str, default_name: &str, kind: &str, extensions: &[&str]) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .set_file_name(default_name)
        .add_filter(kind, extensions)
        .save_file()
}

fn export_csv_dialog(state: &mut AppState) {
    let Some(table) = &state.table else {
        return;
    };
    let Some(path) = save_dialog("Export filtered data", "filtered.csv", "CSV", &["csv"]) else {
        return;
    };
    if let Err(e) = export::save_filtered_csv(&path, table, &state.report.rows) {
        log::error!("Export failed: {e:#}");
        state.status_message = Some(format!("Error: {e:#}"));
    }
}

fn export_summary_dialog(state: &mut AppState) {
    let Some(summary) = &state.report.summary else {
        return;
    };
    let Some(path) = save_dialog("Export summary", "summary.json", "JSON", &["json"]) else {
        return;
    };
    if let Err(e) = export::save_summary_json(&path, summary) {
        log::error!("Export failed: {e:#}");
        state.status_message = Some(format!("Error: {e:#}"));
    }
}
