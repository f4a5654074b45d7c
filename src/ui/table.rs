use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::RecordTable;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Filtered data table (central panel)
// ---------------------------------------------------------------------------

/// Show the surviving rows. The first column is the row's position in the
/// uploaded file.
pub fn filtered_table(ui: &mut Ui, table: &RecordTable, rows: &[usize], max_height: f32) {
    let n_cols = table.headers.len();

    egui::ScrollArea::horizontal()
        .id_salt("filtered_table_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(Column::auto().at_least(32.0))
                .columns(Column::auto().at_least(60.0).clip(true), n_cols)
                .min_scrolled_height(0.0)
                .max_scroll_height(max_height)
                .header(ROW_HEIGHT + 2.0, |mut header| {
                    header.col(|ui: &mut Ui| {
                        ui.strong("");
                    });
                    for name in &table.headers {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                        let r = rows[row.index()];
                        row.col(|ui: &mut Ui| {
                            ui.weak(r.to_string());
                        });
                        for c in 0..n_cols {
                            row.col(|ui: &mut Ui| {
                                ui.label(table.cell(r, c).to_string());
                            });
                        }
                    });
                });
        });
}
