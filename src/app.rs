use std::sync::Arc;

use eframe::egui::{self, ColorImage};

use crate::export;
use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ColonyDashApp {
    pub state: AppState,
}

impl ColonyDashApp {
    /// A `.csv` dropped on the window replaces the current upload.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            let is_csv = file.name.to_ascii_lowercase().ends_with(".csv")
                || file
                    .path
                    .as_ref()
                    .and_then(|p| p.extension())
                    .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
            if !is_csv {
                log::warn!("Ignoring dropped file that is not a CSV: {}", file.name);
                continue;
            }
            if let Some(path) = &file.path {
                self.state.open_path(path);
            } else if let Some(bytes) = &file.bytes {
                self.state.set_upload(file.name.clone(), bytes.to_vec());
            }
            break;
        }
    }

    /// Write a requested plot screenshot once the viewport delivers it.
    fn handle_screenshot(&mut self, ctx: &egui::Context) {
        if self.state.pending_png.is_none() {
            return;
        }
        let shot: Option<Arc<ColorImage>> = ctx.input(|i| {
            i.raw.events.iter().find_map(|e| match e {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });
        let Some(shot) = shot else {
            return;
        };
        let Some(path) = self.state.pending_png.take() else {
            return;
        };

        let cropped = match self.state.plot_rect {
            Some(rect) => shot.region(&rect, Some(ctx.pixels_per_point())),
            None => (*shot).clone(),
        };
        if let Err(e) = export::save_png(&path, &cropped) {
            log::error!("Saving plot failed: {e:#}");
            self.state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

impl eframe::App for ColonyDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        self.handle_screenshot(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: upload + filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: table, summary, plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::central_panel(ui, &mut self.state);
        });
    }
}
