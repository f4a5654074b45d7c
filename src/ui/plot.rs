use eframe::egui::{Color32, Rect, RichText, TextStyle, Ui};
use egui_plot::{GridMark, Line, MarkerShape, Plot, PlotBounds, PlotPoints, Points};

use crate::color::ColorMap;
use crate::data::distribution::{ColonyGroup, DistributionPlot};
use crate::data::model::format_float;

const LEGEND_WIDTH: f32 = 140.0;
const MAX_PLOT_HEIGHT: f32 = 700.0;

// ---------------------------------------------------------------------------
// Violin + strip plot (central panel)
// ---------------------------------------------------------------------------

/// Render the age-by-colony plot with its legend to the right.
/// Returns the screen area covered, for cropping screenshots.
pub fn distribution_plot(ui: &mut Ui, scene: &DistributionPlot, colors: Option<&ColorMap>) -> Rect {
    let ticks: Vec<(f64, String)> = scene.groups.iter().map(|g| (g.position, g.name())).collect();
    let x_min = -0.5;
    let x_max = scene.groups.len() as f64 - 0.5;
    let style = &scene.style;

    let color_of = |g: &ColonyGroup| {
        colors
            .map(|cm| cm.color_for(&g.colony))
            .unwrap_or(Color32::DARK_GRAY)
    };

    let width = (ui.available_width() - LEGEND_WIDTH).max(200.0);
    let height = (width * 10.0 / 7.0).min(MAX_PLOT_HEIGHT);

    ui.horizontal_top(|ui: &mut Ui| {
        Plot::new("distribution_plot")
            .width(width)
            .height(height)
            .x_axis_label("Colony Name")
            .y_axis_label("Age (Weeks)")
            .x_grid_spacer(egui_plot::uniform_grid_spacer(|_| [1.0, 5.0, 25.0]))
            .x_axis_formatter(move |mark: GridMark, _range| {
                ticks
                    .iter()
                    .find(|(pos, _)| (mark.value - pos).abs() < 1e-6)
                    .map(|(_, name)| name.clone())
                    .unwrap_or_default()
            })
            .show_grid([false, true])
            .allow_boxed_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_zoom(false)
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max([x_min, 0.0], [x_max, scene.y_max]));

                for g in &scene.groups {
                    plot_ui.line(
                        Line::new(PlotPoints::new(g.outline.clone()))
                            .color(Color32::GRAY)
                            .width(style.violin_line_width),
                    );

                    plot_ui.points(
                        Points::new(PlotPoints::new(g.points.clone()))
                            .shape(MarkerShape::Up)
                            .filled(true)
                            .radius(style.marker_radius)
                            .color(color_of(g)),
                    );

                    plot_ui.line(
                        Line::new(PlotPoints::new(g.median_tick.to_vec()))
                            .color(Color32::BLACK)
                            .width(style.median_line_width),
                    );
                }
            });

        legend(ui, scene, color_of);
    })
    .response
    .rect
}

/// Colony legend outside the plot's right edge, in small text.
fn legend(ui: &mut Ui, scene: &DistributionPlot, color_of: impl Fn(&ColonyGroup) -> Color32) {
    ui.vertical(|ui: &mut Ui| {
        ui.set_width(LEGEND_WIDTH);
        ui.label(RichText::new("Colony Name").text_style(TextStyle::Small).strong());
        for g in &scene.groups {
            ui.horizontal(|ui: &mut Ui| {
                ui.label(RichText::new("▲").color(color_of(g)).text_style(TextStyle::Small));
                ui.label(RichText::new(g.name()).text_style(TextStyle::Small))
                    .on_hover_text(format!("median age: {} weeks", format_float(g.median)));
            });
        }
    });
}

/// Shown where the plot would be when no row has an age.
pub fn empty_plot(ui: &mut Ui) {
    ui.add_space(8.0);
    ui.label(RichText::new("No ages to plot for the current filters.").italics());
}
