//! Chart Plotter Module
//! Draws the per-year "Total PO by PTJ" bar charts using egui_plot.

use crate::report::{GroupCount, YearChart};
use egui::{Align2, Color32, RichText};
use egui_plot::{Bar, BarChart, GridMark, Plot, PlotPoint, Text};

/// Pale green bars, as on the original report.
pub const BAR_COLOR: Color32 = Color32::from_rgb(152, 251, 152);

const BAR_WIDTH: f64 = 0.6;
const CHART_HEIGHT: f32 = 240.0;
/// Head-room above the tallest bar for its value label.
const LABEL_HEADROOM: f64 = 1.25;

/// Creates the dashboard's bar charts.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Bar positions: one slot per group code, in chart order.
    pub fn bar_points(chart: &YearChart) -> Vec<[f64; 2]> {
        chart
            .groups
            .iter()
            .enumerate()
            .map(|(i, g): (usize, &GroupCount)| [i as f64, g.order_count as f64])
            .collect()
    }

    /// Upper y bound that leaves room for value labels.
    pub fn y_max(chart: &YearChart) -> f64 {
        let tallest = chart
            .groups
            .iter()
            .map(|g| g.order_count)
            .max()
            .unwrap_or(0);
        (tallest.max(1) as f64) * LABEL_HEADROOM
    }

    /// Draw one year's chart: x-axis is group code, bar height is PO count.
    pub fn draw_year_chart(ui: &mut egui::Ui, chart: &YearChart) {
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(chart.year.to_string()).size(15.0).strong());
        });

        if chart.groups.is_empty() {
            ui.add_sized(
                [ui.available_width(), CHART_HEIGHT],
                egui::Label::new(RichText::new("No PO").color(Color32::GRAY)),
            );
            return;
        }

        let points = Self::bar_points(chart);
        let x_labels: Vec<String> = chart.groups.iter().map(|g| g.group_code.clone()).collect();
        let slots = x_labels.len();

        let bars: Vec<Bar> = points
            .iter()
            .zip(&x_labels)
            .map(|(&[x, y], label)| {
                Bar::new(x, y)
                    .width(BAR_WIDTH)
                    .name(label)
                    .fill(BAR_COLOR)
            })
            .collect();

        Plot::new(format!("year_chart_{}", chart.year))
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show_grid(false)
            .show_axes([true, false])
            .include_y(0.0)
            .include_y(Self::y_max(chart))
            .include_x(-0.5)
            .include_x(slots as f64 - 0.5)
            // One tick per bar
            .x_grid_spacer(move |_input| {
                (0..slots)
                    .map(|i| GridMark {
                        value: i as f64,
                        step_size: 1.0,
                    })
                    .collect()
            })
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx as usize) < x_labels.len() {
                    x_labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR));

                for [x, y] in &points {
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(*x, *y),
                            RichText::new(format!("{}", *y as usize)).size(13.0),
                        )
                        .anchor(Align2::CENTER_BOTTOM),
                    );
                }
            });
    }
}
