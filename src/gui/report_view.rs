//! Report View Widget
//! Central panel: summary cards, per-year PTJ charts and the PO detail table.

use crate::charts::ChartPlotter;
use crate::report::{DetailRow, Summary, ViewResult};
use egui::{Color32, RichText, ScrollArea};

const CARD_ACCENT: Color32 = Color32::from_rgb(36, 21, 113);
const TABLE_ROW_HEIGHT: f32 = 22.0;
const SECTION_SPACING: f32 = 15.0;

/// Displays the latest `ViewResult`.
#[derive(Default)]
pub struct ReportView {
    view: Option<ViewResult>,
}

impl ReportView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_view(&mut self, view: ViewResult) {
        self.view = Some(view);
    }

    pub fn clear(&mut self) {
        self.view = None;
    }

    pub fn view(&self) -> Option<&ViewResult> {
        self.view.as_ref()
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        let Some(view) = &self.view else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .id_salt("report_view")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::draw_summary_cards(ui, &view.summary);
                ui.add_space(SECTION_SPACING);

                ui.label(
                    RichText::new("Total PO (Count) Mengikut PTJ")
                        .size(18.0)
                        .strong(),
                );
                ui.add_space(8.0);
                let n = view.year_charts.len().max(1);
                ui.columns(n, |columns| {
                    for (column, chart) in columns.iter_mut().zip(&view.year_charts) {
                        Self::draw_card(column, |ui| ChartPlotter::draw_year_chart(ui, chart));
                    }
                });
                ui.add_space(SECTION_SPACING);

                ui.label(RichText::new("Senarai Pesanan Tempatan").size(16.0).strong());
                ui.add_space(5.0);
                Self::draw_detail_table(ui, &view.detail_rows);
            });
    }

    fn draw_summary_cards(ui: &mut egui::Ui, summary: &Summary) {
        ui.columns(2, |columns| {
            Self::draw_card(&mut columns[0], |ui| {
                Self::draw_metric(ui, "Total PO", &summary.order_count.to_string());
            });
            Self::draw_card(&mut columns[1], |ui| {
                Self::draw_metric(ui, "Total Amount (RM)", &summary.total_amount_display());
            });
        });
    }

    fn draw_metric(ui: &mut egui::Ui, label: &str, value: &str) {
        ui.label(
            RichText::new(label)
                .size(13.0)
                .color(Color32::from_rgb(107, 114, 128)),
        );
        ui.label(RichText::new(value).size(28.0).strong().color(CARD_ACCENT));
    }

    fn draw_card(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(12.0)
            .stroke(egui::Stroke::new(1.0, Color32::from_gray(200)))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(14.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                add_contents(ui);
            });
    }

    fn draw_detail_table(ui: &mut egui::Ui, rows: &[DetailRow]) {
        if rows.is_empty() {
            ui.label(RichText::new("No PO for the current selection").color(Color32::GRAY));
            return;
        }

        ScrollArea::both()
            .id_salt("detail_table")
            .max_height(420.0)
            .auto_shrink([false, true])
            .show_rows(ui, TABLE_ROW_HEIGHT, rows.len(), |ui, row_range| {
                egui::Grid::new("detail_grid")
                    .striped(true)
                    .num_columns(5)
                    .min_col_width(60.0)
                    .spacing([16.0, 4.0])
                    .show(ui, |ui| {
                        for header in ["", "PO", "Vendor", "PO_Date", "Total_Amount"] {
                            ui.label(RichText::new(header).strong());
                        }
                        ui.end_row();

                        for row in &rows[row_range] {
                            ui.label(RichText::new(row.index.to_string()).color(Color32::GRAY));
                            ui.label(&row.po);
                            ui.label(&row.vendor);
                            ui.label(&row.date);
                            ui.label(&row.amount);
                            ui.end_row();
                        }
                    });
            });
    }
}
