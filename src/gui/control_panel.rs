//! Control Panel Widget
//! Left side panel with the data source and the PTJ filter.

use egui::{Color32, RichText, ScrollArea};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Left side control panel with file selection and the PTJ multiselect.
pub struct ControlPanel {
    pub order_path: PathBuf,
    pub unit_path: PathBuf,
    /// Unit names offered for selection, sorted.
    pub unit_options: Vec<String>,
    /// One flag per entry of `unit_options`.
    pub selected: Vec<bool>,
    pub status: String,
    pub is_loading: bool,
}

impl ControlPanel {
    pub fn new(order_path: PathBuf, unit_path: PathBuf) -> Self {
        Self {
            order_path,
            unit_path,
            unit_options: Vec::new(),
            selected: Vec::new(),
            status: "Ready".to_string(),
            is_loading: false,
        }
    }

    /// Replace the available unit names.
    ///
    /// Names that were selected before stay selected; on first fill (or when
    /// none of the old selection survives) everything is selected.
    pub fn update_unit_options(&mut self, options: Vec<String>) {
        let previous: HashSet<&str> = self
            .unit_options
            .iter()
            .zip(&self.selected)
            .filter(|(_, &on)| on)
            .map(|(name, _)| name.as_str())
            .collect();

        let selected: Vec<bool> = options
            .iter()
            .map(|name| previous.contains(name.as_str()))
            .collect();

        self.selected = if selected.iter().any(|&on| on) {
            selected
        } else {
            vec![true; options.len()]
        };
        self.unit_options = options;
    }

    /// Selected unit names, in option order.
    pub fn selected_units(&self) -> Vec<String> {
        self.unit_options
            .iter()
            .zip(self.selected.iter())
            .filter(|(_, &on)| on)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 List PO")
                    .size(22.0)
                    .color(Color32::from_rgb(36, 21, 113)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        if Self::file_row(ui, "List PO", &self.order_path) {
            action = ControlPanelAction::BrowseOrders;
        }
        ui.add_space(4.0);
        if Self::file_row(ui, "DimPTJ", &self.unit_path) {
            action = ControlPanelAction::BrowseUnits;
        }

        ui.add_space(5.0);
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!self.is_loading, |ui| {
                if ui.button("🔄 Reload").clicked() {
                    action = ControlPanelAction::Reload;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters Section =====
        ui.label(RichText::new("Filters").size(14.0).strong());
        ui.add_space(5.0);
        ui.label("PTJ");

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical().max_height(260.0).show(ui, |ui| {
                    if self.unit_options.is_empty() {
                        ui.label(RichText::new("No units").color(Color32::GRAY));
                    }
                    for (i, name) in self.unit_options.iter().enumerate() {
                        if i < self.selected.len() && ui.checkbox(&mut self.selected[i], name).changed()
                        {
                            action = ControlPanelAction::SelectionChanged;
                        }
                    }
                });
            });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() {
                self.selected.iter_mut().for_each(|v| *v = true);
                action = ControlPanelAction::SelectionChanged;
            }
            if ui.small_button("Clear All").clicked() {
                self.selected.iter_mut().for_each(|v| *v = false);
                action = ControlPanelAction::SelectionChanged;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        if self.is_loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading...");
            });
        }

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Loaded") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// File name with a Browse button; true when Browse was clicked.
    fn file_row(ui: &mut egui::Ui, label: &str, path: &Path) -> bool {
        let mut clicked = false;
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());
                    ui.label(RichText::new(format!("{label}: {name}")).size(12.0));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            clicked = true;
                        }
                    });
                });
            });
        clicked
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseOrders,
    BrowseUnits,
    Reload,
    SelectionChanged,
}
