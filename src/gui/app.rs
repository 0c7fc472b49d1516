//! PO Dashboard Main Application
//! Main window with control panel and report view.

use crate::config::AppConfig;
use crate::data::{LoadCache, MergedTable};
use crate::gui::{ControlPanel, ControlPanelAction, ReportView};
use crate::report::{ReportProjector, ALLOWED_GROUP_CODES};
use egui::{RichText, SidePanel};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};

/// CSV loading result from background thread
enum LoadResult {
    Complete(Arc<MergedTable>),
    Error(String),
}

/// Main application window.
///
/// The merged table is shared read-only; the PTJ selection lives in the
/// control panel and every change re-runs the projector from scratch.
pub struct DashboardApp {
    title: String,
    cache: Arc<LoadCache>,
    table: Option<Arc<MergedTable>>,
    control_panel: ControlPanel,
    report_view: ReportView,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    /// Paths changed while a load was in flight.
    reload_pending: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut app = Self::with_cache(config, Arc::new(LoadCache::new()));
        app.start_load();
        app
    }

    fn with_cache(config: AppConfig, cache: Arc<LoadCache>) -> Self {
        Self {
            title: config.window_title,
            cache,
            table: None,
            control_panel: ControlPanel::new(config.order_path, config.unit_path),
            report_view: ReportView::new(),
            load_rx: None,
            reload_pending: false,
        }
    }

    /// Load (or fetch from cache) the merged table in a background thread.
    fn start_load(&mut self) {
        if self.load_rx.is_some() {
            // Picked up once the running load reports back
            self.reload_pending = true;
            return;
        }

        let order_path = self.control_panel.order_path.clone();
        let unit_path = self.control_panel.unit_path.clone();
        let cache = Arc::clone(&self.cache);

        self.control_panel.is_loading = true;
        self.control_panel.set_status("Loading CSV files...");

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let result = match cache.get_or_load(&order_path, &unit_path) {
                Ok(table) => LoadResult::Complete(table),
                Err(e) => {
                    error!(error = %e, "Failed to load PO data");
                    LoadResult::Error(e.to_string())
                }
            };
            let _ = tx.send(result);
        });
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(result) => {
                self.control_panel.is_loading = false;
                self.apply_load_result(result);
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => {
                self.load_rx = Some(rx);
            }
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                self.control_panel.is_loading = false;
                self.control_panel.set_status("Error: loader thread stopped");
            }
        }

        if self.load_rx.is_none() && self.reload_pending {
            self.reload_pending = false;
            info!("Source changed during load, reloading");
            self.start_load();
        }
    }

    fn apply_load_result(&mut self, result: LoadResult) {
        match result {
            LoadResult::Complete(table) => {
                let options = ReportProjector::project(&table, &ALLOWED_GROUP_CODES, &[]);
                self.control_panel.update_unit_options(options.unit_options);
                if table.is_empty() {
                    warn!("List PO extract has no rows");
                    self.control_panel.set_status("Loaded 0 rows: List PO extract is empty");
                } else {
                    self.control_panel.set_status(&format!(
                        "Loaded {} rows ({} without PTJ match)",
                        table.len(),
                        table.unmatched_count()
                    ));
                }
                info!(rows = table.len(), "Dashboard data ready");
                self.table = Some(table);
                self.refresh_view();
            }
            LoadResult::Error(error) => {
                // Nothing renders without a valid table
                self.table = None;
                self.report_view.clear();
                self.control_panel.set_status(&format!("Error: {}", error));
            }
        }
    }

    /// Re-run the projector for the current selection.
    fn refresh_view(&mut self) {
        let Some(table) = &self.table else {
            self.report_view.clear();
            return;
        };
        let selected = self.control_panel.selected_units();
        let view = ReportProjector::project(table, &ALLOWED_GROUP_CODES, &selected);
        self.report_view.set_view(view);
    }

    fn pick_csv(current: &Path) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new().add_filter("CSV Files", &["csv"]);
        if let Some(dir) = current.parent().filter(|d| d.is_dir()) {
            dialog = dialog.set_directory(dir);
        }
        dialog.pick_file()
    }

    fn handle_action(&mut self, action: ControlPanelAction) {
        match action {
            ControlPanelAction::BrowseOrders => {
                if let Some(path) = Self::pick_csv(&self.control_panel.order_path) {
                    self.control_panel.order_path = path;
                    self.start_load();
                }
            }
            ControlPanelAction::BrowseUnits => {
                if let Some(path) = Self::pick_csv(&self.control_panel.unit_path) {
                    self.control_panel.unit_path = path;
                    self.start_load();
                }
            }
            ControlPanelAction::Reload => self.start_load(),
            ControlPanelAction::SelectionChanged => self.refresh_view(),
            ControlPanelAction::None => {}
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        // Request repaint while loading
        if self.load_rx.is_some() {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);
                    self.handle_action(action);
                });
            });

        // Central panel - Report
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(RichText::new(&self.title).size(24.0).strong());
            ui.add_space(10.0);
            self.report_view.show(ui);
        });
    }
}
