//! PO Dashboard - Purchase Order Spending Report
//!
//! Loads the List PO extract and the DimPTJ table, joins them and shows
//! summary cards, per-year PTJ charts and a PO detail table.

mod charts;
mod config;
mod data;
mod gui;
mod report;

use anyhow::{anyhow, Context, Result};
use config::AppConfig;
use eframe::egui;
use gui::DashboardApp;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber; `RUST_LOG` wins over the config level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load dashboard config")?;
    init_logging(&config.log_level);

    tracing::info!(
        orders = %config.order_path.display(),
        units = %config.unit_path.display(),
        "Starting PO dashboard"
    );

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title(config.window_title.clone()),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "PO Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow!("Dashboard window failed: {e}"))
}
