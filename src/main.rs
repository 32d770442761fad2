// Prevents an extra console window on Windows in release builds.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::sync::Arc;

use tracing::{info, warn};
use ziphopp::app::ZipHopp;
use ziphopp::backend::ZipBackend;
use ziphopp::config::Config;
use ziphopp::store::HistoryStore;

fn main() -> Result<(), eframe::Error> {
    // Initialize logging with reasonable defaults
    tracing_subscriber::fmt::init();

    let config = Config::from_env().unwrap_or_else(|e| {
        warn!("Ignoring configuration: {}", e);
        Config::default()
    });

    let store = HistoryStore::open(&config.history_file, config.history_capacity)
        .unwrap_or_else(|e| {
            warn!("Recent files will not be saved: {}", e);
            HistoryStore::in_memory(config.history_capacity)
        });

    info!("Starting ZipHopp");

    let options = eframe::NativeOptions {
        vsync: true,
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_title("ZipHopp"),
        ..Default::default()
    };

    let backend = Arc::new(ZipBackend::new(store));
    eframe::run_native(
        "ZipHopp",
        options,
        Box::new(move |cc| Ok(Box::new(ZipHopp::new(&cc.egui_ctx, backend, &config)))),
    )
}
