//! PdfVault - desktop PDF library manager
//!
//! Drag-and-drop PDF import, persistence in an embedded key-value store,
//! and a built-in page-by-page viewer.

mod app;
mod core;
mod ui;

use app::PdfVaultApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting PdfVault...");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([800.0, 560.0])
            .with_title("PdfVault"),
        ..Default::default()
    };

    eframe::run_native(
        "PdfVault",
        native_options,
        Box::new(|cc| Ok(Box::new(PdfVaultApp::new(cc)))),
    )
}
