mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::Path;

use app::SalesDashboardApp;
use eframe::egui;

/// Workbook opened automatically when present in the working directory.
const DEFAULT_WORKBOOK: &str = "supermarkt_sales.xlsx";

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 760.0])
            .with_min_inner_size([700.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Dashboard",
        options,
        Box::new(|_cc| {
            let mut app = SalesDashboardApp::default();
            let default_source = Path::new(DEFAULT_WORKBOOK);
            if default_source.exists() {
                app.state.open(default_source);
            }
            Ok(Box::new(app))
        }),
    )
}
