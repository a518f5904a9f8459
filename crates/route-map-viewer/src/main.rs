#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

mod app;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    // Setup logging
    tracing_subscriber::fmt::init();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("Ruta - Media Maratón de Quibdó"),
        ..Default::default()
    };

    let _ = eframe::run_native(
        "route-map-viewer",
        native_options,
        Box::new(|cc| Ok(Box::new(app::RouteMapApp::new(cc)))),
    );
}
