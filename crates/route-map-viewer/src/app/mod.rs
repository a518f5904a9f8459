//! Application module
//!
//! Wires the lifecycle controller to the eframe update loop:
//! - Full-screen map view while the session is ready
//! - Loading indicator while the engine load is in flight
//! - Credential fallback view while degraded
//! - Toggleable sidebar with route legend, stats, and lifecycle status

mod engine;
mod plugin;
mod settings;
mod state;
mod ui_panels;

use engine::TileEngine;
use route_map_lib::{LifecycleState, MapLifecycleController, MountTarget, sample};
use settings::Settings;
use state::{FallbackState, UiSettings};

/// Main application structure
pub struct RouteMapApp {
    /// Owns the engine lifecycle and the live map session
    controller: MapLifecycleController<TileEngine>,

    /// Runtime UI settings
    ui_settings: UiSettings,

    /// Credential fallback input state
    fallback: FallbackState,
}

impl RouteMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let cli_args = Settings::from_cli();
        let dataset = sample::quibdo_half_marathon();

        tracing::info!(
            route_points = dataset.route().len(),
            overlays = dataset.overlay_count(),
            "initialized race dataset"
        );

        let engine = TileEngine::new(cc.egui_ctx.clone());
        let mut controller = MapLifecycleController::new(
            engine,
            dataset,
            cli_args.surface_config(),
            cli_args.credential(),
        );

        // Page mount: the central panel is the drawable region
        controller.mount(MountTarget::new("route_map"));

        Self {
            controller,
            ui_settings: UiSettings::default(),
            fallback: FallbackState::default(),
        }
    }
}

#[profiling::all_functions]
impl eframe::App for RouteMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Drive the in-flight load attempt, if any
        self.controller.tick();

        ui_panels::render_sidebar(ctx, &mut self.ui_settings, &self.controller);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                match self.controller.state() {
                    LifecycleState::Loading => {
                        ui.centered_and_justified(|ui| {
                            ui.vertical_centered(|ui| {
                                ui.add_space(ui.available_height() * 0.4);
                                ui.spinner();
                                ui.label("Cargando mapa...");
                            });
                        });
                        ctx.request_repaint();
                    }
                    LifecycleState::Ready => {
                        if let Some(session) = self.controller.session_mut() {
                            let surface = session.surface_mut();
                            surface.show(ui);
                            let attribution = surface.attribution_text();

                            let screen_rect = ui.max_rect();
                            ui.painter().text(
                                screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                                egui::Align2::CENTER_BOTTOM,
                                attribution,
                                egui::FontId::proportional(10.0),
                                egui::Color32::from_black_alpha(180),
                            );
                        }
                    }
                    LifecycleState::Degraded(reason) => {
                        if let Some(credential) =
                            ui_panels::credential_fallback(ui, &mut self.fallback, reason)
                        {
                            self.controller.submit_credential(credential);
                            ctx.request_repaint();
                        }
                    }
                    LifecycleState::Idle => {}
                }

                ui_panels::sidebar_toggle_button(ui, &mut self.ui_settings);
            });
    }

    fn on_exit(&mut self) {
        // Unmount: release the session, its overlays, and the tile fetcher
        self.controller.dispose();
    }
}
