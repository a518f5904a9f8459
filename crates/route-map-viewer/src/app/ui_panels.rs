//! UI panels for the application
//!
//! Sidebar with the route legend and stats, the lifecycle status tab, the
//! sidebar toggle button, and the credential fallback view shown in place of
//! the map when the engine is degraded.

use egui::{Color32, RichText, Ui};
use route_map_lib::{Credential, DegradeReason, GeoDataset, LifecycleState, MapLifecycleController};

use super::engine::TileEngine;
use super::state::{FallbackState, SidebarTab, UiSettings};

/// Render the sidebar toggle button (overlaid on top-right of map)
pub fn sidebar_toggle_button(ui: &mut Ui, ui_settings: &mut UiSettings) {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    let rect = ui.max_rect();
    let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui.allocate_rect(button_rect, egui::Sense::click());
    if response.clicked() {
        ui_settings.sidebar_open = !ui_settings.sidebar_open;
    }

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };
    ui.painter().rect_filled(button_rect, 5.0, bg_color);

    let icon = if ui_settings.sidebar_open { "✕" } else { "☰" };
    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );
}

/// Render the main sidebar (responsive: side on landscape, bottom on portrait)
pub fn render_sidebar(
    ctx: &egui::Context,
    ui_settings: &mut UiSettings,
    controller: &MapLifecycleController<TileEngine>,
) {
    if !ui_settings.sidebar_open {
        return;
    }

    let screen_size = ctx.viewport_rect().size();
    let is_portrait = screen_size.y > screen_size.x;

    if is_portrait {
        egui::TopBottomPanel::bottom("route_sidebar")
            .default_height(260.0)
            .resizable(true)
            .show(ctx, |ui| sidebar_content(ui, ui_settings, controller));
    } else {
        egui::SidePanel::right("route_sidebar")
            .default_width(300.0)
            .min_width(260.0)
            .resizable(true)
            .show(ctx, |ui| sidebar_content(ui, ui_settings, controller));
    }
}

fn sidebar_content(
    ui: &mut Ui,
    ui_settings: &mut UiSettings,
    controller: &MapLifecycleController<TileEngine>,
) {
    ui.horizontal(|ui| {
        ui.selectable_value(&mut ui_settings.active_tab, SidebarTab::Route, "Ruta");
        ui.selectable_value(&mut ui_settings.active_tab, SidebarTab::Status, "Estado");
    });
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| match ui_settings.active_tab {
        SidebarTab::Route => route_tab(ui, controller.dataset()),
        SidebarTab::Status => status_tab(ui, controller),
    });
}

fn route_tab(ui: &mut Ui, dataset: &GeoDataset) {
    ui.heading("Ruta de 21 Kilómetros");
    ui.add_space(8.0);

    legend_row(ui, Color32::from_rgb(34, 197, 94), "Salida/Meta");
    legend_row(ui, Color32::from_rgb(59, 130, 246), "Hidratación");
    legend_row(ui, Color32::from_rgb(234, 179, 8), "Kilómetros");
    legend_row(ui, Color32::from_rgb(168, 85, 247), "Punto de Interés");

    ui.add_space(8.0);
    ui.separator();

    stat_row(ui, "Distancia total", &format_distance(dataset.route_length_meters()));
    stat_row(
        ui,
        "Puntos de hidratación",
        &dataset.hydration_points().len().to_string(),
    );
    stat_row(
        ui,
        "Marcadores de km",
        &dataset.distance_markers().len().to_string(),
    );
    stat_row(
        ui,
        "Puntos de interés",
        &dataset.points_of_interest().len().to_string(),
    );

    ui.add_space(8.0);
    ui.separator();
    ui.label(RichText::new("Puntos de Hidratación").strong());
    for point in dataset.hydration_points() {
        ui.label(format!(
            "Km {:.0}: Agua + Isotónico",
            point.distance_km
        ));
    }
}

fn legend_row(ui: &mut Ui, color: Color32, label: &str) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
        ui.painter().circle_filled(rect.center(), 6.0, color);
        ui.label(label);
    });
}

fn stat_row(ui: &mut Ui, label: &str, value: &str) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(value).strong());
        });
    });
}

fn status_tab(ui: &mut Ui, controller: &MapLifecycleController<TileEngine>) {
    ui.heading("Estado del mapa");
    ui.add_space(8.0);

    let (label, color) = match controller.state() {
        LifecycleState::Idle => ("Inactivo", Color32::GRAY),
        LifecycleState::Loading => ("Cargando", Color32::from_rgb(234, 179, 8)),
        LifecycleState::Ready => ("Listo", Color32::from_rgb(34, 197, 94)),
        LifecycleState::Degraded(_) => ("Degradado", Color32::from_rgb(239, 68, 68)),
    };
    ui.label(RichText::new(label).color(color).strong());

    if let LifecycleState::Degraded(reason) = controller.state() {
        ui.label(format!("Motivo: {reason}"));
    }

    if let Some(session) = controller.session() {
        stat_row(ui, "Sesión", &session.id().to_string());
        stat_row(ui, "Capas activas", &session.overlay_count().to_string());
    }
}

/// Fallback view shown in place of the map surface while degraded
///
/// Returns the submitted credential, if any; the caller forwards it to the
/// lifecycle controller.
pub fn credential_fallback(
    ui: &mut Ui,
    fallback: &mut FallbackState,
    reason: DegradeReason,
) -> Option<Credential> {
    let mut submitted = None;

    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.3);
            ui.label(RichText::new("⚠").size(40.0).color(Color32::from_rgb(234, 179, 8)));
            ui.heading("Token de acceso requerido");
            ui.label(match reason {
                DegradeReason::ModuleLoad => {
                    "El motor de mapas no pudo cargarse. Ingresa tu token público para reintentar."
                }
                DegradeReason::SurfaceInit => {
                    "El mapa no pudo inicializarse. Ingresa tu token público para reintentar."
                }
            });
            ui.add_space(8.0);

            let input = egui::TextEdit::singleline(&mut fallback.input)
                .hint_text("pk.eyJ1...")
                .desired_width(320.0);
            let input_response = ui.add(input);

            let enter_pressed =
                input_response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            ui.add_space(8.0);
            if ui.button("Cargar Mapa").clicked() || enter_pressed {
                submitted = fallback.try_submit();
            }
        });
    });

    submitted
}

/// Format a distance in meters as a human-readable string
pub fn format_distance(meters: f64) -> String {
    let km = meters / 1000.0;
    if km < 1.0 {
        format!("{meters:.0} m")
    } else {
        format!("{km:.2} km")
    }
}
