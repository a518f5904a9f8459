//! Walkers plugin for drawing the retained overlay scene
//!
//! Projects the route line and every marker from the shared scene into
//! screen space each frame, and toggles marker popups on click. Visual
//! styling per marker category lives here and nowhere else.

use egui::{Align2, Color32, FontId, Pos2, Stroke};
use route_map_lib::{LineStyle, MarkerKind, MarkerSpec, OverlayHandle};
use std::sync::{Arc, RwLock};
use walkers::{Plugin, Projector};

use super::engine::{OverlayScene, SceneKind};

/// Plugin rendering the race route scene on the map
pub struct RouteOverlayPlugin {
    scene: Arc<RwLock<OverlayScene>>,
}

impl RouteOverlayPlugin {
    pub fn new(scene: Arc<RwLock<OverlayScene>>) -> Self {
        Self { scene }
    }
}

/// Screen radius of a marker, used for drawing and for click hit-testing
fn marker_radius(kind: &MarkerKind) -> f32 {
    match kind {
        MarkerKind::Start => 20.0,
        MarkerKind::Hydration => 16.0,
        MarkerKind::Landmark => 16.0,
        MarkerKind::Distance { .. } => 12.0,
    }
}

fn marker_fill(kind: &MarkerKind) -> Color32 {
    match kind {
        MarkerKind::Start => Color32::from_rgb(34, 197, 94),
        MarkerKind::Hydration => Color32::from_rgb(59, 130, 246),
        MarkerKind::Landmark => Color32::from_rgb(168, 85, 247),
        MarkerKind::Distance { .. } => Color32::from_rgb(234, 179, 8),
    }
}

fn marker_glyph(kind: &MarkerKind) -> (String, Color32) {
    match kind {
        MarkerKind::Start => ("🏁".to_string(), Color32::WHITE),
        MarkerKind::Hydration => ("💧".to_string(), Color32::WHITE),
        MarkerKind::Landmark => ("📍".to_string(), Color32::WHITE),
        MarkerKind::Distance { km } => (format_km(*km), Color32::BLACK),
    }
}

/// Compact kilometer label: whole numbers without a fraction
fn format_km(km: f64) -> String {
    if km.fract() == 0.0 {
        format!("{km:.0}")
    } else {
        format!("{km:.1}")
    }
}

fn line_color(style: &LineStyle) -> Color32 {
    let [r, g, b] = style.color_rgb;
    Color32::from_rgba_unmultiplied(r, g, b, (style.opacity.clamp(0.0, 1.0) * 255.0) as u8)
}

fn draw_marker(painter: &egui::Painter, pos: Pos2, spec: &MarkerSpec) {
    let radius = marker_radius(&spec.kind);
    let fill = marker_fill(&spec.kind);

    // Start and landmark markers carry a white border like the site legend
    let border = match spec.kind {
        MarkerKind::Start => Stroke::new(3.0, Color32::WHITE),
        MarkerKind::Hydration | MarkerKind::Landmark => Stroke::new(2.0, Color32::WHITE),
        MarkerKind::Distance { .. } => Stroke::NONE,
    };

    painter.circle(pos, radius, fill, border);

    let (glyph, glyph_color) = marker_glyph(&spec.kind);
    painter.text(
        pos,
        Align2::CENTER_CENTER,
        glyph,
        FontId::proportional(radius),
        glyph_color,
    );
}

fn draw_popup(painter: &egui::Painter, anchor: Pos2, text: &str) {
    let font = FontId::proportional(13.0);
    let galley = painter.layout_no_wrap(text.to_string(), font.clone(), Color32::WHITE);
    let padding = egui::vec2(8.0, 6.0);
    let size = galley.size() + padding * 2.0;
    let rect = egui::Rect::from_min_size(
        anchor + egui::vec2(-size.x / 2.0, -size.y - 28.0),
        size,
    );

    painter.rect_filled(rect, 6.0, Color32::from_black_alpha(220));
    painter.galley(rect.min + padding, galley, Color32::WHITE);
}

impl Plugin for RouteOverlayPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("RouteOverlayPlugin::run");

        let painter = ui.painter();
        let mut scene = self.scene.write().unwrap();

        // Scene order is draw order: the route line was attached first and
        // stays beneath the markers.
        let mut marker_positions: Vec<(OverlayHandle, Pos2, f32)> = Vec::new();
        for item in &scene.items {
            match &item.kind {
                SceneKind::Line { path, style } => {
                    let screen_points: Vec<Pos2> = path
                        .iter()
                        .map(|point| {
                            let position = walkers::lat_lon(point.y(), point.x());
                            let screen_vec = projector.project(position);
                            Pos2::new(screen_vec.x, screen_vec.y)
                        })
                        .collect();

                    if screen_points.len() >= 2 {
                        painter.add(egui::Shape::line(
                            screen_points,
                            Stroke::new(style.width, line_color(style)),
                        ));
                    }
                }
                SceneKind::Marker(spec) => {
                    let position = walkers::lat_lon(spec.coords.y(), spec.coords.x());
                    let screen_vec = projector.project(position);
                    let pos = Pos2::new(screen_vec.x, screen_vec.y);
                    draw_marker(painter, pos, spec);
                    if spec.popup.is_some() {
                        marker_positions.push((item.handle, pos, marker_radius(&spec.kind)));
                    }
                }
            }
        }

        // Toggle popups on marker click
        if response.clicked()
            && let Some(pointer) = response.interact_pointer_pos()
        {
            let hit = marker_positions
                .iter()
                .find(|(_, pos, radius)| pos.distance(pointer) <= *radius)
                .map(|(handle, _, _)| *handle);

            scene.open_popup = match hit {
                Some(handle) if scene.open_popup == Some(handle) => None,
                Some(handle) => Some(handle),
                None => None,
            };
        }

        if let Some(open) = scene.open_popup {
            let anchor = marker_positions
                .iter()
                .find(|(handle, _, _)| *handle == open)
                .map(|(_, pos, _)| *pos);
            let text = scene.items.iter().find_map(|item| match &item.kind {
                SceneKind::Marker(spec) if item.handle == open => spec.popup.clone(),
                _ => None,
            });
            if let (Some(anchor), Some(text)) = (anchor, text) {
                draw_popup(painter, anchor, &text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_km() {
        assert_eq!(format_km(5.0), "5");
        assert_eq!(format_km(21.0), "21");
        assert_eq!(format_km(21.1), "21.1");
    }

    #[test]
    fn test_start_marker_is_largest() {
        assert!(marker_radius(&MarkerKind::Start) > marker_radius(&MarkerKind::Hydration));
        assert!(marker_radius(&MarkerKind::Start) > marker_radius(&MarkerKind::Distance { km: 5.0 }));
    }

    #[test]
    fn test_line_color_applies_opacity() {
        let style = route_map_lib::ROUTE_LINE_STYLE;
        let color = line_color(&style);
        assert_eq!(color.a(), (0.8 * 255.0) as u8);
    }
}
