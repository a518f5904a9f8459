//! Overlay renderer
//!
//! Projects a [`GeoDataset`] onto a ready map surface as a route line plus
//! one marker per dataset entry. Pure with respect to the dataset: the same
//! dataset always produces the same overlays in the same order, and the
//! renderer never disposes anything itself.

use crate::dataset::{GeoDataset, PoiKind};
use crate::engine::{EngineError, LineStyle, MapSurface, MarkerKind, MarkerSpec, OverlayHandle};

/// Fixed route line style: green, beneath all markers
pub const ROUTE_LINE_STYLE: LineStyle = LineStyle {
    color_rgb: [34, 197, 94],
    width: 6.0,
    opacity: 0.8,
};

/// Attach every overlay for `dataset` to `surface`
///
/// The route line is drawn first so markers render above it; marker
/// categories follow in dataset order. Each marker and its popup are
/// attached together by the surface. On failure, every handle created so
/// far is removed before the error is returned, so a failed render leaves
/// the surface as it was found.
///
/// Returns the complete collection of created handles; the caller owns
/// their disposal. Must not be invoked twice against the same live surface
/// without an intervening disposal, or overlays would duplicate.
pub fn render_overlays<S: MapSurface>(
    surface: &mut S,
    dataset: &GeoDataset,
) -> Result<Vec<OverlayHandle>, EngineError> {
    #[cfg(feature = "profiling")]
    profiling::scope!("render_overlays");

    let mut handles = Vec::with_capacity(dataset.overlay_count());

    let result = attach_all(surface, dataset, &mut handles);
    if let Err(e) = result {
        tracing::warn!(attached = handles.len(), error = %e, "overlay render failed, rolling back");
        for handle in handles.drain(..) {
            surface.remove_overlay(handle);
        }
        return Err(e);
    }

    tracing::debug!(count = handles.len(), "overlays attached");
    Ok(handles)
}

fn attach_all<S: MapSurface>(
    surface: &mut S,
    dataset: &GeoDataset,
    handles: &mut Vec<OverlayHandle>,
) -> Result<(), EngineError> {
    handles.push(surface.add_polyline(dataset.route(), ROUTE_LINE_STYLE)?);

    for point in dataset.hydration_points() {
        handles.push(surface.add_marker(MarkerSpec {
            kind: MarkerKind::Hydration,
            coords: point.coords,
            popup: Some(format!("{}\nAgua y bebidas isotónicas", point.label)),
        })?);
    }

    for marker in dataset.distance_markers() {
        handles.push(surface.add_marker(MarkerSpec {
            kind: MarkerKind::Distance {
                km: marker.distance_km,
            },
            coords: marker.coords,
            popup: None,
        })?);
    }

    for poi in dataset.points_of_interest() {
        handles.push(surface.add_marker(MarkerSpec {
            kind: match poi.kind {
                PoiKind::Start => MarkerKind::Start,
                PoiKind::Landmark => MarkerKind::Landmark,
            },
            coords: poi.coords,
            popup: Some(poi.name.clone()),
        })?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fake::FakeEngine;
    use crate::engine::{Credential, MapEngine, MountTarget, PendingSurface, SurfaceConfig};
    use crate::sample;

    fn ready_surface(engine: &FakeEngine) -> crate::engine::fake::FakeSurface {
        engine
            .begin_load(
                &Credential::new("t"),
                &MountTarget::new("map"),
                &SurfaceConfig::default(),
            )
            .poll()
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_handle_count_matches_dataset_cardinality() {
        let dataset = sample::quibdo_half_marathon();
        let engine = FakeEngine::succeeding();
        let mut surface = ready_surface(&engine);

        let handles = render_overlays(&mut surface, &dataset).unwrap();
        assert_eq!(handles.len(), dataset.overlay_count());
        // Sample: 1 route + 4 hydration + 10 distance + 4 POI
        assert_eq!(handles.len(), 19);
        assert_eq!(surface.live_overlays(), 19);
    }

    #[test]
    fn test_handles_are_unique() {
        let dataset = sample::quibdo_half_marathon();
        let engine = FakeEngine::succeeding();
        let mut surface = ready_surface(&engine);

        let handles = render_overlays(&mut surface, &dataset).unwrap();
        let unique: std::collections::HashSet<_> = handles.iter().collect();
        assert_eq!(unique.len(), handles.len());
    }

    #[test]
    fn test_failure_rolls_back_created_handles() {
        let dataset = sample::quibdo_half_marathon();
        let engine = FakeEngine::succeeding().fail_markers_after(3);
        let mut surface = ready_surface(&engine);

        let result = render_overlays(&mut surface, &dataset);
        assert!(result.is_err());
        assert_eq!(surface.live_overlays(), 0);
        assert_eq!(engine.live_overlays(), 0);
    }

    #[test]
    fn test_distance_markers_keep_input_order() {
        // Sorting by distance must reproduce the dataset input order exactly:
        // rendering introduces no reordering.
        let dataset = sample::quibdo_half_marathon();
        let mut sorted = dataset.distance_markers().to_vec();
        sorted.sort_by(|a, b| a.distance_km.partial_cmp(&b.distance_km).unwrap());
        assert_eq!(sorted, dataset.distance_markers());

        let mut hydration_km: Vec<f64> = dataset
            .hydration_points()
            .iter()
            .map(|p| p.distance_km)
            .collect();
        hydration_km.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(
            hydration_km,
            dataset
                .hydration_points()
                .iter()
                .map(|p| p.distance_km)
                .collect::<Vec<_>>()
        );
    }
}
