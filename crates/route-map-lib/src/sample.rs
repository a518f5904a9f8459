//! Built-in race geodata: the 21 km half-marathon loop through Quibdó
//!
//! Constructed once at startup and shared via `Arc` for the lifetime of the
//! application.

use crate::dataset::{
    Coordinate, DistanceMarker, GeoDataset, HydrationPoint, PoiKind, PointOfInterest,
};
use geo::{Point, Rect};
use std::sync::Arc;

/// Plausible bounding box around Quibdó used as the coordinate sanity bound
pub fn quibdo_region() -> Rect<f64> {
    Rect::new(
        geo::Coord { x: -77.2, y: 5.2 },
        geo::Coord { x: -76.2, y: 6.2 },
    )
}

/// Recommended initial map center for the sample route
pub fn default_center() -> Coordinate {
    Point::new(-76.6400, 5.6950)
}

/// The half-marathon route dataset
///
/// A closed 19-point loop starting and finishing at Parque Centenario, with
/// 4 hydration stations, 10 kilometer markers, and 4 points of interest.
pub fn quibdo_half_marathon() -> Arc<GeoDataset> {
    let route = vec![
        Point::new(-76.6536, 5.6947), // Parque Centenario (start)
        Point::new(-76.6520, 5.6960),
        Point::new(-76.6490, 5.6980),
        Point::new(-76.6450, 5.7010),
        Point::new(-76.6400, 5.7050),
        Point::new(-76.6350, 5.7080),
        Point::new(-76.6300, 5.7100),
        Point::new(-76.6250, 5.7080),
        Point::new(-76.6200, 5.7050),
        Point::new(-76.6180, 5.7000),
        Point::new(-76.6200, 5.6950),
        Point::new(-76.6250, 5.6900),
        Point::new(-76.6300, 5.6850),
        Point::new(-76.6350, 5.6820),
        Point::new(-76.6400, 5.6800),
        Point::new(-76.6450, 5.6820),
        Point::new(-76.6500, 5.6860),
        Point::new(-76.6536, 5.6900),
        Point::new(-76.6536, 5.6947), // back at the finish
    ];

    let hydration_points = vec![
        hydration(5.0, -76.6400, 5.7050),
        hydration(10.0, -76.6200, 5.7050),
        hydration(15.0, -76.6300, 5.6850),
        hydration(18.0, -76.6450, 5.6820),
    ];

    let distance_markers = vec![
        km(1.0, -76.6520, 5.6960),
        km(3.0, -76.6450, 5.7010),
        km(5.0, -76.6400, 5.7050),
        km(7.0, -76.6300, 5.7100),
        km(10.0, -76.6200, 5.7050),
        km(12.0, -76.6200, 5.6950),
        km(15.0, -76.6300, 5.6850),
        km(18.0, -76.6450, 5.6820),
        km(20.0, -76.6500, 5.6860),
        km(21.0, -76.6536, 5.6947),
    ];

    let points_of_interest = vec![
        PointOfInterest {
            name: "Parque Centenario (Salida/Meta)".to_string(),
            coords: Point::new(-76.6536, 5.6947),
            kind: PoiKind::Start,
        },
        PointOfInterest {
            name: "Malecón del Atrato".to_string(),
            coords: Point::new(-76.6350, 5.7080),
            kind: PoiKind::Landmark,
        },
        PointOfInterest {
            name: "Catedral San Francisco de Asís".to_string(),
            coords: Point::new(-76.6520, 5.6930),
            kind: PoiKind::Landmark,
        },
        PointOfInterest {
            name: "Plaza César Conto".to_string(),
            coords: Point::new(-76.6480, 5.6920),
            kind: PoiKind::Landmark,
        },
    ];

    GeoDataset::new(
        route,
        hydration_points,
        distance_markers,
        points_of_interest,
        quibdo_region(),
    )
    .expect("built-in dataset is valid")
}

fn hydration(distance_km: f64, lon: f64, lat: f64) -> HydrationPoint {
    HydrationPoint {
        distance_km,
        coords: Point::new(lon, lat),
        label: format!("Punto de Hidratación Km {distance_km:.0}"),
    }
}

fn km(distance_km: f64, lon: f64, lat: f64) -> DistanceMarker {
    DistanceMarker {
        distance_km,
        coords: Point::new(lon, lat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_dataset_is_valid() {
        let dataset = quibdo_half_marathon();
        assert_eq!(dataset.route().len(), 19);
        assert_eq!(dataset.hydration_points().len(), 4);
        assert_eq!(dataset.distance_markers().len(), 10);
        assert_eq!(dataset.points_of_interest().len(), 4);
        assert_eq!(dataset.overlay_count(), 19);
    }

    #[test]
    fn test_sample_route_is_a_closed_loop() {
        let dataset = quibdo_half_marathon();
        assert_eq!(dataset.route().first(), dataset.route().last());
    }

    #[test]
    fn test_sample_route_length_is_plausible() {
        // The drawn polyline is a coarse approximation of the 21.097 km
        // course, so only sanity-check the order of magnitude.
        let length_km = quibdo_half_marathon().route_length_meters() / 1000.0;
        assert!(length_km > 5.0, "got {length_km}");
        assert!(length_km < 30.0, "got {length_km}");
    }

    #[test]
    fn test_sample_has_single_start() {
        let dataset = quibdo_half_marathon();
        let start = dataset.start_point().unwrap();
        assert!(start.name.contains("Parque Centenario"));
    }

    #[test]
    fn test_default_center_inside_region() {
        let region = quibdo_region();
        let center = default_center();
        assert!(center.x() > region.min().x && center.x() < region.max().x);
        assert!(center.y() > region.min().y && center.y() < region.max().y);
    }
}
