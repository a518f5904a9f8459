//! Race route geodata model
//!
//! This module provides the `GeoDataset` struct: an immutable, validated
//! description of the race route with precomputed metadata like the bounding
//! box and total route length.

use geo::{Point, Rect};
use std::sync::Arc;
use thiserror::Error;

/// A geographic coordinate: x is longitude, y is latitude (WGS84 degrees).
pub type Coordinate = Point<f64>;

/// Error types for dataset construction
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("route must have at least 2 points, got {0}")]
    RouteTooShort(usize),

    #[error("coordinate ({lon}, {lat}) outside the deployment region")]
    OutOfRegion { lon: f64, lat: f64 },

    #[error("duplicate {set} entry at km {distance_km}")]
    DuplicateDistance { set: &'static str, distance_km: f64 },

    #[error("hydration point at km {0} must have a positive distance")]
    NonPositiveDistance(f64),

    #[error("distance marker at km {0} must not be negative")]
    NegativeDistance(f64),

    #[error("distance markers must be non-decreasing, km {0} follows km {1}")]
    UnorderedDistanceMarkers(f64, f64),

    #[error("more than one point of interest is marked as the start")]
    MultipleStartPoints,
}

pub type Result<T> = std::result::Result<T, DatasetError>;

/// A staffed hydration station along the route
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HydrationPoint {
    /// Distance from the start in kilometers (positive)
    pub distance_km: f64,
    /// Location of the station
    pub coords: Coordinate,
    /// Display label, shown in the marker popup
    pub label: String,
}

/// A compact numeric kilometer marker along the route
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceMarker {
    /// Distance from the start in kilometers (non-negative)
    pub distance_km: f64,
    /// Location of the marker
    pub coords: Coordinate,
}

/// Category of a point of interest
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoiKind {
    /// The start/finish area; rendered with a distinct larger marker
    Start,
    /// A landmark along or near the route
    Landmark,
}

/// A named point of interest near the route
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointOfInterest {
    /// Display name, shown in the marker popup
    pub name: String,
    /// Location of the point of interest
    pub coords: Coordinate,
    /// Marker category
    pub kind: PoiKind,
}

/// Immutable description of the race route and everything drawn on top of it
///
/// Constructed once at startup and shared read-only (via `Arc`) across map
/// reloads and credential retries without copying.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoDataset {
    /// Ordered route polyline; first and last point may coincide (closed loop)
    route: Vec<Coordinate>,
    /// Hydration stations, unique by distance
    hydration_points: Vec<HydrationPoint>,
    /// Kilometer markers, unique by distance and non-decreasing
    distance_markers: Vec<DistanceMarker>,
    /// Points of interest, at most one marked as the start
    points_of_interest: Vec<PointOfInterest>,
    /// Plausibility bound for every coordinate in the dataset
    region: Rect<f64>,
    /// Cached bounding box of the route (computed once during construction)
    cached_bounding_box: Rect<f64>,
    /// Cached route length in meters (computed once during construction)
    cached_route_length: f64,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl GeoDataset {
    /// Create a new dataset, validating every invariant
    ///
    /// # Arguments
    /// * `region` - Plausible geographic bounding box for the deployment
    ///   region; every coordinate must fall inside it
    ///
    /// # Returns
    /// An `Arc<GeoDataset>` on success, or the first violated invariant
    pub fn new(
        route: Vec<Coordinate>,
        hydration_points: Vec<HydrationPoint>,
        distance_markers: Vec<DistanceMarker>,
        points_of_interest: Vec<PointOfInterest>,
        region: Rect<f64>,
    ) -> Result<Arc<Self>> {
        if route.len() < 2 {
            return Err(DatasetError::RouteTooShort(route.len()));
        }

        for point in &route {
            check_in_region(point, &region)?;
        }

        let mut seen_km: Vec<f64> = Vec::with_capacity(hydration_points.len());
        for point in &hydration_points {
            check_in_region(&point.coords, &region)?;
            if point.distance_km <= 0.0 {
                return Err(DatasetError::NonPositiveDistance(point.distance_km));
            }
            if seen_km.contains(&point.distance_km) {
                return Err(DatasetError::DuplicateDistance {
                    set: "hydration point",
                    distance_km: point.distance_km,
                });
            }
            seen_km.push(point.distance_km);
        }

        let mut prev_km: Option<f64> = None;
        for marker in &distance_markers {
            check_in_region(&marker.coords, &region)?;
            if marker.distance_km < 0.0 {
                return Err(DatasetError::NegativeDistance(marker.distance_km));
            }
            if let Some(prev) = prev_km {
                if marker.distance_km == prev {
                    return Err(DatasetError::DuplicateDistance {
                        set: "distance marker",
                        distance_km: marker.distance_km,
                    });
                }
                if marker.distance_km < prev {
                    return Err(DatasetError::UnorderedDistanceMarkers(
                        marker.distance_km,
                        prev,
                    ));
                }
            }
            prev_km = Some(marker.distance_km);
        }

        let mut start_count = 0;
        for poi in &points_of_interest {
            check_in_region(&poi.coords, &region)?;
            if poi.kind == PoiKind::Start {
                start_count += 1;
            }
        }
        if start_count > 1 {
            return Err(DatasetError::MultipleStartPoints);
        }

        let cached_bounding_box = bounding_box(&route);
        let cached_route_length = route_length_meters(&route);

        tracing::debug!(
            route_points = route.len(),
            hydration = hydration_points.len(),
            markers = distance_markers.len(),
            pois = points_of_interest.len(),
            "validated geodata"
        );

        Ok(Arc::new(GeoDataset {
            route,
            hydration_points,
            distance_markers,
            points_of_interest,
            region,
            cached_bounding_box,
            cached_route_length,
        }))
    }

    /// The ordered route polyline
    #[inline]
    pub fn route(&self) -> &[Coordinate] {
        &self.route
    }

    /// Hydration stations in input order
    #[inline]
    pub fn hydration_points(&self) -> &[HydrationPoint] {
        &self.hydration_points
    }

    /// Kilometer markers in input order
    #[inline]
    pub fn distance_markers(&self) -> &[DistanceMarker] {
        &self.distance_markers
    }

    /// Points of interest in input order
    #[inline]
    pub fn points_of_interest(&self) -> &[PointOfInterest] {
        &self.points_of_interest
    }

    /// The deployment region used as the coordinate plausibility bound
    #[inline]
    pub fn region(&self) -> Rect<f64> {
        self.region
    }

    /// The start/finish point of interest, if one is defined
    pub fn start_point(&self) -> Option<&PointOfInterest> {
        self.points_of_interest
            .iter()
            .find(|poi| poi.kind == PoiKind::Start)
    }

    /// Bounding box of the route polyline in WGS84 degrees
    ///
    /// This is O(1) as the value is cached during construction.
    #[inline]
    pub fn bounding_box(&self) -> Rect<f64> {
        self.cached_bounding_box
    }

    /// Total route length in meters (haversine over consecutive points)
    ///
    /// This is O(1) as the value is cached during construction.
    #[inline]
    pub fn route_length_meters(&self) -> f64 {
        self.cached_route_length
    }

    /// Number of overlay handles a full render of this dataset produces:
    /// one route line plus one marker per entry in each category
    pub fn overlay_count(&self) -> usize {
        1 + self.hydration_points.len() + self.distance_markers.len() + self.points_of_interest.len()
    }
}

fn check_in_region(point: &Coordinate, region: &Rect<f64>) -> Result<()> {
    let (lon, lat) = (point.x(), point.y());
    if lon < region.min().x || lon > region.max().x || lat < region.min().y || lat > region.max().y
    {
        return Err(DatasetError::OutOfRegion { lon, lat });
    }
    Ok(())
}

fn bounding_box(route: &[Coordinate]) -> Rect<f64> {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for point in route {
        min_x = min_x.min(point.x());
        min_y = min_y.min(point.y());
        max_x = max_x.max(point.x());
        max_y = max_y.max(point.y());
    }

    Rect::new(
        geo::Coord { x: min_x, y: min_y },
        geo::Coord { x: max_x, y: max_y },
    )
}

/// Total polyline length in meters using the haversine formula
fn route_length_meters(route: &[Coordinate]) -> f64 {
    route
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}

/// Haversine distance between two WGS84 points in meters
#[inline]
fn haversine_distance(p1: &Coordinate, p2: &Coordinate) -> f64 {
    let lat1 = p1.y().to_radians();
    let lat2 = p2.y().to_radians();
    let delta_lat = (p2.y() - p1.y()).to_radians();
    let delta_lon = (p2.x() - p1.x()).to_radians();

    let a =
        (delta_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    // Earth's radius in meters
    const EARTH_RADIUS_M: f64 = 6371000.0;
    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_region() -> Rect<f64> {
        Rect::new(geo::Coord { x: -1.0, y: -1.0 }, geo::Coord { x: 1.0, y: 1.0 })
    }

    fn small_route() -> Vec<Coordinate> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(0.1, 0.1),
            Point::new(0.2, 0.0),
        ]
    }

    #[test]
    fn test_valid_dataset() {
        let dataset = GeoDataset::new(
            small_route(),
            vec![HydrationPoint {
                distance_km: 5.0,
                coords: Point::new(0.1, 0.1),
                label: "Km 5".to_string(),
            }],
            vec![
                DistanceMarker {
                    distance_km: 1.0,
                    coords: Point::new(0.05, 0.05),
                },
                DistanceMarker {
                    distance_km: 2.0,
                    coords: Point::new(0.15, 0.05),
                },
            ],
            vec![PointOfInterest {
                name: "Start".to_string(),
                coords: Point::new(0.0, 0.0),
                kind: PoiKind::Start,
            }],
            test_region(),
        )
        .unwrap();

        assert_eq!(dataset.overlay_count(), 1 + 1 + 2 + 1);
        assert!(dataset.route_length_meters() > 0.0);
        assert!(dataset.start_point().is_some());
    }

    #[test]
    fn test_route_too_short() {
        let result = GeoDataset::new(
            vec![Point::new(0.0, 0.0)],
            vec![],
            vec![],
            vec![],
            test_region(),
        );
        assert!(matches!(result, Err(DatasetError::RouteTooShort(1))));
    }

    #[test]
    fn test_out_of_region_coordinate() {
        let mut route = small_route();
        route.push(Point::new(50.0, 50.0));
        let result = GeoDataset::new(route, vec![], vec![], vec![], test_region());
        assert!(matches!(result, Err(DatasetError::OutOfRegion { .. })));
    }

    #[test]
    fn test_duplicate_hydration_km() {
        let hydration = vec![
            HydrationPoint {
                distance_km: 5.0,
                coords: Point::new(0.1, 0.1),
                label: "a".to_string(),
            },
            HydrationPoint {
                distance_km: 5.0,
                coords: Point::new(0.2, 0.2),
                label: "b".to_string(),
            },
        ];
        let result = GeoDataset::new(small_route(), hydration, vec![], vec![], test_region());
        assert!(matches!(
            result,
            Err(DatasetError::DuplicateDistance { set: "hydration point", .. })
        ));
    }

    #[test]
    fn test_unordered_distance_markers() {
        let markers = vec![
            DistanceMarker {
                distance_km: 3.0,
                coords: Point::new(0.1, 0.1),
            },
            DistanceMarker {
                distance_km: 1.0,
                coords: Point::new(0.2, 0.2),
            },
        ];
        let result = GeoDataset::new(small_route(), vec![], markers, vec![], test_region());
        assert!(matches!(
            result,
            Err(DatasetError::UnorderedDistanceMarkers(1.0, 3.0))
        ));
    }

    #[test]
    fn test_two_start_points_rejected() {
        let pois = vec![
            PointOfInterest {
                name: "a".to_string(),
                coords: Point::new(0.0, 0.0),
                kind: PoiKind::Start,
            },
            PointOfInterest {
                name: "b".to_string(),
                coords: Point::new(0.1, 0.1),
                kind: PoiKind::Start,
            },
        ];
        let result = GeoDataset::new(small_route(), vec![], vec![], pois, test_region());
        assert!(matches!(result, Err(DatasetError::MultipleStartPoints)));
    }

    #[test]
    fn test_closed_loop_permitted() {
        let route = vec![
            Point::new(0.0, 0.0),
            Point::new(0.1, 0.1),
            Point::new(0.0, 0.0),
        ];
        let dataset = GeoDataset::new(route, vec![], vec![], vec![], test_region()).unwrap();
        assert_eq!(dataset.route().first(), dataset.route().last());
    }

    #[test]
    fn test_bounding_box_covers_route() {
        let dataset =
            GeoDataset::new(small_route(), vec![], vec![], vec![], test_region()).unwrap();
        let bbox = dataset.bounding_box();
        assert!(bbox.width() > 0.0);
        assert!(bbox.height() > 0.0);
        assert!((bbox.min().x - 0.0).abs() < f64::EPSILON);
        assert!((bbox.max().x - 0.2).abs() < f64::EPSILON);
    }
}
