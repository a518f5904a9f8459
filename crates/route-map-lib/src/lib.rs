//! Route Map Library - Core model and lifecycle for the race route viewer
//!
//! This library provides the map-independent core of the route viewer: the
//! immutable race geodata, the capability boundary to an external mapping
//! engine, the asynchronous map lifecycle state machine, and the overlay
//! renderer that projects the geodata onto a live map surface.
//!
//! # Architecture
//!
//! - **[`GeoDataset`]**: Immutable, validated description of the race route
//! - **[`MapEngine`]** / **[`MapSurface`]**: Pluggable mapping engine boundary
//! - **[`MapLifecycleController`]**: `Idle -> Loading -> Ready | Degraded`
//!   state machine with scoped session ownership
//! - **[`render_overlays`]**: Projects a dataset onto a ready surface
//!
//! The engine boundary is polymorphic so the application can plug in a real
//! tile-based engine while tests use [`engine::fake::FakeEngine`] without any
//! network access.

mod dataset;
pub mod engine;
mod lifecycle;
mod overlay;
pub mod sample;

// Public API exports
pub use dataset::{
    Coordinate, DatasetError, DistanceMarker, GeoDataset, HydrationPoint, PoiKind, PointOfInterest,
};
pub use engine::{
    Credential, EngineError, LineStyle, MapEngine, MapSurface, MarkerKind, MarkerSpec, MountTarget,
    OverlayHandle, PendingSurface, SurfaceConfig,
};
pub use lifecycle::{DegradeReason, LifecycleState, MapLifecycleController, MapSession};
pub use overlay::{ROUTE_LINE_STYLE, render_overlays};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that the main entry points are accessible
        let _: fn() -> std::sync::Arc<GeoDataset> = sample::quibdo_half_marathon;
        let _: fn() -> SurfaceConfig = SurfaceConfig::default;
    }
}
