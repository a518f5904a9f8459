//! Mapping engine capability boundary
//!
//! The external mapping engine is consumed through the traits in this module
//! and never reimplemented here: an engine asynchronously produces a live map
//! surface for a credential, and a surface accepts retained overlays (one
//! polyline layer plus styled markers with optional popups) that can be
//! removed again through their handles.
//!
//! The boundary is deliberately pluggable: the application provides a real
//! tile-based engine, while tests use [`fake::FakeEngine`] to resolve load
//! attempts synchronously or on demand.

use crate::dataset::Coordinate;
use thiserror::Error;

pub mod fake;

/// Failures surfaced by the mapping engine, caught at the lifecycle boundary
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The engine itself failed to load (library unreachable, network
    /// failure, or an environment without mapping support)
    #[error("mapping engine failed to load: {0}")]
    ModuleLoad(String),

    /// The engine loaded but surface construction or its initial style/tile
    /// load failed (missing mount target, credential rejected, ...)
    #[error("map surface initialization failed: {0}")]
    SurfaceInit(String),
}

/// The access token required by the mapping engine to render tiles
///
/// Treated as an opaque string: replaced wholesale on retry, never validated
/// for format, never mutated in place.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Credential {
    // Keep tokens out of logs
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(len={})", self.0.len())
    }
}

/// The drawable region the page shell hands to the map
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MountTarget {
    id: String,
}

impl MountTarget {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Initial viewport configuration for a new surface
#[derive(Clone, Debug)]
pub struct SurfaceConfig {
    /// Engine style identifier (e.g. a dark basemap)
    pub style: String,
    /// Initial map center
    pub center: Coordinate,
    /// Initial zoom level
    pub zoom: f64,
    /// Initial camera pitch in degrees (engines without tilt ignore this)
    pub pitch: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            style: "dark-v11".to_string(),
            center: geo::Point::new(0.0, 0.0),
            zoom: 2.0,
            pitch: 0.0,
        }
    }
}

/// Opaque reference to a drawn marker or line layer
///
/// Required to remove that element later; issued by the surface, unique
/// within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OverlayHandle(u64);

impl OverlayHandle {
    /// Wrap a surface-issued id; only surface implementations should call this
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Visual category of a marker; the concrete visuals live behind the surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarkerKind {
    /// Hydration station marker
    Hydration,
    /// Compact numeric kilometer marker
    Distance { km: f64 },
    /// Distinct larger start/finish marker
    Start,
    /// Landmark marker
    Landmark,
}

/// A marker and its optional popup, attached to the surface atomically
#[derive(Clone, Debug)]
pub struct MarkerSpec {
    pub kind: MarkerKind,
    pub coords: Coordinate,
    /// Popup content shown when the marker is activated
    pub popup: Option<String>,
}

/// Fixed style for a polyline layer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub color_rgb: [u8; 3],
    pub width: f32,
    pub opacity: f32,
}

/// A live mapping-engine viewport bound to a mount target
///
/// Overlay handles returned here stay valid until removed or until the
/// surface is disposed. `dispose` releases the surface and every overlay
/// still attached; afterwards the surface accepts no further overlays.
pub trait MapSurface {
    /// Attach a polyline layer keyed by the given line string
    fn add_polyline(
        &mut self,
        path: &[Coordinate],
        style: LineStyle,
    ) -> Result<OverlayHandle, EngineError>;

    /// Attach a marker together with its popup (atomic: both or neither)
    fn add_marker(&mut self, marker: MarkerSpec) -> Result<OverlayHandle, EngineError>;

    /// Remove a previously attached overlay; unknown handles are ignored
    fn remove_overlay(&mut self, handle: OverlayHandle);

    /// Number of overlays currently attached
    fn live_overlays(&self) -> usize;

    /// Release the surface and all attached overlays
    fn dispose(&mut self);
}

/// An in-flight load attempt
///
/// Polled from the UI tick; yields the surface once the engine module has
/// loaded and the surface has finished its initial style/tile load. Dropping
/// a pending attempt abandons it: a resolution that fires afterwards has no
/// observable effect.
pub trait PendingSurface {
    type Surface: MapSurface;

    fn poll(&mut self) -> Option<Result<Self::Surface, EngineError>>;
}

/// Asynchronous acquisition of a map surface for a credential
pub trait MapEngine {
    type Surface: MapSurface;
    type Pending: PendingSurface<Surface = Self::Surface>;

    /// Start a load attempt against the given mount target
    fn begin_load(
        &self,
        credential: &Credential,
        target: &MountTarget,
        config: &SurfaceConfig,
    ) -> Self::Pending;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_redacts_token() {
        let credential = Credential::new("pk.secret-token");
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("len=15"));
    }

    #[test]
    fn test_empty_credential() {
        assert!(Credential::new("").is_empty());
        assert!(!Credential::new("x").is_empty());
    }
}
