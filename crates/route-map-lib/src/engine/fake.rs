//! In-memory engine test double
//!
//! `FakeEngine` implements the engine boundary without any network or GPU
//! access. It can resolve load attempts immediately (success or either
//! failure kind) or hold them open until the test resolves them manually,
//! which is how stale-resolution and unmount-while-loading scenarios are
//! exercised. The engine is cheaply cloneable and every clone shares the
//! same counters, so a test can keep a handle after moving the engine into
//! the lifecycle controller.

use super::{
    Credential, EngineError, LineStyle, MapEngine, MapSurface, MarkerSpec, MountTarget,
    OverlayHandle, PendingSurface, SurfaceConfig,
};
use crate::dataset::Coordinate;
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug)]
enum FakeMode {
    Succeed,
    FailModuleLoad,
    FailSurfaceInit,
    Manual,
}

#[derive(Default)]
struct Shared {
    attempts_started: u64,
    surfaces_created: u64,
    surfaces_disposed: u64,
    live_overlays: usize,
    next_handle: u64,
    /// When set, surfaces fail marker additions after this many markers
    marker_failures_after: Option<usize>,
    /// Resolution slots for manual-mode attempts, in begin_load order.
    /// Slots outlive their pending: resolving a slot whose pending was
    /// dropped models a stale async result firing after teardown.
    manual_slots: Vec<Arc<Mutex<Option<Result<(), EngineError>>>>>,
}

/// Engine test double; see module docs
#[derive(Clone)]
pub struct FakeEngine {
    mode: FakeMode,
    shared: Arc<Mutex<Shared>>,
}

impl FakeEngine {
    /// Every attempt resolves successfully on the first poll
    pub fn succeeding() -> Self {
        Self::with_mode(FakeMode::Succeed)
    }

    /// Every attempt fails with `EngineError::ModuleLoad` on the first poll
    pub fn failing_module_load() -> Self {
        Self::with_mode(FakeMode::FailModuleLoad)
    }

    /// Every attempt fails with `EngineError::SurfaceInit` on the first poll
    pub fn failing_surface_init() -> Self {
        Self::with_mode(FakeMode::FailSurfaceInit)
    }

    /// Attempts stay pending until resolved with [`FakeEngine::resolve_next`]
    pub fn manual() -> Self {
        Self::with_mode(FakeMode::Manual)
    }

    fn with_mode(mode: FakeMode) -> Self {
        Self {
            mode,
            shared: Arc::new(Mutex::new(Shared::default())),
        }
    }

    /// Make every surface reject marker additions after `count` markers
    pub fn fail_markers_after(self, count: usize) -> Self {
        self.shared.lock().unwrap().marker_failures_after = Some(count);
        self
    }

    /// Resolve the oldest unresolved manual attempt
    ///
    /// Returns false if no unresolved attempt exists. The attempt resolves
    /// even if its pending has already been dropped; the result is then
    /// simply never observed, like a stale promise.
    pub fn resolve_next(&self, result: Result<(), EngineError>) -> bool {
        let shared = self.shared.lock().unwrap();
        for slot in &shared.manual_slots {
            let mut slot = slot.lock().unwrap();
            if slot.is_none() {
                *slot = Some(result);
                return true;
            }
        }
        false
    }

    pub fn attempts_started(&self) -> u64 {
        self.shared.lock().unwrap().attempts_started
    }

    pub fn surfaces_created(&self) -> u64 {
        self.shared.lock().unwrap().surfaces_created
    }

    pub fn surfaces_disposed(&self) -> u64 {
        self.shared.lock().unwrap().surfaces_disposed
    }

    /// Overlays currently attached across all live surfaces
    pub fn live_overlays(&self) -> usize {
        self.shared.lock().unwrap().live_overlays
    }
}

impl MapEngine for FakeEngine {
    type Surface = FakeSurface;
    type Pending = FakePending;

    fn begin_load(
        &self,
        _credential: &Credential,
        _target: &MountTarget,
        _config: &SurfaceConfig,
    ) -> FakePending {
        let mut shared = self.shared.lock().unwrap();
        shared.attempts_started += 1;

        let slot = match self.mode {
            FakeMode::Manual => {
                let slot = Arc::new(Mutex::new(None));
                shared.manual_slots.push(slot.clone());
                Some(slot)
            }
            _ => None,
        };

        FakePending {
            mode: self.mode,
            slot,
            shared: self.shared.clone(),
            done: false,
        }
    }
}

/// Pending attempt produced by [`FakeEngine::begin_load`]
pub struct FakePending {
    mode: FakeMode,
    slot: Option<Arc<Mutex<Option<Result<(), EngineError>>>>>,
    shared: Arc<Mutex<Shared>>,
    done: bool,
}

impl PendingSurface for FakePending {
    type Surface = FakeSurface;

    fn poll(&mut self) -> Option<Result<FakeSurface, EngineError>> {
        if self.done {
            return None;
        }

        let outcome = match self.mode {
            FakeMode::Succeed => Some(Ok(())),
            FakeMode::FailModuleLoad => Some(Err(EngineError::ModuleLoad(
                "simulated module load failure".to_string(),
            ))),
            FakeMode::FailSurfaceInit => Some(Err(EngineError::SurfaceInit(
                "simulated surface init failure".to_string(),
            ))),
            FakeMode::Manual => self
                .slot
                .as_ref()
                .and_then(|slot| slot.lock().unwrap().clone()),
        }?;

        self.done = true;
        match outcome {
            Ok(()) => Some(Ok(FakeSurface::new(self.shared.clone()))),
            Err(e) => Some(Err(e)),
        }
    }
}

/// Surface test double that records overlay and disposal bookkeeping
pub struct FakeSurface {
    shared: Arc<Mutex<Shared>>,
    overlays: Vec<OverlayHandle>,
    markers_added: usize,
    disposed: bool,
}

impl FakeSurface {
    fn new(shared: Arc<Mutex<Shared>>) -> Self {
        shared.lock().unwrap().surfaces_created += 1;
        Self {
            shared,
            overlays: Vec::new(),
            markers_added: 0,
            disposed: false,
        }
    }

    fn issue_handle(&mut self) -> Result<OverlayHandle, EngineError> {
        if self.disposed {
            return Err(EngineError::SurfaceInit(
                "overlay added to disposed surface".to_string(),
            ));
        }
        let mut shared = self.shared.lock().unwrap();
        shared.next_handle += 1;
        shared.live_overlays += 1;
        let handle = OverlayHandle(shared.next_handle);
        self.overlays.push(handle);
        Ok(handle)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl MapSurface for FakeSurface {
    fn add_polyline(
        &mut self,
        _path: &[Coordinate],
        _style: LineStyle,
    ) -> Result<OverlayHandle, EngineError> {
        self.issue_handle()
    }

    fn add_marker(&mut self, _marker: MarkerSpec) -> Result<OverlayHandle, EngineError> {
        let limit = self.shared.lock().unwrap().marker_failures_after;
        if let Some(limit) = limit
            && self.markers_added >= limit
        {
            return Err(EngineError::SurfaceInit(
                "simulated marker attach failure".to_string(),
            ));
        }
        self.markers_added += 1;
        self.issue_handle()
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) {
        if let Some(index) = self.overlays.iter().position(|h| *h == handle) {
            self.overlays.remove(index);
            self.shared.lock().unwrap().live_overlays -= 1;
        }
    }

    fn live_overlays(&self) -> usize {
        self.overlays.len()
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        let mut shared = self.shared.lock().unwrap();
        shared.live_overlays -= self.overlays.len();
        self.overlays.clear();
        shared.surfaces_disposed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_args() -> (Credential, MountTarget, SurfaceConfig) {
        (
            Credential::new("test-token"),
            MountTarget::new("map"),
            SurfaceConfig::default(),
        )
    }

    #[test]
    fn test_succeeding_engine_yields_surface() {
        let engine = FakeEngine::succeeding();
        let (credential, target, config) = load_args();
        let mut pending = engine.begin_load(&credential, &target, &config);

        let surface = pending.poll().unwrap().unwrap();
        assert_eq!(engine.surfaces_created(), 1);
        assert_eq!(surface.live_overlays(), 0);

        // A consumed pending stays quiet
        assert!(pending.poll().is_none());
    }

    #[test]
    fn test_manual_engine_stays_pending_until_resolved() {
        let engine = FakeEngine::manual();
        let (credential, target, config) = load_args();
        let mut pending = engine.begin_load(&credential, &target, &config);

        assert!(pending.poll().is_none());
        assert!(engine.resolve_next(Ok(())));
        assert!(pending.poll().unwrap().is_ok());
        assert!(!engine.resolve_next(Ok(())));
    }

    #[test]
    fn test_overlay_bookkeeping() {
        let engine = FakeEngine::succeeding();
        let (credential, target, config) = load_args();
        let mut surface = engine
            .begin_load(&credential, &target, &config)
            .poll()
            .unwrap()
            .unwrap();

        let line = surface
            .add_polyline(&[geo::Point::new(0.0, 0.0), geo::Point::new(1.0, 1.0)], crate::ROUTE_LINE_STYLE)
            .unwrap();
        let marker = surface
            .add_marker(MarkerSpec {
                kind: crate::MarkerKind::Hydration,
                coords: geo::Point::new(0.5, 0.5),
                popup: Some("Km 5".to_string()),
            })
            .unwrap();
        assert_eq!(engine.live_overlays(), 2);

        surface.remove_overlay(line);
        assert_eq!(engine.live_overlays(), 1);

        surface.dispose();
        assert_eq!(engine.live_overlays(), 0);
        assert_eq!(engine.surfaces_disposed(), 1);

        // Disposed surfaces reject further overlays
        assert!(
            surface
                .add_marker(MarkerSpec {
                    kind: crate::MarkerKind::Landmark,
                    coords: geo::Point::new(0.5, 0.5),
                    popup: None,
                })
                .is_err()
        );
        let _ = marker;
    }
}
