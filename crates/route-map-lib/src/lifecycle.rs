//! Map lifecycle state machine
//!
//! `MapLifecycleController` owns the asynchronous acquisition of the mapping
//! engine, the live map session, and its disposal. It is the only component
//! that touches the engine's lifecycle API. States:
//!
//! ```text
//! Idle -> Loading -> Ready
//!            |          |
//!            v          v
//!        Degraded -> Loading (user-supplied credential)
//! ```
//!
//! The controller runs on the UI thread; [`MapLifecycleController::tick`] is
//! called once per frame to drive the in-flight load attempt. A credential
//! change or unmount while an attempt is outstanding drops that attempt, so
//! a resolution firing later cannot resurrect a session: the generation
//! counter that tags each attempt also becomes the id of the session it
//! produces, making every session distinguishable from its predecessors.

use crate::dataset::GeoDataset;
use crate::engine::{
    Credential, EngineError, MapEngine, MapSurface, MountTarget, OverlayHandle, PendingSurface,
    SurfaceConfig,
};
use crate::overlay::render_overlays;
use std::sync::Arc;

/// Why the controller entered `Degraded`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DegradeReason {
    /// The mapping engine failed to load
    ModuleLoad,
    /// The engine loaded but the surface could not be constructed or mounted
    SurfaceInit,
}

impl From<&EngineError> for DegradeReason {
    fn from(error: &EngineError) -> Self {
        match error {
            EngineError::ModuleLoad(_) => DegradeReason::ModuleLoad,
            EngineError::SurfaceInit(_) => DegradeReason::SurfaceInit,
        }
    }
}

impl std::fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradeReason::ModuleLoad => write!(f, "module-load-failure"),
            DegradeReason::SurfaceInit => write!(f, "surface-init-failure"),
        }
    }
}

/// Externally observable controller state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Loading,
    Ready,
    Degraded(DegradeReason),
}

/// A live map surface together with the overlays drawn on it
///
/// Created exactly once per successful `Loading -> Ready` transition and
/// disposed exactly once on every exit path from `Ready`. Never reused
/// across retries: a retry constructs a fresh session with the new
/// credential.
pub struct MapSession<S: MapSurface> {
    id: u64,
    credential: Credential,
    surface: S,
    overlays: Vec<OverlayHandle>,
}

impl<S: MapSurface> MapSession<S> {
    /// Generation of the load attempt that produced this session
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The credential this session was loaded with
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Release every overlay handle, then the surface
    fn dispose(mut self) {
        for handle in self.overlays.drain(..) {
            self.surface.remove_overlay(handle);
        }
        self.surface.dispose();
        tracing::info!(session = self.id, "map session disposed");
    }
}

enum Phase<E: MapEngine> {
    Idle,
    Loading { pending: E::Pending },
    Ready { session: MapSession<E::Surface> },
    Degraded { reason: DegradeReason },
}

/// Owns the engine lifecycle: load attempts, the active session, disposal
pub struct MapLifecycleController<E: MapEngine> {
    engine: E,
    dataset: Arc<GeoDataset>,
    config: SurfaceConfig,
    credential: Credential,
    mount: Option<MountTarget>,
    /// Distinguishes the active load attempt from superseded ones; also the
    /// id of the session the attempt produces
    generation: u64,
    phase: Phase<E>,
}

impl<E: MapEngine> MapLifecycleController<E> {
    /// Create an idle controller; nothing happens until [`Self::mount`]
    pub fn new(
        engine: E,
        dataset: Arc<GeoDataset>,
        config: SurfaceConfig,
        credential: Credential,
    ) -> Self {
        Self {
            engine,
            dataset,
            config,
            credential,
            mount: None,
            generation: 0,
            phase: Phase::Idle,
        }
    }

    pub fn state(&self) -> LifecycleState {
        match &self.phase {
            Phase::Idle => LifecycleState::Idle,
            Phase::Loading { .. } => LifecycleState::Loading,
            Phase::Ready { .. } => LifecycleState::Ready,
            Phase::Degraded { reason } => LifecycleState::Degraded(*reason),
        }
    }

    /// The credential the controller currently loads with
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn dataset(&self) -> &Arc<GeoDataset> {
        &self.dataset
    }

    /// The active session, if the controller is `Ready`
    pub fn session(&self) -> Option<&MapSession<E::Surface>> {
        match &self.phase {
            Phase::Ready { session } => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut MapSession<E::Surface>> {
        match &mut self.phase {
            Phase::Ready { session } => Some(session),
            _ => None,
        }
    }

    /// Bind the controller to a drawable region and start the initial load
    pub fn mount(&mut self, target: MountTarget) {
        tracing::info!(target = target.id(), "map mounted");
        self.mount = Some(target);
        self.begin_attempt();
    }

    /// Replace the active credential wholesale and reload
    ///
    /// Empty submissions are ignored, per the fallback view contract.
    /// Returns whether a new load attempt was started.
    pub fn submit_credential(&mut self, credential: Credential) -> bool {
        if credential.is_empty() {
            tracing::warn!("ignoring empty credential submission");
            return false;
        }
        self.credential = credential;
        self.begin_attempt();
        matches!(self.phase, Phase::Loading { .. })
    }

    /// Drive the in-flight load attempt, if any
    ///
    /// Call once per UI frame. Synchronous and non-blocking: an unresolved
    /// attempt leaves the controller in `Loading`.
    pub fn tick(&mut self) {
        let Phase::Loading { pending } = &mut self.phase else {
            return;
        };
        let Some(outcome) = pending.poll() else {
            return;
        };

        match outcome {
            Ok(surface) => self.finish_load(surface),
            Err(e) => {
                tracing::warn!(error = %e, "map load failed");
                self.phase = Phase::Degraded {
                    reason: DegradeReason::from(&e),
                };
            }
        }
    }

    /// Tear down to `Idle`, releasing the session and any in-flight attempt
    ///
    /// Idempotent: safe on an already-disposed or never-created session, and
    /// safe while a load attempt is still outstanding (the attempt is
    /// dropped; its resolution, if it fires later, is discarded unobserved).
    pub fn dispose(&mut self) {
        self.teardown();
        self.mount = None;
        self.phase = Phase::Idle;
    }

    fn begin_attempt(&mut self) {
        // At most one live session and one in-flight attempt at a time
        self.teardown();

        let Some(target) = &self.mount else {
            tracing::warn!("load requested without a mount target");
            self.phase = Phase::Degraded {
                reason: DegradeReason::SurfaceInit,
            };
            return;
        };

        self.generation += 1;
        let pending = self.engine.begin_load(&self.credential, target, &self.config);
        tracing::info!(generation = self.generation, "map load started");
        self.phase = Phase::Loading { pending };
    }

    fn finish_load(&mut self, mut surface: E::Surface) {
        match render_overlays(&mut surface, &self.dataset) {
            Ok(overlays) => {
                tracing::info!(
                    session = self.generation,
                    overlays = overlays.len(),
                    "map ready"
                );
                self.phase = Phase::Ready {
                    session: MapSession {
                        id: self.generation,
                        credential: self.credential.clone(),
                        surface,
                        overlays,
                    },
                };
            }
            Err(e) => {
                tracing::warn!(error = %e, "overlay render failed");
                surface.dispose();
                self.phase = Phase::Degraded {
                    reason: DegradeReason::from(&e),
                };
            }
        }
    }

    /// Dispose the session or drop the in-flight attempt, whichever exists
    fn teardown(&mut self) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Ready { session } => session.dispose(),
            Phase::Loading { pending } => {
                tracing::debug!("superseding in-flight load attempt");
                drop(pending);
            }
            phase @ (Phase::Idle | Phase::Degraded { .. }) => {
                self.phase = phase;
            }
        }
    }
}
