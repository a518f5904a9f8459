//! Tile-based mapping engine over the walkers map widget
//!
//! `TileEngine` is the production implementation of the engine boundary: it
//! produces a [`TileSurface`] backed by an HTTP raster tile source whose
//! URLs carry the access token. Overlays are kept as a retained scene shared
//! with the per-frame [`crate::app::plugin::RouteOverlayPlugin`].

use route_map_lib::{
    Coordinate, Credential, EngineError, LineStyle, MapEngine, MapSurface, MarkerSpec,
    MountTarget, OverlayHandle, PendingSurface, SurfaceConfig,
};
use std::sync::{Arc, RwLock};
use walkers::{
    HttpTiles, MapMemory, TileId,
    sources::{Attribution, TileSource},
};

use super::plugin::RouteOverlayPlugin;

/// Raster tile source for the configured basemap style, keyed by the token
pub struct StyledTileSource {
    style: String,
    token: String,
}

impl TileSource for StyledTileSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://api.mapbox.com/styles/v1/mapbox/{}/tiles/{}/{}/{}?access_token={}",
            self.style, tile_id.zoom, tile_id.x, tile_id.y, self.token
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© Mapbox © OpenStreetMap",
            url: "https://www.mapbox.com/about/maps/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        19
    }
}

/// Production engine; needs the egui context to drive tile downloads
pub struct TileEngine {
    ctx: egui::Context,
}

impl TileEngine {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl MapEngine for TileEngine {
    type Surface = TileSurface;
    type Pending = TilePending;

    fn begin_load(
        &self,
        credential: &Credential,
        target: &MountTarget,
        config: &SurfaceConfig,
    ) -> TilePending {
        tracing::debug!(target = target.id(), "starting tile engine load");
        TilePending {
            ctx: self.ctx.clone(),
            credential: credential.clone(),
            config: config.clone(),
            stage: LoadStage::Module,
        }
    }
}

enum LoadStage {
    /// Resolving the engine itself (statically linked, one frame)
    Module,
    /// Constructing the surface and kicking off the initial tile load
    Surface,
    Done,
}

/// In-flight load attempt; resolves over successive frames
pub struct TilePending {
    ctx: egui::Context,
    credential: Credential,
    config: SurfaceConfig,
    stage: LoadStage,
}

impl PendingSurface for TilePending {
    type Surface = TileSurface;

    fn poll(&mut self) -> Option<Result<TileSurface, EngineError>> {
        match self.stage {
            LoadStage::Module => {
                // The widget is linked in, so this stage cannot fail here;
                // it still takes a frame, like a deferred module import.
                self.stage = LoadStage::Surface;
                self.ctx.request_repaint();
                None
            }
            LoadStage::Surface => {
                self.stage = LoadStage::Done;
                if self.credential.is_empty() {
                    return Some(Err(EngineError::SurfaceInit(
                        "tile source requires an access token".to_string(),
                    )));
                }

                let source = StyledTileSource {
                    style: self.config.style.clone(),
                    token: self.credential.as_str().to_string(),
                };
                let tiles = HttpTiles::new(source, self.ctx.clone());

                let mut map_memory = MapMemory::default();
                map_memory.center_at(walkers::lat_lon(
                    self.config.center.y(),
                    self.config.center.x(),
                ));
                let _ = map_memory.set_zoom(self.config.zoom);

                Some(Ok(TileSurface {
                    tiles: Some(tiles),
                    map_memory,
                    home: self.config.center,
                    scene: Arc::new(RwLock::new(OverlayScene::default())),
                    next_handle: 0,
                }))
            }
            LoadStage::Done => None,
        }
    }
}

/// A single retained overlay in the scene
pub struct SceneItem {
    pub handle: OverlayHandle,
    pub kind: SceneKind,
}

pub enum SceneKind {
    Line {
        path: Vec<Coordinate>,
        style: LineStyle,
    },
    Marker(MarkerSpec),
}

/// Retained overlays plus which popup is currently open
#[derive(Default)]
pub struct OverlayScene {
    pub items: Vec<SceneItem>,
    pub open_popup: Option<OverlayHandle>,
}

/// Live map viewport: tiles, camera, and the retained overlay scene
pub struct TileSurface {
    /// Taken on disposal so the HTTP fetcher is released deterministically
    tiles: Option<HttpTiles>,
    map_memory: MapMemory,
    home: Coordinate,
    scene: Arc<RwLock<OverlayScene>>,
    next_handle: u64,
}

impl TileSurface {
    fn push_item(&mut self, kind: SceneKind) -> Result<OverlayHandle, EngineError> {
        if self.tiles.is_none() {
            return Err(EngineError::SurfaceInit(
                "overlay added to disposed surface".to_string(),
            ));
        }
        self.next_handle += 1;
        let handle = OverlayHandle::from_raw(self.next_handle);
        self.scene
            .write()
            .unwrap()
            .items
            .push(SceneItem { handle, kind });
        Ok(handle)
    }

    /// Render the map with its overlays into the given UI region
    pub fn show(&mut self, ui: &mut egui::Ui) {
        profiling::scope!("tile_surface_show");

        let Some(tiles) = self.tiles.as_mut() else {
            return;
        };

        let plugin = RouteOverlayPlugin::new(self.scene.clone());
        let map = walkers::Map::new(
            Some(tiles),
            &mut self.map_memory,
            walkers::lat_lon(self.home.y(), self.home.x()),
        )
        .with_plugin(plugin);

        ui.add(map);
    }

    /// Re-center the camera on the route
    pub fn center_on_home(&mut self) {
        self.map_memory
            .center_at(walkers::lat_lon(self.home.y(), self.home.x()));
    }

    pub fn attribution_text(&self) -> &'static str {
        "© Mapbox © OpenStreetMap"
    }
}

impl MapSurface for TileSurface {
    fn add_polyline(
        &mut self,
        path: &[Coordinate],
        style: LineStyle,
    ) -> Result<OverlayHandle, EngineError> {
        self.push_item(SceneKind::Line {
            path: path.to_vec(),
            style,
        })
    }

    fn add_marker(&mut self, marker: MarkerSpec) -> Result<OverlayHandle, EngineError> {
        self.push_item(SceneKind::Marker(marker))
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) {
        let mut scene = self.scene.write().unwrap();
        scene.items.retain(|item| item.handle != handle);
        if scene.open_popup == Some(handle) {
            scene.open_popup = None;
        }
    }

    fn live_overlays(&self) -> usize {
        self.scene.read().unwrap().items.len()
    }

    fn dispose(&mut self) {
        // Explicit release: the tile fetcher and the scene go together, so
        // no stray overlay can outlive the viewport it was drawn on.
        self.tiles = None;
        let mut scene = self.scene.write().unwrap();
        scene.items.clear();
        scene.open_popup = None;
    }
}
