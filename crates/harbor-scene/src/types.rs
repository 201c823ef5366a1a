//! Shared resources and messages for scene state, interaction and overlays

use bevy::gltf::Gltf;
use bevy::prelude::*;
use harbor_core::catalog::ObjectCatalog;
use harbor_core::interaction::{Effect, InteractionManager};
use harbor_core::overlay::{OverlayBoard, OverlayKind};
use harbor_core::scene::{SceneDescriptor, SceneList};
use harbor_core::telemetry::{AnalyticsSnapshot, DwellSnapshot, EnergyReadout, FieldView, TrackingNote};

/// The configured scene list; inserted by the application before startup
#[derive(Resource, Debug, Clone)]
pub struct SceneLibrary {
    pub scenes: SceneList,
    /// Scene loaded on startup
    pub start_index: usize,
}

impl SceneLibrary {
    pub fn new(scenes: SceneList, start_index: Option<usize>) -> Self {
        let start_index = scenes.start_index(start_index);
        Self { scenes, start_index }
    }
}

/// The scene currently shown
#[derive(Resource, Debug, Default)]
pub struct ActiveScene {
    pub index: usize,
    /// Root entity of the spawned glTF scene
    pub root: Option<Entity>,
    /// Asset still loading, polled until it settles
    pub pending: Option<Handle<Gltf>>,
    pub catalog: ObjectCatalog,
    /// glTF camera the fixed view switches to, once discovered
    pub fixed_camera: Option<Entity>,
}

impl ActiveScene {
    pub fn descriptor<'a>(&self, library: &'a SceneLibrary) -> Option<&'a SceneDescriptor> {
        library.scenes.get(self.index)
    }
}

/// Focus / tracking state of the viewer, keyed by scene entity
#[derive(Resource, Debug, Default, Deref, DerefMut)]
pub struct InteractionState(pub InteractionManager<Entity>);

/// Effects produced this frame, applied in order by the effect executor
#[derive(Resource, Debug, Default)]
pub struct PendingEffects(pub Vec<Effect<Entity>>);

impl PendingEffects {
    pub fn extend(&mut self, effects: Vec<Effect<Entity>>) {
        self.0.extend(effects);
    }
}

/// Content of the details panel
#[derive(Debug, Clone)]
pub struct DetailsView {
    pub key: String,
    pub title: String,
    pub rows: Vec<FieldView>,
}

/// Content of the tracking banner
#[derive(Debug, Clone)]
pub struct TrackingView {
    pub name: String,
    pub note: TrackingNote,
}

/// Everything the overlay UI draws
#[derive(Resource, Debug, Default)]
pub struct Overlays {
    pub board: OverlayBoard,
    pub loading: bool,
    pub scene_title: String,
    pub details: Option<DetailsView>,
    pub tracking: Option<TrackingView>,
    pub analytics: Option<AnalyticsSnapshot>,
    pub dwell: Option<DwellSnapshot>,
    pub trend: Vec<f32>,
    pub energy: Option<EnergyReadout>,
}

impl Overlays {
    /// Drop per-scene content and switch to the new scene's board
    pub fn reset_for_scene(&mut self, descriptor: &SceneDescriptor) {
        *self = Self {
            board: descriptor.overlay_board(),
            loading: true,
            scene_title: descriptor.name.clone(),
            ..default()
        };
    }
}

/// Request to switch to the scene at this index
#[derive(Message, Debug, Clone, Copy)]
pub struct LoadScene(pub usize);

/// Buttons in the overlay panels
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    CloseDetails,
    StopTracking,
    /// Dismiss an auxiliary panel; focus and tracking are left alone
    CloseOverlay(OverlayKind),
    PreviousScene,
    NextScene,
}

/// Requests for the animated model's one-shots
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRequest {
    PopUp,
    PopDown,
}
