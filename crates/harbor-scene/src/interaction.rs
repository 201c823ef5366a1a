//! Pointer picking and the executor for interaction effects
//!
//! Clicks are ray cast against scene meshes and resolved to catalog objects
//! by walking up the hit's `Name` ancestry. The resulting transitions on
//! [`InteractionState`] produce effects which are applied here: overlay
//! content, camera tweens, highlight and model requests.

use bevy::camera::primitives::Aabb;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;
use bevy_picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings};
use harbor_core::interaction::{Effect, Pick};
use harbor_core::overlay::OverlayKind;
use harbor_core::telemetry::{sample_trend, AnalyticsSnapshot, DwellSnapshot, TREND_SAMPLES};
use harbor_core::tween::{focus_pose, follow_step, CameraPose, CameraTween, TweenPurpose};

use crate::camera::{CameraSettings, FixedSceneCamera, MainCamera, OrbitRig};
use crate::highlight::HighlightRequest;
use crate::types::{
    ActiveScene, DetailsView, InteractionState, ModelRequest, Overlays, PendingEffects, SceneLibrary, TrackingView,
    UiAction,
};
use crate::FrameSet;

/// Plugin for object interaction
pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InteractionState>()
            .init_resource::<PendingEffects>()
            .add_systems(Update, (
                (handle_panel_actions, handle_pointer, apply_effects)
                    .chain()
                    .in_set(FrameSet::Pointer),
                follow_tracked.in_set(FrameSet::Tracking),
                advance_tween.in_set(FrameSet::Tween),
            ));
    }
}

/// Close buttons on the overlay panels
fn handle_panel_actions(
    mut actions: MessageReader<UiAction>,
    mut interaction: ResMut<InteractionState>,
    mut pending: ResMut<PendingEffects>,
    mut overlays: ResMut<Overlays>,
) {
    for action in actions.read() {
        let effects = match *action {
            UiAction::CloseDetails | UiAction::CloseOverlay(OverlayKind::Details) => interaction.unfocus(),
            UiAction::StopTracking | UiAction::CloseOverlay(OverlayKind::Tracking) => interaction.stop_tracking(),
            UiAction::CloseOverlay(kind) => {
                tracing::debug!(?kind, "Overlay closed");
                overlays.board.hide(kind);
                continue;
            }
            UiAction::PreviousScene | UiAction::NextScene => continue,
        };
        pending.extend(effects);
    }
}

/// Primary-button press on the scene
fn handle_pointer(
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), Or<(With<MainCamera>, With<FixedSceneCamera>)>>,
    mut ray_cast: MeshRayCast,
    names: Query<&Name>,
    parents: Query<&ChildOf>,
    active: Res<ActiveScene>,
    mut interaction: ResMut<InteractionState>,
    mut pending: ResMut<PendingEffects>,
    mut contexts: EguiContexts,
) {
    if !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area())
        .unwrap_or(false);
    if egui_wants_pointer || !interaction.accepts_pointer() {
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Some((camera, camera_transform)) = cameras.iter().find(|(camera, _)| camera.is_active) else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor) else {
        return;
    };

    let pick = ray_cast
        .cast_ray(ray, &MeshRayCastSettings::default())
        .first()
        .and_then(|(hit, _)| {
            // Hit mesh and its ancestors, nearest first
            let chain: Vec<(Entity, &str)> = std::iter::once(*hit)
                .chain(parents.iter_ancestors(*hit))
                .filter_map(|e| names.get(e).ok().map(|n| (e, n.as_str())))
                .collect();
            active
                .catalog
                .pick(chain.iter().map(|(_, name)| *name))
                .map(|(index, profile)| Pick {
                    target: chain[index].0,
                    name: profile.name.clone(),
                })
        });

    match &pick {
        Some(pick) => tracing::debug!(object = %pick.name, "Pointer hit catalog object"),
        None => tracing::debug!("Pointer hit nothing interactive"),
    }
    let effects = interaction.click(pick, &active.catalog);
    pending.extend(effects);
}

/// World-space bounds of an entity hierarchy
fn hierarchy_bounds(
    root: Entity,
    children: &Query<&Children>,
    bounds: &Query<(&Aabb, &GlobalTransform)>,
    transforms: &Query<&GlobalTransform>,
) -> (Vec3, Vec3) {
    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    let mut found = false;

    for entity in std::iter::once(root).chain(children.iter_descendants(root)) {
        let Ok((aabb, transform)) = bounds.get(entity) else {
            continue;
        };
        let center = Vec3::from(aabb.center);
        let half = Vec3::from(aabb.half_extents);
        for corner in [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
        ] {
            let point = transform.transform_point(center + half * corner);
            min = min.min(point);
            max = max.max(point);
        }
        found = true;
    }

    if found {
        (min, max)
    } else {
        // No mesh bounds yet, frame a unit box at the object origin
        let origin = transforms.get(root).map(|t| t.translation()).unwrap_or(Vec3::ZERO);
        (origin - Vec3::splat(0.5), origin + Vec3::splat(0.5))
    }
}

/// Grouped system parameters for the effect executor
#[derive(SystemParam)]
struct EffectParams<'w, 's> {
    pending: ResMut<'w, PendingEffects>,
    interaction: ResMut<'w, InteractionState>,
    overlays: ResMut<'w, Overlays>,
    active: Res<'w, ActiveScene>,
    library: Res<'w, SceneLibrary>,
    settings: Res<'w, CameraSettings>,
    rig: Res<'w, OrbitRig>,
    camera: Query<'w, 's, &'static Transform, With<MainCamera>>,
    children: Query<'w, 's, &'static Children>,
    bounds: Query<'w, 's, (&'static Aabb, &'static GlobalTransform)>,
    transforms: Query<'w, 's, &'static GlobalTransform>,
    model_requests: MessageWriter<'w, ModelRequest>,
    highlight_requests: MessageWriter<'w, HighlightRequest>,
}

impl EffectParams<'_, '_> {
    fn current_pose(&self) -> CameraPose {
        let position = self
            .camera
            .single()
            .map(|t| t.translation)
            .unwrap_or_else(|_| self.rig.position());
        CameraPose::new(position, self.rig.target)
    }

    fn home_pose(&self) -> CameraPose {
        let position = self
            .active
            .descriptor(&self.library)
            .map(|d| Vec3::from_array(d.camera_position))
            .unwrap_or_else(|| self.rig.position());
        CameraPose::new(position, Vec3::ZERO)
    }

    fn show_overlay(&mut self, kind: OverlayKind) {
        if !self.overlays.board.show(kind) {
            return;
        }
        // Cosmetic figures are re-rolled every time a panel opens
        let mut rng = rand::rng();
        match kind {
            OverlayKind::Analytics => self.overlays.analytics = Some(AnalyticsSnapshot::sample(&mut rng)),
            OverlayKind::Dwell => self.overlays.dwell = Some(DwellSnapshot::sample(&mut rng)),
            OverlayKind::Graph => self.overlays.trend = sample_trend(&mut rng, 40.0, 50.0, TREND_SAMPLES),
            _ => {}
        }
    }

    fn hide_overlay(&mut self, kind: OverlayKind) {
        self.overlays.board.hide(kind);
        match kind {
            OverlayKind::Details => self.overlays.details = None,
            OverlayKind::Tracking => self.overlays.tracking = None,
            _ => {}
        }
    }

    fn apply(&mut self, effect: Effect<Entity>) {
        match effect {
            Effect::ShowDetails { key } => {
                let Some(record) = self.active.catalog.record(&key) else {
                    tracing::warn!(key = %key, "No record for details panel");
                    return;
                };
                self.overlays.details = Some(DetailsView {
                    title: record.title(&key),
                    rows: record.rows(),
                    key,
                });
                self.show_overlay(OverlayKind::Details);
            }
            Effect::ShowOverlay(kind) => self.show_overlay(kind),
            Effect::HideOverlay(kind) => self.hide_overlay(kind),
            Effect::Highlight { target, severity } => {
                self.highlight_requests.write(HighlightRequest::Start { target, severity });
            }
            Effect::ClearHighlight => {
                self.highlight_requests.write(HighlightRequest::Stop);
            }
            Effect::FocusCamera(_) | Effect::HomeCamera if self.rig.fixed_view => {
                // The main camera is not rendering; leave it where the user put it
                tracing::debug!("Fixed scene camera active, skipping camera tween");
            }
            Effect::FocusCamera(target) => {
                let (min, max) = hierarchy_bounds(target, &self.children, &self.bounds, &self.transforms);
                let tween = CameraTween::new(
                    self.current_pose(),
                    focus_pose(min, max, self.settings.fov()),
                    TweenPurpose::Focus,
                );
                self.interaction.begin_tween(tween);
            }
            Effect::HomeCamera => {
                let tween = CameraTween::new(self.current_pose(), self.home_pose(), TweenPurpose::Home);
                self.interaction.begin_tween(tween);
            }
            Effect::PopUp => {
                self.model_requests.write(ModelRequest::PopUp);
            }
            Effect::PopDown => {
                self.model_requests.write(ModelRequest::PopDown);
            }
            Effect::ShowTracking { name } => {
                let Some(note) = self.active.catalog.tracking_note(&name) else {
                    tracing::warn!(object = %name, "No tracking note");
                    return;
                };
                self.overlays.tracking = Some(TrackingView {
                    note: note.clone(),
                    name,
                });
                self.show_overlay(OverlayKind::Tracking);
            }
            Effect::HideTracking => self.hide_overlay(OverlayKind::Tracking),
        }
    }
}

fn apply_effects(mut params: EffectParams) {
    if params.pending.0.is_empty() {
        return;
    }
    let effects = std::mem::take(&mut params.pending.0);
    for effect in effects {
        params.apply(effect);
    }
}

/// Damped third-person follow of the tracked object
fn follow_tracked(
    interaction: Res<InteractionState>,
    objects: Query<&GlobalTransform>,
    mut camera: Query<&mut Transform, With<MainCamera>>,
    mut rig: ResMut<OrbitRig>,
) {
    let Some(tracked) = interaction.tracked() else {
        return;
    };
    let Ok(object) = objects.get(tracked.target) else {
        return;
    };
    let Ok(mut transform) = camera.single_mut() else {
        return;
    };

    let pose = follow_step(transform.translation, object.translation());
    transform.translation = pose.position;
    transform.look_at(pose.target, Vec3::Y);
    rig.sync_from_pose(pose);
}

/// Drive the active camera tween
fn advance_tween(
    time: Res<Time>,
    mut interaction: ResMut<InteractionState>,
    mut camera: Query<&mut Transform, With<MainCamera>>,
    mut rig: ResMut<OrbitRig>,
) {
    let Some(pose) = interaction.advance_tween(time.delta_secs()) else {
        return;
    };
    if let Ok(mut transform) = camera.single_mut() {
        transform.translation = pose.position;
        transform.look_at(pose.target, Vec3::Y);
    }
    rig.sync_from_pose(pose);
}
