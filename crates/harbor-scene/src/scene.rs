//! Scene setup - lights, per-scene glTF loading, disposal and load tracking

use bevy::asset::LoadState;
use bevy::camera::Exposure;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::gltf::{Gltf, GltfAssetLabel};
use bevy::light::EnvironmentMapLight;
use bevy::prelude::*;
use harbor_core::scene::SceneDescriptor;
use harbor_core::telemetry::EnergyReadout;
use harbor_core::tween::CameraPose;
use harbor_core::OverlayKind;

use crate::camera::{FixedSceneCamera, MainCamera, OrbitRig};
use crate::models::AnimatedModel;
use crate::types::{ActiveScene, InteractionState, LoadScene, Overlays, PendingEffects, SceneLibrary, UiAction};
use crate::FrameSet;

/// Scene background (pale sky blue)
const BACKGROUND: Color = Color::srgb(0.749, 0.820, 0.898);

/// Brightness of the environment map when a scene has one
const ENVIRONMENT_INTENSITY: f32 = 900.0;

/// Marker component for the main directional light
#[derive(Component)]
pub struct MainDirectionalLight;

/// Root of the spawned glTF scene
#[derive(Component, Debug, Clone)]
pub struct SceneModel {
    pub gltf: Handle<Gltf>,
    pub loop_frames: u32,
}

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(BACKGROUND))
            .init_resource::<ActiveScene>()
            .add_systems(Startup, (setup_lights, request_start_scene))
            .add_systems(Update, (
                handle_navigation,
                load_scene,
                track_load_state,
                adopt_gltf_cameras,
            ).chain().in_set(FrameSet::Scene));
    }
}

fn setup_lights(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.25, 0.25, 0.25),
        brightness: 300.0,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(10.0, 10.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
        MainDirectionalLight,
    ));
}

fn request_start_scene(library: Res<SceneLibrary>, mut loads: MessageWriter<LoadScene>) {
    loads.write(LoadScene(library.start_index));
}

/// Previous / next buttons wrap around the scene list
fn handle_navigation(
    mut actions: MessageReader<UiAction>,
    library: Res<SceneLibrary>,
    active: Res<ActiveScene>,
    mut loads: MessageWriter<LoadScene>,
) {
    for action in actions.read() {
        let index = match action {
            UiAction::PreviousScene => library.scenes.previous_index(active.index),
            UiAction::NextScene => library.scenes.next_index(active.index),
            _ => continue,
        };
        loads.write(LoadScene(index));
    }
}

/// Grouped queries touched when swapping scenes
#[derive(bevy::ecs::system::SystemParam)]
struct SceneSwap<'w, 's> {
    commands: Commands<'w, 's>,
    asset_server: Res<'w, AssetServer>,
    active: ResMut<'w, ActiveScene>,
    interaction: ResMut<'w, InteractionState>,
    pending: ResMut<'w, PendingEffects>,
    overlays: ResMut<'w, Overlays>,
    rig: ResMut<'w, OrbitRig>,
    models: Query<'w, 's, &'static mut AnimatedModel>,
    players: Query<'w, 's, &'static mut AnimationPlayer>,
    main_camera: Query<'w, 's, (Entity, &'static mut Camera, &'static mut Transform, &'static mut Exposure), With<MainCamera>>,
}

fn load_scene(mut requests: MessageReader<LoadScene>, library: Res<SceneLibrary>, mut swap: SceneSwap) {
    // Only the last request of a frame matters
    let Some(LoadScene(index)) = requests.read().last().copied() else {
        return;
    };
    let Some(descriptor) = library.scenes.get(index) else {
        tracing::warn!(index, "No scene at index, ignoring load request");
        return;
    };

    tracing::info!(index, scene = %descriptor.name, path = %descriptor.path, "Loading scene");
    dispose_current(&mut swap);

    let effects = swap.interaction.reset();
    swap.pending.extend(effects);

    swap.overlays.reset_for_scene(descriptor);
    if descriptor.shows_energy_grid() {
        swap.overlays.board.show(OverlayKind::EnergyGrid);
        swap.overlays.energy = Some(EnergyReadout::sample(&mut rand::rng()));
    }

    place_camera(&mut swap, descriptor);

    swap.active.catalog = match descriptor.resolve_catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!(scene = %descriptor.name, error = %e, "Invalid object catalog, scene will not be interactive");
            Default::default()
        }
    };

    let gltf: Handle<Gltf> = swap.asset_server.load(descriptor.path.clone());
    let scene = swap
        .asset_server
        .load(GltfAssetLabel::Scene(0).from_asset(descriptor.path.clone()));
    let root = swap
        .commands
        .spawn((
            Name::new(descriptor.name.clone()),
            SceneRoot(scene),
            Transform::default(),
            SceneModel {
                gltf: gltf.clone(),
                loop_frames: descriptor.loop_frames,
            },
        ))
        .id();

    swap.active.index = index;
    swap.active.root = Some(root);
    swap.active.pending = Some(gltf);
}

/// Halt the current model's animations and despawn its hierarchy
fn dispose_current(swap: &mut SceneSwap) {
    swap.active.fixed_camera = None;
    swap.active.pending = None;

    let Some(root) = swap.active.root.take() else {
        return;
    };
    if let Ok(mut model) = swap.models.get_mut(root) {
        model.director.dispose();
        for &player in &model.players {
            if let Ok(mut player) = swap.players.get_mut(player) {
                player.stop_all();
            }
        }
    }
    if let Ok(mut entity) = swap.commands.get_entity(root) {
        entity.despawn();
    }
    tracing::debug!("Previous scene model and animations disposed");
}

fn place_camera(swap: &mut SceneSwap, descriptor: &SceneDescriptor) {
    let position = Vec3::from_array(descriptor.camera_position);
    swap.rig.fixed_view = false;
    swap.rig.sync_from_pose(CameraPose::new(position, Vec3::ZERO));

    let Ok((entity, mut camera, mut transform, mut exposure)) = swap.main_camera.single_mut() else {
        return;
    };
    camera.is_active = true;
    *transform = Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y);
    exposure.ev100 = descriptor.ev100(Exposure::EV100_BLENDER);

    match descriptor.environment_map_paths() {
        Some((diffuse, specular)) => {
            swap.commands.entity(entity).insert(EnvironmentMapLight {
                diffuse_map: swap.asset_server.load(diffuse),
                specular_map: swap.asset_server.load(specular),
                intensity: ENVIRONMENT_INTENSITY,
                ..default()
            });
        }
        None => {
            swap.commands.entity(entity).remove::<EnvironmentMapLight>();
        }
    }
}

/// Dismiss the loading indicator once the asset settles either way
fn track_load_state(
    asset_server: Res<AssetServer>,
    library: Res<SceneLibrary>,
    mut active: ResMut<ActiveScene>,
    mut overlays: ResMut<Overlays>,
) {
    let Some(handle) = active.pending.clone() else {
        return;
    };
    let name = active
        .descriptor(&library)
        .map(|d| d.name.clone())
        .unwrap_or_default();

    match asset_server.load_state(&handle) {
        LoadState::Loaded => {
            tracing::info!(scene = %name, "Scene loaded successfully");
            active.pending = None;
            overlays.loading = false;
        }
        LoadState::Failed(err) => {
            tracing::error!(scene = %name, error = %err, "Failed to load scene asset");
            active.pending = None;
            overlays.loading = false;
        }
        LoadState::NotLoaded | LoadState::Loading => {}
    }
}

/// glTF cameras never render on their own; the configured one becomes the fixed shot
fn adopt_gltf_cameras(
    mut commands: Commands,
    library: Res<SceneLibrary>,
    mut active: ResMut<ActiveScene>,
    mut cameras: Query<(Entity, Option<&Name>, &mut Camera), (Added<Camera>, Without<MainCamera>)>,
) {
    let wanted = active
        .descriptor(&library)
        .and_then(|d| d.fixed_camera.clone());

    for (entity, name, mut camera) in &mut cameras {
        camera.is_active = false;
        let name = name.map(Name::as_str).unwrap_or_default();
        tracing::debug!(camera = %name, "Deactivated glTF camera");

        if wanted.as_deref() == Some(name) {
            tracing::info!(camera = %name, "Found fixed scene camera");
            commands.entity(entity).insert(FixedSceneCamera);
            active.fixed_camera = Some(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::animation::graph::AnimationNodeIndex;
    use harbor_core::animation::AnimationDirector;
    use harbor_core::scene::SceneList;

    fn library() -> SceneLibrary {
        let mut berth = SceneDescriptor::new("Berth", "scenes/berth.glb");
        berth.loop_frames = 600;
        let scenes = SceneList::new(vec![SceneDescriptor::new("Quay", "scenes/quay.glb"), berth]).unwrap();
        SceneLibrary::new(scenes, None)
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Gltf>()
            .init_asset::<Scene>()
            .add_message::<LoadScene>()
            .init_resource::<ActiveScene>()
            .init_resource::<InteractionState>()
            .init_resource::<PendingEffects>()
            .init_resource::<Overlays>()
            .init_resource::<OrbitRig>()
            .insert_resource(library())
            .add_systems(Update, load_scene);
        app
    }

    fn looping_player(clip: AnimationNodeIndex) -> AnimationPlayer {
        let mut player = AnimationPlayer::default();
        player.play(clip).repeat();
        player
    }

    #[test]
    fn test_scene_swap_leaves_no_looping_actions() {
        let mut app = app();
        let ambient = AnimationNodeIndex::new(1);

        // One player inside the model hierarchy, one referenced from elsewhere
        let nested = app.world_mut().spawn(looping_player(ambient)).id();
        let detached = app.world_mut().spawn(looping_player(ambient)).id();
        let old_root = app
            .world_mut()
            .spawn((
                Name::new("Quay"),
                AnimatedModel {
                    director: AnimationDirector::new([(ambient, "conveyor_loop")]),
                    players: vec![nested, detached],
                    speeds: Default::default(),
                },
            ))
            .add_child(nested)
            .id();
        app.world_mut().resource_mut::<ActiveScene>().root = Some(old_root);

        app.world_mut().write_message(LoadScene(1));
        app.update();

        assert!(app.world().get_entity(old_root).is_err());
        assert!(app.world().get_entity(nested).is_err());
        let player = app.world().get::<AnimationPlayer>(detached).unwrap();
        assert_eq!(player.playing_animations().count(), 0);

        let models = app
            .world_mut()
            .query::<&AnimatedModel>()
            .iter(app.world())
            .count();
        assert_eq!(models, 0);

        let active = app.world().resource::<ActiveScene>();
        assert_eq!(active.index, 1);
        assert!(active.pending.is_some());
        let new_root = active.root.unwrap();
        assert_ne!(new_root, old_root);
        assert_eq!(app.world().get::<SceneModel>(new_root).unwrap().loop_frames, 600);

        let overlays = app.world().resource::<Overlays>();
        assert!(overlays.loading);
        assert_eq!(overlays.scene_title, "Berth");
    }

    #[test]
    fn test_only_last_load_request_applies() {
        let mut app = app();
        app.world_mut().write_message(LoadScene(1));
        app.world_mut().write_message(LoadScene(0));
        app.update();

        let active = app.world().resource::<ActiveScene>();
        assert_eq!(active.index, 0);
        assert_eq!(app.world().resource::<Overlays>().scene_title, "Quay");
        let roots = app
            .world_mut()
            .query::<&SceneModel>()
            .iter(app.world())
            .count();
        assert_eq!(roots, 1);
    }

    #[test]
    fn test_scene_swap_stops_tracking() {
        let mut app = app();
        let truck = app.world_mut().spawn_empty().id();
        app.world_mut()
            .resource_mut::<InteractionState>()
            .start_tracking(truck, "Truck_1");

        app.world_mut().write_message(LoadScene(1));
        app.update();

        let interaction = app.world().resource::<InteractionState>();
        assert!(!interaction.is_tracking());
        assert!(interaction.controls_enabled());
        assert!(app
            .world()
            .resource::<PendingEffects>()
            .0
            .iter()
            .all(|e| !matches!(e, harbor_core::interaction::Effect::HomeCamera)));
    }
}
