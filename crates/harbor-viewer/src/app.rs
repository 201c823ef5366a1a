//! Bevy application setup

use bevy::prelude::*;
use bevy::winit::WinitSettings;
use bevy_egui::EguiPlugin;
use bevy_picking::{DefaultPickingPlugins, prelude::MeshPickingPlugin};
use harbor_core::scene::SceneList;
use harbor_scene::{HarborScenePlugin, SceneLibrary};

use crate::config::Config;

/// Run the Bevy application
pub fn run(config: &Config, scenes: SceneList) {
    tracing::info!(
        scenes = scenes.len(),
        start = ?config.start_scene,
        "Starting harbor twin"
    );

    App::new()
        // Continuous rendering; the scene always has looping animations
        .insert_resource(WinitSettings::default())
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: config.window.title.clone(),
                    canvas: Some(config.window.canvas.clone()),
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: false,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                // Scenes and environment maps are served next to the page
                file_path: "".to_string(),
                // Static hosting has no .meta files
                meta_check: bevy::asset::AssetMetaCheck::Never,
                ..default()
            })
        )
        // Picking must be added BEFORE EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .insert_resource(config.camera.settings())
        .insert_resource(SceneLibrary::new(scenes, config.start_scene))
        .add_plugins(HarborScenePlugin)
        .run();
}
