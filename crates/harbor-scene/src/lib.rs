//! Harbor Scene - 3D scene, interaction and overlay plugins of the port twin
//!
//! The viewer binary only configures the window and inserts a
//! [`SceneLibrary`]; everything else lives in [`HarborScenePlugin`].

pub mod camera;
pub mod highlight;
pub mod interaction;
pub mod models;
pub mod scene;
pub mod types;
pub mod ui;

use bevy::prelude::*;

/// Ordering of the per-frame work
///
/// Scene swaps settle before pointer input is resolved, effects are applied
/// before animations and highlights react, and the camera is written by at
/// most one of tracking, tweening or user control.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Scene,
    Pointer,
    Animation,
    Highlight,
    Tracking,
    FreeMove,
    Tween,
    Orbit,
}

/// Plugin that sets up the whole twin scene
pub struct HarborScenePlugin;

impl Plugin for HarborScenePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                FrameSet::Scene,
                FrameSet::Pointer,
                FrameSet::Animation,
                FrameSet::Highlight,
                FrameSet::Tracking,
                FrameSet::FreeMove,
                FrameSet::Tween,
                FrameSet::Orbit,
            )
                .chain(),
        )
        .add_message::<LoadScene>()
        .add_message::<UiAction>()
        .add_message::<ModelRequest>()
        .add_message::<highlight::HighlightRequest>()
        .init_resource::<Overlays>()
        .add_plugins(camera::CameraPlugin)
        .add_plugins(scene::SceneSetupPlugin)
        .add_plugins(models::ModelsPlugin)
        .add_plugins(interaction::InteractionPlugin)
        .add_plugins(highlight::HighlightPlugin)
        .add_plugins(ui::UiPlugin);
    }
}

// Re-export commonly used types
pub use camera::CameraSettings;
pub use types::*;
