//! Camera rig: damped orbit controls, keyboard free movement and the fixed scene camera

use bevy::camera::Exposure;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::ecs::message::MessageReader;
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;
use harbor_core::tween::CameraPose;
use std::f32::consts::{FRAC_PI_2, PI};

use crate::types::{ActiveScene, InteractionState};
use crate::FrameSet;

/// Lowest the orbit may go, measured from straight up
pub const MAX_POLAR_ANGLE: f32 = PI / 2.1;

/// Keeps the orbit off the pole
const MAX_ELEVATION: f32 = FRAC_PI_2 - 0.01;

/// Camera settings from the `[camera]` config section
#[derive(Debug, Clone, Resource)]
pub struct CameraSettings {
    /// Vertical field of view
    pub fov_degrees: f32,
    /// Keyboard free movement speed, units per second
    pub move_speed: f32,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            move_speed: 30.0,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            smooth_factor: 0.15,
            min_distance: 1.0,
            max_distance: 50.0,
        }
    }
}

impl CameraSettings {
    pub fn fov(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}

/// Spherical orbit state around a target point (Y up)
///
/// `distance` and `target` chase `target_distance` and `target_focus` with
/// exponential smoothing, which gives the orbit its damping.
#[derive(Debug, Clone, Resource)]
pub struct OrbitRig {
    pub azimuth: f32,
    pub elevation: f32,
    pub distance: f32,
    pub target_distance: f32,
    pub target: Vec3,
    pub target_focus: Vec3,
    /// The glTF fixed camera is rendering instead of the main camera
    pub fixed_view: bool,
}

impl Default for OrbitRig {
    fn default() -> Self {
        let mut rig = Self {
            azimuth: 0.0,
            elevation: 0.0,
            distance: 1.0,
            target_distance: 1.0,
            target: Vec3::ZERO,
            target_focus: Vec3::ZERO,
            fixed_view: false,
        };
        rig.sync_from_pose(CameraPose::new(Vec3::new(6.0, 80.0, 60.0), Vec3::ZERO));
        rig
    }
}

impl OrbitRig {
    pub fn min_elevation() -> f32 {
        FRAC_PI_2 - MAX_POLAR_ANGLE
    }

    /// Camera position relative to the target
    pub fn offset(&self) -> Vec3 {
        let horizontal = self.distance * self.elevation.cos();
        Vec3::new(
            horizontal * self.azimuth.sin(),
            self.distance * self.elevation.sin(),
            horizontal * self.azimuth.cos(),
        )
    }

    pub fn position(&self) -> Vec3 {
        self.target + self.offset()
    }

    /// Re-derive the spherical state from a camera pose written elsewhere
    pub fn sync_from_pose(&mut self, pose: CameraPose) {
        let offset = pose.position - pose.target;
        let distance = offset.length().max(f32::EPSILON);
        self.distance = distance;
        self.target_distance = distance;
        self.elevation = (offset.y / distance).clamp(-1.0, 1.0).asin();
        self.azimuth = offset.x.atan2(offset.z);
        self.target = pose.target;
        self.target_focus = pose.target;
    }

    pub fn orbit(&mut self, delta: Vec2, sensitivity: f32) {
        self.azimuth -= delta.x * sensitivity;
        self.elevation = (self.elevation + delta.y * sensitivity).clamp(Self::min_elevation(), MAX_ELEVATION);
    }

    /// Screen-space pan of the orbit target
    pub fn pan(&mut self, delta: Vec2) {
        let forward = -self.offset().normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        let speed = self.distance * 0.002;
        self.target_focus += (-right * delta.x + up * delta.y) * speed;
    }

    pub fn zoom(&mut self, scroll: f32, settings: &CameraSettings) {
        let factor = 1.0 - scroll * settings.zoom_speed;
        self.target_distance =
            (self.target_distance * factor).clamp(settings.min_distance, settings.max_distance);
    }

    /// Forward and right directions flattened onto the ground plane
    pub fn ground_axes(&self) -> (Vec3, Vec3) {
        let offset = self.offset();
        let forward = Vec3::new(-offset.x, 0.0, -offset.z).normalize_or_zero();
        (forward, forward.cross(Vec3::Y))
    }

    /// Move camera and target together
    pub fn translate(&mut self, delta: Vec3) {
        self.target += delta;
        self.target_focus += delta;
    }

    pub fn smooth(&mut self, dt: f32, smooth_factor: f32) {
        let lerp_factor = 1.0 - (-smooth_factor * 60.0 * dt).exp();
        self.distance += (self.target_distance - self.distance) * lerp_factor;
        self.target += (self.target_focus - self.target) * lerp_factor;
    }

    /// User input may move the camera
    pub fn accepts_input(&self, interaction: &InteractionState) -> bool {
        interaction.controls_enabled() && !self.fixed_view
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Marker for the glTF camera used as the scene's fixed shot
#[derive(Component)]
pub struct FixedSceneCamera;

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraSettings>()
            .init_resource::<OrbitRig>()
            .add_systems(Startup, spawn_camera)
            .add_systems(Update, (
                toggle_fixed_camera.in_set(FrameSet::Pointer),
                free_move.in_set(FrameSet::FreeMove),
                orbit_controls.in_set(FrameSet::Orbit),
            ));
    }
}

fn spawn_camera(mut commands: Commands, settings: Res<CameraSettings>, rig: Res<OrbitRig>) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: settings.fov(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        Tonemapping::AcesFitted,
        Exposure::default(),
        Transform::from_translation(rig.position()).looking_at(rig.target, Vec3::Y),
        MainCamera,
    ));
}

/// Key `0` swaps between the orbit camera and the scene's fixed camera
fn toggle_fixed_camera(
    keyboard: Res<ButtonInput<KeyCode>>,
    active: Res<ActiveScene>,
    mut rig: ResMut<OrbitRig>,
    mut main_camera: Query<&mut Camera, (With<MainCamera>, Without<FixedSceneCamera>)>,
    mut fixed_cameras: Query<(Entity, &mut Camera), (With<FixedSceneCamera>, Without<MainCamera>)>,
) {
    if !(keyboard.just_pressed(KeyCode::Digit0) || keyboard.just_pressed(KeyCode::Numpad0)) {
        return;
    }
    let Some(fixed) = active.fixed_camera else {
        return;
    };

    rig.fixed_view = !rig.fixed_view;
    for (entity, mut camera) in &mut fixed_cameras {
        camera.is_active = rig.fixed_view && entity == fixed;
    }
    if let Ok(mut camera) = main_camera.single_mut() {
        camera.is_active = !rig.fixed_view;
    }

    if rig.fixed_view {
        tracing::info!("Switched to fixed scene camera");
    } else {
        tracing::info!("Switched back to orbit camera");
    }
}

/// WASD / arrow keys move across the ground plane
fn free_move(
    keyboard: Res<ButtonInput<KeyCode>>,
    interaction: Res<InteractionState>,
    settings: Res<CameraSettings>,
    time: Res<Time>,
    mut rig: ResMut<OrbitRig>,
) {
    if interaction.is_tweening() || interaction.is_tracking() || !rig.accepts_input(&interaction) {
        return;
    }

    let pressed = |a: KeyCode, b: KeyCode| keyboard.pressed(a) || keyboard.pressed(b);
    let (forward, right) = rig.ground_axes();
    let mut direction = Vec3::ZERO;
    if pressed(KeyCode::KeyW, KeyCode::ArrowUp) {
        direction += forward;
    }
    if pressed(KeyCode::KeyS, KeyCode::ArrowDown) {
        direction -= forward;
    }
    if pressed(KeyCode::KeyA, KeyCode::ArrowLeft) {
        direction -= right;
    }
    if pressed(KeyCode::KeyD, KeyCode::ArrowRight) {
        direction += right;
    }

    let delta = direction.normalize_or_zero() * settings.move_speed * time.delta_secs();
    if delta != Vec3::ZERO {
        rig.translate(delta);
    }
}

/// Mouse orbit / pan / zoom with damping
fn orbit_controls(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut rig: ResMut<OrbitRig>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    interaction: Res<InteractionState>,
    settings: Res<CameraSettings>,
    time: Res<Time>,
    mut contexts: EguiContexts,
) {
    let total_motion: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    let scroll: f32 = mouse_wheel
        .read()
        .map(|event| match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / 120.0,
        })
        .sum();

    if !rig.accepts_input(&interaction) {
        return;
    }

    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area())
        .unwrap_or(false);

    if !egui_wants_pointer {
        if mouse_button.pressed(MouseButton::Left) {
            rig.orbit(total_motion, settings.sensitivity);
        }
        if mouse_button.pressed(MouseButton::Right) {
            rig.pan(total_motion);
        }
        if scroll != 0.0 {
            rig.zoom(scroll, &settings);
        }
    }

    rig.smooth(time.delta_secs(), settings.smooth_factor);

    if let Ok(mut transform) = camera_query.single_mut() {
        transform.translation = rig.position();
        transform.look_at(rig.target, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_from_pose_round_trip() {
        let mut rig = OrbitRig::default();
        let pose = CameraPose::new(Vec3::new(10.0, 12.0, -4.0), Vec3::new(2.0, 0.0, 1.0));
        rig.sync_from_pose(pose);
        assert!((rig.position() - pose.position).length() < 1e-4);
        assert_eq!(rig.target, pose.target);
        assert_eq!(rig.distance, rig.target_distance);
    }

    #[test]
    fn test_zoom_limits() {
        let settings = CameraSettings::default();
        let mut rig = OrbitRig::default();
        rig.zoom(-100.0, &settings);
        assert_eq!(rig.target_distance, 50.0);
        rig.zoom(100.0, &settings);
        assert_eq!(rig.target_distance, 1.0);
    }

    #[test]
    fn test_orbit_stays_above_ground() {
        let mut rig = OrbitRig::default();
        rig.orbit(Vec2::new(0.0, -10_000.0), 0.005);
        assert!((rig.elevation - OrbitRig::min_elevation()).abs() < 1e-6);
        assert!(rig.offset().y > 0.0);
    }

    #[test]
    fn test_ground_axes() {
        let mut rig = OrbitRig::default();
        rig.sync_from_pose(CameraPose::new(Vec3::new(0.0, 10.0, 10.0), Vec3::ZERO));
        let (forward, right) = rig.ground_axes();
        assert!((forward - Vec3::NEG_Z).length() < 1e-5);
        assert!((right - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_translate_moves_camera_and_target() {
        let mut rig = OrbitRig::default();
        let before = rig.position();
        rig.translate(Vec3::new(3.0, 0.0, -2.0));
        assert!((rig.position() - (before + Vec3::new(3.0, 0.0, -2.0))).length() < 1e-4);
        assert_eq!(rig.target, rig.target_focus);
    }
}
