//! Configuration loading and validation

use anyhow::Result;
use harbor_core::presets;
use harbor_core::scene::{SceneDescriptor, SceneError, SceneList};
use harbor_scene::CameraSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid scene list: {0}")]
    Scenes(#[from] SceneError),
    #[error("camera distance range {min}..{max} is empty")]
    DistanceRange { min: f32, max: f32 },
    #[error("camera field of view {0} is outside 1..179 degrees")]
    FieldOfView(f32),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    /// Scene loaded on startup
    #[serde(default)]
    pub start_scene: Option<usize>,
    /// Replaces the built-in scene presets when non-empty
    #[serde(default)]
    pub scenes: Vec<SceneDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// CSS selector of the canvas on the web build
    #[serde(default = "default_canvas")]
    pub canvas: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            canvas: default_canvas(),
        }
    }
}

fn default_title() -> String {
    "Harbor Digital Twin".to_string()
}

fn default_canvas() -> String {
    "#harbor-canvas".to_string()
}

/// Mirrors [`CameraSettings`]; missing keys keep their defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub move_speed: f32,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let settings = CameraSettings::default();
        Self {
            fov_degrees: settings.fov_degrees,
            move_speed: settings.move_speed,
            sensitivity: settings.sensitivity,
            zoom_speed: settings.zoom_speed,
            smooth_factor: settings.smooth_factor,
            min_distance: settings.min_distance,
            max_distance: settings.max_distance,
        }
    }
}

impl CameraConfig {
    pub fn settings(&self) -> CameraSettings {
        CameraSettings {
            fov_degrees: self.fov_degrees,
            move_speed: self.move_speed,
            sensitivity: self.sensitivity,
            zoom_speed: self.zoom_speed,
            smooth_factor: self.smooth_factor,
            min_distance: self.min_distance,
            max_distance: self.max_distance,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_distance > 0.0 && self.min_distance < self.max_distance) {
            return Err(ConfigError::DistanceRange {
                min: self.min_distance,
                max: self.max_distance,
            });
        }
        if !(1.0..179.0).contains(&self.fov_degrees) {
            return Err(ConfigError::FieldOfView(self.fov_degrees));
        }
        Ok(())
    }
}

impl Config {
    /// Configured scenes, or the presets when none are given
    pub fn scene_list(&self) -> Result<SceneList, ConfigError> {
        let scenes = if self.scenes.is_empty() {
            presets::default_scenes()
        } else {
            self.scenes.clone()
        };
        Ok(SceneList::new(scenes)?)
    }

    /// Check everything the viewer needs before the window opens
    pub fn validate(&self) -> Result<SceneList, ConfigError> {
        self.camera.validate()?;
        self.scene_list()
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), scenes = config.scenes.len(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harbor_core::catalog::ObjectProfile;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("harbor.toml")).unwrap();

        assert_eq!(config.window.canvas, "#harbor-canvas");
        assert_eq!(config.camera.fov_degrees, 60.0);
        assert!(config.scenes.is_empty());

        let scenes = config.validate().unwrap();
        assert_eq!(scenes.len(), presets::default_scenes().len());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let file = write_config(
            r#"
start_scene = 2

[window]
title = "Berth 7"

[camera]
move_speed = 12.5
"#,
        );
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.window.title, "Berth 7");
        assert_eq!(config.window.canvas, "#harbor-canvas");
        assert_eq!(config.camera.move_speed, 12.5);
        assert_eq!(config.camera.max_distance, 50.0);
        assert_eq!(config.start_scene, Some(2));

        let settings = config.camera.settings();
        assert_eq!(settings.move_speed, 12.5);
        assert_eq!(settings.smooth_factor, CameraSettings::default().smooth_factor);
    }

    #[test]
    fn test_scenes_replace_presets() {
        let file = write_config(
            r#"
[[scenes]]
name = "Yard"
path = "scenes/yard.glb"
overlays = ["analytics"]

[[scenes.catalog.objects]]
name = "Crane_1"
capability = "focus"

[scenes.catalog.records.Crane_1]
fields = [{ label = "Status", value = "Operational" }]
"#,
        );
        let config = load_config(file.path()).unwrap();
        let scenes = config.validate().unwrap();

        assert_eq!(scenes.len(), 1);
        let yard = scenes.get(0).unwrap();
        assert_eq!(yard.name, "Yard");
        assert_eq!(yard.loop_frames, 900);
        let catalog = yard.resolve_catalog().unwrap();
        assert!(catalog.is_focusable("Crane_1"));
    }

    #[test]
    fn test_invalid_scene_is_reported() {
        let mut config = Config::default();
        let mut scene = SceneDescriptor::new("Yard", "scenes/yard.glb");
        scene.catalog.objects.push(ObjectProfile::focus("Crane_1"));
        scene.catalog.objects.push(ObjectProfile::focus("Crane_1"));
        config.scenes.push(scene);

        assert!(matches!(config.validate(), Err(ConfigError::Scenes(SceneError::Catalog { .. }))));
    }

    #[test]
    fn test_camera_limits_are_checked() {
        let mut config = Config::default();
        config.camera.min_distance = 60.0;
        assert!(matches!(config.validate(), Err(ConfigError::DistanceRange { .. })));

        let mut config = Config::default();
        config.camera.fov_degrees = 0.0;
        assert_eq!(config.validate().unwrap_err(), ConfigError::FieldOfView(0.0));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let file = write_config("[camera]\nfov_degrees = \"wide\"\n");
        assert!(load_config(file.path()).is_err());
    }
}
