//! Scene descriptors and the ordered scene list

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::animation::SOURCE_FPS;
use crate::catalog::{CatalogError, CatalogSpec, ObjectCatalog};
use crate::overlay::{OverlayBoard, OverlayKind};

/// Environment name meaning "built-in lighting only"
pub const DEFAULT_ENVIRONMENT: &str = "default";

/// Name of the glTF camera used as a scene's fixed shot
pub const FIXED_CAMERA_NAME: &str = "Fixed_Shot_Cam_Orientation";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene list is empty")]
    Empty,
    #[error("scene '{0}' has a zero loop length")]
    ZeroLoopFrames(String),
    #[error("scene '{0}' has a non-positive exposure")]
    InvalidExposure(String),
    #[error("scene '{scene}': {source}")]
    Catalog {
        scene: String,
        #[source]
        source: CatalogError,
    },
}

fn default_loop_frames() -> u32 {
    900
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

fn default_camera_position() -> [f32; 3] {
    [6.0, 80.0, 60.0]
}

fn default_exposure() -> f32 {
    1.0
}

/// Everything needed to load and present one scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescriptor {
    /// Title shown between the navigation buttons
    pub name: String,
    /// glTF asset path, relative to the asset root
    pub path: String,
    /// Length every looping clip is stretched to, in 24 fps frames
    #[serde(default = "default_loop_frames")]
    pub loop_frames: u32,
    /// Environment map base name, or `default`
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_camera_position")]
    pub camera_position: [f32; 3],
    /// Linear exposure multiplier
    #[serde(default = "default_exposure")]
    pub exposure: f32,
    /// glTF camera that key `0` switches to
    #[serde(default)]
    pub fixed_camera: Option<String>,
    /// Overlays this scene provides on top of details and tracking
    #[serde(default)]
    pub overlays: Vec<OverlayKind>,
    #[serde(default)]
    pub catalog: CatalogSpec,
}

impl SceneDescriptor {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            loop_frames: default_loop_frames(),
            environment: default_environment(),
            camera_position: default_camera_position(),
            exposure: default_exposure(),
            fixed_camera: None,
            overlays: Vec::new(),
            catalog: CatalogSpec::default(),
        }
    }

    /// Seconds one ambient loop lasts
    pub fn loop_duration(&self) -> f32 {
        self.loop_frames as f32 / SOURCE_FPS
    }

    pub fn uses_default_environment(&self) -> bool {
        self.environment.is_empty() || self.environment == DEFAULT_ENVIRONMENT
    }

    /// `(diffuse, specular)` cubemap paths, or `None` for built-in lighting
    pub fn environment_map_paths(&self) -> Option<(String, String)> {
        if self.uses_default_environment() {
            return None;
        }
        let stem = Path::new(&self.environment)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.environment);
        Some((
            format!("environment_maps/{stem}_diffuse.ktx2"),
            format!("environment_maps/{stem}_specular.ktx2"),
        ))
    }

    /// Physical camera exposure for the linear multiplier, relative to `base_ev100`
    pub fn ev100(&self, base_ev100: f32) -> f32 {
        if self.exposure > 0.0 {
            base_ev100 - self.exposure.log2()
        } else {
            base_ev100
        }
    }

    pub fn shows_energy_grid(&self) -> bool {
        self.overlays.contains(&OverlayKind::EnergyGrid)
    }

    pub fn overlay_board(&self) -> OverlayBoard {
        OverlayBoard::new(self.overlays.iter().copied())
    }

    pub fn resolve_catalog(&self) -> Result<ObjectCatalog, SceneError> {
        ObjectCatalog::resolve(&self.catalog).map_err(|source| SceneError::Catalog {
            scene: self.name.clone(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        if self.loop_frames == 0 {
            return Err(SceneError::ZeroLoopFrames(self.name.clone()));
        }
        if self.exposure.is_nan() || self.exposure <= 0.0 {
            return Err(SceneError::InvalidExposure(self.name.clone()));
        }
        self.resolve_catalog().map(|_| ())
    }
}

/// Ordered, non-empty list of scenes with wrap-around navigation
#[derive(Debug, Clone, PartialEq)]
pub struct SceneList {
    scenes: Vec<SceneDescriptor>,
}

impl SceneList {
    pub fn new(scenes: Vec<SceneDescriptor>) -> Result<Self, SceneError> {
        if scenes.is_empty() {
            return Err(SceneError::Empty);
        }
        for scene in &scenes {
            scene.validate()?;
        }
        Ok(Self { scenes })
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SceneDescriptor> {
        self.scenes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneDescriptor> {
        self.scenes.iter()
    }

    pub fn next_index(&self, current: usize) -> usize {
        (current + 1) % self.scenes.len()
    }

    pub fn previous_index(&self, current: usize) -> usize {
        (current + self.scenes.len() - 1) % self.scenes.len()
    }

    /// Index to start from; out-of-range requests fall back to the first scene
    pub fn start_index(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(index) if index < self.scenes.len() => index,
            Some(index) => {
                tracing::warn!(index, count = self.scenes.len(), "Requested scene out of range, starting at 0");
                0
            }
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ObjectProfile;

    fn list() -> SceneList {
        SceneList::new(vec![
            SceneDescriptor::new("A", "scenes/a.glb"),
            SceneDescriptor::new("B", "scenes/b.glb"),
            SceneDescriptor::new("C", "scenes/c.glb"),
        ])
        .unwrap()
    }

    #[test]
    fn test_wrap_around() {
        let list = list();
        assert_eq!(list.next_index(2), 0);
        assert_eq!(list.next_index(0), 1);
        assert_eq!(list.previous_index(0), 2);
        assert_eq!(list.previous_index(1), 0);
    }

    #[test]
    fn test_start_index() {
        let list = list();
        assert_eq!(list.start_index(None), 0);
        assert_eq!(list.start_index(Some(2)), 2);
        assert_eq!(list.start_index(Some(7)), 0);
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(SceneList::new(Vec::new()).unwrap_err(), SceneError::Empty);
    }

    #[test]
    fn test_invalid_catalog_names_scene() {
        let mut scene = SceneDescriptor::new("Broken", "scenes/x.glb");
        scene.catalog.objects = vec![ObjectProfile::focus("a"), ObjectProfile::focus("a")];
        let err = SceneList::new(vec![scene]).unwrap_err();
        assert!(matches!(err, SceneError::Catalog { ref scene, .. } if scene == "Broken"));
        assert!(err.to_string().contains("listed more than once"));
    }

    #[test]
    fn test_loop_duration() {
        let mut scene = SceneDescriptor::new("A", "a.glb");
        assert_eq!(scene.loop_duration(), 37.5);
        scene.loop_frames = 600;
        assert_eq!(scene.loop_duration(), 25.0);
    }

    #[test]
    fn test_environment_paths() {
        let mut scene = SceneDescriptor::new("A", "a.glb");
        assert!(scene.environment_map_paths().is_none());

        scene.environment = "qwantani_moon_noon_puresky_1k.hdr".into();
        let (diffuse, specular) = scene.environment_map_paths().unwrap();
        assert_eq!(diffuse, "environment_maps/qwantani_moon_noon_puresky_1k_diffuse.ktx2");
        assert_eq!(specular, "environment_maps/qwantani_moon_noon_puresky_1k_specular.ktx2");
    }

    #[test]
    fn test_exposure_to_ev100() {
        let mut scene = SceneDescriptor::new("A", "a.glb");
        assert_eq!(scene.ev100(9.7), 9.7);
        scene.exposure = 0.5;
        assert!((scene.ev100(9.7) - 10.7).abs() < 1e-5);
    }

    #[test]
    fn test_toml_defaults() {
        let scene: SceneDescriptor = toml::from_str(
            r#"
            name = "Yard"
            path = "scenes/yard.glb"
            overlays = ["energy_grid"]
            "#,
        )
        .unwrap();
        assert_eq!(scene.loop_frames, 900);
        assert_eq!(scene.camera_position, [6.0, 80.0, 60.0]);
        assert!(scene.uses_default_environment());
        assert!(scene.shows_energy_grid());
        assert!(scene.overlay_board().provides(OverlayKind::EnergyGrid));
    }
}
