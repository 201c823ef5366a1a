//! Object catalog: which named scene objects can be clicked, and what they show
//!
//! A catalog is authored as a [`CatalogSpec`] (presets or TOML) and resolved
//! once per scene load into an [`ObjectCatalog`] with name lookups. Each
//! object name maps to exactly one [`ObjectProfile`], so the focusable and
//! trackable registries are disjoint by construction.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::overlay::OverlayKind;
use crate::telemetry::{TelemetryRecord, TrackingNote};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("object '{0}' is listed more than once")]
    DuplicateObject(String),
    #[error("trackable object '{0}' has no tracking note")]
    MissingTrackingNote(String),
}

/// What clicking an object does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Fly the camera to it and show its details
    Focus,
    /// Follow it with the camera
    Track,
}

/// Diagnostic severity; flagged objects pulse while focused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Critical,
}

impl Severity {
    /// Linear RGB emissive color of the highlight
    pub fn emissive_rgb(self) -> [f32; 3] {
        match self {
            Severity::Warning => [1.0, 0.55, 0.0],
            Severity::Critical => [1.0, 0.05, 0.05],
        }
    }
}

/// Per-object interaction strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectProfile {
    /// Scene graph node name
    pub name: String,
    pub capability: Capability,
    /// Logical entity key whose record is shown instead of `name`'s
    #[serde(default)]
    pub alias: Option<String>,
    /// Overlays opened next to the details panel on focus
    #[serde(default)]
    pub overlays: Vec<OverlayKind>,
    #[serde(default)]
    pub severity: Option<Severity>,
    /// Whether focusing plays the model's "pop up" clip
    #[serde(default = "default_true")]
    pub pop_up: bool,
}

fn default_true() -> bool {
    true
}

impl ObjectProfile {
    pub fn focus(name: &str) -> Self {
        Self {
            name: name.to_string(),
            capability: Capability::Focus,
            alias: None,
            overlays: Vec::new(),
            severity: None,
            pop_up: true,
        }
    }

    pub fn track(name: &str) -> Self {
        Self {
            capability: Capability::Track,
            pop_up: false,
            ..Self::focus(name)
        }
    }

    pub fn with_alias(mut self, key: &str) -> Self {
        self.alias = Some(key.to_string());
        self
    }

    pub fn with_overlays(mut self, overlays: &[OverlayKind]) -> Self {
        self.overlays = overlays.to_vec();
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Key into the record table
    pub fn display_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Authored form of a catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSpec {
    #[serde(default)]
    pub objects: Vec<ObjectProfile>,
    /// Details records keyed by display key
    #[serde(default)]
    pub records: BTreeMap<String, TelemetryRecord>,
    /// Tracking banners keyed by object name
    #[serde(default)]
    pub tracking: BTreeMap<String, TrackingNote>,
}

/// Resolved catalog for the active scene
#[derive(Debug, Clone, Default)]
pub struct ObjectCatalog {
    profiles: HashMap<String, ObjectProfile>,
    records: HashMap<String, TelemetryRecord>,
    tracking: HashMap<String, TrackingNote>,
}

impl ObjectCatalog {
    pub fn resolve(spec: &CatalogSpec) -> Result<Self, CatalogError> {
        let mut profiles = HashMap::with_capacity(spec.objects.len());
        for profile in &spec.objects {
            if profiles.insert(profile.name.clone(), profile.clone()).is_some() {
                return Err(CatalogError::DuplicateObject(profile.name.clone()));
            }
            if profile.capability == Capability::Track && !spec.tracking.contains_key(&profile.name) {
                return Err(CatalogError::MissingTrackingNote(profile.name.clone()));
            }
            if profile.capability == Capability::Focus && !spec.records.contains_key(profile.display_key()) {
                // Records are soft misses at click time; worth a heads-up at load
                tracing::warn!(object = %profile.name, key = %profile.display_key(), "Focusable object has no record");
            }
        }

        Ok(Self {
            profiles,
            records: spec.records.clone().into_iter().collect(),
            tracking: spec.tracking.clone().into_iter().collect(),
        })
    }

    pub fn profile(&self, name: &str) -> Option<&ObjectProfile> {
        self.profiles.get(name)
    }

    pub fn capability(&self, name: &str) -> Option<Capability> {
        self.profile(name).map(|p| p.capability)
    }

    pub fn is_focusable(&self, name: &str) -> bool {
        self.capability(name) == Some(Capability::Focus)
    }

    pub fn is_trackable(&self, name: &str) -> bool {
        self.capability(name) == Some(Capability::Track)
    }

    pub fn record(&self, key: &str) -> Option<&TelemetryRecord> {
        self.records.get(key)
    }

    pub fn tracking_note(&self, name: &str) -> Option<&TrackingNote> {
        self.tracking.get(name)
    }

    /// Sorted names of every object with the given capability
    pub fn names_with(&self, capability: Capability) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .profiles
            .values()
            .filter(|p| p.capability == capability)
            .map(|p| p.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Resolve a hit given the names of the hit node and its ancestors,
    /// nearest first.
    ///
    /// The whole chain is searched for a trackable name before it is searched
    /// for a focusable one. Returns the chain index of the match.
    pub fn pick<'a, I>(&self, chain: I) -> Option<(usize, &ObjectProfile)>
    where
        I: IntoIterator<Item = &'a str>,
        I::IntoIter: Clone,
    {
        let chain = chain.into_iter();
        for capability in [Capability::Track, Capability::Focus] {
            let hit = chain.clone().enumerate().find_map(|(i, name)| {
                self.profile(name)
                    .filter(|p| p.capability == capability)
                    .map(|p| (i, p))
            });
            if hit.is_some() {
                return hit;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> CatalogSpec {
        let mut spec = CatalogSpec {
            objects: vec![
                ObjectProfile::focus("crane_new").with_overlays(&[OverlayKind::Analytics]),
                ObjectProfile::focus("Arm1_lambert1_0").with_alias("Robotic_Arm_System"),
                ObjectProfile::focus("Cube").with_alias("Robotic_Arm_System"),
                ObjectProfile::track("crate_opti_1"),
            ],
            ..Default::default()
        };
        spec.records.insert(
            "crane_new".into(),
            TelemetryRecord::from_pairs([("Name", "Automated Crane Unit")]),
        );
        spec.records.insert(
            "Robotic_Arm_System".into(),
            TelemetryRecord::from_pairs([("Name", "Robotic Arm System")]),
        );
        spec.tracking.insert(
            "crate_opti_1".into(),
            TrackingNote::new(true, "Traffic Optimized:", "AI-guided pathing"),
        );
        spec
    }

    #[test]
    fn test_alias_resolution() {
        let catalog = ObjectCatalog::resolve(&spec()).unwrap();
        let arm = catalog.profile("Cube").unwrap();
        assert_eq!(arm.display_key(), "Robotic_Arm_System");
        assert!(catalog.record(arm.display_key()).is_some());
        assert_eq!(catalog.profile("crane_new").unwrap().display_key(), "crane_new");
    }

    #[test]
    fn test_pick_prefers_trackable_anywhere_in_chain() {
        let catalog = ObjectCatalog::resolve(&spec()).unwrap();

        // Focusable child inside a trackable parent: tracking wins
        let chain = ["mesh_0", "crane_new", "crate_opti_1", "Scene"];
        let (index, profile) = catalog.pick(chain.iter().copied()).unwrap();
        assert_eq!(index, 2);
        assert_eq!(profile.capability, Capability::Track);

        let chain = ["mesh_0", "Arm1_lambert1_0", "Scene"];
        let (index, profile) = catalog.pick(chain.iter().copied()).unwrap();
        assert_eq!(index, 1);
        assert_eq!(profile.name, "Arm1_lambert1_0");
    }

    #[test]
    fn test_pick_unknown_chain() {
        let catalog = ObjectCatalog::resolve(&spec()).unwrap();
        let chain = ["Ground_Plane", "Scene"];
        assert!(catalog.pick(chain.iter().copied()).is_none());
        assert!(catalog.pick(std::iter::empty::<&str>()).is_none());
    }

    #[test]
    fn test_registries_disjoint() {
        let catalog = ObjectCatalog::resolve(&spec()).unwrap();
        let focusable = catalog.names_with(Capability::Focus);
        let trackable = catalog.names_with(Capability::Track);
        assert_eq!(focusable, vec!["Arm1_lambert1_0", "Cube", "crane_new"]);
        assert_eq!(trackable, vec!["crate_opti_1"]);
        assert!(focusable.iter().all(|n| !catalog.is_trackable(n)));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut spec = spec();
        spec.objects.push(ObjectProfile::track("crane_new"));
        assert_eq!(
            ObjectCatalog::resolve(&spec).unwrap_err(),
            CatalogError::DuplicateObject("crane_new".into())
        );
    }

    #[test]
    fn test_trackable_requires_note() {
        let mut spec = spec();
        spec.objects.push(ObjectProfile::track("crate_lag_9"));
        assert_eq!(
            ObjectCatalog::resolve(&spec).unwrap_err(),
            CatalogError::MissingTrackingNote("crate_lag_9".into())
        );
    }
}
