//! Harbor Core - Scene data, object catalog and interaction state
//!
//! This crate holds everything about the Harbor Twin viewer that does not
//! need a renderer:
//! - Scene descriptors, the wrap-around scene list and the built-in presets
//! - Object catalog mapping scene node names to focus/track behavior
//! - Mock telemetry records and the rules that turn fields into panel rows
//! - Camera tween math and the focus/tracking state machine
//! - The pop up / pop down animation state machine

pub mod animation;
pub mod catalog;
pub mod interaction;
pub mod overlay;
pub mod presets;
pub mod scene;
pub mod telemetry;
pub mod tween;

pub use animation::{AnimationDirector, ClipCommand, ClipRole, OneShotPhase};
pub use catalog::{Capability, CatalogError, CatalogSpec, ObjectCatalog, ObjectProfile, Severity};
pub use interaction::{Effect, InteractionManager, InteractionPhase, Pick};
pub use overlay::{OverlayBoard, OverlayKind};
pub use scene::{SceneDescriptor, SceneError, SceneList};
pub use telemetry::{AnalyticsSnapshot, DwellSnapshot, EnergyReadout, FieldView, TelemetryRecord, Tier, TrackingNote};
pub use tween::{CameraPose, CameraTween, TweenPurpose};
