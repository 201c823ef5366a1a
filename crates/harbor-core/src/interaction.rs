//! Focus / tracking state machine
//!
//! [`InteractionManager`] owns the interaction state (nothing, one focused
//! object, or one tracked object) and the single active camera tween. It is
//! engine agnostic: transitions return a list of [`Effect`]s that the
//! renderer carries out (open panels, start highlight, fly the camera...).
//! `T` is the renderer's handle for a scene object.

use crate::catalog::{Capability, ObjectCatalog, Severity};
use crate::overlay::OverlayKind;
use crate::tween::{CameraPose, CameraTween};

/// Visual side effect of a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect<T> {
    /// Fill the details panel from the record under `key` and show it
    ShowDetails { key: String },
    ShowOverlay(OverlayKind),
    HideOverlay(OverlayKind),
    Highlight { target: T, severity: Severity },
    ClearHighlight,
    /// Start a framing tween towards the object
    FocusCamera(T),
    /// Start a tween back to the scene's initial pose
    HomeCamera,
    PopUp,
    PopDown,
    /// Fill the tracking panel from the note for `name` and show it
    ShowTracking { name: String },
    HideTracking,
}

/// Object resolved from a pointer hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick<T> {
    pub target: T,
    /// Catalog name of the matched node
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Focused<T> {
    pub target: T,
    pub name: String,
    /// Record key after alias resolution
    pub key: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracked<T> {
    pub target: T,
    pub name: String,
}

/// Coarse state, for display and assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionPhase {
    Idle,
    Focused,
    Tracking,
}

#[derive(Debug, Clone)]
pub struct InteractionManager<T> {
    focused: Option<Focused<T>>,
    tracked: Option<Tracked<T>>,
    tween: Option<CameraTween>,
    controls_enabled: bool,
}

impl<T> Default for InteractionManager<T> {
    fn default() -> Self {
        Self {
            focused: None,
            tracked: None,
            tween: None,
            controls_enabled: true,
        }
    }
}

impl<T: Copy + PartialEq + std::fmt::Debug> InteractionManager<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> InteractionPhase {
        match (&self.focused, &self.tracked) {
            (_, Some(_)) => InteractionPhase::Tracking,
            (Some(_), None) => InteractionPhase::Focused,
            (None, None) => InteractionPhase::Idle,
        }
    }

    pub fn focused(&self) -> Option<&Focused<T>> {
        self.focused.as_ref()
    }

    pub fn tracked(&self) -> Option<&Tracked<T>> {
        self.tracked.as_ref()
    }

    pub fn is_tracking(&self) -> bool {
        self.tracked.is_some()
    }

    pub fn is_tweening(&self) -> bool {
        self.tween.is_some()
    }

    pub fn tween(&self) -> Option<&CameraTween> {
        self.tween.as_ref()
    }

    /// Whether user orbit controls may move the camera
    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    /// Scene clicks are swallowed while a tween runs or the camera is tracking
    pub fn accepts_pointer(&self) -> bool {
        !self.is_tweening() && !self.is_tracking()
    }

    /// Primary-button press on the scene, already resolved against the catalog
    pub fn click(&mut self, pick: Option<Pick<T>>, catalog: &ObjectCatalog) -> Vec<Effect<T>> {
        if !self.accepts_pointer() {
            return Vec::new();
        }

        let Some(pick) = pick else {
            return self.unfocus();
        };

        match catalog.capability(&pick.name) {
            Some(Capability::Track) => self.start_tracking(pick.target, &pick.name),
            Some(Capability::Focus) => self.focus(pick.target, &pick.name, catalog),
            None => self.unfocus(),
        }
    }

    pub fn focus(&mut self, target: T, name: &str, catalog: &ObjectCatalog) -> Vec<Effect<T>> {
        if self.tracked.is_some() {
            return Vec::new();
        }
        if self.focused.as_ref().is_some_and(|f| f.target == target) {
            return Vec::new();
        }

        let Some(profile) = catalog.profile(name).filter(|p| p.capability == Capability::Focus) else {
            tracing::warn!(object = %name, "Not a focusable object");
            return self.unfocus();
        };
        let key = profile.display_key().to_string();
        if catalog.record(&key).is_none() {
            tracing::warn!(object = %name, key = %key, "No telemetry record, dropping focus");
            return self.unfocus();
        }

        let mut effects = Vec::new();
        if self.focused.take().is_some_and(|f| f.highlighted) {
            effects.push(Effect::ClearHighlight);
        }

        effects.push(Effect::ShowDetails { key: key.clone() });
        for kind in OverlayKind::FOCUS_OVERLAYS {
            if kind == OverlayKind::Details {
                continue;
            }
            if profile.overlays.contains(&kind) {
                effects.push(Effect::ShowOverlay(kind));
            } else {
                effects.push(Effect::HideOverlay(kind));
            }
        }
        if let Some(severity) = profile.severity {
            effects.push(Effect::Highlight { target, severity });
        }
        effects.push(Effect::FocusCamera(target));
        if profile.pop_up {
            effects.push(Effect::PopUp);
        }

        tracing::debug!(object = %name, key = %key, "Focused");
        self.focused = Some(Focused {
            target,
            name: name.to_string(),
            key,
            highlighted: profile.severity.is_some(),
        });
        effects
    }

    pub fn unfocus(&mut self) -> Vec<Effect<T>> {
        let Some(previous) = self.focused.take() else {
            return Vec::new();
        };

        let mut effects: Vec<Effect<T>> = OverlayKind::FOCUS_OVERLAYS
            .into_iter()
            .map(Effect::HideOverlay)
            .collect();
        if previous.highlighted {
            effects.push(Effect::ClearHighlight);
        }
        effects.push(Effect::PopDown);
        effects.push(Effect::HomeCamera);

        tracing::debug!(object = %previous.name, "Unfocused");
        effects
    }

    pub fn start_tracking(&mut self, target: T, name: &str) -> Vec<Effect<T>> {
        if self.tracked.as_ref().is_some_and(|t| t.target == target) {
            return Vec::new();
        }

        let mut effects = self.unfocus();
        // The follow camera takes over from here
        effects.retain(|e| *e != Effect::HomeCamera);
        self.tween = None;

        self.tracked = Some(Tracked {
            target,
            name: name.to_string(),
        });
        self.controls_enabled = false;
        effects.push(Effect::ShowTracking {
            name: name.to_string(),
        });

        tracing::debug!(object = %name, "Tracking started");
        effects
    }

    pub fn stop_tracking(&mut self) -> Vec<Effect<T>> {
        let Some(previous) = self.tracked.take() else {
            return Vec::new();
        };
        self.controls_enabled = true;

        tracing::debug!(object = %previous.name, "Tracking stopped");
        vec![Effect::HideTracking, Effect::HomeCamera]
    }

    /// Drop every interaction ahead of a scene swap; the camera is placed
    /// by the loader so no home tween is requested.
    pub fn reset(&mut self) -> Vec<Effect<T>> {
        let mut effects = self.unfocus();
        effects.extend(self.stop_tracking());
        effects.retain(|e| *e != Effect::HomeCamera);
        self.tween = None;
        self.controls_enabled = true;
        effects
    }

    /// Install a new tween, replacing any in-flight one
    pub fn begin_tween(&mut self, tween: CameraTween) -> Option<CameraTween> {
        self.controls_enabled = false;
        let cancelled = self.tween.replace(tween);
        if let Some(old) = &cancelled {
            tracing::debug!(purpose = ?old.purpose, progress = old.progress(), "Cancelled in-flight tween");
        }
        cancelled
    }

    /// Advance the active tween; returns the pose to apply this frame
    pub fn advance_tween(&mut self, dt: f32) -> Option<CameraPose> {
        let tween = self.tween.as_mut()?;
        let step = tween.advance(dt);
        if step.finished {
            self.tween = None;
            self.controls_enabled = !self.is_tracking();
        }
        Some(step.pose)
    }
}
