//! Clip bookkeeping for an animated scene model
//!
//! Every clip except `pop_up` / `pop_down` loops forever. The two one-shots
//! are driven by a small state machine and blend against the loops with
//! linear weight crossfades. The director only decides weights and which
//! clips run; the renderer applies [`ClipCommand`]s to its animation player
//! and reports one-shot completion back through [`AnimationDirector::finished`].

/// Frame rate the authored loop lengths are expressed in
pub const SOURCE_FPS: f32 = 24.0;

/// Length of every fade in / fade out, in seconds
pub const CROSSFADE_SECS: f32 = 0.5;

pub const POP_UP_CLIP: &str = "pop_up";
pub const POP_DOWN_CLIP: &str = "pop_down";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipRole {
    Loop,
    PopUp,
    PopDown,
}

impl ClipRole {
    pub fn of(name: &str) -> Self {
        match name {
            POP_UP_CLIP => ClipRole::PopUp,
            POP_DOWN_CLIP => ClipRole::PopDown,
            _ => ClipRole::Loop,
        }
    }
}

/// Playback speed that stretches a clip so one loop lasts `loop_frames / 24` s
pub fn loop_speed(clip_duration: f32, loop_frames: u32) -> f32 {
    let target = loop_frames as f32 / SOURCE_FPS;
    if target <= 0.0 || clip_duration <= 0.0 {
        1.0
    } else {
        clip_duration / target
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OneShotPhase {
    /// Loops running, no one-shot active
    #[default]
    Idle,
    /// `pop_up` playing
    TransitioningIn,
    /// `pop_up` finished and clamped on its last frame
    Held,
    /// `pop_down` playing
    TransitioningOut,
}

/// Instruction for the renderer's animation player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipCommand<K> {
    /// Restart the clip from its first frame
    Play { clip: K, repeat: bool },
    Stop(K),
}

#[derive(Debug, Clone)]
struct ClipSlot<K> {
    clip: K,
    role: ClipRole,
    weight: f32,
    target: f32,
    playing: bool,
}

#[derive(Debug, Clone)]
pub struct AnimationDirector<K> {
    slots: Vec<ClipSlot<K>>,
    phase: OneShotPhase,
}

impl<K: Copy + PartialEq + std::fmt::Debug> AnimationDirector<K> {
    /// Build from `(clip handle, clip name)` pairs
    pub fn new<'a>(clips: impl IntoIterator<Item = (K, &'a str)>) -> Self {
        let slots = clips
            .into_iter()
            .map(|(clip, name)| ClipSlot {
                clip,
                role: ClipRole::of(name),
                weight: 0.0,
                target: 0.0,
                playing: false,
            })
            .collect();
        Self {
            slots,
            phase: OneShotPhase::Idle,
        }
    }

    pub fn phase(&self) -> OneShotPhase {
        self.phase
    }

    pub fn loops(&self) -> impl Iterator<Item = K> + '_ {
        self.slots
            .iter()
            .filter(|s| s.role == ClipRole::Loop)
            .map(|s| s.clip)
    }

    pub fn has_clip(&self, role: ClipRole) -> bool {
        self.slots.iter().any(|s| s.role == role)
    }

    /// Current blend weight of every running clip
    pub fn weights(&self) -> impl Iterator<Item = (K, f32)> + '_ {
        self.slots
            .iter()
            .filter(|s| s.playing)
            .map(|s| (s.clip, s.weight))
    }

    pub fn is_playing(&self, clip: K) -> bool {
        self.slots.iter().any(|s| s.clip == clip && s.playing)
    }

    /// The one-shot the renderer should poll for completion
    pub fn pending_one_shot(&self) -> Option<K> {
        let role = match self.phase {
            OneShotPhase::TransitioningIn => ClipRole::PopUp,
            OneShotPhase::TransitioningOut => ClipRole::PopDown,
            OneShotPhase::Idle | OneShotPhase::Held => return None,
        };
        self.slots.iter().find(|s| s.role == role).map(|s| s.clip)
    }

    /// Start every looping clip at full weight
    pub fn start(&mut self) -> Vec<ClipCommand<K>> {
        let mut commands = Vec::new();
        for slot in self.slots.iter_mut().filter(|s| s.role == ClipRole::Loop) {
            slot.weight = 1.0;
            slot.target = 1.0;
            slot.playing = true;
            commands.push(ClipCommand::Play {
                clip: slot.clip,
                repeat: true,
            });
        }
        commands
    }

    pub fn pop_up(&mut self) -> Vec<ClipCommand<K>> {
        if self.in_flight() {
            tracing::debug!(phase = ?self.phase, "One-shot in flight, ignoring pop up");
            return Vec::new();
        }
        if !self.has_clip(ClipRole::PopUp) {
            tracing::warn!("'{POP_UP_CLIP}' clip not found, only the camera will move");
            return Vec::new();
        }

        self.fade_out_role(ClipRole::Loop);
        self.fade_out_role(ClipRole::PopDown);
        let commands = self.fade_in_role(ClipRole::PopUp);
        self.phase = OneShotPhase::TransitioningIn;
        commands
    }

    pub fn pop_down(&mut self) -> Vec<ClipCommand<K>> {
        match self.phase {
            OneShotPhase::TransitioningIn | OneShotPhase::TransitioningOut => {
                tracing::debug!(phase = ?self.phase, "One-shot in flight, ignoring pop down");
                return Vec::new();
            }
            OneShotPhase::Idle => return Vec::new(),
            OneShotPhase::Held => {}
        }

        self.fade_out_role(ClipRole::PopUp);
        if !self.has_clip(ClipRole::PopDown) {
            tracing::warn!("'{POP_DOWN_CLIP}' clip not found, resuming loops directly");
            self.phase = OneShotPhase::Idle;
            return self.fade_in_role(ClipRole::Loop);
        }

        let commands = self.fade_in_role(ClipRole::PopDown);
        self.phase = OneShotPhase::TransitioningOut;
        commands
    }

    /// A non-repeating clip reached its end
    pub fn finished(&mut self, clip: K) -> Vec<ClipCommand<K>> {
        let Some(role) = self.slots.iter().find(|s| s.clip == clip).map(|s| s.role) else {
            return Vec::new();
        };
        match (self.phase, role) {
            (OneShotPhase::TransitioningIn, ClipRole::PopUp) => {
                self.phase = OneShotPhase::Held;
                Vec::new()
            }
            (OneShotPhase::TransitioningOut, ClipRole::PopDown) => {
                self.fade_out_role(ClipRole::PopDown);
                self.phase = OneShotPhase::Idle;
                self.fade_in_role(ClipRole::Loop)
            }
            _ => Vec::new(),
        }
    }

    /// Step the crossfades; clips that faded out completely are stopped
    pub fn advance(&mut self, dt: f32) -> Vec<ClipCommand<K>> {
        let step = dt.max(0.0) / CROSSFADE_SECS;
        let mut commands = Vec::new();
        for slot in self.slots.iter_mut().filter(|s| s.playing) {
            if slot.weight < slot.target {
                slot.weight = (slot.weight + step).min(slot.target);
            } else if slot.weight > slot.target {
                slot.weight = (slot.weight - step).max(slot.target);
            }
            if slot.target == 0.0 && slot.weight == 0.0 {
                slot.playing = false;
                commands.push(ClipCommand::Stop(slot.clip));
            }
        }
        commands
    }

    /// Halt every clip; nothing keeps advancing afterwards
    pub fn dispose(&mut self) -> Vec<ClipCommand<K>> {
        self.phase = OneShotPhase::Idle;
        self.slots
            .iter_mut()
            .map(|slot| {
                slot.weight = 0.0;
                slot.target = 0.0;
                slot.playing = false;
                ClipCommand::Stop(slot.clip)
            })
            .collect()
    }

    fn in_flight(&self) -> bool {
        matches!(
            self.phase,
            OneShotPhase::TransitioningIn | OneShotPhase::TransitioningOut
        )
    }

    fn fade_out_role(&mut self, role: ClipRole) {
        for slot in self.slots.iter_mut().filter(|s| s.role == role) {
            slot.target = 0.0;
        }
    }

    fn fade_in_role(&mut self, role: ClipRole) -> Vec<ClipCommand<K>> {
        let repeat = role == ClipRole::Loop;
        let mut commands = Vec::new();
        for slot in self.slots.iter_mut().filter(|s| s.role == role) {
            slot.weight = 0.0;
            slot.target = 1.0;
            slot.playing = true;
            commands.push(ClipCommand::Play {
                clip: slot.clip,
                repeat,
            });
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: u8 = 0;
    const CONVEYOR: u8 = 1;
    const UP: u8 = 2;
    const DOWN: u8 = 3;

    fn director() -> AnimationDirector<u8> {
        let mut director = AnimationDirector::new([
            (IDLE, "crane_idle"),
            (CONVEYOR, "conveyor"),
            (UP, "pop_up"),
            (DOWN, "pop_down"),
        ]);
        director.start();
        director
    }

    fn weight(director: &AnimationDirector<u8>, clip: u8) -> f32 {
        director
            .weights()
            .find(|(c, _)| *c == clip)
            .map(|(_, w)| w)
            .unwrap_or(0.0)
    }

    #[test]
    fn test_clip_roles() {
        assert_eq!(ClipRole::of("pop_up"), ClipRole::PopUp);
        assert_eq!(ClipRole::of("pop_down"), ClipRole::PopDown);
        assert_eq!(ClipRole::of("Pop_Up"), ClipRole::Loop);
    }

    #[test]
    fn test_loop_speed() {
        // 900 frames at 24 fps is 37.5 s
        assert!((loop_speed(75.0, 900) - 2.0).abs() < 1e-6);
        assert!((loop_speed(12.5, 600) - 0.5).abs() < 1e-6);
        assert_eq!(loop_speed(10.0, 0), 1.0);
    }

    #[test]
    fn test_start_plays_only_loops() {
        let director = director();
        assert!(director.is_playing(IDLE));
        assert!(director.is_playing(CONVEYOR));
        assert!(!director.is_playing(UP));
        assert_eq!(director.phase(), OneShotPhase::Idle);
    }

    #[test]
    fn test_crossfade_weights() {
        let mut director = director();
        let commands = director.pop_up();
        assert_eq!(commands, vec![ClipCommand::Play { clip: UP, repeat: false }]);
        assert_eq!(director.phase(), OneShotPhase::TransitioningIn);

        director.advance(0.25);
        assert!((weight(&director, IDLE) - 0.5).abs() < 1e-6);
        assert!((weight(&director, UP) - 0.5).abs() < 1e-6);

        let stopped = director.advance(0.25);
        assert!(stopped.contains(&ClipCommand::Stop(IDLE)));
        assert!(stopped.contains(&ClipCommand::Stop(CONVEYOR)));
        assert_eq!(weight(&director, UP), 1.0);
        assert!(!director.is_playing(IDLE));
    }

    #[test]
    fn test_requests_ignored_while_in_flight() {
        let mut director = director();
        director.pop_up();
        assert!(director.pop_up().is_empty());
        assert!(director.pop_down().is_empty());
        assert_eq!(director.pending_one_shot(), Some(UP));

        director.finished(UP);
        assert_eq!(director.phase(), OneShotPhase::Held);
        assert_eq!(director.pending_one_shot(), None);

        director.pop_down();
        assert_eq!(director.phase(), OneShotPhase::TransitioningOut);
        assert!(director.pop_up().is_empty());
    }

    #[test]
    fn test_pop_down_completion_resumes_loops() {
        let mut director = director();
        director.pop_up();
        director.advance(1.0);
        director.finished(UP);
        director.pop_down();
        director.advance(1.0);

        let commands = director.finished(DOWN);
        assert_eq!(director.phase(), OneShotPhase::Idle);
        assert!(commands.contains(&ClipCommand::Play { clip: IDLE, repeat: true }));
        assert!(commands.contains(&ClipCommand::Play { clip: CONVEYOR, repeat: true }));

        director.advance(CROSSFADE_SECS);
        assert_eq!(weight(&director, IDLE), 1.0);
        assert!(!director.is_playing(DOWN));
    }

    #[test]
    fn test_missing_pop_down_resumes_directly() {
        let mut director = AnimationDirector::new([(IDLE, "idle"), (UP, "pop_up")]);
        director.start();
        director.pop_up();
        director.finished(UP);

        let commands = director.pop_down();
        assert_eq!(commands, vec![ClipCommand::Play { clip: IDLE, repeat: true }]);
        assert_eq!(director.phase(), OneShotPhase::Idle);
    }

    #[test]
    fn test_missing_pop_up_is_noop() {
        let mut director = AnimationDirector::new([(IDLE, "idle")]);
        director.start();
        assert!(director.pop_up().is_empty());
        assert_eq!(director.phase(), OneShotPhase::Idle);
        assert!(director.is_playing(IDLE));
    }

    #[test]
    fn test_dispose_halts_everything() {
        let mut director = director();
        director.pop_up();
        director.advance(0.1);

        let commands = director.dispose();
        assert_eq!(commands.len(), 4);
        assert_eq!(director.weights().count(), 0);
        assert!(director.loops().all(|clip| !director.is_playing(clip)));
        assert!(director.advance(1.0).is_empty());
    }
}
