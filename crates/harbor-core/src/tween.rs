//! Camera pose interpolation: focus framing, tweens and the tracking follow step

use glam::Vec3;

/// Multiplier applied to the object's half extent when framing it
pub const FOCUS_PADDING: f32 = 1.5;

/// Duration of focus and reset tweens, in seconds
pub const TWEEN_DURATION_SECS: f32 = 1.2;

/// Fraction of the remaining distance the tracking camera closes each frame
pub const FOLLOW_DAMPING: f32 = 0.05;

/// Camera offset from a tracked object (above and behind)
pub const FOLLOW_OFFSET: Vec3 = Vec3::new(0.0, 5.0, 15.0);

/// Camera position plus the point the orbit controls revolve around
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    pub fn lerp(&self, other: &CameraPose, t: f32) -> CameraPose {
        CameraPose {
            position: self.position.lerp(other.position, t),
            target: self.target.lerp(other.target, t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    QuadraticOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadraticOut => t * (2.0 - t),
        }
    }
}

/// Camera distance at which an object of the given largest dimension fits
/// the vertical field of view (radians) with padding
pub fn focus_distance(max_dim: f32, fov_y: f32, padding: f32) -> f32 {
    (max_dim / 2.0 * padding) / (fov_y / 2.0).tan()
}

/// Pose that frames an axis-aligned box from above and behind
pub fn focus_pose(min: Vec3, max: Vec3, fov_y: f32) -> CameraPose {
    let center = (min + max) * 0.5;
    let size = max - min;
    let distance = focus_distance(size.max_element(), fov_y, FOCUS_PADDING);
    CameraPose {
        position: center + Vec3::new(0.0, distance * 0.5, distance),
        target: center,
    }
}

/// One damped step of the tracking camera
pub fn follow_step(camera_position: Vec3, tracked_position: Vec3) -> CameraPose {
    let desired = tracked_position + FOLLOW_OFFSET;
    CameraPose {
        position: camera_position.lerp(desired, FOLLOW_DAMPING),
        target: tracked_position,
    }
}

/// Why a tween was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenPurpose {
    Focus,
    Home,
}

/// A timed interpolation between two camera poses
#[derive(Debug, Clone, PartialEq)]
pub struct CameraTween {
    pub from: CameraPose,
    pub to: CameraPose,
    pub purpose: TweenPurpose,
    pub elapsed: f32,
    pub duration: f32,
    pub easing: Easing,
}

/// Result of advancing a tween by one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenStep {
    pub pose: CameraPose,
    pub finished: bool,
}

impl CameraTween {
    pub fn new(from: CameraPose, to: CameraPose, purpose: TweenPurpose) -> Self {
        Self {
            from,
            to,
            purpose,
            elapsed: 0.0,
            duration: TWEEN_DURATION_SECS,
            easing: Easing::QuadraticOut,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn advance(&mut self, dt: f32) -> TweenStep {
        self.elapsed += dt.max(0.0);
        let t = self.progress();
        TweenStep {
            pose: self.from.lerp(&self.to, self.easing.apply(t)),
            finished: t >= 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_distance_fixture() {
        let d = focus_distance(10.0, 60f32.to_radians(), FOCUS_PADDING);
        assert!((d - 12.990).abs() < 0.01, "got {d}");
    }

    #[test]
    fn test_focus_pose_offsets() {
        let pose = focus_pose(Vec3::new(-5.0, 0.0, -1.0), Vec3::new(5.0, 4.0, 1.0), 60f32.to_radians());
        let d = focus_distance(10.0, 60f32.to_radians(), FOCUS_PADDING);
        assert_eq!(pose.target, Vec3::new(0.0, 2.0, 0.0));
        assert!((pose.position - Vec3::new(0.0, 2.0 + d * 0.5, d)).length() < 1e-4);
    }

    #[test]
    fn test_quadratic_out() {
        assert_eq!(Easing::QuadraticOut.apply(0.0), 0.0);
        assert_eq!(Easing::QuadraticOut.apply(1.0), 1.0);
        assert_eq!(Easing::QuadraticOut.apply(0.5), 0.75);
        assert_eq!(Easing::QuadraticOut.apply(2.0), 1.0);
    }

    #[test]
    fn test_tween_reaches_target() {
        let from = CameraPose::new(Vec3::ZERO, Vec3::ZERO);
        let to = CameraPose::new(Vec3::new(10.0, 0.0, 0.0), Vec3::Y);
        let mut tween = CameraTween::new(from, to, TweenPurpose::Focus);

        let step = tween.advance(0.6);
        assert!(!step.finished);
        assert!((step.pose.position.x - 7.5).abs() < 1e-4);

        let step = tween.advance(0.7);
        assert!(step.finished);
        assert_eq!(step.pose, to);
    }

    #[test]
    fn test_follow_step_damping() {
        let step = follow_step(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0));
        let desired = Vec3::new(100.0, 5.0, 15.0);
        assert!((step.position - desired * 0.05).length() < 1e-4);
        assert_eq!(step.target, Vec3::new(100.0, 0.0, 0.0));
    }
}
