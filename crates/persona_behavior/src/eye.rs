use glam::{EulerRot, Quat};

use persona_core::math::approach;

use crate::config::EyeTuning;

/// Eye-bone orientation, integrated toward a look direction at a fixed rate.
///
/// Heading and pitch are stored in radians and move independently; roll is
/// always zero. The target is the look direction minus what the head already
/// expresses, clamped to the eye's range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EyeRig {
    pub heading: f32,
    pub pitch: f32,
    pub target_heading: f32,
    pub target_pitch: f32,
}

impl EyeRig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the eye-local target from a look direction and the head's
    /// current direction, both in degrees. A non-finite input keeps the
    /// previous target.
    pub fn aim(&mut self, look: (f32, f32), head: (f32, f32), tuning: &EyeTuning) {
        let finite = [look.0, look.1, head.0, head.1].iter().all(|v| v.is_finite());
        if !finite {
            return;
        }
        let heading = (look.0 - head.0).clamp(-tuning.max_heading, tuning.max_heading);
        let pitch = (look.1 - head.1).clamp(-tuning.max_pitch, tuning.max_pitch);
        self.target_heading = heading.to_radians();
        self.target_pitch = pitch.to_radians();
    }

    /// Rotates toward the target without overshooting it.
    pub fn update(&mut self, dt: f32, tuning: &EyeTuning) {
        let max_step = tuning.angular_speed * dt.max(0.0);
        self.heading = approach(self.heading, self.target_heading, max_step);
        self.pitch = approach(self.pitch, self.target_pitch, max_step);
    }

    /// Local rotation for the eye bones: heading about +Y, then pitch about
    /// -X so positive pitch looks up for a character facing +Z.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.heading, -self.pitch, 0.0)
    }
}
