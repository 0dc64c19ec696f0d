use glam::Vec3;

/// The point the character is asked to look at, with derived kinematics.
///
/// The position is written by the host's screen-to-world projection. Motion
/// is only derived between consecutive visible samples, so re-acquiring a
/// target after it was hidden does not register as a jump.
#[derive(Debug, Clone, Default)]
pub struct LookTarget {
    pub world_pos: Vec3,
    pub visible: bool,
    previous_pos: Option<Vec3>,
    velocity: Vec3,
    acceleration: Vec3,
    delta_velocity: f32,
}

impl LookTarget {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a projected position. Non-finite positions are dropped and the
    /// last good one is kept.
    pub fn set_world_pos(&mut self, pos: Vec3) {
        if !pos.is_finite() {
            log::debug!("LookTarget: ignoring non-finite position {pos}");
            return;
        }
        self.world_pos = pos;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Samples the current position at the end of a fixed tick of length `dt`.
    pub fn sample(&mut self, dt: f32) {
        if !self.visible || dt <= 0.0 {
            self.previous_pos = None;
            self.velocity = Vec3::ZERO;
            self.acceleration = Vec3::ZERO;
            self.delta_velocity = 0.0;
            return;
        }

        match self.previous_pos {
            Some(previous) => {
                let velocity = (self.world_pos - previous) / dt;
                let change = velocity - self.velocity;
                self.acceleration = change / dt;
                self.delta_velocity = change.length();
                self.velocity = velocity;
            }
            None => {
                self.velocity = Vec3::ZERO;
                self.acceleration = Vec3::ZERO;
                self.delta_velocity = 0.0;
            }
        }
        self.previous_pos = Some(self.world_pos);
    }

    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[must_use]
    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    /// Magnitude of the velocity change over the last tick, in cm/s.
    #[must_use]
    pub fn delta_velocity(&self) -> f32 {
        self.delta_velocity
    }

    /// Heading and pitch in degrees from `origin` toward the target.
    ///
    /// The character faces +Z with +Y up; positive heading turns toward +X
    /// (the character's left), positive pitch looks up.
    #[must_use]
    pub fn angles_from(&self, origin: Vec3) -> (f32, f32) {
        direction_angles(self.world_pos - origin)
    }
}

/// Heading and pitch in degrees of a direction vector. Zero vectors look ahead.
#[must_use]
pub fn direction_angles(direction: Vec3) -> (f32, f32) {
    if direction.length_squared() <= f32::EPSILON {
        return (0.0, 0.0);
    }
    let horizontal = direction.x.hypot(direction.z);
    let heading = direction.x.atan2(direction.z).to_degrees();
    let pitch = direction.y.atan2(horizontal).to_degrees();
    (heading, pitch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_velocity_has_no_velocity_change() {
        let mut target = LookTarget::new();
        target.set_visible(true);
        for i in 0..5 {
            target.set_world_pos(Vec3::new(i as f32 * 2.0, 0.0, 100.0));
            target.sample(0.1);
        }
        assert!((target.velocity().x - 20.0).abs() < 1e-3);
        assert!(target.delta_velocity() < 1e-3);
    }

    #[test]
    fn hidden_target_resets_history() {
        let mut target = LookTarget::new();
        target.set_visible(true);
        target.set_world_pos(Vec3::ZERO);
        target.sample(0.1);
        target.set_world_pos(Vec3::new(10.0, 0.0, 0.0));
        target.sample(0.1);
        assert!(target.delta_velocity() > 0.0);

        target.set_visible(false);
        target.sample(0.1);
        assert_eq!(target.delta_velocity(), 0.0);

        target.set_visible(true);
        target.set_world_pos(Vec3::new(500.0, 0.0, 0.0));
        target.sample(0.1);
        assert_eq!(target.delta_velocity(), 0.0);
    }

    #[test]
    fn angles_follow_axes() {
        let (h, p) = direction_angles(Vec3::new(1.0, 0.0, 1.0));
        assert!((h - 45.0).abs() < 1e-4);
        assert!(p.abs() < 1e-4);

        let (h, p) = direction_angles(Vec3::new(0.0, 1.0, 1.0));
        assert!(h.abs() < 1e-4);
        assert!((p - 45.0).abs() < 1e-4);

        assert_eq!(direction_angles(Vec3::ZERO), (0.0, 0.0));
    }

    #[test]
    fn non_finite_position_keeps_last_sample() {
        let mut target = LookTarget::new();
        target.set_visible(true);
        target.set_world_pos(Vec3::new(10.0, 0.0, 100.0));
        target.sample(0.1);

        target.set_world_pos(Vec3::new(f32::NAN, 0.0, 100.0));
        target.set_world_pos(Vec3::new(0.0, f32::INFINITY, 100.0));
        assert_eq!(target.world_pos, Vec3::new(10.0, 0.0, 100.0));
        target.sample(0.1);
        assert!(target.velocity().is_finite());
        assert_eq!(target.delta_velocity(), 0.0);
    }
}
