use persona_animation::ClipMultiplexer;
use persona_core::math::{approach, lerp, smoothstep};

/// Weight state of one posture clip (one side of one axis).
///
/// `now` moves from `source` toward `target`, either by easing at a speed or
/// by a smoothstep mix of an explicit fraction. The clip is started when the
/// weight becomes positive and stopped once it is back at zero on a losing
/// side, so idle axes cost no clip evaluation.
#[derive(Debug, Clone)]
pub struct AxisBlend {
    clip: String,
    pub source: f32,
    pub target: f32,
    pub now: f32,
    pub active: bool,
}

impl AxisBlend {
    #[must_use]
    pub fn new(clip: impl Into<String>) -> Self {
        Self {
            clip: clip.into(),
            source: 0.0,
            target: 0.0,
            now: 0.0,
            active: false,
        }
    }

    #[must_use]
    pub fn clip(&self) -> &str {
        &self.clip
    }

    /// Starts a new transition from the current weight.
    pub fn retarget(&mut self, target: f32) {
        self.source = self.now;
        self.target = target.clamp(0.0, 1.0);
    }

    /// Moves toward the target by at most `speed * dt`.
    pub fn ease(&mut self, target: f32, speed: f32, dt: f32) {
        self.source = self.now;
        self.target = target.clamp(0.0, 1.0);
        self.now = approach(self.now, self.target, speed * dt);
    }

    /// Mixes source and target by `smoothstep(fraction)`.
    pub fn mix(&mut self, fraction: f32) {
        self.now = lerp(self.source, self.target, smoothstep(fraction)).clamp(0.0, 1.0);
    }

    /// Pushes the current weight to the clip.
    ///
    /// A losing axis at zero weight has its clip stopped; unknown clips are
    /// ignored so a model without this posture simply does not perform it.
    pub fn apply(&mut self, mux: &mut ClipMultiplexer, winning: bool) {
        if self.now > 0.0 {
            let playing = mux.is_playing(&self.clip).unwrap_or(false);
            let result = if self.active && playing {
                mux.set_weight(&self.clip, self.now)
            } else {
                mux.play(&self.clip, self.now)
            };
            self.active = result.is_ok();
        } else if self.active && !winning {
            let _ = mux.stop(&self.clip);
            self.active = false;
        } else if self.active {
            let _ = mux.set_weight(&self.clip, 0.0);
        }
    }

    /// Stops the clip and zeroes the weights.
    pub fn release(&mut self, mux: &mut ClipMultiplexer) {
        if self.active {
            let _ = mux.stop(&self.clip);
        }
        self.source = 0.0;
        self.target = 0.0;
        self.now = 0.0;
        self.active = false;
    }
}

/// Two opposing posture clips sharing one signed angle.
///
/// A positive angle drives `positive` to `|angle| / max_angle` and the other
/// side to zero, and vice versa.
#[derive(Debug, Clone)]
pub struct AxisPair {
    pub positive: AxisBlend,
    pub negative: AxisBlend,
    max_angle: f32,
    angle: f32,
}

impl AxisPair {
    #[must_use]
    pub fn new(positive: &str, negative: &str, max_angle: f32) -> Self {
        Self {
            positive: AxisBlend::new(positive),
            negative: AxisBlend::new(negative),
            max_angle: max_angle.max(f32::EPSILON),
            angle: 0.0,
        }
    }

    fn targets(&self, angle: f32) -> (f32, f32) {
        let weight = (angle.abs() / self.max_angle).clamp(0.0, 1.0);
        if angle > 0.0 { (weight, 0.0) } else if angle < 0.0 { (0.0, weight) } else { (0.0, 0.0) }
    }

    /// Eases both sides toward the weights for `angle`.
    pub fn track(&mut self, angle: f32, speed: f32, dt: f32) {
        self.angle = angle;
        let (pos, neg) = self.targets(angle);
        self.positive.ease(pos, speed, dt);
        self.negative.ease(neg, speed, dt);
    }

    /// Starts a scripted turn toward `angle` from the current weights.
    pub fn begin_turn(&mut self, angle: f32) {
        self.angle = angle;
        let (pos, neg) = self.targets(angle);
        self.positive.retarget(pos);
        self.negative.retarget(neg);
    }

    pub fn turn(&mut self, fraction: f32) {
        self.positive.mix(fraction);
        self.negative.mix(fraction);
    }

    /// Angle last requested, in degrees.
    #[must_use]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Side currently winning: the one the requested angle points to.
    #[must_use]
    pub fn winning_side(&self) -> &AxisBlend {
        if self.angle < 0.0 { &self.negative } else { &self.positive }
    }

    /// Angle currently expressed by the clip weights, in degrees.
    #[must_use]
    pub fn expressed_angle(&self) -> f32 {
        (self.positive.now - self.negative.now) * self.max_angle
    }

    pub fn apply(&mut self, mux: &mut ClipMultiplexer) {
        let positive_wins = self.angle > 0.0;
        let negative_wins = self.angle < 0.0;
        self.positive.apply(mux, positive_wins);
        self.negative.apply(mux, negative_wins);
    }

    pub fn release(&mut self, mux: &mut ClipMultiplexer) {
        self.positive.release(mux);
        self.negative.release(mux);
        self.angle = 0.0;
    }
}

/// Head posture: heading on left/right clips, pitch on up/down clips.
#[derive(Debug, Clone)]
pub struct HeadRig {
    pub heading: AxisPair,
    pub pitch: AxisPair,
}

impl HeadRig {
    #[must_use]
    pub fn new(left: &str, right: &str, up: &str, down: &str, max_heading: f32, max_pitch: f32) -> Self {
        Self {
            heading: AxisPair::new(left, right, max_heading),
            pitch: AxisPair::new(up, down, max_pitch),
        }
    }

    pub fn track(&mut self, heading: f32, pitch: f32, speed: f32, dt: f32) {
        self.heading.track(heading, speed, dt);
        self.pitch.track(pitch, speed, dt);
    }

    pub fn begin_turn(&mut self, heading: f32, pitch: f32) {
        self.heading.begin_turn(heading);
        self.pitch.begin_turn(pitch);
    }

    pub fn turn(&mut self, fraction: f32) {
        self.heading.turn(fraction);
        self.pitch.turn(fraction);
    }

    pub fn apply(&mut self, mux: &mut ClipMultiplexer) {
        self.heading.apply(mux);
        self.pitch.apply(mux);
    }

    /// Heading and pitch the head currently shows, in degrees.
    #[must_use]
    pub fn expressed_angles(&self) -> (f32, f32) {
        (self.heading.expressed_angle(), self.pitch.expressed_angle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_animation::{PlayMode, SimClip, SimClock};

    fn mux(clock: &SimClock) -> ClipMultiplexer {
        ClipMultiplexer::new(
            "Head",
            vec![
                Box::new(SimClip::bone(clock, "headL", 2.0, PlayMode::Loop)),
                Box::new(SimClip::bone(clock, "headR", 2.0, PlayMode::Loop)),
            ],
        )
    }

    #[test]
    fn ease_is_rate_limited() {
        let mut axis = AxisBlend::new("headL");
        axis.ease(1.0, 2.0, 0.1);
        assert!((axis.now - 0.2).abs() < 1e-6);
        axis.ease(0.1, 2.0, 0.1);
        assert!((axis.now - 0.1).abs() < 1e-6);
    }

    #[test]
    fn mix_stays_between_endpoints() {
        let mut axis = AxisBlend::new("headL");
        axis.now = 0.8;
        axis.retarget(0.2);
        for i in 0..=10 {
            axis.mix(i as f32 / 10.0);
            assert!(axis.now <= 0.8 + 1e-6 && axis.now >= 0.2 - 1e-6);
        }
        assert!((axis.now - 0.2).abs() < 1e-6);
    }

    #[test]
    fn losing_side_is_stopped_at_zero() {
        let clock = SimClock::new();
        let mut m = mux(&clock);
        let mut pair = AxisPair::new("headL", "headR", 90.0);

        for _ in 0..10 {
            pair.track(45.0, 5.0, 0.1);
            pair.apply(&mut m);
        }
        assert!((pair.positive.now - 0.5).abs() < 1e-5);
        assert!(m.is_playing("headL").unwrap());
        assert!(!m.is_playing("headR").unwrap());

        for _ in 0..20 {
            pair.track(-45.0, 5.0, 0.1);
            pair.apply(&mut m);
        }
        assert_eq!(pair.positive.now, 0.0);
        assert!(!m.is_playing("headL").unwrap());
        assert!(m.is_playing("headR").unwrap());
        assert!((pair.expressed_angle() + 45.0).abs() < 1e-3);
    }

    #[test]
    fn missing_clip_is_ignored() {
        let clock = SimClock::new();
        let mut m = mux(&clock);
        let mut pair = AxisPair::new("headU", "headD", 30.0);
        pair.track(15.0, 5.0, 0.1);
        pair.apply(&mut m);
        assert!(!pair.positive.active);
        assert!(pair.positive.now > 0.0);
    }
}
