//! Blend helpers shared by the behavior layer.

/// Tolerance for timer comparisons driven by accumulated fixed steps.
pub const TIME_EPSILON: f32 = 1e-4;

/// Hermite smoothstep of `t`, clamped to [0, 1].
#[inline]
#[must_use]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear interpolation between `a` and `b`.
#[inline]
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Moves `current` toward `target` by at most `max_delta`, never overshooting.
#[inline]
#[must_use]
pub fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    let max_delta = max_delta.max(0.0);
    current + (target - current).clamp(-max_delta, max_delta)
}

/// Returns `true` once `elapsed` has reached `threshold`, tolerating float drift.
#[inline]
#[must_use]
pub fn reached(elapsed: f32, threshold: f32) -> bool {
    elapsed + TIME_EPSILON >= threshold
}

/// Euclidean remainder that yields 0 for a degenerate (zero or negative) period.
#[inline]
#[must_use]
pub fn wrap_phase(time: f64, period: f64) -> f64 {
    if period <= 0.0 || !period.is_finite() {
        return 0.0;
    }
    time.rem_euclid(period)
}

/// Trapezoid envelope with smoothstep ramps.
///
/// Rises from 0 to `plateau` over the first `fade` seconds, holds, and falls
/// back to 0 over the last `fade` seconds of `duration`.
#[must_use]
pub fn fade_envelope(elapsed: f32, duration: f32, fade: f32, plateau: f32) -> f32 {
    if duration <= 0.0 || elapsed < 0.0 || elapsed >= duration {
        return 0.0;
    }
    let fade = fade.min(duration * 0.5).max(f32::EPSILON);
    let rise = smoothstep(elapsed / fade);
    let fall = smoothstep((duration - elapsed) / fade);
    plateau * rise.min(fall)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothstep_endpoints_and_midpoint() {
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(0.0), 0.0);
        assert!((smoothstep(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(4.0), 1.0);
    }

    #[test]
    fn approach_does_not_overshoot() {
        assert_eq!(approach(0.0, 1.0, 0.3), 0.3);
        assert_eq!(approach(0.9, 1.0, 0.3), 1.0);
        assert_eq!(approach(1.0, 0.0, 0.25), 0.75);
    }

    #[test]
    fn wrap_phase_guards_zero_period() {
        assert_eq!(wrap_phase(3.5, 0.0), 0.0);
        assert!((wrap_phase(3.5, 2.0) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn envelope_shape() {
        assert_eq!(fade_envelope(0.0, 4.0, 0.5, 0.8), 0.0);
        assert!((fade_envelope(2.0, 4.0, 0.5, 0.8) - 0.8).abs() < 1e-6);
        assert!((fade_envelope(0.25, 4.0, 0.5, 1.0) - 0.5).abs() < 1e-6);
        assert!((fade_envelope(3.75, 4.0, 0.5, 1.0) - 0.5).abs() < 1e-6);
        assert_eq!(fade_envelope(4.0, 4.0, 0.5, 1.0), 0.0);
    }
}
