use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use rustc_hash::FxHasher;

/// Builds the per-instance generator: the explicit seed if given, otherwise
/// a stable hash of the instance name.
#[must_use]
pub fn instance_rng(instance: &str, seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(|| {
        let mut hasher = FxHasher::default();
        instance.hash(&mut hasher);
        hasher.finish()
    });
    StdRng::seed_from_u64(seed)
}

/// Uniform draw from `[min, max]`; returns `min` for an empty or inverted range.
pub fn roll(rng: &mut StdRng, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..=max)
    } else {
        min
    }
}

/// Draws `min + k * step` for a uniform `k`, staying within `[min, max]`.
pub fn roll_stepped(rng: &mut StdRng, min: f32, max: f32, step: f32) -> f32 {
    if step <= 0.0 || max <= min {
        return min;
    }
    let steps = ((max - min) / step).floor() as u32;
    let k = rng.random_range(0..=steps);
    min + k as f32 * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_instance_same_sequence() {
        let mut a = instance_rng("Char1", None);
        let mut b = instance_rng("Char1", None);
        for _ in 0..8 {
            assert_eq!(roll(&mut a, 0.0, 1.0).to_bits(), roll(&mut b, 0.0, 1.0).to_bits());
        }
    }

    #[test]
    fn degenerate_ranges() {
        let mut rng = instance_rng("x", Some(1));
        assert_eq!(roll(&mut rng, 0.3, 0.3), 0.3);
        assert_eq!(roll(&mut rng, 1.0, 0.0), 1.0);
        assert_eq!(roll_stepped(&mut rng, 5.0, 5.0, 5.0), 5.0);
    }

    #[test]
    fn stepped_values_lie_on_grid() {
        let mut rng = instance_rng("grid", Some(3));
        for _ in 0..64 {
            let v = roll_stepped(&mut rng, 5.0, 15.0, 5.0);
            assert!(v == 5.0 || v == 10.0 || v == 15.0, "got {v}");
        }
    }
}
