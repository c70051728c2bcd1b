//! Starfield point cloud.

use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Generates star positions uniformly inside an axis-aligned cube.
pub struct StarfieldGenerator {
    seed: u64,
    count: u32,
    spread: f32,
}

impl StarfieldGenerator {
    /// `spread` is the cube's edge length; positions fall in `[-spread/2, spread/2)`.
    pub fn new(seed: u64, count: u32, spread: f32) -> Self {
        Self {
            seed,
            count,
            spread,
        }
    }

    /// Deterministic for a given seed: each coordinate is `(r - 0.5) · spread`, `r ∈ [0, 1)`.
    pub fn generate(&self) -> Vec<Vec3> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        (0..self.count)
            .map(|_| {
                Vec3::new(
                    (rng.random::<f32>() - 0.5) * self.spread,
                    (rng.random::<f32>() - 0.5) * self.spread,
                    (rng.random::<f32>() - 0.5) * self.spread,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_stars_inside_cube() {
        let stars = StarfieldGenerator::new(42, 15_000, 10.0).generate();
        assert_eq!(stars.len(), 15_000);
        for star in &stars {
            for c in star.to_array() {
                assert!((-5.0..5.0).contains(&c), "coordinate {c} outside [-5, 5)");
            }
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let a = StarfieldGenerator::new(7, 100, 10.0).generate();
        let b = StarfieldGenerator::new(7, 100, 10.0).generate();
        let c = StarfieldGenerator::new(8, 100, 10.0).generate();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fills_the_cube() {
        let stars = StarfieldGenerator::new(42, 15_000, 10.0).generate();
        let (min, max) = stars
            .iter()
            .fold((Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)), |(lo, hi), p| {
                (lo.min(*p), hi.max(*p))
            });
        assert!(min.max_element() < -4.9);
        assert!(max.min_element() > 4.9);

        let mean = stars.iter().copied().sum::<Vec3>() / stars.len() as f32;
        assert!(mean.length() < 0.2);
    }

    #[test]
    fn test_zero_count() {
        assert!(StarfieldGenerator::new(1, 0, 10.0).generate().is_empty());
    }
}
