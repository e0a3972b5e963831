//! Height profile generation, smoothing and mutation.
//!
//! Every operation returns a fresh profile; nothing mutates a profile in
//! place, so parents and children never alias.

use rand::prelude::*;

use crate::schema::{HeightProfile, ProfileConstraints};

/// Random number generator wrapper for profile operations.
pub struct ProfileRng {
    rng: StdRng,
}

impl ProfileRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Generate a smoothed random profile of `steps` heights.
    pub fn generate(&mut self, steps: usize, constraints: &ProfileConstraints) -> HeightProfile {
        let raw = self.generate_raw(steps, constraints);
        HeightProfile::from_heights(smooth(&raw, constraints))
    }

    /// Generate an unsmoothed profile.
    ///
    /// The first height is `max_height`; every later height is a bounded
    /// random walk from the previous one, clamped to the height bounds.
    pub fn generate_raw(&mut self, steps: usize, constraints: &ProfileConstraints) -> Vec<f32> {
        let mut heights = Vec::with_capacity(steps);
        let mut current = constraints.max_height;

        for i in 0..steps {
            current = if i == 0 {
                constraints.max_height * (steps - i) as f32 / steps as f32
            } else {
                let delta = self.uniform_delta(constraints.generation_delta);
                clamp_height(current + delta, constraints)
            };
            heights.push(current);
        }

        heights
    }

    /// Mutate a copy of `profile` and smooth the result.
    pub fn mutate(
        &mut self,
        profile: &HeightProfile,
        rate: f32,
        constraints: &ProfileConstraints,
    ) -> HeightProfile {
        let raw = self.mutate_raw(profile.heights(), rate, constraints);
        HeightProfile::from_heights(smooth(&raw, constraints))
    }

    /// Mutate a copy of `heights` without smoothing.
    ///
    /// Each height is replaced with probability `rate` by itself plus a
    /// uniform delta, clamped to the height bounds.
    pub fn mutate_raw(
        &mut self,
        heights: &[f32],
        rate: f32,
        constraints: &ProfileConstraints,
    ) -> Vec<f32> {
        let mut mutated = heights.to_vec();

        for height in mutated.iter_mut() {
            if self.rng.r#gen::<f32>() < rate {
                let delta = self.uniform_delta(constraints.mutation_delta);
                *height = clamp_height(*height + delta, constraints);
            }
        }

        mutated
    }

    /// Uniform index in `0..len`.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Uniform random value in `[-half_range, half_range]`.
    fn uniform_delta(&mut self, half_range: f32) -> f32 {
        if half_range <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-half_range..=half_range)
    }
}

#[inline]
fn clamp_height(height: f32, constraints: &ProfileConstraints) -> f32 {
    height.min(constraints.max_height).max(constraints.min_height)
}

/// Three-zone moving average.
///
/// - index 0 is copied unchanged;
/// - head (`1..window`): blend of the first height and the local average,
///   the first height's weight falling linearly from `(window - 1) / window`;
/// - tail (last `transition_length` indices): local average scaled by a
///   cosine ease from 1 down toward 0;
/// - everything else: the local average.
///
/// The local average covers `[i - window / 2, i + window / 2]` clipped to the
/// profile and always reads the unsmoothed input.
pub fn smooth(heights: &[f32], constraints: &ProfileConstraints) -> Vec<f32> {
    let n = heights.len();
    let mut smoothed = heights.to_vec();
    let Some(&first) = heights.first() else {
        return smoothed;
    };

    let window = constraints.smoothing_window;
    let half_window = window / 2;
    let transition = constraints.transition_length;
    let tail_start = n as isize - transition as isize;

    for (i, out) in smoothed.iter_mut().enumerate().skip(1) {
        let avg = window_average(heights, i, half_window);

        *out = if i < window {
            let weight = (window - i) as f32 / window as f32;
            weight * first + (1.0 - weight) * avg
        } else if i as isize > tail_start {
            let progress = (i as isize - tail_start) as f32 / transition as f32;
            let weight = (1.0 + (progress * std::f32::consts::PI).cos()) / 2.0;
            avg * weight
        } else {
            avg
        };
    }

    smoothed
}

#[inline]
fn window_average(heights: &[f32], center: usize, half_window: usize) -> f32 {
    let start = center.saturating_sub(half_window);
    let end = (center + half_window + 1).min(heights.len());
    let window = &heights[start..end];
    window.iter().sum::<f32>() / window.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn in_bounds(h: f32, c: &ProfileConstraints) -> bool {
        h >= c.min_height && h <= c.max_height
    }

    #[test]
    fn test_generate_raw_starts_at_max() {
        let mut rng = ProfileRng::new(42);
        let constraints = ProfileConstraints::default();

        let raw = rng.generate_raw(200, &constraints);
        assert_eq!(raw.len(), 200);
        assert_eq!(raw[0], constraints.max_height);
        assert!(raw.iter().all(|&h| in_bounds(h, &constraints)));
    }

    #[test]
    fn test_generate_raw_steps_are_bounded() {
        let mut rng = ProfileRng::new(7);
        let constraints = ProfileConstraints::default();

        let raw = rng.generate_raw(200, &constraints);
        for pair in raw.windows(2) {
            assert!((pair[1] - pair[0]).abs() <= constraints.generation_delta + 1e-3);
        }
    }

    #[test]
    fn test_smoothing_preserves_first() {
        let constraints = ProfileConstraints::default();
        let heights: Vec<f32> = (0..50).map(|i| 60.0 + (i * 37 % 400) as f32).collect();

        let smoothed = smooth(&heights, &constraints);
        assert_eq!(smoothed.len(), heights.len());
        assert_eq!(smoothed[0], heights[0]);
    }

    #[test]
    fn test_smoothing_flat_middle_is_flat() {
        let constraints = ProfileConstraints::default();
        let heights = vec![200.0; 200];

        let smoothed = smooth(&heights, &constraints);
        // Head blends 200 with 200; middle averages 200.
        for &h in &smoothed[..=160] {
            assert!((h - 200.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_smoothing_head_ramp() {
        let constraints = ProfileConstraints::default();
        let mut heights = vec![100.0; 200];
        heights[0] = 500.0;

        let smoothed = smooth(&heights, &constraints);
        // Index 1: weight 0.9 on the first height; window [0, 6] averages
        // (500 + 6 * 100) / 7.
        let avg = (500.0 + 600.0) / 7.0;
        let expected = 0.9 * 500.0 + 0.1 * avg;
        assert!((smoothed[1] - expected).abs() < 1e-3);

        for pair in smoothed[1..10].windows(2) {
            assert!(pair[1] <= pair[0] + 1e-3);
        }
    }

    #[test]
    fn test_smoothing_tail_eases_to_ground() {
        let constraints = ProfileConstraints::default();
        let heights = vec![300.0; 200];

        let smoothed = smooth(&heights, &constraints);
        // Tail starts after index 160.
        assert!((smoothed[160] - 300.0).abs() < 1e-3);
        for pair in smoothed[160..].windows(2) {
            assert!(pair[1] < pair[0]);
        }
        let last = smoothed[199];
        assert!(last > 0.0 && last < 1.0);
    }

    #[test]
    fn test_smoothing_empty_and_single() {
        let constraints = ProfileConstraints::default();
        assert!(smooth(&[], &constraints).is_empty());
        assert_eq!(smooth(&[123.0], &constraints), vec![123.0]);
    }

    #[test]
    fn test_mutate_returns_new_profile() {
        let mut rng = ProfileRng::new(3);
        let constraints = ProfileConstraints::default();
        let parent = rng.generate(200, &constraints);
        let snapshot = parent.clone();

        let child = rng.mutate(&parent, 1.0, &constraints);

        assert_eq!(parent, snapshot);
        assert_eq!(child.len(), parent.len());
        assert_ne!(child, parent);
    }

    #[test]
    fn test_mutation_moves_first_height_within_bounds() {
        let constraints = ProfileConstraints::default();
        // Mid-range start so the first height can move either way.
        let heights = vec![300.0; 200];

        let mut moved = 0;
        for seed in 0..200 {
            let mut rng = ProfileRng::new(seed);
            let mutated = rng.mutate_raw(&heights, 1.0, &constraints);
            assert!(in_bounds(mutated[0], &constraints));
            if mutated[0] != heights[0] {
                moved += 1;
            }

            let smoothed = smooth(&mutated, &constraints);
            assert_eq!(smoothed[0].to_bits(), mutated[0].to_bits());
        }
        assert!(moved > 150);
    }

    #[test]
    fn test_zero_rate_mutation_only_smooths() {
        let mut rng = ProfileRng::new(5);
        let constraints = ProfileConstraints::default();
        let parent = rng.generate(200, &constraints);

        let raw = rng.mutate_raw(parent.heights(), 0.0, &constraints);
        assert_eq!(raw, parent.heights());
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let constraints = ProfileConstraints::default();
        let a = ProfileRng::new(99).generate(200, &constraints);
        let b = ProfileRng::new(99).generate(200, &constraints);
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_generated_heights_in_bounds(seed in any::<u64>(), steps in 1usize..300) {
            let constraints = ProfileConstraints::default();
            let mut rng = ProfileRng::new(seed);

            let raw = rng.generate_raw(steps, &constraints);
            prop_assert_eq!(raw.len(), steps);
            prop_assert!(raw.iter().all(|&h| in_bounds(h, &constraints)));

            let smoothed = smooth(&raw, &constraints);
            prop_assert_eq!(smoothed[0], raw[0]);
            prop_assert!(smoothed.iter().all(|&h| h >= 0.0 && h <= constraints.max_height + 1e-3));
        }

        #[test]
        fn prop_mutated_heights_in_bounds(seed in any::<u64>(), rate in 0.0f32..=1.0) {
            let constraints = ProfileConstraints::default();
            let mut rng = ProfileRng::new(seed);
            let raw = rng.generate_raw(200, &constraints);

            let mutated = rng.mutate_raw(&raw, rate, &constraints);
            prop_assert_eq!(mutated.len(), raw.len());
            prop_assert!(mutated.iter().all(|&h| in_bounds(h, &constraints)));
        }

        #[test]
        fn prop_smoothing_keeps_first_height(
            heights in prop::collection::vec(50.0f32..500.0, 1..250),
        ) {
            let constraints = ProfileConstraints::default();
            let smoothed = smooth(&heights, &constraints);
            prop_assert_eq!(smoothed.len(), heights.len());
            prop_assert_eq!(smoothed[0].to_bits(), heights[0].to_bits());
        }
    }
}
