//! Permutation significance testing for candidate splits

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::ClusteringConfig;
use crate::estimator::{change_point_estimator, estimator};

/// Score how unlikely the split at `change_point` is to arise by chance
///
/// A sub-window of at most `max_subsampling_length` samples around the split
/// is shuffled `permutation_iterations` times. The result is the fraction of
/// shuffles whose best split scores strictly lower than the observed split,
/// divided by `permutation_iterations + 1`, so it always lies in `[0, 1)`.
/// Sequences shorter than 3 samples score 0.
pub fn permutation_test<R: Rng + ?Sized>(
    sequence: &[f64],
    change_point: usize,
    config: &ClusteringConfig,
    rng: &mut R,
) -> f64 {
    if sequence.len() < 3 {
        return 0.0;
    }

    let half_window = config.max_subsampling_length / 2;
    let segment_start = change_point.saturating_sub(half_window);
    let segment_end = (change_point + half_window).min(sequence.len());
    let mut segment = sequence[segment_start..segment_end].to_vec();

    let observed = estimator(&segment, change_point - segment_start);

    let mut weaker = 0usize;
    for _ in 0..config.permutation_iterations {
        segment.shuffle(rng);
        if let Some((_, estimate)) = change_point_estimator(&segment) {
            if estimate < observed {
                weaker += 1;
            }
        }
    }

    weaker as f64 / (config.permutation_iterations + 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn step(before: usize, after: usize) -> Vec<f64> {
        let mut values = vec![10.0; before];
        values.extend(vec![20.0; after]);
        values
    }

    #[test]
    fn test_short_sequence_scores_zero() {
        let config = ClusteringConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(permutation_test(&[], 0, &config, &mut rng), 0.0);
        assert_eq!(permutation_test(&[1.0, 5.0], 1, &config, &mut rng), 0.0);
    }

    #[test]
    fn test_clean_step_is_significant() {
        let config = ClusteringConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let probability = permutation_test(&step(10, 10), 10, &config, &mut rng);
        assert!(probability >= config.min_significance, "got {}", probability);
        assert!(probability < 1.0);
    }

    #[test]
    fn test_constant_sequence_is_never_significant() {
        let config = ClusteringConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(permutation_test(&[4.0; 15], 7, &config, &mut rng), 0.0);
    }

    #[test]
    fn test_deterministic_under_fixed_seed() {
        let config = ClusteringConfig::default();
        let values = [1.0, 3.0, 2.0, 8.0, 9.0, 7.5, 2.5, 8.5, 1.5, 9.5, 3.0, 8.0];

        let first = permutation_test(&values, 6, &config, &mut StdRng::seed_from_u64(99));
        let second = permutation_test(&values, 6, &config, &mut StdRng::seed_from_u64(99));
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_only_sub_window_around_split_is_shuffled() {
        let config = ClusteringConfig::default();
        let values: Vec<f64> = (0..50)
            .map(|i| {
                let base = if i < 25 { 100.0 } else { 104.0 };
                base + ((i * 7) % 5) as f64
            })
            .collect();

        // max_subsampling_length 20 keeps values[15..35], with the split at 10
        let full = permutation_test(&values, 25, &config, &mut StdRng::seed_from_u64(4));
        let window = permutation_test(&values[15..35], 10, &config, &mut StdRng::seed_from_u64(4));
        assert_eq!(full.to_bits(), window.to_bits());

        let mut outside_changed = values.clone();
        outside_changed[0] = 1.0e6;
        outside_changed[49] = -1.0e6;
        let unchanged = permutation_test(&outside_changed, 25, &config, &mut StdRng::seed_from_u64(4));
        assert_eq!(full.to_bits(), unchanged.to_bits());
    }

    #[test]
    fn test_window_is_clamped_to_sequence_bounds() {
        let config = ClusteringConfig {
            max_subsampling_length: 4,
            ..ClusteringConfig::default()
        };
        let mut values = vec![0.0; 30];
        values[29] = 1.0;
        let mut rng = StdRng::seed_from_u64(3);
        let probability = permutation_test(&values, 29, &config, &mut rng);
        assert!((0.0..=1.0).contains(&probability));
    }
}
