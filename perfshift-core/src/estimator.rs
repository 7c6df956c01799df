//! Divisive cluster estimation
//!
//! An approximation of the E-Divisive divergence: a split is scored by how far
//! apart the two resulting clusters are relative to their internal spread,
//! using squared Euclidean distances between samples.

/// Smallest split index considered by [`change_point_estimator`]
const MARGIN: usize = 1;

/// Split `sequence` into `sequence[..partition_point]` and `sequence[partition_point..]`
///
/// # Panics
/// Panics if `partition_point > sequence.len()`.
pub fn cluster(sequence: &[f64], partition_point: usize) -> (&[f64], &[f64]) {
    sequence.split_at(partition_point)
}

fn within_distance_sum(cluster: &[f64]) -> f64 {
    let mut sum = 0.0;
    for (i, &a) in cluster.iter().enumerate() {
        for &b in &cluster[i + 1..] {
            sum += (a - b).abs().powi(2);
        }
    }
    sum
}

fn pair_count(n: usize) -> f64 {
    (n * n.saturating_sub(1) / 2).max(1) as f64
}

/// Size-weighted divergence of splitting `sequence` at `index`
///
/// Returns NaN when either side of the split is empty.
pub fn estimator(sequence: &[f64], index: usize) -> f64 {
    let (a, b) = cluster(sequence, index);
    if a.is_empty() || b.is_empty() {
        return f64::NAN;
    }

    let between: f64 = a
        .iter()
        .map(|&x| b.iter().map(|&y| (x - y).abs().powi(2)).sum::<f64>())
        .sum();

    let n_a = a.len() as f64;
    let n_b = b.len() as f64;

    let mean_within_a = within_distance_sum(a) / pair_count(a.len());
    let mean_within_b = within_distance_sum(b) / pair_count(b.len());
    let mean_between = between * 2.0 / (n_a * n_b);

    let e = mean_between - mean_within_a - mean_within_b;
    e * n_a * n_b / (n_a + n_b)
}

/// Find the split index with the largest estimate
///
/// Returns `(index, estimate)`, or `None` when the sequence is too short to
/// split. Ties go to the lowest index and NaN estimates are never selected.
pub fn change_point_estimator(sequence: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for index in MARGIN..sequence.len() {
        let estimate = estimator(sequence, index);
        if estimate.is_nan() {
            continue;
        }
        match best {
            Some((_, max)) if estimate <= max => {}
            _ => best = Some((index, estimate)),
        }
    }

    best
}

/// Widen a split into the range of indices whose estimate stays within
/// `tolerance` of the estimate at `change_point`
///
/// Returns an inclusive `(left, right)` range of split indices.
pub fn extend_change_point_range(
    change_point: usize,
    sequence: &[f64],
    tolerance: f64,
) -> (usize, usize) {
    let threshold = estimator(sequence, change_point) * tolerance;
    let last = sequence.len().saturating_sub(1);

    let left = (1..=change_point)
        .rev()
        .find(|&index| estimator(sequence, index) < threshold)
        .map_or(1, |index| index + 1);

    let right = (change_point..=last)
        .find(|&index| estimator(sequence, index) < threshold)
        .map_or(last, |index| index - 1);

    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(before: usize, after: usize) -> Vec<f64> {
        let mut values = vec![10.0; before];
        values.extend(vec![20.0; after]);
        values
    }

    #[test]
    fn test_cluster_splits_at_partition_point() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(cluster(&values, 0), (&[][..], &values[..]));
        assert_eq!(cluster(&values, 1), (&[1.0][..], &[2.0, 3.0, 4.0][..]));
        assert_eq!(cluster(&values, 4), (&values[..], &[][..]));
    }

    #[test]
    fn test_estimator_empty_side_is_nan() {
        let values = [1.0, 2.0, 3.0];
        assert!(estimator(&values, 0).is_nan());
        assert!(estimator(&values, 3).is_nan());
    }

    #[test]
    fn test_estimator_clean_step() {
        // within terms vanish; between = 100 pairs * 100 -> mean 200; 200 * 100 / 20
        let values = step(10, 10);
        assert!((estimator(&values, 10) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_estimator_constant_sequence_is_zero() {
        let values = vec![3.5; 12];
        for index in 1..values.len() {
            assert_eq!(estimator(&values, index), 0.0);
        }
    }

    #[test]
    fn test_change_point_estimator_finds_step() {
        let values = step(10, 10);
        let (index, estimate) = change_point_estimator(&values).unwrap();
        assert_eq!(index, 10);
        assert!((estimate - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_change_point_estimator_short_sequences() {
        assert_eq!(change_point_estimator(&[]), None);
        assert_eq!(change_point_estimator(&[1.0]), None);
        assert_eq!(change_point_estimator(&[1.0, 2.0]).map(|(i, _)| i), Some(1));
    }

    #[test]
    fn test_change_point_estimator_first_maximum_wins() {
        // every split of a constant sequence scores 0
        let values = vec![1.0; 8];
        assert_eq!(change_point_estimator(&values), Some((1, 0.0)));
    }

    #[test]
    fn test_extend_change_point_range_clean_step_is_tight() {
        let values = step(10, 10);
        assert_eq!(extend_change_point_range(10, &values, 0.9), (10, 10));
    }

    #[test]
    fn test_extend_change_point_range_defaults_to_bounds() {
        // a zero estimate never falls below a zero threshold
        let values = vec![2.0; 6];
        assert_eq!(extend_change_point_range(3, &values, 0.9), (1, 5));
    }

    #[test]
    fn test_extend_change_point_range_widens_over_ramp() {
        let values = [0.0, 0.0, 0.0, 0.0, 5.0, 9.9, 10.0, 10.0, 10.0, 10.0];
        let (index, _) = change_point_estimator(&values).unwrap();
        let (left, right) = extend_change_point_range(index, &values, 0.9);
        assert!(left <= index && index <= right);
        assert!(right - left >= 1);
    }
}
