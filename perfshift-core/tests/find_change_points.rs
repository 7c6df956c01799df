use perfshift_core::{find_change_points, find_change_points_with_rng, ChangePointError, DetectionConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn keyed(values: &[f64]) -> Vec<(i64, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, &y)| (1000 + i as i64, y))
        .collect()
}

fn levels(parts: &[(f64, usize)]) -> Vec<f64> {
    parts
        .iter()
        .flat_map(|&(value, count)| std::iter::repeat(value).take(count))
        .collect()
}

/// A step from ~100 to ~120 at index 25 with a small periodic wobble
fn noisy_step() -> Vec<f64> {
    (0..50)
        .map(|i| {
            let base = if i < 25 { 100.0 } else { 120.0 };
            base + ((i * 7) % 5) as f64 * 0.2
        })
        .collect()
}

#[test]
fn test_clean_step_is_detected() {
    let series = keyed(&levels(&[(10.0, 10), (20.0, 10)]));
    let changes = find_change_points(&series, &DetectionConfig::default()).unwrap();

    assert_eq!(changes.len(), 1);
    let change = &changes[0];
    assert_eq!(change.x_value, 1010);
    assert_eq!(change.median_before, 10.0);
    assert_eq!(change.median_after, 20.0);
    assert_eq!(change.size_before, 10);
    assert_eq!(change.size_after, 10);
    assert_eq!(change.window_start, 1000);
    assert_eq!(change.window_end, 1019);
    assert!((change.relative_change - 1.0).abs() < 1e-12);
    assert_eq!(change.std_dev_before, 0.0);
    assert_eq!(change.p_value, 0.0);
}

#[test]
fn test_decrease_is_detected() {
    let series = keyed(&levels(&[(20.0, 12), (10.0, 12)]));
    let changes = find_change_points(&series, &DetectionConfig::default()).unwrap();

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].x_value, 1012);
    assert!((changes[0].relative_change + 0.5).abs() < 1e-12);
}

#[test]
fn test_noisy_step_is_detected() {
    let series = keyed(&noisy_step());
    let changes = find_change_points(&series, &DetectionConfig::default()).unwrap();

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].x_value, 1025);
    assert_eq!(changes[0].size_before + changes[0].size_after, 50);
    assert!(changes[0].p_value < 0.001);
}

#[test]
fn test_constant_series_has_no_change() {
    let series = keyed(&[42.0; 40]);
    let changes = find_change_points(&series, &DetectionConfig::default()).unwrap();
    assert!(changes.is_empty());
}

#[test]
fn test_short_series_is_empty() {
    let config = DetectionConfig::default();
    assert!(find_change_points::<i64>(&[], &config).unwrap().is_empty());
    assert!(find_change_points(&keyed(&[1.0]), &config).unwrap().is_empty());
    assert!(find_change_points(&keyed(&[1.0, 9.0, 1.0]), &config).unwrap().is_empty());
}

#[test]
fn test_step_too_close_to_start_is_rejected() {
    let series = keyed(&levels(&[(1.0, 3), (5.0, 7)]));
    let changes = find_change_points(&series, &DetectionConfig::default()).unwrap();
    assert!(changes.is_empty());
}

#[test]
fn test_only_most_recent_change_is_returned() {
    let series = keyed(&levels(&[(10.0, 15), (30.0, 15), (50.0, 15)]));
    let changes = find_change_points(&series, &DetectionConfig::default()).unwrap();

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].x_value, 1030);
    assert_eq!(changes[0].median_after, 50.0);
}

#[test]
fn test_deterministic_under_fixed_seed() {
    let mut values = noisy_step();
    values[10] += 3.0;
    values[37] -= 2.0;
    let series = keyed(&values);
    let config = DetectionConfig::default();

    let first = find_change_points(&series, &config).unwrap();
    let second = find_change_points(&series, &config).unwrap();
    assert_eq!(first, second);

    let third = find_change_points_with_rng(&series, &config, &mut StdRng::seed_from_u64(5)).unwrap();
    let fourth = find_change_points_with_rng(&series, &config, &mut StdRng::seed_from_u64(5)).unwrap();
    assert_eq!(third, fourth);
}

#[test]
fn test_only_trailing_window_is_analyzed() {
    let mut values = levels(&[(500.0, 20), (5.0, 10)]);
    values.extend(noisy_step());
    let series = keyed(&values);
    let config = DetectionConfig::default();

    let full = find_change_points(&series, &config).unwrap();
    let trailing = find_change_points(&series[series.len() - 50..], &config).unwrap();

    assert_eq!(full, trailing);
    assert_eq!(full.len(), 1);
    assert_eq!(full[0].window_start, 1030);
}

#[test]
fn test_uniform_noise_has_no_change() {
    let mut rng = StdRng::seed_from_u64(20_160_412);
    let values: Vec<f64> = (0..50).map(|_| rng.gen::<f64>()).collect();
    let changes = find_change_points(&keyed(&values), &DetectionConfig::default()).unwrap();
    assert!(changes.is_empty(), "unexpected change: {:?}", changes);
}

#[test]
fn test_non_finite_sample_in_window_is_rejected() {
    let mut values = noisy_step();
    values[40] = f64::NAN;
    let result = find_change_points(&keyed(&values), &DetectionConfig::default());
    assert_eq!(result, Err(ChangePointError::NonFiniteSample { index: 40 }));

    values[40] = f64::INFINITY;
    let result = find_change_points(&keyed(&values), &DetectionConfig::default());
    assert_eq!(result, Err(ChangePointError::NonFiniteSample { index: 40 }));
}

#[test]
fn test_non_finite_sample_outside_window_is_ignored() {
    let mut values = vec![f64::NAN; 5];
    values.extend(levels(&[(10.0, 10), (20.0, 10)]));
    let config = DetectionConfig {
        filters: perfshift_core::FilterConfig {
            max_window_size: 20,
            ..Default::default()
        },
        ..Default::default()
    };

    let changes = find_change_points(&keyed(&values), &config).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].x_value, 1015);
}
