/// Step-shape scoring for candidate change points
///
/// A sharp regression looks like a step function: flat, a jump, flat again.
/// A gradual drift can still have a large difference between the two halves
/// but fits a step poorly.

use crate::statistics::mean;

/// How well a two-level step at `step_index` explains `values`, in `[0, 1]`
///
/// This is the fraction of the total variance removed by fitting each side of
/// the split with its own mean. Returns 0 when `step_index` does not leave at
/// least one value on each side, or when `values` has no variance.
pub fn steppiness(values: &[f64], step_index: usize) -> f64 {
    if step_index == 0 || step_index >= values.len() {
        return 0.0;
    }

    let overall = mean(values);
    let total: f64 = values.iter().map(|&v| (v - overall).powi(2)).sum();
    if total == 0.0 {
        return 0.0;
    }

    let (left, right) = values.split_at(step_index);
    let residual = squared_error(left) + squared_error(right);

    (1.0 - residual / total).clamp(0.0, 1.0)
}

fn squared_error(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|&v| (v - m).powi(2)).sum()
}
