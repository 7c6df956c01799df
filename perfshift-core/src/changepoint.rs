//! Change point records
//!
//! A `ChangePoint` describes one accepted level shift in a series of
//! `(x, y)` measurements, where `x` is an opaque key such as a revision.

use serde::{Deserialize, Serialize};

use crate::statistics::{median, relative_change, standard_deviation, welchs_t_test};

/// A statistically significant level shift in a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePoint<X> {
    /// Key of the first point after the change
    pub x_value: X,
    pub median_before: f64,
    pub median_after: f64,
    pub size_before: usize,
    pub size_after: usize,
    /// Key of the first point in the analyzed window
    pub window_start: X,
    /// Key of the last point in the analyzed window (inclusive)
    pub window_end: X,
    /// Signed change of the median, relative to the median before
    pub relative_change: f64,
    /// Population standard deviation of the values before the change
    pub std_dev_before: f64,
    pub t_statistic: f64,
    pub degrees_of_freedom: f64,
    pub p_value: f64,
}

impl<X> ChangePoint<X> {
    /// True when the measured values went up across the change
    pub fn is_increase(&self) -> bool {
        self.median_after > self.median_before
    }
}

/// Build the record for a change at `split_index` of `series`
///
/// Returns `None` unless `0 < split_index < series.len()`.
pub fn make_change_point<X: Clone>(series: &[(X, f64)], split_index: usize) -> Option<ChangePoint<X>> {
    if split_index == 0 || split_index >= series.len() {
        return None;
    }

    let values: Vec<f64> = series.iter().map(|(_, y)| *y).collect();
    let (before, after) = values.split_at(split_index);
    let median_before = median(before);
    let median_after = median(after);
    let t_test = welchs_t_test(before, after);

    Some(ChangePoint {
        x_value: series[split_index].0.clone(),
        median_before,
        median_after,
        size_before: before.len(),
        size_after: after.len(),
        window_start: series[0].0.clone(),
        window_end: series[series.len() - 1].0.clone(),
        relative_change: relative_change(median_before, median_after),
        std_dev_before: standard_deviation(before),
        t_statistic: t_test.t,
        degrees_of_freedom: t_test.df,
        p_value: t_test.p,
    })
}
