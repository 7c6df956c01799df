//! Change-point search over a window of recent measurements
//!
//! The search runs the divisive explorer repeatedly, each time starting a
//! little before the latest split found, collects the candidate indices and
//! then keeps only the most recent candidate that passes every acceptance
//! filter.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::changepoint::{make_change_point, ChangePoint};
use crate::config::{DetectionConfig, FilterConfig};
use crate::error::ChangePointError;
use crate::explorer::cluster_and_find_split;
use crate::find_step::steppiness;
use crate::statistics::{median, relative_change, standard_deviation};

/// The first acceptance filter a candidate failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRejection {
    MinSegmentSize,
    MinAbsoluteChange,
    MinRelativeChange,
    MinStdDev,
    MinSteppiness,
}

impl fmt::Display for FilterRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterRejection::MinSegmentSize => "min_segment_size",
            FilterRejection::MinAbsoluteChange => "min_absolute_change",
            FilterRejection::MinRelativeChange => "min_relative_change",
            FilterRejection::MinStdDev => "min_std_dev",
            FilterRejection::MinSteppiness => "min_steppiness",
        };
        f.write_str(name)
    }
}

/// Find the most recent change point in `series`
///
/// The permutation tests are driven by a generator seeded from
/// `config.clustering.seed`, so repeated calls return identical results.
///
/// # Errors
/// Returns [`ChangePointError::NonFiniteSample`] if the analyzed window holds a
/// NaN or infinite value. Finding nothing is not an error.
pub fn find_change_points<X: Clone>(
    series: &[(X, f64)],
    config: &DetectionConfig,
) -> Result<Vec<ChangePoint<X>>, ChangePointError> {
    let mut rng = StdRng::seed_from_u64(config.clustering.seed);
    find_change_points_with_rng(series, config, &mut rng)
}

/// Like [`find_change_points`], drawing permutations from `rng`
pub fn find_change_points_with_rng<X: Clone, R: Rng + ?Sized>(
    series: &[(X, f64)],
    config: &DetectionConfig,
    rng: &mut R,
) -> Result<Vec<ChangePoint<X>>, ChangePointError> {
    if series.len() < 2 {
        return Ok(Vec::new());
    }

    let filters = &config.filters;
    let window = &series[series.len().saturating_sub(filters.max_window_size)..];
    let y_values: Vec<f64> = window.iter().map(|(_, y)| *y).collect();

    if let Some(index) = y_values.iter().position(|y| !y.is_finite()) {
        return Err(ChangePointError::NonFiniteSample { index });
    }

    let candidates = match find_candidate_indices(&y_values, config, rng)? {
        Some(candidates) => candidates,
        None => {
            debug!("Insufficient data: {:?}", y_values);
            return Ok(Vec::new());
        }
    };
    info!("E-Divisive candidate change-points: {:?}", candidates);

    let mut sorted = candidates;
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let mut accepted = Vec::new();
    for index in sorted {
        match passes_thresholds(&y_values, index, filters) {
            Ok(()) => accepted.push(index),
            Err(reason) => debug!(
                "Rejected {} as potential index; reason = {}",
                index, reason
            ),
        }
    }
    info!("E-Divisive potential change-points: {:?}", accepted);

    Ok(accepted
        .into_iter()
        .take(1)
        .filter_map(|index| make_change_point(window, index))
        .collect())
}

/// Map an index found in a sub-search back onto the window
///
/// Every sub-search after the first starts `min_segment_size` samples before
/// the latest split.
fn relative_index_adjuster(base: usize, offset: usize, min_segment_size: usize) -> usize {
    if base == 0 {
        return offset;
    }
    (base + offset).saturating_sub(min_segment_size)
}

/// Run the explorer repeatedly until it stops producing new split indices
///
/// Returns `None` if the first search already had too little data.
fn find_candidate_indices<R: Rng + ?Sized>(
    y_values: &[f64],
    config: &DetectionConfig,
    rng: &mut R,
) -> Result<Option<Vec<usize>>, ChangePointError> {
    let min_segment_size = config.filters.min_segment_size;
    let mut candidates: Vec<usize> = Vec::new();
    let mut split_index = 0;

    while split_index + min_segment_size < y_values.len() {
        let start = split_index.saturating_sub(min_segment_size);
        let splits = match cluster_and_find_split(&y_values[start..], &config.clustering, rng) {
            Ok(splits) => splits,
            Err(ChangePointError::InsufficientData(_)) => {
                if candidates.is_empty() {
                    return Ok(None);
                }
                break;
            }
            Err(e) => return Err(e),
        };

        let mut new_indices: Vec<usize> = Vec::new();
        for split in splits {
            let index = relative_index_adjuster(split_index, split.index, min_segment_size);
            if !candidates.contains(&index) && !new_indices.contains(&index) {
                new_indices.push(index);
            }
        }

        match new_indices.iter().max() {
            Some(&latest) => {
                split_index = latest;
                candidates.extend(new_indices);
            }
            None => break,
        }
    }

    Ok(Some(candidates))
}

/// Check a candidate split of `values` against the acceptance filters
///
/// Filters run in a fixed order and the first failure is reported.
pub fn passes_thresholds(
    values: &[f64],
    split_index: usize,
    filters: &FilterConfig,
) -> Result<(), FilterRejection> {
    let (left, right) = values.split_at(split_index.min(values.len()));

    if left.len() < filters.min_segment_size
        || right.len() < filters.min_segment_size
        || left.is_empty()
        || right.is_empty()
    {
        return Err(FilterRejection::MinSegmentSize);
    }

    let left_median = median(left);
    let right_median = median(right);

    let absolute_change = (left_median - right_median).abs();
    if absolute_change < filters.min_absolute_change {
        return Err(FilterRejection::MinAbsoluteChange);
    }

    if relative_change(left_median, right_median).abs() < filters.min_relative_change {
        return Err(FilterRejection::MinRelativeChange);
    }

    let min_std_dev = standard_deviation(left).min(standard_deviation(right));
    if absolute_change < filters.multiple_of_std_dev * min_std_dev {
        return Err(FilterRejection::MinStdDev);
    }

    if steppiness(values, split_index) < filters.min_steppiness {
        return Err(FilterRejection::MinSteppiness);
    }

    Ok(())
}
