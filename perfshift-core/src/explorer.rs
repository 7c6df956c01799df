//! Breadth-first search for significant splits across a sequence

use std::collections::{BTreeSet, VecDeque};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::compare::{compare, CompareMode, Comparison};
use crate::config::ClusteringConfig;
use crate::error::ChangePointError;
use crate::estimator::{change_point_estimator, cluster, extend_change_point_range};
use crate::significance::permutation_test;
use crate::statistics::iqr;

/// A significant split and the range of split indices that describe the same change
///
/// Ordered by `index`, then by `range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SplitCandidate {
    /// First index of the "after" cluster
    pub index: usize,
    /// Inclusive bounds of split indices scoring within tolerance of `index`
    pub range: (usize, usize),
}

/// Find every significant split by repeatedly bisecting `values`
///
/// Ranges are explored in FIFO order starting from the whole sequence. A range
/// whose best split fails the permutation test is dropped; otherwise the split
/// is recorded and both halves are queued.
///
/// # Errors
/// Returns [`ChangePointError::InsufficientData`] when `values` has 3 or fewer
/// samples, or when no split is significant.
pub fn cluster_and_find_split<R: Rng + ?Sized>(
    values: &[f64],
    config: &ClusteringConfig,
    rng: &mut R,
) -> Result<Vec<SplitCandidate>, ChangePointError> {
    if values.len() <= 3 {
        return Err(ChangePointError::insufficient_data(format!(
            "need more than 3 samples, got {}",
            values.len()
        )));
    }

    let mut candidates = BTreeSet::new();
    let mut queue = VecDeque::from([(0, values.len())]);

    while let Some((start, end)) = queue.pop_front() {
        // Ranges this short always score 0
        if end - start < 3 {
            continue;
        }
        let segment = &values[start..end];
        let partition_point = change_point_estimator(segment).map_or(0, |(index, _)| index);

        let probability = permutation_test(segment, partition_point, config, rng);
        if probability < config.min_significance {
            continue;
        }

        let (lower, upper) =
            extend_change_point_range(partition_point, segment, config.change_range_tolerance);
        candidates.insert(SplitCandidate {
            index: start + partition_point,
            range: (start + lower, start + upper),
        });

        queue.push_back((start, start + partition_point));
        queue.push_back((start + partition_point, end));
    }

    if candidates.is_empty() {
        return Err(ChangePointError::insufficient_data(
            "no significant split found",
        ));
    }

    Ok(candidates.into_iter().collect())
}

/// Split `sequence` at `partition_point` and compare the two clusters
///
/// The expected effect magnitude is half the interquartile range of the
/// first cluster when both clusters have more than two samples.
pub fn cluster_and_compare(sequence: &[f64], partition_point: usize) -> (Comparison, &[f64], &[f64]) {
    let (a, b) = cluster(sequence, partition_point);
    let magnitude = if a.len() > 2 && b.len() > 2 {
        iqr(a) / 2.0
    } else {
        1.0
    };
    let attempt_count = (a.len() + b.len()) / 2;

    (
        compare(a, b, attempt_count, CompareMode::Performance, magnitude),
        a,
        b,
    )
}
