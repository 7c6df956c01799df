/// Statistical functions used by change-point filtering and reporting
///
/// This module provides the summary statistics (mean, median, spread) and the
/// Welch's t-test that describe the two sides of a detected change.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Calculate the arithmetic mean of a slice of values
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the population variance of a slice of values
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let m = mean(values);
    values.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Calculate the sample (n - 1) variance of a slice of values
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let m = mean(values);
    values.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Calculate the standard deviation of a slice of values
pub fn standard_deviation(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let len = sorted.len();
    if len == 0 {
        return f64::NAN;
    }
    if len % 2 == 0 {
        (sorted[len / 2 - 1] + sorted[len / 2]) / 2.0
    } else {
        sorted[len / 2]
    }
}

/// Calculate the median, averaging the two middle elements for even lengths
///
/// Returns NaN for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    median_of_sorted(&sorted_copy(values))
}

/// Calculate the interquartile range
///
/// Quartiles are the medians of the lower and upper halves; for odd lengths the
/// middle element belongs to neither half.
pub fn iqr(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let sorted = sorted_copy(values);
    let half = sorted.len() / 2;
    let lower = &sorted[..half];
    let upper = &sorted[sorted.len() - half..];
    median_of_sorted(upper) - median_of_sorted(lower)
}

/// Signed relative change from `before` to `after`, relative to `|before|`
///
/// A change away from zero is reported as an infinity in the direction of the
/// change.
pub fn relative_change(before: f64, after: f64) -> f64 {
    if before == after {
        return 0.0;
    }
    let difference = after - before;
    if before == 0.0 {
        return if difference > 0.0 {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        };
    }
    difference / before.abs()
}

/// Result of a two-sample t-test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TTestResult {
    /// The t statistic (positive when the second sample has the larger mean)
    pub t: f64,
    /// Welch–Satterthwaite degrees of freedom
    pub df: f64,
    /// Two-tailed p-value
    pub p: f64,
}

/// Welch's unequal-variance t-test between two samples
///
/// The statistic is signed as `mean(b) - mean(a)`, so a regression that raises
/// the measured values yields a positive t.
pub fn welchs_t_test(a: &[f64], b: &[f64]) -> TTestResult {
    let n_a = a.len() as f64;
    let n_b = b.len() as f64;
    let fallback_df = (n_a + n_b - 2.0).max(1.0);

    if a.is_empty() || b.is_empty() {
        return TTestResult {
            t: 0.0,
            df: fallback_df,
            p: 1.0,
        };
    }

    let mean_diff = mean(b) - mean(a);
    let se_a = sample_variance(a) / n_a;
    let se_b = sample_variance(b) / n_b;
    let standard_error = (se_a + se_b).sqrt();

    if standard_error == 0.0 {
        return if mean_diff == 0.0 {
            TTestResult {
                t: 0.0,
                df: fallback_df,
                p: 1.0,
            }
        } else {
            TTestResult {
                t: mean_diff.signum() * f64::INFINITY,
                df: fallback_df,
                p: 0.0,
            }
        };
    }

    let t = mean_diff / standard_error;

    // Welch–Satterthwaite; a single-sample side contributes no variance term
    let mut denominator = 0.0;
    if a.len() > 1 {
        denominator += se_a.powi(2) / (n_a - 1.0);
    }
    if b.len() > 1 {
        denominator += se_b.powi(2) / (n_b - 1.0);
    }
    let df = if denominator > 0.0 {
        (se_a + se_b).powi(2) / denominator
    } else {
        fallback_df
    };

    TTestResult {
        t,
        df,
        p: two_tailed_p_value(t, df),
    }
}

fn two_tailed_p_value(t: f64, df: f64) -> f64 {
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}
