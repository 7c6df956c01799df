//! Two-sample comparison used to classify a pair of clusters
//!
//! The comparison combines a Mann-Whitney U test and a two-sample
//! Kolmogorov-Smirnov test and classifies the pair as the same, different, or
//! undecided. The undecided band is wider for small samples and small expected
//! effects, where a lack of significance says little.

use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;

/// P-value at or below which two samples are reported as different
pub const LOW_THRESHOLD: f64 = 0.01;

/// Upper threshold used for functional (pass/fail rate) comparisons
const FUNCTIONAL_HIGH_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareMode {
    Performance,
    Functional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Same,
    Different,
    Unknown,
}

/// Outcome of [`compare`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub verdict: Verdict,
    pub p_value: f64,
    pub low_threshold: f64,
    pub high_threshold: f64,
}

/// Upper tail probability of the standard normal distribution
fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / std::f64::consts::SQRT_2)
}

/// Two-sided Mann-Whitney U p-value using the tie-corrected normal approximation
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 1.0;
    }

    let n_a = a.len() as f64;
    let n_b = b.len() as f64;
    let n = n_a + n_b;

    let mut pooled: Vec<(f64, bool)> = a
        .iter()
        .map(|&v| (v, true))
        .chain(b.iter().map(|&v| (v, false)))
        .collect();
    pooled.sort_by(|x, y| x.0.total_cmp(&y.0));

    // Average ranks over ties, accumulating the tie correction term
    let mut rank_sum_a = 0.0;
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < pooled.len() {
        let mut j = i + 1;
        while j < pooled.len() && pooled[j].0 == pooled[i].0 {
            j += 1;
        }
        let average_rank = (i + j + 1) as f64 / 2.0;
        let tied = (j - i) as f64;
        tie_term += tied.powi(3) - tied;
        rank_sum_a += pooled[i..j].iter().filter(|(_, from_a)| *from_a).count() as f64 * average_rank;
        i = j;
    }

    let u = rank_sum_a - n_a * (n_a + 1.0) / 2.0;
    let mean_u = n_a * n_b / 2.0;
    let variance_u = n_a * n_b / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if variance_u <= 0.0 {
        return 1.0;
    }

    // Continuity correction toward the mean
    let distance = ((u - mean_u).abs() - 0.5).max(0.0);
    let z = distance / variance_u.sqrt();
    (2.0 * normal_sf(z)).min(1.0)
}

/// Two-sided two-sample Kolmogorov-Smirnov p-value (asymptotic distribution)
pub fn kolmogorov_smirnov(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 1.0;
    }

    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_by(|x, y| x.total_cmp(y));
    b.sort_by(|x, y| x.total_cmp(y));

    let (mut i, mut j) = (0, 0);
    let mut d: f64 = 0.0;
    while i < a.len() && j < b.len() {
        let value = a[i].min(b[j]);
        while i < a.len() && a[i] <= value {
            i += 1;
        }
        while j < b.len() && b[j] <= value {
            j += 1;
        }
        let cdf_a = i as f64 / a.len() as f64;
        let cdf_b = j as f64 / b.len() as f64;
        d = d.max((cdf_a - cdf_b).abs());
    }

    let n_a = a.len() as f64;
    let n_b = b.len() as f64;
    let effective_n = (n_a * n_b / (n_a + n_b)).sqrt();
    let lambda = (effective_n + 0.12 + 0.11 / effective_n) * d;
    kolmogorov_survival(lambda)
}

fn kolmogorov_survival(lambda: f64) -> f64 {
    // The series converges slowly for small lambda; the survival there is within 1e-9 of 1
    if lambda < 0.2 {
        return 1.0;
    }
    let mut sum = 0.0;
    for k in 1..=100 {
        let k = k as f64;
        let term = 2.0 * (-1f64).powi(k as i32 - 1) * (-2.0 * k * k * lambda * lambda).exp();
        sum += term;
        if term.abs() < 1e-12 {
            break;
        }
    }
    sum.clamp(0.0, 1.0)
}

/// P-value above which two samples are reported as the same
///
/// For performance comparisons this is the p-value a Mann-Whitney test would
/// be expected to give for a shift of `magnitude` (in units of the samples'
/// spread) with `attempt_count` samples per side; a shift that large should
/// have been detected, so a larger p-value is evidence of no change.
pub fn high_threshold(mode: CompareMode, magnitude: f64, attempt_count: usize) -> f64 {
    match mode {
        CompareMode::Functional => FUNCTIONAL_HIGH_THRESHOLD,
        CompareMode::Performance => {
            if attempt_count == 0 || !magnitude.is_finite() || magnitude <= 0.0 {
                return 1.0;
            }
            // Mann-Whitney has asymptotic relative efficiency 3/pi against the t-test
            let efficiency = (3.0 / std::f64::consts::PI).sqrt();
            let z = magnitude * (attempt_count as f64 / 2.0).sqrt() * efficiency;
            (2.0 * normal_sf(z)).clamp(LOW_THRESHOLD, 1.0)
        }
    }
}

/// Compare two samples and classify them as the same, different or undecided
pub fn compare(
    a: &[f64],
    b: &[f64],
    attempt_count: usize,
    mode: CompareMode,
    magnitude: f64,
) -> Comparison {
    let high_threshold = high_threshold(mode, magnitude, attempt_count);

    if a.is_empty() || b.is_empty() {
        return Comparison {
            verdict: Verdict::Unknown,
            p_value: 1.0,
            low_threshold: LOW_THRESHOLD,
            high_threshold,
        };
    }

    let p_value = mann_whitney_u(a, b).min(kolmogorov_smirnov(a, b));
    let verdict = if p_value <= LOW_THRESHOLD {
        Verdict::Different
    } else if p_value <= high_threshold {
        Verdict::Unknown
    } else {
        Verdict::Same
    };

    Comparison {
        verdict,
        p_value,
        low_threshold: LOW_THRESHOLD,
        high_threshold,
    }
}
