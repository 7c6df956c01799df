use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Hard ceiling on the analyzed window; the estimator is cubic in window size.
pub const MAX_WINDOW_SIZE_LIMIT: usize = 500;
/// Hard ceiling on the permutation-test sub-window.
pub const MAX_SUBSAMPLING_LENGTH_LIMIT: usize = 100;
/// Hard ceiling on the number of shuffles per permutation test.
pub const PERMUTATION_ITERATIONS_LIMIT: usize = 10_000;

/// Acceptance policy applied to candidate change points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Only the most recent `max_window_size` points are analyzed
    #[serde(default = "default_max_window_size")]
    pub max_window_size: usize,

    /// Minimum number of points on each side of a change
    #[serde(default = "default_min_segment_size")]
    pub min_segment_size: usize,

    /// Minimum absolute difference between the medians
    #[serde(default)]
    pub min_absolute_change: f64,

    /// Minimum relative difference between the medians (0.01 = 1%)
    #[serde(default = "default_min_relative_change")]
    pub min_relative_change: f64,

    /// Minimum step-likeness of the change, in [0, 1]
    #[serde(default = "default_min_steppiness")]
    pub min_steppiness: f64,

    /// The median shift must be this many times the smaller side's std dev
    #[serde(default = "default_multiple_of_std_dev")]
    pub multiple_of_std_dev: f64,
}

fn default_max_window_size() -> usize { 50 }
fn default_min_segment_size() -> usize { 6 }
fn default_min_relative_change() -> f64 { 0.01 }
fn default_min_steppiness() -> f64 { 0.5 }
fn default_multiple_of_std_dev() -> f64 { 2.5 }

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_window_size: default_max_window_size(),
            min_segment_size: default_min_segment_size(),
            min_absolute_change: 0.0,
            min_relative_change: default_min_relative_change(),
            min_steppiness: default_min_steppiness(),
            multiple_of_std_dev: default_multiple_of_std_dev(),
        }
    }
}

/// Parameters of the divisive clustering and permutation significance test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Number of shuffles per permutation test
    #[serde(default = "default_permutation_iterations")]
    pub permutation_iterations: usize,

    /// Width of the sub-window shuffled around a candidate split
    #[serde(default = "default_max_subsampling_length")]
    pub max_subsampling_length: usize,

    /// Permutation-test score a split needs to be kept
    #[serde(default = "default_min_significance")]
    pub min_significance: f64,

    /// Fraction of the peak estimate that still counts as the same change
    #[serde(default = "default_change_range_tolerance")]
    pub change_range_tolerance: f64,

    /// Seed for the permutation-test random generator
    #[serde(default)]
    pub seed: u64,
}

fn default_permutation_iterations() -> usize { 199 }
fn default_max_subsampling_length() -> usize { 20 }
fn default_min_significance() -> f64 { 0.95 }
fn default_change_range_tolerance() -> f64 { 0.90 }

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            permutation_iterations: default_permutation_iterations(),
            max_subsampling_length: default_max_subsampling_length(),
            min_significance: default_min_significance(),
            change_range_tolerance: default_change_range_tolerance(),
            seed: 0,
        }
    }
}

/// Complete change-point detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DetectionConfig {
    #[serde(default)]
    pub filters: FilterConfig,

    #[serde(default)]
    pub clustering: ClusteringConfig,
}

impl DetectionConfig {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load() -> Self {
        let mut config = Self::default();

        match Self::from_file("perfshift.toml") {
            Ok(file_config) => config = file_config,
            Err(ConfigError::Io(_)) => {}
            Err(e) => tracing::warn!("ignoring perfshift.toml: {}", e),
        }

        config.apply_env_overrides();

        config
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: DetectionConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Unparseable values are ignored and leave the current setting in place.
    pub fn apply_env_overrides(&mut self) {
        override_from_env("PERFSHIFT_MAX_WINDOW_SIZE", &mut self.filters.max_window_size);
        override_from_env("PERFSHIFT_MIN_SEGMENT_SIZE", &mut self.filters.min_segment_size);
        override_from_env("PERFSHIFT_MIN_ABSOLUTE_CHANGE", &mut self.filters.min_absolute_change);
        override_from_env("PERFSHIFT_MIN_RELATIVE_CHANGE", &mut self.filters.min_relative_change);
        override_from_env("PERFSHIFT_MIN_STEPPINESS", &mut self.filters.min_steppiness);
        override_from_env("PERFSHIFT_MULTIPLE_OF_STD_DEV", &mut self.filters.multiple_of_std_dev);

        override_from_env(
            "PERFSHIFT_PERMUTATION_ITERATIONS",
            &mut self.clustering.permutation_iterations,
        );
        override_from_env(
            "PERFSHIFT_MAX_SUBSAMPLING_LENGTH",
            &mut self.clustering.max_subsampling_length,
        );
        override_from_env("PERFSHIFT_MIN_SIGNIFICANCE", &mut self.clustering.min_significance);
        override_from_env(
            "PERFSHIFT_CHANGE_RANGE_TOLERANCE",
            &mut self.clustering.change_range_tolerance,
        );
        override_from_env("PERFSHIFT_SEED", &mut self.clustering.seed);
    }

    /// Check the configuration against the cost ceilings and value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let filters = &self.filters;
        let clustering = &self.clustering;

        if filters.max_window_size > MAX_WINDOW_SIZE_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_window_size {} exceeds the limit of {}",
                filters.max_window_size, MAX_WINDOW_SIZE_LIMIT
            )));
        }
        if clustering.max_subsampling_length > MAX_SUBSAMPLING_LENGTH_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_subsampling_length {} exceeds the limit of {}",
                clustering.max_subsampling_length, MAX_SUBSAMPLING_LENGTH_LIMIT
            )));
        }
        if clustering.permutation_iterations == 0
            || clustering.permutation_iterations > PERMUTATION_ITERATIONS_LIMIT
        {
            return Err(ConfigError::Invalid(format!(
                "permutation_iterations must be in 1..={}, got {}",
                PERMUTATION_ITERATIONS_LIMIT, clustering.permutation_iterations
            )));
        }
        if clustering.min_significance <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_significance must be positive, got {}",
                clustering.min_significance
            )));
        }
        for (name, value) in [
            ("min_significance", clustering.min_significance),
            ("change_range_tolerance", clustering.change_range_tolerance),
            ("min_steppiness", filters.min_steppiness),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml)?;
        Ok(())
    }
}

fn override_from_env<T: std::str::FromStr>(key: &str, target: &mut T) {
    if let Ok(raw) = std::env::var(key) {
        match raw.parse() {
            Ok(val) => *target = val,
            Err(_) => tracing::warn!("ignoring unparseable {}={:?}", key, raw),
        }
    }
}
