//! Change-point detection for benchmark history
//!
//! Given an ordered series of `(x, y)` measurements, `find_change_points`
//! locates the most recent statistically significant level shift. The search
//! is an approximation of E-Divisive: splits are scored by a divisive cluster
//! estimate, validated with a permutation test, refined by recursive
//! bisection, and finally screened by size, magnitude, noise and shape
//! filters.

pub mod changepoint;
pub mod compare;
pub mod config;
pub mod error;
pub mod estimator;
pub mod explorer;
pub mod find_change_points;
pub mod find_step;
pub mod output;
pub mod series;
pub mod significance;
pub mod statistics;

pub use changepoint::*;
pub use config::*;
pub use error::*;
pub use explorer::{cluster_and_compare, cluster_and_find_split, SplitCandidate};
pub use find_change_points::*;
pub use output::*;
