//! Statistical methods for latency datasets.
//!
//! This module provides:
//! - Median computation
//! - Mean, sample standard deviation and pooled summaries
//! - Normal-approximation confidence intervals and the overlap test

mod descriptive;
mod interval;
mod quantile;

pub use descriptive::{mean, median_ms, pooled_ms, sample_std_dev, Summary};
pub use interval::{distinguishable, probit, two_sided_z, ConfidenceInterval};
pub use quantile::{median_ns, median_sorted};
