//! Estimators turning dataset snapshots into round estimates.
//!
//! Two strategies answer related but distinct questions:
//!
//! 1. **Baseline** ([`BaselineEstimator`]): which of many cases is the outlier,
//!    judged by its median against the pooled samples of all other cases
//! 2. **Interval** ([`IntervalEstimator`]): whether exactly two cases have
//!    non-overlapping confidence intervals for their mean latency
//!
//! Both sit behind the [`Estimator`] trait and are selected by
//! [`Mode`](crate::Mode).

mod baseline;
mod interval;

pub use baseline::BaselineEstimator;
pub use interval::IntervalEstimator;

use crate::config::{Config, Mode};
use crate::error::Result;
use crate::result::Estimate;
use crate::types::CaseDataset;

/// Computes one [`Estimate`] from the current datasets.
///
/// Implementations must be deterministic: the same snapshot always yields the
/// same estimate.
pub trait Estimator: Send + Sync {
    /// Summarize `datasets` (in case order).
    fn estimate(&self, datasets: &[CaseDataset]) -> Result<Estimate>;
}

/// Build the estimator selected by `config.mode`.
pub fn estimator_for(config: &Config) -> Box<dyn Estimator> {
    match config.mode {
        Mode::Baseline => Box::new(BaselineEstimator::new(config.confidence)),
        Mode::Interval => Box::new(
            IntervalEstimator::new(config.confidence).precision(config.precision),
        ),
    }
}
