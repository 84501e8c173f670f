//! Robust multi-case comparison against a pooled baseline.
//!
//! The case with the largest median is the suspected hit. Every other case's
//! raw samples form one pool whose mean and spread define "normal" latency.
//! The hit's own variance never enters the baseline.

use crate::constants::CONFIDENCE;
use crate::error::{OracleError, Result};
use crate::result::{BaselineReport, CaseDeviation, Estimate, Verdict};
use crate::statistics::{median_ms, pooled_ms, two_sided_z};
use crate::types::CaseDataset;

use super::Estimator;

/// Flags the slowest case when its median clears the pooled baseline.
#[derive(Debug, Clone, Copy)]
pub struct BaselineEstimator {
    confidence: f64,
}

impl Default for BaselineEstimator {
    fn default() -> Self {
        Self::new(CONFIDENCE)
    }
}

impl BaselineEstimator {
    /// Create an estimator at `confidence`.
    pub fn new(confidence: f64) -> Self {
        Self { confidence }
    }
}

/// Deviation of `median` from `mean` in units of `sd`.
///
/// A zero spread gives `0` for an exact match and `±inf` otherwise.
fn sigmas(median: f64, mean: f64, sd: f64) -> f64 {
    let diff = median - mean;
    if sd > 0.0 {
        diff / sd
    } else if diff == 0.0 {
        0.0
    } else {
        diff.signum() * f64::INFINITY
    }
}

impl Estimator for BaselineEstimator {
    fn estimate(&self, datasets: &[CaseDataset]) -> Result<Estimate> {
        if datasets.len() < 2 {
            return Err(OracleError::config(format!(
                "baseline mode needs at least two cases, got {}",
                datasets.len()
            )));
        }

        let medians = datasets.iter().map(median_ms).collect::<Result<Vec<_>>>()?;

        // First index wins ties.
        let hit_index = medians
            .iter()
            .enumerate()
            .fold(0, |best, (i, &m)| if m > medians[best] { i } else { best });

        let (baseline_mean_ms, baseline_std_dev_ms, baseline_samples) = pooled_ms(
            datasets
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != hit_index)
                .map(|(_, d)| d),
        )?;

        let cases = datasets
            .iter()
            .zip(&medians)
            .map(|(dataset, &median)| {
                let deviation = sigmas(median, baseline_mean_ms, baseline_std_dev_ms);
                CaseDeviation {
                    label: dataset.label().to_string(),
                    samples: dataset.len(),
                    median_ms: median,
                    deviation_pct_of_sd: deviation * 100.0,
                    deviation_sigmas: deviation,
                }
            })
            .collect();

        let z_score = two_sided_z(self.confidence);
        let hit_samples = datasets[hit_index].len();
        let threshold_ms = z_score * baseline_std_dev_ms / (hit_samples as f64).sqrt();
        let verdict =
            Verdict::from_distinguishable(medians[hit_index] - baseline_mean_ms > threshold_ms);

        Ok(Estimate::Baseline(BaselineReport {
            cases,
            hit_index,
            hit_label: datasets[hit_index].label().to_string(),
            baseline_mean_ms,
            baseline_std_dev_ms,
            baseline_samples,
            threshold_ms,
            z_score,
            confidence: self.confidence,
            verdict,
        }))
    }
}
