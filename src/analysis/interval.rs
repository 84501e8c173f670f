//! Two-sample confidence-interval comparison.

use crate::config::Precision;
use crate::constants::CONFIDENCE;
use crate::error::{OracleError, Result};
use crate::result::{CaseEstimate, Estimate, IntervalReport, Verdict};
use crate::statistics::{distinguishable, ConfidenceInterval, Summary};
use crate::types::CaseDataset;

use super::Estimator;

/// Compares a base and a target case by their mean-latency intervals.
#[derive(Debug, Clone, Copy)]
pub struct IntervalEstimator {
    confidence: f64,
    precision: Precision,
}

impl Default for IntervalEstimator {
    fn default() -> Self {
        Self::new(CONFIDENCE)
    }
}

impl IntervalEstimator {
    /// Create an estimator at `confidence` with full-resolution arithmetic.
    pub fn new(confidence: f64) -> Self {
        Self {
            confidence,
            precision: Precision::default(),
        }
    }

    /// Set the unit handling applied before the mean and spread.
    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    fn case_estimate(&self, dataset: &CaseDataset) -> Result<CaseEstimate> {
        let summary = Summary::of(dataset, self.precision)?;
        Ok(CaseEstimate {
            label: dataset.label().to_string(),
            samples: summary.n,
            median_ms: summary.median,
            mean_ms: summary.mean,
            std_dev_ms: summary.std_dev,
            interval: ConfidenceInterval::for_mean(
                summary.mean,
                summary.std_dev,
                summary.n,
                self.confidence,
            ),
        })
    }
}

impl Estimator for IntervalEstimator {
    fn estimate(&self, datasets: &[CaseDataset]) -> Result<Estimate> {
        let [base, target] = datasets else {
            return Err(OracleError::config(format!(
                "interval mode compares exactly two cases, got {}",
                datasets.len()
            )));
        };
        let base = self.case_estimate(base)?;
        let target = self.case_estimate(target)?;
        let verdict =
            Verdict::from_distinguishable(distinguishable(&base.interval, &target.interval));

        Ok(Estimate::Interval(IntervalReport {
            base,
            target,
            precision: self.precision,
            confidence: self.confidence,
            verdict,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(values: &[u64]) -> Vec<u64> {
        values.iter().map(|v| v * 1_000_000).collect()
    }

    fn report(estimate: Estimate) -> IntervalReport {
        match estimate {
            Estimate::Interval(report) => report,
            other => panic!("unexpected estimate: {other:?}"),
        }
    }

    #[test]
    fn test_separated_cases_are_distinguishable() {
        let datasets = vec![
            CaseDataset::with_samples("base", ms(&[10, 11, 10, 11, 10, 11])),
            CaseDataset::with_samples("target", ms(&[20, 21, 20, 21, 20, 21])),
        ];
        let report = report(IntervalEstimator::default().estimate(&datasets).unwrap());
        assert_eq!(report.verdict, Verdict::Distinguishable);
        assert_eq!(report.base.label, "base");
        assert!((report.base.mean_ms - 10.5).abs() < 1e-9);
        assert!(report.base.interval.left < report.base.interval.right);
        assert_eq!(report.confidence, 0.95);
    }

    #[test]
    fn test_identical_cases_overlap() {
        let samples = ms(&[10, 12, 11, 13, 9]);
        let datasets = vec![
            CaseDataset::with_samples("base", samples.clone()),
            CaseDataset::with_samples("target", samples),
        ];
        let report = report(IntervalEstimator::default().estimate(&datasets).unwrap());
        assert_eq!(report.verdict, Verdict::Indistinguishable);
    }

    #[test]
    fn test_truncation_can_hide_a_sub_millisecond_leak() {
        let base: Vec<u64> = (0..50).map(|i| 10_000_000 + (i % 2) * 10_000).collect();
        let target: Vec<u64> = base.iter().map(|s| s + 500_000).collect();
        let datasets = vec![
            CaseDataset::with_samples("base", base),
            CaseDataset::with_samples("target", target),
        ];

        let full = IntervalEstimator::default().estimate(&datasets).unwrap();
        assert!(full.is_distinguishable());

        let truncated = IntervalEstimator::default()
            .precision(Precision::TruncatedMillis)
            .estimate(&datasets)
            .unwrap();
        assert!(!truncated.is_distinguishable());
    }

    #[test]
    fn test_requires_two_cases() {
        let one = vec![CaseDataset::with_samples("a", vec![1, 2])];
        let err = IntervalEstimator::default().estimate(&one).unwrap_err();
        assert!(matches!(err, OracleError::Configuration(_)));
    }

    #[test]
    fn test_short_dataset_is_insufficient() {
        let datasets = vec![
            CaseDataset::with_samples("a", vec![1, 2]),
            CaseDataset::with_samples("b", vec![1]),
        ];
        let err = IntervalEstimator::default().estimate(&datasets).unwrap_err();
        match err {
            OracleError::InsufficientData { case, len, min } => {
                assert_eq!(case, "b");
                assert_eq!(len, 1);
                assert_eq!(min, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
