//! Round and run result types.

use serde::{Deserialize, Serialize};

use crate::config::Precision;
use crate::statistics::ConfidenceInterval;
use crate::types::CaseDataset;

/// Outcome of comparing cases at the configured confidence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The cases differ beyond measurement noise.
    Distinguishable,
    /// No difference could be separated from noise.
    Indistinguishable,
}

impl Verdict {
    /// Map a boolean test outcome to a verdict.
    pub fn from_distinguishable(distinguishable: bool) -> Self {
        if distinguishable {
            Self::Distinguishable
        } else {
            Self::Indistinguishable
        }
    }

    /// True for [`Verdict::Distinguishable`].
    pub fn is_distinguishable(self) -> bool {
        self == Self::Distinguishable
    }
}

/// Estimate produced for one round.
///
/// A pure function of the dataset snapshot it was computed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Estimate {
    /// Robust multi-case comparison against a pooled baseline.
    Baseline(BaselineReport),
    /// Two-sample confidence-interval comparison.
    Interval(IntervalReport),
}

impl Estimate {
    /// Verdict carried by either report.
    pub fn verdict(&self) -> Verdict {
        match self {
            Self::Baseline(report) => report.verdict,
            Self::Interval(report) => report.verdict,
        }
    }

    /// True if the round's verdict is [`Verdict::Distinguishable`].
    pub fn is_distinguishable(&self) -> bool {
        self.verdict().is_distinguishable()
    }

    /// Confidence level the estimate was computed at.
    pub fn confidence(&self) -> f64 {
        match self {
            Self::Baseline(report) => report.confidence,
            Self::Interval(report) => report.confidence,
        }
    }
}

/// Per-case statistics for the interval comparison, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseEstimate {
    /// Case label.
    pub label: String,
    /// Samples the estimate covers.
    pub samples: usize,
    /// Median of the full-resolution samples.
    pub median_ms: f64,
    /// Sample mean after the precision policy.
    pub mean_ms: f64,
    /// Sample standard deviation (n-1) after the precision policy.
    pub std_dev_ms: f64,
    /// Two-sided interval for the mean.
    pub interval: ConfidenceInterval,
}

/// Mode B report: base and target intervals and whether they overlap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalReport {
    /// First case.
    pub base: CaseEstimate,
    /// Second case.
    pub target: CaseEstimate,
    /// Unit handling applied before the mean and spread.
    pub precision: Precision,
    /// Confidence level of both intervals.
    pub confidence: f64,
    /// Distinguishable iff the intervals do not overlap.
    pub verdict: Verdict,
}

/// One row of the Mode A comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDeviation {
    /// Case label.
    pub label: String,
    /// Samples in the case's dataset.
    pub samples: usize,
    /// Median latency.
    pub median_ms: f64,
    /// `(median − baseline mean) / baseline sd`, in percent.
    pub deviation_pct_of_sd: f64,
    /// The same deviation in units of baseline standard deviations.
    pub deviation_sigmas: f64,
}

/// Mode A report: every case's median against the pooled baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineReport {
    /// Rows in case order.
    pub cases: Vec<CaseDeviation>,
    /// Index of the case with the largest median.
    pub hit_index: usize,
    /// Label of that case.
    pub hit_label: String,
    /// Mean of all samples outside the hit case.
    pub baseline_mean_ms: f64,
    /// Sample standard deviation of the same pool.
    pub baseline_std_dev_ms: f64,
    /// Size of the pool.
    pub baseline_samples: usize,
    /// How far the hit median must exceed the baseline mean to count.
    pub threshold_ms: f64,
    /// Two-sided critical value used for `threshold_ms`.
    pub z_score: f64,
    /// Confidence level.
    pub confidence: f64,
    /// Distinguishable iff the hit median clears the threshold.
    pub verdict: Verdict,
}

impl BaselineReport {
    /// Row of the hit case.
    pub fn hit(&self) -> Option<&CaseDeviation> {
        self.cases.get(self.hit_index)
    }
}

/// Cumulative report emitted after every refinement round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundReport {
    /// 1-based round number.
    pub round: usize,
    /// New iterations requested this round.
    pub round_size: usize,
    /// Iterations requested so far, this round included.
    pub accumulated_iterations: usize,
    /// Samples actually held per case (smallest dataset).
    pub samples_per_case: usize,
    /// Estimate over everything collected so far.
    pub estimate: Estimate,
}

/// Why the refinement loop ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Accumulated iterations reached the configured ceiling.
    Ceiling,
    /// The verdict stayed distinguishable for the configured number of rounds.
    EarlyStop,
}

/// Everything a completed run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Round reports in order.
    pub reports: Vec<RoundReport>,
    /// Final datasets in case order.
    pub datasets: Vec<CaseDataset>,
    /// Why the loop ended.
    pub stop_reason: StopReason,
}

impl RunSummary {
    /// Report of the last round, if any round ran.
    pub fn last(&self) -> Option<&RoundReport> {
        self.reports.last()
    }

    /// Final verdict, or `Indistinguishable` if no round ran.
    pub fn verdict(&self) -> Verdict {
        self.last()
            .map(|r| r.estimate.verdict())
            .unwrap_or(Verdict::Indistinguishable)
    }

    /// Accumulated iterations at the end of the run.
    pub fn total_iterations(&self) -> usize {
        self.last().map(|r| r.accumulated_iterations).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_from_bool() {
        assert!(Verdict::from_distinguishable(true).is_distinguishable());
        assert!(!Verdict::from_distinguishable(false).is_distinguishable());
    }

    #[test]
    fn test_empty_summary() {
        let summary = RunSummary {
            reports: Vec::new(),
            datasets: Vec::new(),
            stop_reason: StopReason::Ceiling,
        };
        assert_eq!(summary.verdict(), Verdict::Indistinguishable);
        assert_eq!(summary.total_iterations(), 0);
    }
}
