//! Descriptive statistics over latency datasets.
//!
//! Everything here is a pure function of its input slice. Sample order never
//! matters; medians sort a transient copy.

use crate::config::Precision;
use crate::constants::{MIN_SAMPLES_FOR_STDDEV, NS_PER_MS};
use crate::error::{OracleError, Result};
use crate::types::CaseDataset;

use super::quantile::median_ns;

/// Arithmetic mean.
///
/// Returns `NaN` for an empty slice; callers guard sizes beforehand.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with the n-1 denominator.
///
/// # Panics
///
/// Panics if fewer than two values are given.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    assert!(
        values.len() >= MIN_SAMPLES_FOR_STDDEV,
        "Sample standard deviation needs at least two values"
    );
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Mean, spread and median of one dataset, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Number of samples summarized.
    pub n: usize,
    /// Sample mean.
    pub mean: f64,
    /// Sample standard deviation (n-1).
    pub std_dev: f64,
    /// Median of the raw samples.
    pub median: f64,
}

impl Summary {
    /// Summarize a dataset after converting samples with `precision`.
    ///
    /// The median is always taken on full-resolution samples.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::InsufficientData` if the dataset has fewer than
    /// two samples.
    pub fn of(dataset: &CaseDataset, precision: Precision) -> Result<Self> {
        if dataset.len() < MIN_SAMPLES_FOR_STDDEV {
            return Err(OracleError::insufficient(
                dataset.label(),
                dataset.len(),
                MIN_SAMPLES_FOR_STDDEV,
            ));
        }
        let values: Vec<f64> = dataset
            .samples()
            .iter()
            .map(|&ns| precision.to_millis(ns))
            .collect();
        Ok(Self {
            n: values.len(),
            mean: mean(&values),
            std_dev: sample_std_dev(&values),
            median: median_ns(dataset.samples()) / NS_PER_MS,
        })
    }
}

/// Mean and sample standard deviation of several datasets taken as one pool.
///
/// Used for the Mode A baseline: every case except the hit contributes its
/// raw samples. Values are returned in milliseconds.
///
/// # Errors
///
/// Returns `OracleError::InsufficientData` if the pool holds fewer than two
/// samples.
pub fn pooled_ms<'a, I>(datasets: I) -> Result<(f64, f64, usize)>
where
    I: IntoIterator<Item = &'a CaseDataset>,
{
    let values: Vec<f64> = datasets
        .into_iter()
        .flat_map(|d| d.samples().iter().map(|&ns| ns as f64 / NS_PER_MS))
        .collect();
    if values.len() < MIN_SAMPLES_FOR_STDDEV {
        return Err(OracleError::insufficient(
            "baseline",
            values.len(),
            MIN_SAMPLES_FOR_STDDEV,
        ));
    }
    Ok((mean(&values), sample_std_dev(&values), values.len()))
}

/// Median of a dataset in milliseconds.
///
/// # Errors
///
/// Returns `OracleError::InsufficientData` for an empty dataset.
pub fn median_ms(dataset: &CaseDataset) -> Result<f64> {
    if dataset.is_empty() {
        return Err(OracleError::insufficient(dataset.label(), 0, 1));
    }
    Ok(median_ns(dataset.samples()) / NS_PER_MS)
}
