//! Accumulation of sampler batches across refinement rounds.

use crate::error::{OracleError, Result};
use crate::types::{CaseDataset, RequestCase, SampleBatch};

/// Running per-case datasets for one attack run.
///
/// Merging is a pure append: no ordering, no deduplication, never shrinks.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    datasets: Vec<CaseDataset>,
}

impl Aggregator {
    /// Start with one empty dataset per case.
    pub fn new(cases: &[RequestCase]) -> Self {
        Self {
            datasets: cases.iter().map(|c| CaseDataset::new(c.label())).collect(),
        }
    }

    /// Append every dataset of `batch` to the matching running dataset.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::Configuration` if the batch was produced for a
    /// different set of cases. Nothing is merged in that case.
    pub fn merge(&mut self, batch: &SampleBatch) -> Result<()> {
        let incoming = batch.datasets();
        if incoming.len() != self.datasets.len() {
            return Err(OracleError::config(format!(
                "batch has {} cases, aggregator tracks {}",
                incoming.len(),
                self.datasets.len()
            )));
        }
        if let Some((have, got)) = self
            .datasets
            .iter()
            .zip(incoming)
            .find(|(have, got)| have.label() != got.label())
        {
            return Err(OracleError::config(format!(
                "batch case `{}` does not match tracked case `{}`",
                got.label(),
                have.label()
            )));
        }

        for (running, new) in self.datasets.iter_mut().zip(incoming) {
            running.extend_from(new.samples());
        }
        Ok(())
    }

    /// Current datasets in case order.
    pub fn datasets(&self) -> &[CaseDataset] {
        &self.datasets
    }

    /// Size of the smallest dataset.
    pub fn samples_per_case(&self) -> usize {
        self.datasets.iter().map(CaseDataset::len).min().unwrap_or(0)
    }

    /// Consume the aggregator, returning the datasets.
    pub fn into_datasets(self) -> Vec<CaseDataset> {
        self.datasets
    }
}
