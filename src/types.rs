//! Request cases, latency datasets and sampler batches.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};

use crate::error::{OracleError, Result};

/// An immutable, labeled HTTP request template for one input under test.
#[derive(Debug, Clone)]
pub struct RequestCase {
    label: String,
    method: Method,
    url: Url,
    headers: HeaderMap,
}

impl RequestCase {
    /// Create a case from an already-built URL.
    pub fn new(label: impl Into<String>, method: Method, url: Url) -> Self {
        Self {
            label: label.into(),
            method,
            url,
            headers: HeaderMap::new(),
        }
    }

    /// Build a `GET base?param=label` case.
    ///
    /// Any query string already present on `base` is replaced.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::Configuration` if `base` is not an absolute
    /// `http`/`https` URL.
    pub fn get_with_query(base: &str, param: &str, label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        let mut url = parse_target(base)?;
        url.set_query(None);
        url.query_pairs_mut().append_pair(param, &label);
        Ok(Self::new(label, Method::GET, url))
    }

    /// Build one `GET` case per label against the same base URL.
    pub fn from_labels<S: AsRef<str>>(base: &str, param: &str, labels: &[S]) -> Result<Vec<Self>> {
        labels
            .iter()
            .map(|label| Self::get_with_query(base, param, label.as_ref()))
            .collect()
    }

    /// Add a header to the template.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Case label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Target URL including the case's query.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Extra request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Parse and validate a probe target.
pub fn parse_target(base: &str) -> Result<Url> {
    let url = Url::parse(base)
        .map_err(|e| OracleError::config(format!("target url `{base}` is invalid: {e}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(OracleError::config(format!(
                "target url `{base}` has unsupported scheme `{other}`"
            )))
        }
    }
    if url.host_str().is_none() {
        return Err(OracleError::config(format!("target url `{base}` has no host")));
    }
    Ok(url)
}

/// Convert a measured duration to whole nanoseconds, saturating at `u64::MAX`.
pub fn duration_to_ns(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Latency samples (nanoseconds) collected for one case.
///
/// Order carries no meaning; the dataset only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseDataset {
    label: String,
    samples_ns: Vec<u64>,
}

impl CaseDataset {
    /// Create an empty dataset for `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            samples_ns: Vec::new(),
        }
    }

    /// Create a dataset from existing samples.
    pub fn with_samples(label: impl Into<String>, samples_ns: Vec<u64>) -> Self {
        Self {
            label: label.into(),
            samples_ns,
        }
    }

    /// Case label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Samples in nanoseconds.
    pub fn samples(&self) -> &[u64] {
        &self.samples_ns
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples_ns.len()
    }

    /// True if no samples have been collected.
    pub fn is_empty(&self) -> bool {
        self.samples_ns.is_empty()
    }

    pub(crate) fn extend_from(&mut self, samples_ns: &[u64]) {
        self.samples_ns.extend_from_slice(samples_ns);
    }
}

/// Output of one sampler invocation: one dataset per case, in case order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleBatch {
    datasets: Vec<CaseDataset>,
}

impl SampleBatch {
    /// Create an empty batch with one dataset per case.
    pub fn empty(cases: &[RequestCase]) -> Self {
        Self {
            datasets: cases.iter().map(|c| CaseDataset::new(c.label())).collect(),
        }
    }

    /// Build a batch from datasets directly.
    pub fn from_datasets(datasets: Vec<CaseDataset>) -> Self {
        Self { datasets }
    }

    /// Datasets in case order.
    pub fn datasets(&self) -> &[CaseDataset] {
        &self.datasets
    }

    /// Number of samples in the smallest per-case dataset.
    pub fn samples_per_case(&self) -> usize {
        self.datasets.iter().map(CaseDataset::len).min().unwrap_or(0)
    }

    /// Total samples across all cases.
    pub fn total_samples(&self) -> usize {
        self.datasets.iter().map(CaseDataset::len).sum()
    }

    pub(crate) fn dataset_mut(&mut self, index: usize) -> Option<&mut CaseDataset> {
        self.datasets.get_mut(index)
    }
}
