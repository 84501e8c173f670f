//! # http-timing-oracle
//!
//! Detect remote timing side channels in HTTP endpoints.
//!
//! This crate repeatedly probes a target with a small set of labeled inputs
//! (for example candidate email addresses), measures time to first response
//! byte, and refines its estimate round after round:
//! - Concurrent sampling on one shared transport so every case sees the same
//!   connection behaviour
//! - Two estimators: median-vs-pooled-baseline for many cases, and
//!   confidence-interval overlap for a base/target pair
//! - Cumulative per-round reports, coloured terminal output and JSON
//!
//! ## Measurement Discipline
//!
//! Every probe failure is fatal. A dropped or retried sample would bias the
//! dataset, so the run stops at the first error rather than degrading.
//!
//! ## Quick Start
//!
//! ```ignore
//! use http_timing_oracle::{output, RemoteOracle};
//!
//! let summary = RemoteOracle::for_target(
//!     "http://localhost:3001",
//!     "email",
//!     &["whatever@fake.com", "correct@email.com"],
//! )?
//! .max_iterations(2_000)
//! .run(|report| println!("{}", output::format_round(report)))
//! .await?;
//!
//! println!("{}", output::format_summary(&summary));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod constants;
mod error;
mod oracle;
mod result;
mod types;

// Functional modules
pub mod analysis;
pub mod demo;
pub mod measurement;
pub mod output;
pub mod statistics;

// Re-exports for public API
pub use config::{
    Config, ConnectionPolicy, EarlyStop, Mode, Precision, Schedule, ShardPolicy, TransportConfig,
};
pub use constants::{
    CONCURRENCY, CONFIDENCE, DEFAULT_QUERY_PARAM, MAX_ITERATIONS, MIN_ITERATIONS,
    MIN_SAMPLES_FOR_STDDEV,
};
pub use error::{ErrorKind, OracleError, ProbeError, Result};
pub use oracle::{round_schedule, Phase, RefinementController, RemoteOracle};
pub use result::{
    BaselineReport, CaseDeviation, CaseEstimate, Estimate, IntervalReport, RoundReport,
    RunSummary, StopReason, Verdict,
};
pub use types::{parse_target, CaseDataset, RequestCase, SampleBatch};

/// Compare a base and a target label against `base_url` with default settings.
///
/// Probes `GET base_url?email=<label>` for both labels and runs the interval
/// estimator up to the default iteration ceiling, discarding per-round
/// reports.
///
/// # Errors
///
/// Returns the first configuration, measurement or statistics error.
pub async fn compare(base_url: &str, base: &str, target: &str) -> Result<RunSummary> {
    RemoteOracle::for_target(base_url, DEFAULT_QUERY_PARAM, &[base, target])?
        .run(|_| {})
        .await
}
