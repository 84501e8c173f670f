//! Remote timing oracle: builder and refinement loop.

use std::sync::Arc;

use tracing::{debug, info};

use crate::analysis::{estimator_for, Estimator};
use crate::config::{
    Config, ConnectionPolicy, EarlyStop, Mode, Precision, Schedule, ShardPolicy, TransportConfig,
};
use crate::error::{OracleError, Result};
use crate::measurement::{Aggregator, HttpProber, Probe, Sampler};
use crate::result::{RoundReport, RunSummary, StopReason};
use crate::types::{CaseDataset, RequestCase};

/// Main entry point for remote timing analysis.
///
/// Use the builder pattern to configure and run an attack against a target.
///
/// # Example
///
/// ```ignore
/// use http_timing_oracle::RemoteOracle;
///
/// let summary = RemoteOracle::for_target(
///     "http://localhost:3001",
///     "email",
///     &["whatever@fake.com", "correct@email.com"],
/// )?
/// .max_iterations(2_000)
/// .run(|report| println!("{}", report.accumulated_iterations))
/// .await?;
/// ```
#[derive(Debug, Clone)]
pub struct RemoteOracle {
    cases: Vec<RequestCase>,
    config: Config,
}

impl RemoteOracle {
    /// Create an oracle over prepared cases with default configuration.
    pub fn new(cases: Vec<RequestCase>) -> Self {
        Self {
            cases,
            config: Config::default(),
        }
    }

    /// Create an oracle probing `GET base?param=label` for every label.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::Configuration` if `base` is not a usable URL.
    pub fn for_target<S: AsRef<str>>(base: &str, param: &str, labels: &[S]) -> Result<Self> {
        Ok(Self::new(RequestCase::from_labels(base, param, labels)?))
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the number of concurrent workers.
    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    /// Set the per-round iteration floor.
    pub fn min_iterations(mut self, n: usize) -> Self {
        self.config.min_iterations = n;
        self
    }

    /// Set the ceiling on accumulated iterations.
    pub fn max_iterations(mut self, n: usize) -> Self {
        self.config.max_iterations = n;
        self
    }

    /// Set the confidence level.
    pub fn confidence(mut self, c: f64) -> Self {
        self.config.confidence = c;
        self
    }

    /// Set the estimation strategy.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the unit handling for interval estimation.
    pub fn precision(mut self, precision: Precision) -> Self {
        self.config.precision = precision;
        self
    }

    /// Set the sharding remainder policy.
    pub fn shard_policy(mut self, policy: ShardPolicy) -> Self {
        self.config.shard_policy = policy;
        self
    }

    /// Set the per-worker case order.
    pub fn schedule(mut self, schedule: Schedule) -> Self {
        self.config.schedule = schedule;
        self
    }

    /// Set the connection discipline.
    pub fn connection_policy(mut self, policy: ConnectionPolicy) -> Self {
        self.config.transport.connection_policy = policy;
        self
    }

    /// Stop after `stable_rounds` consecutive distinguishable rounds.
    pub fn early_stop(mut self, stable_rounds: usize) -> Self {
        self.config.early_stop = Some(EarlyStop { stable_rounds });
        self
    }

    /// Set the shared transport settings.
    pub fn transport(mut self, transport: TransportConfig) -> Self {
        self.config.transport = transport;
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Cases under test, in order.
    pub fn cases(&self) -> &[RequestCase] {
        &self.cases
    }

    /// Run the full refinement loop over HTTP.
    ///
    /// One transport is built for the run and shared by every worker and
    /// every case. `on_report` is called after each round, before the next
    /// round starts.
    ///
    /// # Errors
    ///
    /// Returns the first configuration, measurement or statistics error. The
    /// loop stops immediately; no partial summary is returned.
    pub async fn run<F>(&self, on_report: F) -> Result<RunSummary>
    where
        F: FnMut(&RoundReport),
    {
        self.config.validate()?;
        let prober = Arc::new(HttpProber::new(&self.config.transport)?);
        self.run_with_prober(prober, on_report).await
    }

    /// Run the refinement loop with a caller-supplied probe.
    pub async fn run_with_prober<P, F>(&self, prober: Arc<P>, on_report: F) -> Result<RunSummary>
    where
        P: Probe + ?Sized + 'static,
        F: FnMut(&RoundReport),
    {
        RefinementController::new(prober, self.cases.clone(), &self.config)?
            .run(on_report)
            .await
    }
}

/// Refinement loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No round has started.
    Idle,
    /// Waiting on the sampler.
    Sampling,
    /// Computing the round's estimate.
    Estimating,
    /// Handing the report to the caller.
    Reporting,
    /// Terminal.
    Done,
}

/// Round sizes the loop requests for a given floor and ceiling.
///
/// Round `k` asks for `k * floor` new iterations; the last round is clamped
/// to whatever remains below `ceiling`.
pub fn round_schedule(floor: usize, ceiling: usize) -> Vec<usize> {
    let mut sizes = Vec::new();
    if floor == 0 {
        return sizes;
    }
    let mut accumulated = 0;
    let mut round: usize = 1;
    while accumulated < ceiling {
        let size = round.saturating_mul(floor).min(ceiling - accumulated);
        sizes.push(size);
        accumulated += size;
        round += 1;
    }
    sizes
}

/// Drives `Idle → Sampling → Estimating → Reporting → (Sampling | Done)`.
///
/// Rounds are strictly sequential. Any error ends the loop in [`Phase::Done`]
/// and is returned to the caller.
pub struct RefinementController<P: ?Sized> {
    sampler: Sampler<P>,
    cases: Vec<RequestCase>,
    estimator: Box<dyn Estimator>,
    aggregator: Aggregator,
    floor: usize,
    ceiling: usize,
    early_stop: Option<EarlyStop>,
    phase: Phase,
    round: usize,
    accumulated: usize,
    stable_rounds: usize,
    stop_reason: Option<StopReason>,
}

impl<P> RefinementController<P>
where
    P: Probe + ?Sized + 'static,
{
    /// Create a controller for `cases` using the estimator selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::Configuration` if the configuration is invalid or
    /// the case count does not suit the selected mode.
    pub fn new(prober: Arc<P>, cases: Vec<RequestCase>, config: &Config) -> Result<Self> {
        config.validate()?;
        match config.mode {
            Mode::Interval if cases.len() != 2 => {
                return Err(OracleError::config(format!(
                    "interval mode compares exactly two cases, got {}",
                    cases.len()
                )))
            }
            Mode::Baseline if cases.len() < 2 => {
                return Err(OracleError::config(format!(
                    "baseline mode needs at least two cases, got {}",
                    cases.len()
                )))
            }
            _ => {}
        }

        Ok(Self {
            sampler: Sampler::from_config(prober, config)?,
            aggregator: Aggregator::new(&cases),
            cases,
            estimator: estimator_for(config),
            floor: config.min_iterations,
            ceiling: config.max_iterations,
            early_stop: config.early_stop,
            phase: Phase::Idle,
            round: 0,
            accumulated: 0,
            stable_rounds: 0,
            stop_reason: None,
        })
    }

    /// Replace the estimator.
    pub fn with_estimator(mut self, estimator: Box<dyn Estimator>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Iterations requested so far.
    pub fn accumulated_iterations(&self) -> usize {
        self.accumulated
    }

    /// Datasets collected so far.
    pub fn datasets(&self) -> &[CaseDataset] {
        self.aggregator.datasets()
    }

    /// Why the loop finished, once it has.
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Run one round and return its report, or `None` once the loop is done.
    pub async fn step(&mut self) -> Result<Option<RoundReport>> {
        if self.phase == Phase::Done {
            return Ok(None);
        }
        match self.round_inner().await {
            Ok(report) => Ok(Some(report)),
            Err(err) => {
                self.phase = Phase::Done;
                Err(err)
            }
        }
    }

    async fn round_inner(&mut self) -> Result<RoundReport> {
        let round = self.round + 1;
        let round_size = round.saturating_mul(self.floor).min(self.ceiling - self.accumulated);

        self.phase = Phase::Sampling;
        let batch = self.sampler.sample(&self.cases, round_size).await?;
        self.aggregator.merge(&batch)?;
        self.round = round;
        self.accumulated += round_size;

        self.phase = Phase::Estimating;
        let estimate = self.estimator.estimate(self.aggregator.datasets())?;

        self.phase = Phase::Reporting;
        if estimate.is_distinguishable() {
            self.stable_rounds += 1;
        } else {
            self.stable_rounds = 0;
        }
        let report = RoundReport {
            round,
            round_size,
            accumulated_iterations: self.accumulated,
            samples_per_case: self.aggregator.samples_per_case(),
            estimate,
        };
        debug!(
            round,
            round_size,
            accumulated = self.accumulated,
            samples_per_case = report.samples_per_case,
            verdict = ?report.estimate.verdict(),
            "round complete"
        );

        if self.accumulated >= self.ceiling {
            self.finish(StopReason::Ceiling);
        } else if self
            .early_stop
            .is_some_and(|early| self.stable_rounds >= early.stable_rounds)
        {
            self.finish(StopReason::EarlyStop);
        }
        Ok(report)
    }

    fn finish(&mut self, reason: StopReason) {
        self.phase = Phase::Done;
        self.stop_reason = Some(reason);
    }

    /// Run rounds until the ceiling or early stop, reporting each one.
    ///
    /// # Errors
    ///
    /// Returns the first error from any round.
    pub async fn run<F>(mut self, mut on_report: F) -> Result<RunSummary>
    where
        F: FnMut(&RoundReport),
    {
        let mut reports = Vec::new();
        while let Some(report) = self.step().await? {
            on_report(&report);
            reports.push(report);
        }
        let stop_reason = self.stop_reason.unwrap_or(StopReason::Ceiling);
        info!(
            rounds = reports.len(),
            iterations = self.accumulated,
            ?stop_reason,
            "refinement finished"
        );
        Ok(RunSummary {
            reports,
            datasets: self.aggregator.into_datasets(),
            stop_reason,
        })
    }
}
