//! Concurrent sample collection with first-error cancellation.
//!
//! A sampler invocation shards the requested iteration count across a fixed
//! number of worker tasks. Each worker probes every case for its shard and
//! reports once on a bounded channel. The first failure cancels a shared
//! token; workers only look at it between probes, so a round trip already on
//! the wire always completes naturally. Results are all-or-nothing.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::config::{Config, Schedule, ShardPolicy};
use crate::error::{OracleError, Result};
use crate::types::{RequestCase, SampleBatch};

use super::prober::Probe;

/// Samples collected by one worker, indexed by case.
#[derive(Debug)]
struct ShardSamples {
    shard: usize,
    per_case: Vec<Vec<u64>>,
}

/// Fan-out/fan-in worker pool over a shared [`Probe`].
pub struct Sampler<P: ?Sized> {
    prober: Arc<P>,
    concurrency: usize,
    shard_policy: ShardPolicy,
    schedule: Schedule,
}

impl<P: ?Sized> std::fmt::Debug for Sampler<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("concurrency", &self.concurrency)
            .field("shard_policy", &self.shard_policy)
            .field("schedule", &self.schedule)
            .finish()
    }
}

impl<P> Sampler<P>
where
    P: Probe + ?Sized + 'static,
{
    /// Create a sampler with `concurrency` workers and default policies.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::Configuration` if `concurrency` is zero.
    pub fn new(prober: Arc<P>, concurrency: usize) -> Result<Self> {
        if concurrency == 0 {
            return Err(OracleError::config("concurrency must be at least 1"));
        }
        Ok(Self {
            prober,
            concurrency,
            shard_policy: ShardPolicy::default(),
            schedule: Schedule::default(),
        })
    }

    /// Create a sampler from the relevant fields of `config`.
    pub fn from_config(prober: Arc<P>, config: &Config) -> Result<Self> {
        Ok(Self::new(prober, config.concurrency)?
            .shard_policy(config.shard_policy)
            .schedule(config.schedule))
    }

    /// Set the remainder policy.
    pub fn shard_policy(mut self, policy: ShardPolicy) -> Self {
        self.shard_policy = policy;
        self
    }

    /// Set the per-worker case order.
    pub fn schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Samples per case that `count` requested iterations will produce.
    pub fn expected_samples(&self, count: usize) -> usize {
        self.shard_policy.shard_sizes(count, self.concurrency).iter().sum()
    }

    /// Collect `count` samples per case.
    ///
    /// # Errors
    ///
    /// Returns the first worker failure as `OracleError::Measurement`, naming
    /// the shard and case. No partial batch is returned.
    pub async fn sample(&self, cases: &[RequestCase], count: usize) -> Result<SampleBatch> {
        let mut batch = SampleBatch::empty(cases);
        if count == 0 || cases.is_empty() {
            return Ok(batch);
        }

        let shard_sizes = self.shard_policy.shard_sizes(count, self.concurrency);
        debug!(
            count,
            workers = self.concurrency,
            ?shard_sizes,
            cases = cases.len(),
            "starting sampler"
        );

        let cases: Arc<[RequestCase]> = cases.into();
        let token = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel(self.concurrency);

        for (shard, iterations) in shard_sizes.into_iter().enumerate() {
            let tx = tx.clone();
            let prober = Arc::clone(&self.prober);
            let cases = Arc::clone(&cases);
            let token = token.clone();
            let schedule = self.schedule;
            tokio::spawn(async move {
                if token.is_cancelled() {
                    trace!(shard, "shard cancelled before start");
                    return;
                }
                let report =
                    run_shard(shard, iterations, &cases, prober.as_ref(), schedule, &token).await;
                if let Some(report) = report.transpose() {
                    // The collector may already have returned.
                    let _ = tx.send(report).await;
                }
            });
        }
        drop(tx);

        let expected = self.concurrency;
        let mut reported = 0;
        while reported < expected {
            match rx.recv().await {
                Some(Ok(shard)) => {
                    for (index, samples) in shard.per_case.iter().enumerate() {
                        if let Some(dataset) = batch.dataset_mut(index) {
                            dataset.extend_from(samples);
                        }
                    }
                    trace!(shard = shard.shard, "shard merged");
                    reported += 1;
                }
                Some(Err(err)) => {
                    token.cancel();
                    warn!(error = %err, "sampler aborted");
                    return Err(err);
                }
                None => {
                    token.cancel();
                    return Err(OracleError::WorkerLost { reported, expected });
                }
            }
        }

        Ok(batch)
    }
}

/// Probe plan for one worker: case indices in visiting order.
///
/// The interleaved plan is produced lazily; only the shuffled plan is
/// materialized.
fn shard_plan(
    schedule: Schedule,
    n_cases: usize,
    iterations: usize,
) -> Box<dyn Iterator<Item = usize> + Send> {
    match schedule {
        Schedule::Interleaved => Box::new((0..iterations).flat_map(move |_| 0..n_cases)),
        Schedule::Shuffled => {
            let mut plan: Vec<usize> = (0..n_cases)
                .flat_map(|case| std::iter::repeat(case).take(iterations))
                .collect();
            plan.shuffle(&mut rand::rng());
            Box::new(plan.into_iter())
        }
    }
}

/// Run one worker's shard.
///
/// Returns `Ok(None)` if the run was cancelled before the shard finished.
async fn run_shard<P>(
    shard: usize,
    iterations: usize,
    cases: &[RequestCase],
    prober: &P,
    schedule: Schedule,
    token: &CancellationToken,
) -> Result<Option<ShardSamples>>
where
    P: Probe + ?Sized,
{
    let plan = shard_plan(schedule, cases.len(), iterations);
    let mut per_case = vec![Vec::new(); cases.len()];

    for index in plan {
        if token.is_cancelled() {
            trace!(shard, "shard stopped after cancellation");
            return Ok(None);
        }
        let case = &cases[index];
        let latency_ns = prober
            .probe(case)
            .await
            .map_err(|source| OracleError::Measurement {
                shard,
                case: case.label().to_string(),
                source,
            })?;
        per_case[index].push(latency_ns);
    }

    Ok(Some(ShardSamples { shard, per_case }))
}
