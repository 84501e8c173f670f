//! Configuration for remote timing analysis.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CONCURRENCY, CONFIDENCE, CONNECT_TIMEOUT, MAX_ITERATIONS, MIN_ITERATIONS,
    MIN_SAMPLES_FOR_STDDEV, NS_PER_MS, POOL_IDLE_TIMEOUT, POOL_MAX_IDLE_PER_HOST, TCP_KEEPALIVE,
};
use crate::error::{OracleError, Result};

/// Configuration options for `RemoteOracle`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Concurrent probe workers per sampler invocation (default: 8).
    pub concurrency: usize,

    /// Per-round iteration floor and increment (default: 10).
    ///
    /// Round `k` requests `k * min_iterations` new samples per case.
    pub min_iterations: usize,

    /// Ceiling on accumulated iterations per case (default: 10,000).
    pub max_iterations: usize,

    /// Two-sided confidence level in (0, 1) (default: 0.95).
    pub confidence: f64,

    /// Which estimator summarizes each round.
    pub mode: Mode,

    /// Unit handling for interval estimation.
    pub precision: Precision,

    /// What to do with `count % concurrency` leftover iterations.
    pub shard_policy: ShardPolicy,

    /// Order in which a worker visits cases.
    pub schedule: Schedule,

    /// Optional stop once the verdict has been stable for a few rounds.
    ///
    /// Disabled by default: the loop always runs to `max_iterations`.
    pub early_stop: Option<EarlyStop>,

    /// Shared transport settings.
    pub transport: TransportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: CONCURRENCY,
            min_iterations: MIN_ITERATIONS,
            max_iterations: MAX_ITERATIONS,
            confidence: CONFIDENCE,
            mode: Mode::default(),
            precision: Precision::default(),
            shard_policy: ShardPolicy::default(),
            schedule: Schedule::default(),
            early_stop: None,
            transport: TransportConfig::default(),
        }
    }
}

impl Config {
    /// Check the configuration for values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::Configuration` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(OracleError::config("concurrency must be at least 1"));
        }
        if self.min_iterations < MIN_SAMPLES_FOR_STDDEV {
            return Err(OracleError::config(format!(
                "min_iterations must be at least {MIN_SAMPLES_FOR_STDDEV}, got {}",
                self.min_iterations
            )));
        }
        if self.max_iterations < self.min_iterations {
            return Err(OracleError::config(format!(
                "max_iterations ({}) must not be below min_iterations ({})",
                self.max_iterations, self.min_iterations
            )));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(OracleError::config(format!(
                "confidence must lie in (0, 1), got {}",
                self.confidence
            )));
        }
        if let Some(early) = self.early_stop {
            if early.stable_rounds == 0 {
                return Err(OracleError::config("early_stop.stable_rounds must be at least 1"));
            }
        }
        if self.shard_policy == ShardPolicy::Truncate && self.min_iterations < self.concurrency {
            // The first round would produce zero samples per case.
            return Err(OracleError::config(format!(
                "min_iterations ({}) must be at least concurrency ({}) when truncating shards",
                self.min_iterations, self.concurrency
            )));
        }
        Ok(())
    }
}

/// Estimation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Robust multi-case comparison against a pooled baseline of the other cases.
    Baseline,
    /// Two-sample confidence-interval comparison (exactly two cases).
    #[default]
    Interval,
}

/// Unit handling applied before interval statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// Full-resolution nanoseconds, expressed as fractional milliseconds.
    #[default]
    Nanoseconds,
    /// Each sample truncated to whole milliseconds first.
    TruncatedMillis,
}

impl Precision {
    /// Convert a nanosecond sample to milliseconds under this policy.
    pub fn to_millis(self, ns: u64) -> f64 {
        match self {
            Self::Nanoseconds => ns as f64 / NS_PER_MS,
            Self::TruncatedMillis => (ns / 1_000_000) as f64,
        }
    }
}

/// Assignment of `count % concurrency` leftover iterations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShardPolicy {
    /// The first `count % concurrency` workers each take one extra iteration.
    #[default]
    Distribute,
    /// Every worker takes `count / concurrency`; the remainder is not measured.
    Truncate,
}

impl ShardPolicy {
    /// Per-worker iteration counts for `count` iterations over `concurrency` workers.
    pub fn shard_sizes(self, count: usize, concurrency: usize) -> Vec<usize> {
        let workers = concurrency.max(1);
        let base = count / workers;
        let remainder = count % workers;
        (0..workers)
            .map(|i| match self {
                Self::Distribute if i < remainder => base + 1,
                _ => base,
            })
            .collect()
    }
}

/// Order in which one worker probes the cases of a round.
///
/// Every worker follows the same discipline, so each case receives the
/// same number of probes from every worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    /// Each iteration probes every case once, in case order.
    #[default]
    Interleaved,
    /// Balanced schedule shuffled independently per worker.
    Shuffled,
}

/// Early termination once the verdict stabilizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarlyStop {
    /// Consecutive distinguishable rounds required before stopping.
    pub stable_rounds: usize,
}

/// Connection handling applied uniformly to every probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPolicy {
    /// Send `Connection: close` so every probe pays connection setup.
    #[default]
    Close,
    /// Let the shared pool reuse connections.
    Reuse,
}

/// Settings for the shared HTTP transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// TCP connect timeout (default: 30s).
    pub connect_timeout: Duration,
    /// TCP keep-alive interval (default: 24h).
    pub tcp_keepalive: Duration,
    /// Idle pooled connection lifetime (default: 10s).
    pub pool_idle_timeout: Duration,
    /// Idle pooled connections kept per host (default: 100).
    pub pool_max_idle_per_host: usize,
    /// Optional end-to-end timeout per round trip.
    pub request_timeout: Option<Duration>,
    /// Connection reuse discipline.
    pub connection_policy: ConnectionPolicy,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
            tcp_keepalive: TCP_KEEPALIVE,
            pool_idle_timeout: POOL_IDLE_TIMEOUT,
            pool_max_idle_per_host: POOL_MAX_IDLE_PER_HOST,
            request_timeout: None,
            connection_policy: ConnectionPolicy::default(),
        }
    }
}
