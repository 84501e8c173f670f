//! Default values shared by the configuration, the prober and the CLI.

use std::time::Duration;

/// Per-round iteration floor. Round `k` requests `k * MIN_ITERATIONS` samples per case.
pub const MIN_ITERATIONS: usize = 10;

/// Default ceiling on accumulated iterations per case.
pub const MAX_ITERATIONS: usize = 10_000;

/// Default number of concurrent probe workers.
pub const CONCURRENCY: usize = 8;

/// Default two-sided confidence level.
pub const CONFIDENCE: f64 = 0.95;

/// Smallest dataset the interval estimator accepts.
pub const MIN_SAMPLES_FOR_STDDEV: usize = 2;

/// TCP connect timeout for the shared transport.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// TCP keep-alive interval for the shared transport.
pub const TCP_KEEPALIVE: Duration = Duration::from_secs(24 * 60 * 60);

/// How long an idle pooled connection survives.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum idle pooled connections per host.
pub const POOL_MAX_IDLE_PER_HOST: usize = 100;

/// Query parameter carrying the case label in the reference scenario.
pub const DEFAULT_QUERY_PARAM: &str = "email";

/// Nanoseconds per millisecond.
pub const NS_PER_MS: f64 = 1_000_000.0;
