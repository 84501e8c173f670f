//! Shared test doubles.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use http_timing_oracle::measurement::Probe;
use http_timing_oracle::{ProbeError, RequestCase};

/// Probe with per-label latencies and an optional scripted failure.
///
/// Calls are numbered from zero in the order they reach the probe.
pub struct ScriptedProbe {
    default_ns: u64,
    latencies: HashMap<String, u64>,
    fail_on_call: Option<usize>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    /// Every case answers in `ns`.
    pub fn constant(ns: u64) -> Self {
        Self {
            default_ns: ns,
            latencies: HashMap::new(),
            fail_on_call: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer `label` in `ns`.
    pub fn with_latency(mut self, label: &str, ns: u64) -> Self {
        self.latencies.insert(label.to_string(), ns);
        self
    }

    /// Fail with a transport error on call number `n`.
    pub fn fail_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Sleep before answering every successful call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Calls made so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn probe(&self, case: &RequestCase) -> Result<u64, ProbeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_call == Some(call) {
            return Err(ProbeError::Transport(format!("scripted failure on call {call}")));
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .latencies
            .get(case.label())
            .copied()
            .unwrap_or(self.default_ns))
    }
}

/// Two cases against a placeholder target.
pub fn two_cases() -> Vec<RequestCase> {
    RequestCase::from_labels(
        "http://localhost:3001",
        "email",
        &["whatever@fake.com", "correct@email.com"],
    )
    .unwrap()
}
