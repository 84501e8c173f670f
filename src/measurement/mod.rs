//! Measurement infrastructure for remote timing analysis.
//!
//! This module provides:
//! - A [`Probe`] abstraction performing one timed round trip per call, with an
//!   HTTP implementation on a shared connection pool
//! - A [`Sampler`] fanning probes out over a fixed pool of concurrent workers
//! - An [`Aggregator`] accumulating sampler batches across refinement rounds
//!
//! # Timing Discipline
//!
//! Latency is taken from just before dispatch to the arrival of the response
//! head. The body is drained afterwards and never counted. All workers and all
//! cases share one transport so connection reuse is identical across cases.

mod aggregate;
mod prober;
mod sampler;

pub use aggregate::Aggregator;
pub use prober::{HttpProber, Probe};
pub use sampler::Sampler;
