//! Error types for remote timing measurement.
//!
//! Every error is fatal to the run that produced it. A dropped or retried
//! probe would silently bias the dataset, so nothing here is retryable.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OracleError>;

/// Failure of a single timed round trip.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    /// Connection establishment or the round trip itself failed.
    #[error("round trip failed: {0}")]
    Transport(String),

    /// The response body could not be drained or closed.
    #[error("failed to drain response body: {0}")]
    Body(String),
}

/// Top-level error for a measurement run.
#[derive(Debug, Error)]
pub enum OracleError {
    /// A worker failed while probing a case. Carries the first failure only.
    #[error("shard {shard} failed while probing case `{case}`: {source}")]
    Measurement {
        /// Index of the worker shard that failed.
        shard: usize,
        /// Label of the case being probed.
        case: String,
        /// Underlying probe failure.
        #[source]
        source: ProbeError,
    },

    /// A worker task ended without reporting (panicked or was dropped).
    #[error("worker task exited without reporting ({reported} of {expected} shards reported)")]
    WorkerLost {
        /// Shards that reported before the loss was noticed.
        reported: usize,
        /// Shards that were spawned.
        expected: usize,
    },

    /// Statistics were requested on too few samples.
    #[error("insufficient data for case `{case}`: {len} samples, need at least {min}")]
    InsufficientData {
        /// Case label (or `baseline` for pooled data).
        case: String,
        /// Samples available.
        len: usize,
        /// Samples required.
        min: usize,
    },

    /// Invalid configuration (concurrency, target URL, confidence, ...).
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Coarse classification of [`OracleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection or round-trip failure.
    Transport,
    /// Response body drain/close failure.
    Body,
    /// Too few samples for the requested statistic.
    InsufficientData,
    /// Invalid configuration.
    Configuration,
}

impl OracleError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an insufficient-data error.
    pub fn insufficient(case: impl Into<String>, len: usize, min: usize) -> Self {
        Self::InsufficientData {
            case: case.into(),
            len,
            min,
        }
    }

    /// Classify this error.
    ///
    /// A lost worker is reported as a transport failure: the round could not
    /// be completed and no sample is trustworthy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Measurement {
                source: ProbeError::Transport(_),
                ..
            } => ErrorKind::Transport,
            Self::Measurement {
                source: ProbeError::Body(_),
                ..
            } => ErrorKind::Body,
            Self::WorkerLost { .. } => ErrorKind::Transport,
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            Self::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Measurement errors are never retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_error_names_shard_and_case() {
        let err = OracleError::Measurement {
            shard: 2,
            case: "correct@email.com".to_string(),
            source: ProbeError::Transport("connection refused".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("shard 2"));
        assert!(msg.contains("correct@email.com"));
        assert!(msg.contains("connection refused"));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_kinds() {
        let body = OracleError::Measurement {
            shard: 0,
            case: "a".into(),
            source: ProbeError::Body("reset".into()),
        };
        assert_eq!(body.kind(), ErrorKind::Body);
        assert_eq!(
            OracleError::insufficient("a", 1, 2).kind(),
            ErrorKind::InsufficientData
        );
        assert_eq!(OracleError::config("bad").kind(), ErrorKind::Configuration);
        assert!(!OracleError::config("bad").is_retryable());
    }
}
