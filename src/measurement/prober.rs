//! Single timed HTTP round trips.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONNECTION};
use reqwest::{Client, Request};
use tracing::trace;

use crate::config::{ConnectionPolicy, TransportConfig};
use crate::error::{OracleError, ProbeError, Result};
use crate::types::{duration_to_ns, RequestCase};

/// One timed round trip against a request case.
///
/// Implementations return the latency in nanoseconds. A probe is never
/// retried: any failure ends the enclosing sampler invocation.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Perform exactly one round trip for `case`.
    async fn probe(&self, case: &RequestCase) -> std::result::Result<u64, ProbeError>;
}

/// HTTP prober on a shared, reusable connection pool.
///
/// Construct once per run and hand the same instance (behind an `Arc`) to
/// every worker so that all cases see identical transport behaviour.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    connection_policy: ConnectionPolicy,
}

impl HttpProber {
    /// Build the shared transport from `transport`.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::Configuration` if the TLS backend or client
    /// cannot be initialized.
    pub fn new(transport: &TransportConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .http1_only()
            .connect_timeout(transport.connect_timeout)
            .tcp_keepalive(transport.tcp_keepalive)
            .pool_idle_timeout(transport.pool_idle_timeout)
            .pool_max_idle_per_host(transport.pool_max_idle_per_host)
            .redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = transport.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| OracleError::config(format!("failed to build HTTP transport: {e}")))?;

        Ok(Self {
            client,
            connection_policy: transport.connection_policy,
        })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client, connection_policy: ConnectionPolicy) -> Self {
        Self {
            client,
            connection_policy,
        }
    }

    fn build_request(&self, case: &RequestCase) -> std::result::Result<Request, ProbeError> {
        let mut builder = self
            .client
            .request(case.method().clone(), case.url().clone())
            .headers(case.headers().clone());
        if self.connection_policy == ConnectionPolicy::Close {
            builder = builder.header(CONNECTION, HeaderValue::from_static("close"));
        }
        builder
            .build()
            .map_err(|e| ProbeError::Transport(format!("invalid request for {}: {e}", case.url())))
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, case: &RequestCase) -> std::result::Result<u64, ProbeError> {
        let request = self.build_request(case)?;

        let start = Instant::now();
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| ProbeError::Transport(format!("{} {}: {e}", case.method(), case.url())))?;
        // The response head has arrived: this is the first-byte instant.
        let latency_ns = duration_to_ns(start.elapsed());
        let status = response.status();

        // Drain after timing; the latency above is already fixed.
        response
            .bytes()
            .await
            .map_err(|e| ProbeError::Body(format!("{}: {e}", case.url())))?;

        trace!(case = case.label(), %status, latency_ns, "probe complete");
        Ok(latency_ns)
    }
}
