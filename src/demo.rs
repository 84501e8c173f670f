//! Deliberately leaky login endpoint for exercising the oracle.
//!
//! Every request sleeps `max(0, base + N(0, sd))` milliseconds. A request
//! whose `email` equals the configured correct address then sleeps a further
//! fixed amount, standing in for a password check that only runs on a match.
//! The response is always `401 Unauthorized` with an empty body.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Address whose requests take the slow path.
pub const CORRECT_EMAIL: &str = "correct@email.com";

/// Extra time spent on the matching path.
pub const LEAK: Duration = Duration::from_micros(500);

/// Behaviour of the demo endpoint.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Mean injected latency in milliseconds (default: 0).
    pub base_latency_ms: f64,
    /// Standard deviation of the injected latency in milliseconds (default: 0).
    pub std_dev_ms: f64,
    /// Query value that triggers the leak.
    pub correct_email: String,
    /// Leak duration (default: 500µs).
    pub leak: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            base_latency_ms: 0.0,
            std_dev_ms: 0.0,
            correct_email: CORRECT_EMAIL.to_string(),
            leak: LEAK,
        }
    }
}

impl DemoConfig {
    /// Set the mean injected latency.
    pub fn base_latency_ms(mut self, ms: f64) -> Self {
        self.base_latency_ms = ms;
        self
    }

    /// Set the injected latency spread.
    pub fn std_dev_ms(mut self, ms: f64) -> Self {
        self.std_dev_ms = ms;
        self
    }

    /// Set the leak duration.
    pub fn leak(mut self, leak: Duration) -> Self {
        self.leak = leak;
        self
    }

    /// Draw one noise delay, clamped at zero.
    fn noise(&self) -> Duration {
        let z: f64 = rand::rng().sample(StandardNormal);
        let ms = (self.base_latency_ms + z * self.std_dev_ms).max(0.0);
        Duration::from_secs_f64(ms / 1_000.0)
    }
}

#[derive(Debug, Deserialize)]
struct LoginQuery {
    #[serde(default)]
    email: Option<String>,
}

async fn login(
    State(config): State<Arc<DemoConfig>>,
    Query(query): Query<LoginQuery>,
) -> StatusCode {
    let noise = config.noise();
    if !noise.is_zero() {
        tokio::time::sleep(noise).await;
    }

    let matched = query.email.as_deref() == Some(config.correct_email.as_str());
    if matched && !config.leak.is_zero() {
        // tokio timers have millisecond granularity.
        let leak = config.leak;
        let _ = tokio::task::spawn_blocking(move || std::thread::sleep(leak)).await;
    }

    debug!(email = ?query.email, ?noise, matched, "login attempt");
    StatusCode::UNAUTHORIZED
}

/// Build the demo router.
pub fn router(config: DemoConfig) -> Router {
    Router::new()
        .route("/", get(login))
        .with_state(Arc::new(config))
}

/// Serve the demo endpoint on `listener` until `shutdown` resolves.
///
/// In-flight requests finish before this returns.
///
/// # Errors
///
/// Returns the underlying I/O error if the server fails.
pub async fn serve<F>(
    listener: TcpListener,
    config: DemoConfig,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: Option<SocketAddr> = listener.local_addr().ok();
    info!(
        ?addr,
        base_ms = config.base_latency_ms,
        sd_ms = config.std_dev_ms,
        "demo server listening"
    );
    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown)
        .await?;
    debug!("demo server shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_noise() {
        assert!(DemoConfig::default().noise().is_zero());
    }

    #[test]
    fn test_noise_is_clamped() {
        let config = DemoConfig::default().base_latency_ms(-100.0).std_dev_ms(1.0);
        for _ in 0..100 {
            assert!(config.noise().is_zero());
        }
    }

    #[test]
    fn test_noise_without_spread_is_base() {
        let config = DemoConfig::default().base_latency_ms(2.0);
        assert!((config.noise().as_secs_f64() - 0.002).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_always_unauthorized() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, DemoConfig::default(), async move {
            let _ = rx.await;
        }));

        let client = reqwest::Client::new();
        for email in ["whatever@fake.com", CORRECT_EMAIL] {
            let response = client
                .get(format!("http://{addr}/?email={email}"))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
            assert!(response.bytes().await.unwrap().is_empty());
        }

        tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
