//! End-to-end integration tests against the in-process demo server.

use std::net::SocketAddr;
use std::time::Duration;

use http_timing_oracle::demo::{self, DemoConfig, CORRECT_EMAIL};
use http_timing_oracle::output::{format_round, format_summary, to_json};
use http_timing_oracle::{
    compare, ErrorKind, Estimate, Mode, OracleError, RemoteOracle, StopReason, MAX_ITERATIONS,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct DemoServer {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl DemoServer {
    async fn start(config: DemoConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(demo::serve(listener, config, async move {
            let _ = rx.await;
        }));
        Self { addr, stop, handle }
    }

    fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    async fn shutdown(self) {
        let _ = self.stop.send(());
        self.handle.await.unwrap().unwrap();
    }
}

/// Basic smoke test that a full run completes.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn smoke_test() {
    let server = DemoServer::start(DemoConfig::default()).await;

    let mut lines = Vec::new();
    let labels = ["whatever@fake.com", CORRECT_EMAIL];
    let summary = RemoteOracle::for_target(&server.url(), "email", &labels)
        .unwrap()
        .concurrency(2)
        .max_iterations(30)
        .run(|report| lines.push(format_round(report)))
        .await
        .unwrap();

    assert_eq!(summary.reports.len(), 2);
    assert_eq!(summary.stop_reason, StopReason::Ceiling);
    for dataset in &summary.datasets {
        assert_eq!(dataset.len(), 30);
        assert!(dataset.samples().iter().all(|&ns| ns > 0));
    }
    assert!(lines[1].contains("30 iterations | Base Mean Latency CI"));
    assert!(format_summary(&summary).contains("Iterations: 30"));

    server.shutdown().await;
}

/// A clear injected leak is detected by the interval estimator.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn detects_injected_leak() {
    let server = DemoServer::start(DemoConfig::default().leak(Duration::from_millis(5))).await;

    let labels = ["whatever@fake.com", CORRECT_EMAIL];
    let summary = RemoteOracle::for_target(&server.url(), "email", &labels)
        .unwrap()
        .concurrency(4)
        .max_iterations(60)
        .run(|_| {})
        .await
        .unwrap();

    let last = summary.last().unwrap();
    assert!(last.estimate.is_distinguishable(), "{}", format_round(last));
    let Estimate::Interval(report) = &last.estimate else {
        panic!("expected an interval estimate");
    };
    assert!(report.target.mean_ms > report.base.mean_ms + 4.0);
    assert!(to_json(last).unwrap().contains("\"verdict\":\"distinguishable\""));

    server.shutdown().await;
}

/// Baseline mode singles out the leaking address among several.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn baseline_mode_finds_leaking_case() {
    let server = DemoServer::start(DemoConfig::default().leak(Duration::from_millis(5))).await;

    let summary = RemoteOracle::for_target(
        &server.url(),
        "email",
        &["a@fake.com", "b@fake.com", CORRECT_EMAIL, "c@fake.com"],
    )
    .unwrap()
    .mode(Mode::Baseline)
    .concurrency(4)
    .max_iterations(30)
    .run(|_| {})
    .await
    .unwrap();

    let Estimate::Baseline(report) = &summary.last().unwrap().estimate else {
        panic!("expected a baseline estimate");
    };
    assert_eq!(report.hit_label, CORRECT_EMAIL);
    assert!(report.verdict.is_distinguishable());

    server.shutdown().await;
}

/// The one-call comparison runs the default interval loop to the ceiling.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn compare_runs_default_loop() {
    let server = DemoServer::start(DemoConfig::default()).await;

    let summary = compare(&server.url(), "whatever@fake.com", CORRECT_EMAIL)
        .await
        .unwrap();

    assert_eq!(summary.stop_reason, StopReason::Ceiling);
    assert_eq!(summary.total_iterations(), MAX_ITERATIONS);
    assert_eq!(summary.datasets[1].label(), CORRECT_EMAIL);
    assert!(summary.verdict().is_distinguishable());

    server.shutdown().await;
}

/// A target nobody listens on fails the run with a transport error.
#[tokio::test]
async fn unreachable_target_is_fatal() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut rounds = 0;
    let err = RemoteOracle::for_target(&format!("http://{addr}/"), "email", &["a", "b"])
        .unwrap()
        .concurrency(2)
        .max_iterations(20)
        .run(|_| rounds += 1)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(matches!(err, OracleError::Measurement { .. }));
    assert_eq!(rounds, 0);
}

#[tokio::test]
async fn configuration_errors() {
    let err = RemoteOracle::for_target("not a url", "email", &["a", "b"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = RemoteOracle::for_target("http://127.0.0.1:9/", "email", &["a", "b"])
        .unwrap()
        .confidence(1.5)
        .run(|_| {})
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = RemoteOracle::for_target("http://127.0.0.1:9/", "email", &["a", "b", "c"])
        .unwrap()
        .run(|_| {})
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
