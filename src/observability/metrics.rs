//! Metrics collection and exposition.
//!
//! # Metrics
//! - `front_requests_total` (counter): requests by route type and status
//! - `front_request_duration_seconds` (histogram): dispatch latency by route type
//! - `front_comments_total` (counter): comment submissions by outcome
//! - `front_files_total` (counter): file requests by outcome
//!
//! Recording is a no-op until a recorder is installed, so the front
//! controller can be used without the exporter (tests, embedding).

use std::net::SocketAddr;
use std::time::Instant;

use axum::routing::get;
use axum::Router;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

/// Install the Prometheus recorder and describe the front metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    Ok(handle)
}

/// Serve `/metrics` on its own listener until shutdown.
pub async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let app = Router::new().route(
        "/metrics",
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    );

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "Metrics endpoint listening");

    tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await;
        if let Err(e) = result {
            tracing::error!(error = %e, "Metrics endpoint failed");
        }
    });
    Ok(())
}

fn describe_metrics() {
    describe_counter!("front_requests_total", "Requests served by route type and status");
    describe_histogram!(
        "front_request_duration_seconds",
        "Time spent dispatching a request, by route type"
    );
    describe_counter!("front_comments_total", "Comment submissions by outcome");
    describe_counter!("front_files_total", "Public file requests by outcome");
}

pub fn record_request(route: &str, status: u16, start: Instant) {
    counter!(
        "front_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("front_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// `outcome` is one of preview, invalid, rejected, error, published,
/// pending or honeypot.
pub fn record_comment(outcome: &'static str) {
    counter!("front_comments_total", "outcome" => outcome).increment(1);
}

pub fn record_file(outcome: &'static str) {
    counter!("front_files_total", "outcome" => outcome).increment(1);
}
