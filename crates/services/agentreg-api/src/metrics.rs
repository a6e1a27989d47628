use axum::{routing::get, Router};
use prometheus::{gather, Encoder, TextEncoder};
use std::net::SocketAddr;

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> String {
    let encoder = TextEncoder::new();
    let metric_families = gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode Prometheus metrics: {}", e);
        return format!("# ERROR: Failed to encode metrics: {}\n", e);
    }
    match String::from_utf8(buffer) {
        Ok(metrics_text) => metrics_text,
        Err(e) => {
            tracing::error!("Failed to convert Prometheus buffer to UTF-8: {}", e);
            "# ERROR: Failed to convert buffer to UTF-8\n".to_string()
        }
    }
}

/// Serve `/metrics` on a dedicated listener. Runs until the listener fails.
pub async fn run_metrics_server(addr: SocketAddr) {
    let app = Router::new().route("/metrics", get(metrics_handler));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind metrics server to {}: {}", addr, e);
            return;
        }
    };
    tracing::info!("Metrics server listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Metrics server failed: {}", e);
    }
}
