//! Prometheus counters and the text exposition endpoint.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

pub static HTTP_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "bookpro_http_requests_total",
        "HTTP requests served, by method and status",
        &["method", "status"]
    )
    .expect("register http counter")
});

pub static WRITES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "bookpro_writes_total",
        "Journaled writes, by kind and outcome",
        &["kind", "outcome"]
    )
    .expect("register writes counter")
});

pub static SESSIONS_ISSUED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "bookpro_sessions_issued_total",
        "Session tokens issued via signup, login, and password reset"
    )
    .expect("register sessions counter")
});

/// Middleware: count every request by method and response status.
pub async fn track(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let response = next.run(req).await;
    HTTP_REQUESTS
        .with_label_values(&[&method, response.status().as_str()])
        .inc();
    response
}

/// GET /metrics
pub async fn handler() -> Response {
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        eprintln!("[metrics] encode failed: {}", e);
        return axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    (
        [("content-type", prometheus::TEXT_FORMAT)],
        buffer,
    )
        .into_response()
}
