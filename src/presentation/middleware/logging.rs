//! Request Logging Middleware
//!
//! Records per-request metrics and emits a structured access log line.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

use crate::infrastructure::metrics;

/// Log each request and record HTTP metrics.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed = started.elapsed();
    metrics::record_http_request(method.as_str(), &path, status, elapsed.as_secs_f64());
    tracing::info!(
        method = %method,
        path = %path,
        status,
        elapsed_ms = elapsed.as_millis() as u64,
        "request"
    );

    response
}
