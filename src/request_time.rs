use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::config::AppConfig;

/// request_time_middleware
///
/// Times each request with its own `Instant` and emits a warning when the request took
/// longer than the configured threshold. Nothing is shared between requests.
pub async fn request_time_middleware(
    State(config): State<AppConfig>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let elapsed = started.elapsed();
    if is_slow(elapsed, config.slow_request_threshold()) {
        tracing::warn!(
            %method,
            %path,
            elapsed_ms = elapsed_ms(elapsed),
            "Slow request"
        );
    }
    response
}

pub fn is_slow(elapsed: Duration, threshold: Duration) -> bool {
    elapsed > threshold
}

/// Whole milliseconds, saturating at `u64::MAX`.
pub fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
