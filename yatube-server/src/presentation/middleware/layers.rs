use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::infrastructure::settings::Settings;

pub(crate) fn apply_trace(router: Router) -> Router {
    router.layer(TraceLayer::new_for_http())
}

/// Body size, per-request timeout and a process-wide cap on in-flight requests.
pub(crate) fn apply_limits(router: Router, settings: &Settings) -> Router {
    router
        .layer(RequestBodyLimitLayer::new(
            settings.http_request_body_limit_bytes,
        ))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(settings.http_request_timeout_secs),
        ))
        .layer(GlobalConcurrencyLimitLayer::new(
            settings.http_concurrency_limit,
        ))
}
